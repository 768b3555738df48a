//! Variable store and user-function table.

use std::collections::HashMap;

/// Function calls nest at most this deep: a body cannot call another function.
pub const MAX_CALL_DEPTH: usize = 1;

/// A user-defined function: raw body lines and an optional parameter name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Function {
    pub param: Option<String>,
    pub body: Vec<String>,
}

/// Variables and functions visible to every subsequent command
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, f32>,
    functions: HashMap<String, Function>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.vars.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f32) {
        self.vars.insert(name.into(), value);
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, f32)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Define or overwrite a function. Returns true if it replaced one.
    pub fn define(&mut self, name: impl Into<String>, function: Function) -> bool {
        self.functions.insert(name.into(), function).is_some()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Bind a call argument to the function's parameter, if both exist.
    pub(crate) fn bind_argument(&mut self, function: &Function, argument: Option<f32>) {
        if let (Some(param), Some(value)) = (&function.param, argument) {
            self.set(param.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_overwrite() {
        let mut env = Environment::new();
        env.set("x", 1.0);
        env.set("x", 2.5);
        assert_eq!(env.get("x"), Some(2.5));
        assert_eq!(env.get("y"), None);
        assert_eq!(env.variables().count(), 1);
    }

    #[test]
    fn redefinition_replaces_the_body() {
        let mut env = Environment::new();
        let first = Function {
            param: None,
            body: vec!["forward(1)".into()],
        };
        let second = Function {
            param: Some("n".into()),
            body: vec!["forward(n)".into()],
        };
        assert!(!env.define("step", first));
        assert!(env.define("step", second.clone()));
        assert_eq!(env.function("step"), Some(&second));
        assert!(env.has_function("step"));
    }

    #[test]
    fn argument_binds_to_parameter() {
        let mut env = Environment::new();
        let f = Function {
            param: Some("side".into()),
            body: Vec::new(),
        };
        env.bind_argument(&f, Some(40.0));
        assert_eq!(env.get("side"), Some(40.0));

        // No argument leaves the previous value alone
        env.bind_argument(&f, None);
        assert_eq!(env.get("side"), Some(40.0));
    }
}
