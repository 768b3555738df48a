//! Variable substitution.
//!
//! Runs on each sub-command before it is parsed: every comma-separated token
//! inside a parenthesized list that names a variable is replaced with its
//! value, and `x=y` becomes `x=<value of y>`. Unknown tokens are left alone so
//! they surface as parse errors.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use super::env::Environment;

static ARG_LIST: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").ok());

static ALIAS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]\w*)=([A-Za-z_]\w*)$").ok());

/// Strip all whitespace from a command.
pub fn strip_whitespace(command: &str) -> String {
    command.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Replace variable names in `command` with their values.
pub fn substitute(command: &str, env: &Environment) -> String {
    let command = strip_whitespace(command);

    let replaced = match ARG_LIST.as_ref() {
        Some(args) => args
            .replace_all(&command, |caps: &Captures<'_>| {
                let list: Vec<String> = caps[1]
                    .split(',')
                    .map(|token| substitute_token(token, env))
                    .collect();
                format!("({})", list.join(","))
            })
            .into_owned(),
        None => command,
    };

    if let Some(caps) = ALIAS.as_ref().and_then(|alias| alias.captures(&replaced)) {
        if let Some(value) = env.get(&caps[2]) {
            return format!("{}={}", &caps[1], value);
        }
    }
    replaced
}

fn substitute_token(token: &str, env: &Environment) -> String {
    let (sign, name) = match token.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, token),
    };
    match env.get(name) {
        Some(value) => format!("{}", sign * value),
        None => token.to_string(),
    }
}
