//! Command interpreter.
//!
//! This module is organized into submodules:
//! - `env`: Variable store and function table
//! - `subst`: Variable substitution inside commands
//! - `blocks`: Block bodies and `;` splitting
//!
//! Commands run strictly in textual order. Before each sub-command the
//! interpreter waits on whatever motion the previous one started, so a
//! command always sees the complete effect of the one before it, including a
//! rollback after a collision. A sub-command that does not parse is reported
//! and dropped without affecting its siblings.

pub mod blocks;
pub mod env;
pub mod subst;

use glam::dvec2;

pub use env::{Environment, Function, MAX_CALL_DEPTH};

use crate::ast::{BlockHeader, Call, Command, InlineLoop};
use crate::driver::{Dispatch, Driver, Stepper};
use crate::errors::ParseError;
#[cfg(feature = "tracing")]
use crate::errors::render_diagnostic;
use crate::log::{debug, warn};
use crate::motion::{MotionId, Turtle};
use crate::parse;
use crate::types::{Color, MovementResult};

/// Executes commands and scripts against a [`Driver`].
#[derive(Debug)]
pub struct Interpreter<D: Driver> {
    driver: D,
    env: Environment,
    history: Vec<String>,
    errors: Vec<ParseError>,
    in_flight: Option<MotionId>,
    last_result: Option<MovementResult>,
    call_depth: usize,
}

impl Interpreter<Stepper> {
    /// Interpreter over a headless stepper.
    pub fn headless(turtle: Turtle) -> Self {
        Interpreter::new(Stepper::new(turtle))
    }

    pub fn turtle(&self) -> &Turtle {
        self.driver.turtle()
    }
}

impl<D: Driver> Interpreter<D> {
    pub fn new(driver: D) -> Self {
        Interpreter {
            driver,
            env: Environment::new(),
            history: Vec::new(),
            errors: Vec::new(),
            in_flight: None,
            last_result: None,
            call_depth: 0,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Wait for any motion in flight and give back the driver.
    pub fn into_driver(mut self) -> D {
        self.settle();
        self.driver
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn variable(&self, name: &str) -> Option<f32> {
        self.env.get(name)
    }

    /// Every command executed so far, after variable substitution
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Result of the most recent motion request
    pub fn last_result(&self) -> Option<MovementResult> {
        self.last_result
    }

    /// Errors reported since the last call
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Wait for the motion in flight, if any, and return its result.
    pub fn settle(&mut self) -> Option<MovementResult> {
        let motion = self.in_flight.take()?;
        let result = self.driver.wait_for(motion);
        debug!(motion = motion.get(), %result, "motion settled");
        self.last_result = Some(result);
        Some(result)
    }

    /// Execute one line of `;`-separated commands.
    ///
    /// Returns the commands that ran. The last motion may still be in
    /// flight; it is waited on before the next command or by [`Self::settle`].
    pub fn run_line(&mut self, line: &str) -> Vec<String> {
        let mut executed = Vec::new();
        self.exec_line(line, &mut executed);
        executed
    }

    /// Execute a multi-line script, including `DEF` and `LOOP` blocks.
    pub fn run_script(&mut self, source: &str) -> Vec<String> {
        let mut executed = Vec::new();
        self.exec_lines(&mut source.lines(), &mut executed);
        executed
    }

    // ─── Execution ───────────────────────────────────────────────────────────

    fn exec_lines<I, S>(&mut self, lines: &mut I, out: &mut Vec<String>)
    where
        I: Iterator<Item = S>,
        S: AsRef<str>,
    {
        while let Some(line) = lines.next() {
            let line = line.as_ref();
            self.settle();

            let header = match parse::parse_block_header(line) {
                Ok(header) => header,
                Err(err) => {
                    // Skip the body of a loop whose count is unusable
                    blocks::read_body(lines);
                    self.report(err);
                    continue;
                }
            };

            match header {
                Some(BlockHeader::Def { name, param }) => {
                    let body = blocks::read_body(lines);
                    self.define(line, name, param, body);
                }
                Some(BlockHeader::Loop { count }) => match blocks::read_body(lines) {
                    Some(body) => {
                        debug!(count, lines = body.len(), "running loop block");
                        for _ in 0..count {
                            self.exec_lines(&mut body.iter(), out);
                        }
                    }
                    None => self.report(ParseError::UnterminatedBlock {
                        header: line.trim().to_string(),
                    }),
                },
                None => self.exec_line(line, out),
            }
        }
    }

    fn define(&mut self, header: &str, name: String, param: Option<String>, body: Option<Vec<String>>) {
        let Some(body) = body else {
            self.report(ParseError::UnterminatedBlock {
                header: header.trim().to_string(),
            });
            return;
        };
        if self.call_depth > 0 {
            self.report(ParseError::NestedDefinition { name });
            return;
        }
        debug!(name = %name, ?param, lines = body.len(), "function defined");
        if self.env.define(name.clone(), Function { param, body }) {
            debug!(name = %name, "function redefined");
        }
    }

    fn exec_line(&mut self, line: &str, out: &mut Vec<String>) {
        let line = subst::strip_whitespace(line);
        for command in blocks::split_commands(&line) {
            if command.is_empty() {
                continue;
            }
            self.settle();
            self.exec_command(command, out);
        }
    }

    fn exec_command(&mut self, command: &str, out: &mut Vec<String>) {
        match parse::parse_inline_loop(command) {
            Ok(Some(inline)) => {
                self.run_inline_loop(inline, out);
                return;
            }
            Ok(None) => {}
            Err(err) => {
                self.report(err);
                return;
            }
        }

        let command = subst::substitute(command, &self.env);

        if let Some(call) = parse::parse_call(&command) {
            if self.env.has_function(&call.name) {
                self.call(call, out);
                return;
            }
        }

        match parse::parse_command(&command) {
            Ok(parsed) => {
                debug!(command = %command, motion = parsed.is_motion(), "executing");
                self.history.push(command.clone());
                out.push(command);
                self.execute(parsed);
            }
            Err(err) => self.report(err),
        }
    }

    fn run_inline_loop(&mut self, inline: InlineLoop, out: &mut Vec<String>) {
        debug!(count = inline.count, body = %inline.body, "running inline loop");
        for _ in 0..inline.count {
            self.exec_line(&inline.body, out);
        }
    }

    fn call(&mut self, call: Call, out: &mut Vec<String>) {
        if self.call_depth >= MAX_CALL_DEPTH {
            self.report(ParseError::CallDepthExceeded {
                name: call.name,
                max: MAX_CALL_DEPTH,
            });
            return;
        }
        let Some(function) = self.env.function(&call.name).cloned() else {
            return;
        };

        debug!(name = %call.name, argument = ?call.argument, "calling function");
        self.env.bind_argument(&function, call.argument);
        self.call_depth += 1;
        self.exec_lines(&mut function.body.iter(), out);
        self.call_depth -= 1;
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Forward(distance) => {
                let dispatch = self.driver.forward(distance);
                self.dispatched(dispatch);
            }
            Command::Turn(degrees) => {
                let dispatch = self.driver.turn(degrees);
                self.dispatched(dispatch);
            }
            Command::Arc { radius, degrees } => {
                let dispatch = self.driver.arc(radius, degrees);
                self.dispatched(dispatch);
            }
            Command::SetRotation(degrees) => self.driver.set_rotation(degrees),
            Command::SetPosition(x, y) => self.driver.set_position(dvec2(x as f64, y as f64)),
            Command::PenUp => self.driver.set_pen_down(false),
            Command::PenDown => self.driver.set_pen_down(true),
            Command::SetSize(radius) => self.driver.set_pen_size(radius),
            Command::SetSpeed(speed) => self.driver.set_speed(speed),
            Command::SetColor(r, g, b) => self.driver.set_pen_color(Color::from_components(r, g, b)),
            Command::Assign { name, value } => self.env.set(name, value.eval()),
        }
    }

    fn dispatched(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Settled(result) => {
                if result == MovementResult::Failure {
                    warn!("motion rejected");
                }
                self.last_result = Some(result);
            }
            Dispatch::InFlight(motion) => self.in_flight = Some(motion),
        }
    }

    fn report(&mut self, err: ParseError) {
        warn!("command dropped\n{}", render_diagnostic(&err));
        self.errors.push(err);
    }
}
