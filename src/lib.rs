//! Interpreter for a small turtle-graphics command language.
//!
//! Commands such as `forward(100)`, `arc(50, 90)` or `LOOP4{forward(10);turn(90)}`
//! drive a [`Turtle`] whose motions are animated over time and tested against
//! an obstacle field at every step. The [`Interpreter`] runs commands in strict
//! order, waiting on each motion before the next command starts.

use pest_derive::Parser;

pub mod ast;
pub mod driver;
pub mod errors;
pub mod field;
pub mod geometry;
pub mod interp;
pub mod log;
pub mod motion;
pub mod parse;
pub mod playback;
pub mod session;
pub mod types;

pub use driver::{CompletionSource, Dispatch, Driver, MotionSink, Stepper};
pub use errors::{ParseError, SessionError};
pub use field::{Canvas, Obstacle, ObstacleField};
pub use interp::Interpreter;
pub use motion::{MotionEvent, MotionId, Turtle, TurtleConfig};
pub use playback::{Playback, PlaybackHandle};
pub use session::SessionState;
pub use types::{Color, Line, MovementResult};

#[derive(Parser)]
#[grammar = "turtle.pest"]
pub struct TurtleParser;

/// Run a script headlessly on a fresh turtle and return its final state.
pub fn run_script(source: &str) -> SessionState {
    let mut interpreter = Interpreter::headless(Turtle::default());
    interpreter.run_script(source);
    interpreter.settle();
    SessionState::capture(interpreter.turtle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pest::Parser;

    #[test]
    fn parse_forward() {
        let result = TurtleParser::parse(Rule::command, "forward(100)");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_fractional_arguments() {
        for input in ["turn(.5)", "turn(-0.25)", "arc(10,-90)", "setcolor(1,2.5,3)"] {
            let result = TurtleParser::parse(Rule::command, input);
            assert!(result.is_ok(), "Failed to parse {input}: {:?}", result.err());
        }
    }

    #[test]
    fn parse_optional_parens() {
        for input in ["up", "up()", "down", "down()"] {
            let result = TurtleParser::parse(Rule::command, input);
            assert!(result.is_ok(), "Failed to parse {input}: {:?}", result.err());
        }
    }

    #[test]
    fn keyword_prefix_is_not_a_keyword() {
        // "upper" must not match `up` and leave "per" behind
        let result = TurtleParser::parse(Rule::command, "upper=1");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
        let result = TurtleParser::parse(Rule::command, "upper");
        assert!(result.is_err());
    }

    #[test]
    fn parse_assignment_forms() {
        for input in ["x=1", "x=-2.5", "x=add(1,2)", "x=mul(-1,2.5)"] {
            let result = TurtleParser::parse(Rule::command, input);
            assert!(result.is_ok(), "Failed to parse {input}: {:?}", result.err());
        }
    }

    #[test]
    fn parse_call_with_plus_sign() {
        let result = TurtleParser::parse(Rule::call, "square(+4)");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_nested_inline_loop() {
        let result = TurtleParser::parse(Rule::inline_loop, "LOOP2{LOOP3{forward(1)};turn(5)}");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_block_headers() {
        let result = TurtleParser::parse(Rule::def_header, "DEF square(side) {");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
        let result = TurtleParser::parse(Rule::loop_header, "  LOOP 12{");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn run_script_draws_a_square() {
        let state = run_script("LOOP 4 {\n forward(20)\n turn(90)\n}\n");
        assert_eq!(state.lines.len(), 4);
        assert!(state.position.distance(glam::dvec2(450.0, 450.0)) < 1e-6);
        assert_eq!(state.rotation, 0.0);
    }
}
