//! Run a turtle script headlessly and print the saved session record.
//!
//! ```text
//! cargo run --example run_script -- drawing.turtle
//! RUST_LOG=turtlescript=debug cargo run --features tracing --example run_script
//! ```

use tracing_subscriber::EnvFilter;
use turtlescript::{Interpreter, SessionState, Turtle};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let source = std::env::args()
        .nth(1)
        .map(|path| std::fs::read_to_string(&path).expect("Failed to read script"))
        .unwrap_or_else(|| {
            r#"DEF star(size) {
  LOOP 5 {
    forward(size)
    turn(144)
  }
}
setcolor(200, 40, 40)
star(120)
up; setpos(300, 700); down
LOOP6{arc(30, 60); turn(-60)}"#
                .to_string()
        });

    let mut interpreter = Interpreter::headless(Turtle::default());
    interpreter.run_script(&source);
    interpreter.settle();

    for err in interpreter.take_errors() {
        eprintln!("{:?}", miette::Report::new(err));
    }

    eprintln!(
        "{} commands, {:?} of simulated motion",
        interpreter.history().len(),
        interpreter.driver().elapsed()
    );
    print!("{}", SessionState::capture(interpreter.turtle()));
}
