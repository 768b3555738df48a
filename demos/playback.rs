//! Real-time playback: a script runs on the main thread while a second
//! thread pauses and resumes the turtle.

use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use turtlescript::{Interpreter, Playback, Turtle};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let playback = Playback::start(Turtle::default());
    let handle = playback.handle();
    let mut interpreter = Interpreter::new(playback);

    let remote = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        handle.pause();
        println!("paused at {:?}", handle.snapshot().position);
        thread::sleep(Duration::from_millis(500));
        handle.resume();
    });

    interpreter.run_line("setspeed(400); LOOP4{forward(100); turn(90)}");
    interpreter.settle();
    remote.join().expect("remote thread");

    let state = interpreter.into_driver().finish();
    println!("finished at {:?} with {} lines", state.position, state.lines.len());
}
