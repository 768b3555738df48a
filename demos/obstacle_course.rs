//! Drive the turtle into a field of obstacles and report every collision.

use std::sync::Arc;

use glam::dvec2;
use tracing_subscriber::EnvFilter;
use turtlescript::{Canvas, Color, Interpreter, MotionEvent, Obstacle, Turtle};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let canvas = Canvas::new(900.0, 900.0)
        .with_obstacle(Obstacle::rect(dvec2(400.0, 250.0), dvec2(500.0, 270.0), Color::RED))
        .with_obstacle(Obstacle::regular(dvec2(650.0, 450.0), 40.0, 6, 0.0, Color::rgb(0, 0, 255)));
    let turtle = Turtle::default().with_field(Arc::new(canvas));
    let mut interpreter = Interpreter::headless(turtle);

    let script = [
        "setspeed(400)",
        "forward(300)",
        "turn(90); forward(400)",
        "turn(90); forward(1000)",
    ];
    for line in script {
        interpreter.run_line(line);
        let result = interpreter.settle();
        let position = interpreter.turtle().position();
        println!("{line:<28} -> {result:?} at ({:.1}, {:.1})", position.x, position.y);

        for event in interpreter.driver_mut().take_events() {
            if let MotionEvent::Collision(hit) = event {
                println!("    hit {:?}", hit.object);
            }
        }
    }
    println!("{} lines drawn", interpreter.turtle().line_count());
}
