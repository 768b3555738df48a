//! Data-driven script tests.
//!
//! Each `tests/scripts/*.turtle` file is a script whose `#` lines are
//! directives rather than commands:
//!
//! - `# canvas: W H` attaches an empty canvas
//! - `# obstacle: X0 Y0 X1 Y1` adds a rectangular obstacle to it
//! - `# expect: ...` checks the final state after the script settles

use std::sync::Arc;

use camino::Utf8Path;
use glam::{DVec2, dvec2};
use turtlescript::{Canvas, Color, Interpreter, MovementResult, Obstacle, Turtle};

/// Tolerance for positions and rotations
const TOLERANCE: f64 = 1e-3;

#[derive(Debug)]
enum Expect {
    Position(DVec2),
    Rotation(f64),
    Lines(usize),
    Pen(bool),
    Radius(f64),
    Color(Color),
    Var(String, f64),
    History(usize),
    Errors(usize),
    Result(MovementResult),
    Line {
        index: usize,
        start: DVec2,
        end: DVec2,
    },
}

struct Case {
    script: String,
    canvas: Option<Canvas>,
    expectations: Vec<Expect>,
}

fn numbers(args: &[&str]) -> Result<Vec<f64>, String> {
    args.iter()
        .map(|a| a.parse::<f64>().map_err(|e| format!("bad number {a:?}: {e}")))
        .collect()
}

fn parse_expect(text: &str) -> Result<Expect, String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let (kind, args) = words.split_first().ok_or("empty expectation")?;
    let expect = match *kind {
        "position" => {
            let n = numbers(args)?;
            Expect::Position(dvec2(n[0], n[1]))
        }
        "rotation" => Expect::Rotation(numbers(args)?[0]),
        "lines" => Expect::Lines(args[0].parse().map_err(|e| format!("{e}"))?),
        "pen" => Expect::Pen(args[0] == "down"),
        "radius" => Expect::Radius(numbers(args)?[0]),
        "color" => Expect::Color(args[0].parse().map_err(|e| format!("{e}"))?),
        "var" => Expect::Var(args[0].to_string(), numbers(&args[1..])?[0]),
        "history" => Expect::History(args[0].parse().map_err(|e| format!("{e}"))?),
        "errors" => Expect::Errors(args[0].parse().map_err(|e| format!("{e}"))?),
        "result" => Expect::Result(match args[0] {
            "success" => MovementResult::Success,
            "failure" => MovementResult::Failure,
            "blocked" => MovementResult::Blocked,
            other => return Err(format!("unknown result {other:?}")),
        }),
        "line" => {
            let n = numbers(args)?;
            Expect::Line {
                index: n[0] as usize,
                start: dvec2(n[1], n[2]),
                end: dvec2(n[3], n[4]),
            }
        }
        other => return Err(format!("unknown expectation {other:?}")),
    };
    Ok(expect)
}

fn load_case(source: &str) -> Result<Case, String> {
    let mut script = String::new();
    let mut canvas: Option<Canvas> = None;
    let mut expectations = Vec::new();

    for line in source.lines() {
        let Some(directive) = line.trim().strip_prefix('#') else {
            script.push_str(line);
            script.push('\n');
            continue;
        };
        let directive = directive.trim();
        if let Some(rest) = directive.strip_prefix("expect:") {
            expectations.push(parse_expect(rest)?);
        } else if let Some(rest) = directive.strip_prefix("canvas:") {
            let n = numbers(&rest.split_whitespace().collect::<Vec<_>>())?;
            canvas = Some(Canvas::new(n[0], n[1]));
        } else if let Some(rest) = directive.strip_prefix("obstacle:") {
            let n = numbers(&rest.split_whitespace().collect::<Vec<_>>())?;
            let obstacle = Obstacle::rect(dvec2(n[0], n[1]), dvec2(n[2], n[3]), Color::RED);
            canvas
                .as_mut()
                .ok_or("obstacle declared before canvas")?
                .add_obstacle(obstacle);
        }
    }

    Ok(Case {
        script,
        canvas,
        expectations,
    })
}

fn check(interp: &mut Interpreter<turtlescript::Stepper>, expect: &Expect) -> Result<(), String> {
    let turtle = interp.turtle();
    let fail = |what: String| Err(format!("{expect:?}: {what}"));
    match expect {
        Expect::Position(p) => {
            if turtle.position().distance(*p) > TOLERANCE {
                return fail(format!("position is {}", turtle.position()));
            }
        }
        Expect::Rotation(r) => {
            if (turtle.rotation() as f64 - r).abs() > TOLERANCE {
                return fail(format!("rotation is {}", turtle.rotation()));
            }
        }
        Expect::Lines(n) => {
            if turtle.line_count() != *n {
                return fail(format!("{} lines drawn", turtle.line_count()));
            }
        }
        Expect::Pen(down) => {
            if turtle.pen_down() != *down {
                return fail(format!("pen down is {}", turtle.pen_down()));
            }
        }
        Expect::Radius(r) => {
            if (turtle.pen_radius() as f64 - r).abs() > TOLERANCE {
                return fail(format!("pen radius is {}", turtle.pen_radius()));
            }
        }
        Expect::Color(c) => {
            if turtle.pen_color() != *c {
                return fail(format!("pen color is {}", turtle.pen_color()));
            }
        }
        Expect::Line { index, start, end } => match turtle.line(*index) {
            Some(line) if line.start.distance(*start) <= TOLERANCE && line.end.distance(*end) <= TOLERANCE => {}
            other => return fail(format!("line is {other:?}")),
        },
        Expect::Var(name, value) => match interp.variable(name) {
            Some(v) if (v as f64 - value).abs() <= TOLERANCE => {}
            other => return fail(format!("variable is {other:?}")),
        },
        Expect::History(n) => {
            if interp.history().len() != *n {
                return fail(format!("history is {:?}", interp.history()));
            }
        }
        Expect::Errors(n) => {
            let errors = interp.take_errors();
            if errors.len() != *n {
                return fail(format!("errors are {errors:?}"));
            }
        }
        Expect::Result(r) => {
            if interp.last_result() != Some(*r) {
                return fail(format!("last result is {:?}", interp.last_result()));
            }
        }
    }
    Ok(())
}

fn run_script_file(path: &Utf8Path) -> datatest_stable::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let case = load_case(&source)?;

    let mut turtle = Turtle::default();
    if let Some(canvas) = case.canvas {
        turtle.set_field(Some(Arc::new(canvas)));
    }
    let mut interp = Interpreter::headless(turtle);
    interp.run_script(&case.script);
    interp.settle();

    for expect in &case.expectations {
        check(&mut interp, expect).map_err(|e| format!("{path}: {e}"))?;
    }
    Ok(())
}

datatest_stable::harness! {
    { test = run_script_file, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/scripts"), pattern = r"\.turtle$" },
}
