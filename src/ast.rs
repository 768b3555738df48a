//! Syntax tree types for turtle commands
//!
//! These types represent one parsed sub-command or block header.

/// A primitive command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pen up: up, up()
    PenUp,
    /// Pen down: down, down()
    PenDown,
    /// Animated move along the heading: forward(10)
    Forward(f32),
    /// Instant relative rotation: turn(90)
    Turn(f32),
    /// Absolute rotation: setrot(180)
    SetRotation(f32),
    /// Teleport without drawing: setpos(100, 200)
    SetPosition(f32, f32),
    /// Animated arc: arc(radius, degrees)
    Arc { radius: f32, degrees: f32 },
    /// Pen radius: setsize(4)
    SetSize(f32),
    /// Motion speed in units per second: setspeed(500)
    SetSpeed(f32),
    /// Pen color from three channel values: setcolor(255, 0, 0)
    SetColor(f32, f32, f32),
    /// Variable assignment: x = 3, x = add(1, 2), x = mul(2, 4)
    Assign { name: String, value: Expr },
}

impl Command {
    /// True for commands that go through the motion queue.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Command::Forward(_) | Command::Turn(_) | Command::Arc { .. }
        )
    }
}

/// Right-hand side of an assignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr {
    Value(f32),
    Add(f32, f32),
    Mul(f32, f32),
}

impl Expr {
    pub fn eval(self) -> f32 {
        match self {
            Expr::Value(v) => v,
            Expr::Add(a, b) => a + b,
            Expr::Mul(a, b) => a * b,
        }
    }
}

/// A call shape `name(arg?)`, resolved against user functions
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub argument: Option<f32>,
}

/// Single-line loop: LOOP3{forward(10);turn(120)}
#[derive(Debug, Clone, PartialEq)]
pub struct InlineLoop {
    pub count: u32,
    pub body: String,
}

/// Opening line of a multi-line block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockHeader {
    /// DEF name(param) {
    Def { name: String, param: Option<String> },
    /// LOOP n {
    Loop { count: u32 },
}
