//! Strongly-typed primitives for turtle state (zero-cost newtypes).
//!
//! Rotation and pen radius carry range invariants that the engine relies on,
//! so they are only constructible through their normalizing constructors.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;

/// Smallest pen radius accepted by the engine.
pub const MIN_PEN_RADIUS: f32 = 1.0;
/// Largest pen radius accepted by the engine.
pub const MAX_PEN_RADIUS: f32 = 9.0;

// ============================================================================
// Heading
// ============================================================================

/// Turtle rotation in degrees, always inside `[0, 360)`.
///
/// Rotation 0 faces screen-up (negative y); positive turns are clockwise on
/// screen because y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Heading(f32);

impl Heading {
    pub const NORTH: Heading = Heading(0.0);

    /// Normalize any finite angle into `[0, 360)`.
    ///
    /// Non-finite input collapses to 0 rather than poisoning later math.
    #[inline]
    pub fn new(degrees: f32) -> Heading {
        if !degrees.is_finite() {
            return Heading::NORTH;
        }
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs,
        // and yields -0.0 for negative multiples of 360
        if wrapped >= 360.0 || wrapped == 0.0 {
            Heading(0.0)
        } else {
            Heading(wrapped)
        }
    }

    #[inline]
    pub fn degrees(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f64 {
        (self.0 as f64).to_radians()
    }

    /// Heading rotated by `degrees` (clockwise for positive values).
    #[inline]
    pub fn turned(self, degrees: f32) -> Heading {
        Heading::new(self.0 + degrees)
    }
}

impl From<f32> for Heading {
    fn from(degrees: f32) -> Self {
        Heading::new(degrees)
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// PenSize
// ============================================================================

/// Pen radius clamped to `[MIN_PEN_RADIUS, MAX_PEN_RADIUS]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct PenSize(f32);

impl PenSize {
    #[inline]
    pub fn new(radius: f32) -> PenSize {
        if radius.is_nan() {
            return PenSize(MIN_PEN_RADIUS);
        }
        PenSize(radius.clamp(MIN_PEN_RADIUS, MAX_PEN_RADIUS))
    }

    #[inline]
    pub fn radius(self) -> f32 {
        self.0
    }
}

impl Default for PenSize {
    fn default() -> Self {
        PenSize(3.0)
    }
}

impl fmt::Display for PenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Color
// ============================================================================

/// Error returned when a color string is not `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color: {:?}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

/// 8-bit RGB pen color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Build a color from script arguments: each channel is `floor(abs(value))`,
    /// saturated at 255.
    pub fn from_components(r: f32, g: f32, b: f32) -> Color {
        fn channel(v: f32) -> u8 {
            // `as` saturates and maps NaN to 0
            v.abs().floor().min(255.0) as u8
        }
        Color::rgb(channel(r), channel(g), channel(b))
    }

    /// Lower-case `#rrggbb` form used by the session format.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| err());
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        match hex.len() {
            3 => Ok(Color::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            _ => Err(err()),
        }
    }
}

// ============================================================================
// Movement results and drawn lines
// ============================================================================

/// Outcome reported for every motion request.
///
/// `Paused` is a status notification; the other three are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementResult {
    Success,
    Failure,
    Blocked,
    Paused,
}

impl MovementResult {
    /// Whether this result ends the motion it belongs to.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, MovementResult::Paused)
    }
}

impl fmt::Display for MovementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MovementResult::Success => "success",
            MovementResult::Failure => "failure",
            MovementResult::Blocked => "blocked",
            MovementResult::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Default width for line records that omit it.
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// One drawn segment. Immutable once recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub start: DVec2,
    pub end: DVec2,
    pub color: Color,
    pub width: f32,
}

impl Line {
    pub fn new(start: DVec2, end: DVec2, color: Color, width: f32) -> Line {
        Line {
            start,
            end,
            color,
            width,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}
