//! Saved session state.
//!
//! The record is plain text: a header line
//! `x;y;rotation;pen_down;pen_radius;#color;` followed by one
//! `start.x;start.y;end.x;end.y;#color;width` line per drawn segment.
//! Segment lines with five fields get the default width. Segment lines with
//! any other field count are skipped.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use glam::{DVec2, dvec2};

use crate::errors::SessionError;
use crate::log::{debug, info};
use crate::motion::Turtle;
use crate::types::{Color, DEFAULT_LINE_WIDTH, Line};

/// Everything needed to restore a turtle and its drawing
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub position: DVec2,
    pub rotation: f32,
    pub pen_down: bool,
    pub pen_radius: f32,
    pub pen_color: Color,
    pub lines: Vec<Line>,
}

impl SessionState {
    pub fn capture(turtle: &Turtle) -> Self {
        SessionState {
            position: turtle.position(),
            rotation: turtle.rotation(),
            pen_down: turtle.pen_down(),
            pen_radius: turtle.pen_radius(),
            pen_color: turtle.pen_color(),
            lines: turtle.lines().to_vec(),
        }
    }

    /// Restore this state onto `turtle`, cancelling any motion in flight.
    pub fn apply(&self, turtle: &mut Turtle) {
        if turtle.is_moving() {
            turtle.reset();
        }
        turtle.set_position(self.position);
        turtle.set_rotation(self.rotation);
        turtle.set_pen_down(self.pen_down);
        turtle.set_pen_radius(self.pen_radius);
        turtle.set_pen_color(self.pen_color);
        turtle.set_lines(self.lines.clone());
    }

    pub fn parse(text: &str) -> Result<Self, SessionError> {
        let mut lines = text.lines().map(str::trim);
        let header = match lines.next() {
            Some(header) if !header.is_empty() => header,
            _ => return Err(SessionError::Empty),
        };

        let fields: Vec<&str> = header.split(';').collect();
        if fields.len() < 6 {
            return Err(SessionError::TooFewFields {
                found: fields.len(),
            });
        }

        let x = number::<f64>("x", fields[0])?;
        let y = number::<f64>("y", fields[1])?;
        let rotation = number::<f32>("rotation", fields[2])?;
        let pen_down = number::<i32>("pen state", fields[3])? != 0;
        let pen_radius = number::<f32>("pen radius", fields[4])?;
        let pen_color = Color::from_str(fields[5]).map_err(|_| SessionError::InvalidColor {
            value: fields[5].to_string(),
        })?;

        let lines = lines.filter_map(parse_line).collect();

        Ok(SessionState {
            position: dvec2(x, y),
            rotation,
            pen_down,
            pen_radius,
            pen_color,
            lines,
        })
    }

    /// Write the record to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = local_path(path.as_ref());
        fs::write(path, self.to_string())?;
        info!(path = %path.display(), lines = self.lines.len(), "session saved");
        Ok(())
    }

    /// Read a record from `path`, which may carry a `file://` prefix.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = local_path(path.as_ref());
        let state = fs::read_to_string(path)?.parse::<SessionState>()?;
        info!(path = %path.display(), lines = state.lines.len(), "session loaded");
        Ok(state)
    }
}

impl FromStr for SessionState {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionState::parse(s)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{};{};{};{};{};{};",
            self.position.x,
            self.position.y,
            self.rotation,
            u8::from(self.pen_down),
            self.pen_radius,
            self.pen_color.to_hex()
        )?;
        for line in &self.lines {
            writeln!(
                f,
                "{};{};{};{};{};{}",
                line.start.x,
                line.start.y,
                line.end.x,
                line.end.y,
                line.color.to_hex(),
                line.width
            )?;
        }
        Ok(())
    }
}

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T, SessionError> {
    value.trim().parse().map_err(|_| SessionError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_line(record: &str) -> Option<Line> {
    let parts: Vec<&str> = record.split(';').filter(|p| !p.is_empty()).collect();
    if parts.len() != 5 && parts.len() != 6 {
        if !record.is_empty() {
            debug!(record, "skipping malformed line record");
        }
        return None;
    }

    let coord = |i: usize| parts[i].parse::<f64>().ok();
    let start = dvec2(coord(0)?, coord(1)?);
    let end = dvec2(coord(2)?, coord(3)?);
    let color = Color::from_str(parts[4]).ok()?;
    let width = match parts.get(5) {
        Some(width) => width.parse::<f32>().ok()?,
        None => DEFAULT_LINE_WIDTH,
    };
    Some(Line::new(start, end, color, width))
}

fn local_path(path: &Path) -> &Path {
    match path.to_str().and_then(|s| s.strip_prefix("file://")) {
        Some(stripped) => Path::new(stripped),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only() {
        let state: SessionState = "50;50;45;1;2;#ff0000;".parse().expect("valid");
        assert_eq!(state.position, dvec2(50.0, 50.0));
        assert_eq!(state.rotation, 45.0);
        assert!(state.pen_down);
        assert_eq!(state.pen_radius, 2.0);
        assert_eq!(state.pen_color, Color::RED);
        assert!(state.lines.is_empty());
    }

    #[test]
    fn five_field_lines_get_the_default_width() {
        let text = "0;0;0;0;3;#000000;\n  1;2;3;4;#00ff00  \n1;2;3;4;#00ff00;2.5\n1;2;3\n";
        let state = SessionState::parse(text).expect("valid");
        assert!(!state.pen_down);
        assert_eq!(state.lines.len(), 2);
        assert_eq!(state.lines[0].width, DEFAULT_LINE_WIDTH);
        assert_eq!(state.lines[1].width, 2.5);
        assert_eq!(state.lines[1].color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn bad_headers_are_rejected() {
        assert!(matches!(SessionState::parse(""), Err(SessionError::Empty)));
        assert!(matches!(
            SessionState::parse("1;2;3"),
            Err(SessionError::TooFewFields { found: 3 })
        ));
        assert!(matches!(
            SessionState::parse("1;nope;3;1;2;#000000;"),
            Err(SessionError::InvalidNumber { field: "y", .. })
        ));
        assert!(matches!(
            SessionState::parse("1;2;3;1;2;red;"),
            Err(SessionError::InvalidColor { .. })
        ));
    }

    #[test]
    fn file_url_prefix_is_stripped() {
        assert_eq!(local_path(Path::new("file:///tmp/a.txt")), Path::new("/tmp/a.txt"));
        assert_eq!(local_path(Path::new("relative.txt")), Path::new("relative.txt"));
    }

    #[test]
    fn apply_restores_the_turtle() {
        let state = SessionState {
            position: dvec2(10.0, 20.0),
            rotation: 90.0,
            pen_down: false,
            pen_radius: 6.0,
            pen_color: Color::RED,
            lines: vec![Line::new(dvec2(1.0, 1.0), dvec2(2.0, 2.0), Color::RED, 6.0)],
        };
        let mut turtle = Turtle::default();
        turtle.forward(100.0);
        state.apply(&mut turtle);
        assert!(!turtle.is_moving());
        assert_eq!(SessionState::capture(&turtle), state);
    }
}
