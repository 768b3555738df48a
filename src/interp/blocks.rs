//! Reading `DEF`/`LOOP` block bodies from a line stream.
//!
//! A body runs until the line that brings the brace depth back to zero.
//! That closing line is consumed and discarded. Nested block headers and
//! single-line loops stay balanced, so they remain part of the body.

/// Read the body of a block whose header was just consumed.
///
/// Returns `None` if the stream ends before the block is closed.
pub fn read_body<I, S>(lines: &mut I) -> Option<Vec<String>>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let mut depth: isize = 1;
    let mut body = Vec::new();
    for line in lines {
        let line = line.as_ref();
        depth += brace_delta(line);
        if depth <= 0 {
            return Some(body);
        }
        body.push(line.to_string());
    }
    None
}

fn brace_delta(line: &str) -> isize {
    line.chars().fold(0, |delta, c| match c {
        '{' => delta + 1,
        '}' => delta - 1,
        _ => delta,
    })
}

/// Split a whitespace-stripped line on `;` outside of braces.
pub fn split_commands(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in line.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                parts.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&line[start..]);
    parts
}
