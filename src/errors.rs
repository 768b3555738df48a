//! Error types with rich diagnostics using miette
//!
//! Command errors carry the offending sub-command as their source so they
//! render with a label under it.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source ("<command>", a script path, ...)
    pub name: String,
    /// The text being parsed
    pub source: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// A command typed at the interpreter
    pub fn command(source: impl Into<String>) -> Self {
        Self::new("<command>", source)
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Span covering the whole source
    pub fn full_span(&self) -> SourceSpan {
        (0, self.source.len()).into()
    }
}

/// Render a diagnostic the way miette prints it, without colors.
pub fn render_diagnostic(diagnostic: &dyn Diagnostic) -> String {
    let mut out = String::new();
    let handler = miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, diagnostic).is_err() {
        return diagnostic.to_string();
    }
    out
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Errors that occur while parsing or executing a command
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("unknown command: {command}")]
    #[diagnostic(
        code(turtlescript::parse::unknown_command),
        help(
            "expected up, down, forward(n), turn(n), setrot(n), setpos(x,y), arc(r,deg), \
             setsize(n), setspeed(n), setcolor(r,g,b), name=value or a defined function"
        )
    )]
    UnknownCommand {
        command: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("does not match any command")]
        span: SourceSpan,
    },

    #[error("invalid number: {text}")]
    #[diagnostic(code(turtlescript::parse::invalid_number))]
    InvalidNumber {
        text: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a number")]
        span: SourceSpan,
    },

    #[error("invalid loop count: {text}")]
    #[diagnostic(
        code(turtlescript::parse::invalid_loop_count),
        help("loop counts must fit in an unsigned 32-bit integer")
    )]
    InvalidLoopCount {
        text: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("loop count")]
        span: SourceSpan,
    },

    #[error("function `{name}` defined inside another function")]
    #[diagnostic(
        code(turtlescript::parse::nested_definition),
        help("define functions at the top level of a script")
    )]
    NestedDefinition { name: String },

    #[error("call to `{name}` exceeds the maximum call depth of {max}")]
    #[diagnostic(
        code(turtlescript::parse::call_depth_exceeded),
        help("functions cannot call other functions")
    )]
    CallDepthExceeded { name: String, max: usize },

    #[error("block `{header}` is never closed")]
    #[diagnostic(
        code(turtlescript::parse::unterminated_block),
        help("close the block with a line containing `}}`")
    )]
    UnterminatedBlock { header: String },
}

impl ParseError {
    pub fn unknown_command(command: &str) -> Self {
        let ctx = SourceContext::command(command);
        ParseError::UnknownCommand {
            command: command.to_string(),
            span: ctx.full_span(),
            src: ctx.named_source(),
        }
    }
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors that occur while reading or writing a saved session
#[derive(Error, Diagnostic, Debug)]
pub enum SessionError {
    #[error("session is empty")]
    #[diagnostic(code(turtlescript::session::empty))]
    Empty,

    #[error("session header has {found} fields, expected at least 6")]
    #[diagnostic(
        code(turtlescript::session::too_few_fields),
        help("the header is x;y;rotation;pen_down;pen_radius;#color;")
    )]
    TooFewFields { found: usize },

    #[error("invalid {field} in session header: {value:?}")]
    #[diagnostic(code(turtlescript::session::invalid_number))]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid color in session header: {value:?}")]
    #[diagnostic(
        code(turtlescript::session::invalid_color),
        help("colors are written as #rrggbb")
    )]
    InvalidColor { value: String },

    #[error("session file error")]
    #[diagnostic(code(turtlescript::session::io))]
    Io(#[from] std::io::Error),
}
