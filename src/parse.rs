//! Parse pest pairs into AST nodes

use crate::ast::*;
use crate::errors::{ParseError, SourceContext};
use crate::{Rule, TurtleParser};
use pest::Parser;
use pest::iterators::Pair;

/// Parse one whitespace-stripped sub-command into a primitive
pub fn parse_command(source: &str) -> Result<Command, ParseError> {
    let pair = TurtleParser::parse(Rule::command, source)
        .map_err(|_| ParseError::unknown_command(source))?
        .next()
        .ok_or_else(|| ParseError::unknown_command(source))?;

    let inner = pair
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or_else(|| ParseError::unknown_command(source))?;

    let ctx = SourceContext::command(source);
    match inner.as_rule() {
        Rule::pen_up => Ok(Command::PenUp),
        Rule::pen_down => Ok(Command::PenDown),
        Rule::forward => Ok(Command::Forward(parse_args::<1>(&ctx, inner)?[0])),
        Rule::turn => Ok(Command::Turn(parse_args::<1>(&ctx, inner)?[0])),
        Rule::set_rot => Ok(Command::SetRotation(parse_args::<1>(&ctx, inner)?[0])),
        Rule::set_speed => Ok(Command::SetSpeed(parse_args::<1>(&ctx, inner)?[0])),
        Rule::set_size => Ok(Command::SetSize(parse_args::<1>(&ctx, inner)?[0])),
        Rule::set_pos => {
            let [x, y] = parse_args(&ctx, inner)?;
            Ok(Command::SetPosition(x, y))
        }
        Rule::arc => {
            let [radius, degrees] = parse_args(&ctx, inner)?;
            Ok(Command::Arc { radius, degrees })
        }
        Rule::set_color => {
            let [r, g, b] = parse_args(&ctx, inner)?;
            Ok(Command::SetColor(r, g, b))
        }
        Rule::assignment => parse_assignment(&ctx, inner),
        _ => Err(ParseError::unknown_command(source)),
    }
}

/// Parse a call shape `name(arg?)`. Returns `None` for anything else.
pub fn parse_call(source: &str) -> Option<Call> {
    let pair = TurtleParser::parse(Rule::call, source).ok()?.next()?;
    let mut name = None;
    let mut argument = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = Some(inner.as_str().to_string()),
            Rule::call_arg => argument = Some(inner.as_str().parse::<f32>().ok()?),
            _ => {}
        }
    }
    Some(Call {
        name: name?,
        argument,
    })
}

/// Parse a single-line loop `LOOPn{body}`. Returns `Ok(None)` for anything else.
pub fn parse_inline_loop(source: &str) -> Result<Option<InlineLoop>, ParseError> {
    let Ok(mut pairs) = TurtleParser::parse(Rule::inline_loop, source) else {
        return Ok(None);
    };
    let Some(pair) = pairs.next() else {
        return Ok(None);
    };

    let ctx = SourceContext::command(source);
    let mut count = None;
    let mut body = String::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::count => count = Some(parse_count(&ctx, &inner)?),
            Rule::loop_body => body = inner.as_str().to_string(),
            _ => {}
        }
    }
    Ok(count.map(|count| InlineLoop { count, body }))
}

/// Recognize the opening line of a `DEF` or `LOOP` block.
pub fn parse_block_header(line: &str) -> Result<Option<BlockHeader>, ParseError> {
    let ctx = SourceContext::new("<script>", line);

    if let Ok(mut pairs) = TurtleParser::parse(Rule::def_header, line) {
        let Some(pair) = pairs.next() else {
            return Ok(None);
        };
        let mut name = None;
        let mut param = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::ident => name = Some(inner.as_str().to_string()),
                Rule::param => param = Some(inner.as_str().to_string()),
                _ => {}
            }
        }
        return Ok(name.map(|name| BlockHeader::Def { name, param }));
    }

    if let Ok(mut pairs) = TurtleParser::parse(Rule::loop_header, line) {
        let Some(pair) = pairs.next() else {
            return Ok(None);
        };
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::count {
                let count = parse_count(&ctx, &inner)?;
                return Ok(Some(BlockHeader::Loop { count }));
            }
        }
    }

    Ok(None)
}

fn parse_assignment(ctx: &SourceContext, pair: Pair<Rule>) -> Result<Command, ParseError> {
    let mut inner = pair.into_inner();
    let (Some(name), Some(expr)) = (inner.next(), inner.next()) else {
        return Err(ParseError::unknown_command(&ctx.source));
    };
    let name = name.as_str().to_string();

    let value = match expr.as_rule() {
        Rule::add_expr => {
            let [a, b] = parse_args(ctx, expr)?;
            Expr::Add(a, b)
        }
        Rule::mul_expr => {
            let [a, b] = parse_args(ctx, expr)?;
            Expr::Mul(a, b)
        }
        _ => {
            let [v] = parse_args(ctx, expr)?;
            Expr::Value(v)
        }
    };
    Ok(Command::Assign { name, value })
}

/// Collect exactly `N` numeric children of `pair`.
fn parse_args<const N: usize>(ctx: &SourceContext, pair: Pair<Rule>) -> Result<[f32; N], ParseError> {
    let mut out = [0.0; N];
    let mut found = 0;
    for inner in pair.into_inner() {
        if !matches!(inner.as_rule(), Rule::number | Rule::decimal) {
            continue;
        }
        if found == N {
            return Err(ParseError::unknown_command(&ctx.source));
        }
        out[found] = parse_number(ctx, &inner)?;
        found += 1;
    }
    if found != N {
        return Err(ParseError::unknown_command(&ctx.source));
    }
    Ok(out)
}

fn parse_number(ctx: &SourceContext, pair: &Pair<Rule>) -> Result<f32, ParseError> {
    let text = pair.as_str();
    text.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
        text: text.to_string(),
        src: ctx.named_source(),
        span: span_of(pair),
    })
}

fn parse_count(ctx: &SourceContext, pair: &Pair<Rule>) -> Result<u32, ParseError> {
    let text = pair.as_str();
    text.parse::<u32>().map_err(|_| ParseError::InvalidLoopCount {
        text: text.to_string(),
        src: ctx.named_source(),
        span: span_of(pair),
    })
}

fn span_of(pair: &Pair<Rule>) -> miette::SourceSpan {
    let span = pair.as_span();
    (span.start(), span.end() - span.start()).into()
}
