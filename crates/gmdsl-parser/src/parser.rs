//! Parser for gmdsl source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the parse tree defined in [`parser_types`](super::parser_types). The public
//! entry point is [`build_document`].
//!
//! The grammar is LL(1): every production is chosen by its leading token.
//! In particular an `annotation` keyword always introduces a parameter list
//! (`(name: Type, ...)`) and an `@Name` prefix always introduces an argument
//! list (`(value, ...)`); the two parenthesized lists never share a
//! production. Once a production is chosen it commits with `cut_err`, so the
//! first mismatch is reported where it happens and parsing stops.

use winnow::{
    Parser as _,
    combinator::{cut_err, opt, peek, preceded, repeat, separated, terminated},
    error::{AddContext, ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use gmdsl_core::{identifier::QualifiedName, model::Direction, span::Spanned};

use crate::{
    Span,
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of the production being parsed
    Label(&'static str),
    /// What was expected, and the remaining token count (`eof_offset()`)
    /// at the token that did not match
    Expected {
        what: &'static str,
        remaining: usize,
    },
}

type Input<'src> = GmTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type GmTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Build an error recording what was expected at the current token.
fn expected(input: &Input<'_>, what: &'static str) -> ContextError<Context> {
    ContextError::new().add_context(
        input,
        &input.checkpoint(),
        Context::Expected {
            what,
            remaining: input.eof_offset(),
        },
    )
}

/// Look at the next token without consuming it.
fn peek_token<'src>(input: &mut Input<'src>) -> Option<&'src Token<'src>> {
    peek(any::<_, ErrMode<ContextError<Context>>>)
        .parse_next(input)
        .ok()
        .map(|token: &'src PositionedToken<'src>| &token.token)
}

/// Consume one token if `f` accepts it, otherwise backtrack with `what`.
fn token<'src, O>(
    what: &'static str,
    mut f: impl FnMut(&PositionedToken<'src>) -> Option<O>,
) -> impl FnMut(&mut Input<'src>) -> IResult<O> {
    move |input: &mut Input<'src>| {
        any.verify_map(|token: &PositionedToken<'src>| f(token))
            .parse_next(input)
            .map_err(|_: ErrMode<ContextError<Context>>| {
                ErrMode::Backtrack(expected(input, what))
            })
    }
}

/// Consume exactly `expected_token`, returning its span.
fn punct<'src>(
    expected_token: Token<'static>,
    what: &'static str,
) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    token(what, move |token: &PositionedToken<'src>| {
        (token.token == expected_token).then_some(token.span)
    })
}

/// Parse a plain identifier (keywords are rejected)
fn identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    token("identifier", |token: &PositionedToken<'src>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
        _ => None,
    })
    .parse_next(input)
}

/// Parse a member name: an identifier or a keyword used as a name.
///
/// Inside bodies and parameter lists no declaration can start, so names
/// like `type` or `node` are unambiguous there.
fn member_name<'src>(what: &'static str) -> impl FnMut(&mut Input<'src>) -> IResult<Spanned<&'src str>> {
    token(what, |token: &PositionedToken<'src>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
        other => other
            .keyword()
            .map(|keyword| Spanned::new(keyword, token.span)),
    })
}

/// Parse a dotted name: `a`, `a.b`, `a.b.C`
fn qualified_name<'src>(input: &mut Input<'src>) -> IResult<Spanned<QualifiedName>> {
    let first = identifier.parse_next(input)?;
    let rest: Vec<Spanned<&'src str>> =
        repeat(0.., preceded(punct(Token::Dot, "`.`"), cut_err(identifier)))
            .parse_next(input)?;

    let span = rest
        .iter()
        .fold(first.span(), |span, segment| span.union(segment.span()));
    let segments = std::iter::once(*first.inner()).chain(rest.iter().map(|s| *s.inner()));

    QualifiedName::new(segments)
        .map(|name| Spanned::new(name, span))
        .map_err(|_| ErrMode::Cut(expected(input, "qualified name")))
}

/// Parse an edge direction: `->` or `<->`
fn direction<'src>(input: &mut Input<'src>) -> IResult<Spanned<Direction>> {
    token("`->` or `<->`", |token: &PositionedToken<'src>| match token.token {
        Token::Arrow => Some(Spanned::new(Direction::OneWay, token.span)),
        Token::DoubleArrow => Some(Spanned::new(Direction::Bidirectional, token.span)),
        _ => None,
    })
    .parse_next(input)
}

/// Parse one annotation usage argument: string, number or (qualified) identifier
fn argument<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Argument<'src>>> {
    if matches!(peek_token(input), Some(Token::Identifier(_))) {
        let name = qualified_name.parse_next(input)?;
        return Ok(name.map(|name| types::Argument::Identifier(name.clone())));
    }

    token(
        "string, number or identifier",
        |token: &PositionedToken<'src>| match &token.token {
            Token::StringLiteral(value) => Some(Spanned::new(
                types::Argument::String(value.clone()),
                token.span,
            )),
            Token::NumberLiteral(value) => {
                Some(Spanned::new(types::Argument::Number(*value), token.span))
            }
            _ => None,
        },
    )
    .parse_next(input)
}

/// Parse a usage argument list: `(value, ...)`
///
/// Only reachable from [`annotation_usage`].
fn argument_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<types::Argument<'src>>>> {
    punct(Token::LeftParen, "`(`").parse_next(input)?;
    cut_err(terminated(
        separated(0.., argument, punct(Token::Comma, "`,`")),
        punct(Token::RightParen, "`,` or `)`"),
    ))
    .context(Context::Label("annotation arguments"))
    .parse_next(input)
}

fn annotation_usage_rest<'src>(input: &mut Input<'src>) -> IResult<types::Usage<'src>> {
    let name = qualified_name.parse_next(input)?;
    let arguments = opt(argument_list).parse_next(input)?;
    Ok(types::Usage {
        name,
        arguments: arguments.unwrap_or_default(),
    })
}

/// Parse an annotation usage: `@Name` or `@Name(arg, ...)`
fn annotation_usage<'src>(input: &mut Input<'src>) -> IResult<types::Usage<'src>> {
    punct(Token::At, "`@`").parse_next(input)?;
    cut_err(annotation_usage_rest)
        .context(Context::Label("annotation usage"))
        .parse_next(input)
}

/// Parse one annotation parameter: `name: Type`
fn parameter<'src>(input: &mut Input<'src>) -> IResult<types::Parameter<'src>> {
    let name = member_name("parameter name").parse_next(input)?;
    let type_name =
        cut_err(preceded(punct(Token::Colon, "`:`"), qualified_name)).parse_next(input)?;
    Ok(types::Parameter { name, type_name })
}

/// Parse a declaration parameter list: `(name: Type, ...)`
///
/// Only reachable from [`annotation_declaration`].
fn parameter_list<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Parameter<'src>>> {
    punct(Token::LeftParen, "`(`").parse_next(input)?;
    cut_err(terminated(
        separated(0.., parameter, punct(Token::Comma, "`,`")),
        punct(Token::RightParen, "`,` or `)`"),
    ))
    .context(Context::Label("annotation parameters"))
    .parse_next(input)
}

/// Parse a property: `@A name: Type`
fn property<'src>(input: &mut Input<'src>) -> IResult<types::Property<'src>> {
    let usages: Vec<types::Usage<'src>> = repeat(0.., annotation_usage).parse_next(input)?;
    let name = if usages.is_empty() {
        member_name("property declaration or `}`").parse_next(input)?
    } else {
        cut_err(member_name("property name")).parse_next(input)?
    };
    let type_ref =
        cut_err(preceded(punct(Token::Colon, "`:`"), qualified_name)).parse_next(input)?;

    Ok(types::Property {
        usages,
        name,
        type_ref,
    })
}

/// Parse a body: `{ property* }`
fn declaration_body<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Property<'src>>> {
    punct(Token::LeftBrace, "`{`").parse_next(input)?;
    cut_err(terminated(
        repeat(0.., property),
        punct(Token::RightBrace, "property declaration or `}`"),
    ))
    .context(Context::Label("declaration body"))
    .parse_next(input)
}

fn namespace_declaration<'src>(input: &mut Input<'src>) -> IResult<types::Declaration<'src>> {
    punct(Token::Namespace, "`namespace`").parse_next(input)?;
    cut_err(qualified_name)
        .context(Context::Label("namespace declaration"))
        .map(types::Declaration::Namespace)
        .parse_next(input)
}

fn import_declaration<'src>(input: &mut Input<'src>) -> IResult<types::Declaration<'src>> {
    punct(Token::Import, "`import`").parse_next(input)?;
    cut_err(qualified_name)
        .context(Context::Label("import declaration"))
        .map(types::Declaration::Import)
        .parse_next(input)
}

fn annotation_declaration<'src>(input: &mut Input<'src>) -> IResult<types::Declaration<'src>> {
    punct(Token::Annotation, "`annotation`").parse_next(input)?;
    let (name, parameters) = cut_err((identifier, opt(parameter_list)))
        .context(Context::Label("annotation declaration"))
        .parse_next(input)?;
    Ok(types::Declaration::Annotation {
        name,
        parameters: parameters.unwrap_or_default(),
    })
}

fn type_declaration<'src>(
    input: &mut Input<'src>,
    usages: Vec<types::Usage<'src>>,
) -> IResult<types::Declaration<'src>> {
    punct(Token::Type, "`type`").parse_next(input)?;
    let (name, body) = cut_err((identifier, opt(declaration_body)))
        .context(Context::Label("type declaration"))
        .parse_next(input)?;
    Ok(types::Declaration::Type { usages, name, body })
}

fn node_declaration<'src>(
    input: &mut Input<'src>,
    usages: Vec<types::Usage<'src>>,
) -> IResult<types::Declaration<'src>> {
    punct(Token::Node, "`node`").parse_next(input)?;
    let (name, body) = cut_err((identifier, declaration_body))
        .context(Context::Label("node declaration"))
        .parse_next(input)?;
    Ok(types::Declaration::Node { usages, name, body })
}

fn edge_declaration<'src>(
    input: &mut Input<'src>,
    usages: Vec<types::Usage<'src>>,
) -> IResult<types::Declaration<'src>> {
    punct(Token::Edge, "`edge`").parse_next(input)?;
    let (name, _, source, direction, target, _, body) = cut_err((
        identifier,
        punct(Token::LeftParen, "`(`"),
        qualified_name,
        direction,
        qualified_name,
        punct(Token::RightParen, "`)`"),
        opt(declaration_body),
    ))
    .context(Context::Label("edge declaration"))
    .parse_next(input)?;

    Ok(types::Declaration::Edge {
        usages,
        name,
        source,
        direction,
        target,
        body,
    })
}

/// Parse annotation usages followed by a type, node or edge declaration.
fn annotated_declaration<'src>(input: &mut Input<'src>) -> IResult<types::Declaration<'src>> {
    let usages: Vec<types::Usage<'src>> = repeat(0.., annotation_usage).parse_next(input)?;

    match peek_token(input) {
        Some(Token::Type) => type_declaration(input, usages),
        Some(Token::Node) => node_declaration(input, usages),
        Some(Token::Edge) => edge_declaration(input, usages),
        _ => Err(ErrMode::Cut(expected(
            input,
            "`type`, `node` or `edge` after annotations",
        ))),
    }
}

/// Parse one top-level declaration, dispatching on its first token.
fn declaration<'src>(input: &mut Input<'src>) -> IResult<types::Declaration<'src>> {
    match peek_token(input) {
        Some(Token::Namespace) => namespace_declaration(input),
        Some(Token::Import) => import_declaration(input),
        Some(Token::Annotation) => annotation_declaration(input),
        Some(Token::At | Token::Type | Token::Node | Token::Edge) => annotated_declaration(input),
        _ => Err(ErrMode::Backtrack(expected(input, "declaration"))),
    }
}

fn document<'src>(input: &mut Input<'src>) -> IResult<types::Document<'src>> {
    let declarations = repeat(0.., declaration).parse_next(input)?;

    if peek_token(input).is_some() {
        return Err(ErrMode::Cut(expected(input, "declaration")));
    }

    Ok(types::Document { declarations })
}

/// Convert a winnow error into a diagnostic pointing at the offending token.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let (what, remaining) = context
        .context()
        .find_map(|ctx| match ctx {
            Context::Expected { what, remaining } => Some((*what, *remaining)),
            Context::Label(_) => None,
        })
        .unwrap_or(("declaration", current_remaining));

    let within = context.context().find_map(|ctx| match ctx {
        Context::Label(label) => Some(*label),
        Context::Expected { .. } => None,
    });

    let index = tokens.len().saturating_sub(remaining);
    let diagnostic = match tokens.get(index) {
        Some(found) => Diagnostic::error(format!("expected {what}, found `{}`", found.token))
            .with_code(ErrorCode::E100)
            .with_label(found.span, format!("unexpected `{}`", found.token)),
        None => {
            let end = tokens.last().map_or(0, |token| token.span.end());
            Diagnostic::error(format!("unexpected end of input, expected {what}"))
                .with_code(ErrorCode::E101)
                .with_label(Span::new(end..end), "input ends here")
        }
    };

    match within {
        Some(label) => diagnostic.with_help(format!("while parsing {label}")),
        None => diagnostic,
    }
}

/// Build a parse tree from significant tokens.
///
/// # Errors
///
/// Returns a single diagnostic for the first token that does not fit the
/// grammar; no partial tree is produced.
pub fn build_document<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::Document<'src>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    document
        .parse_next(&mut token_slice)
        .map_err(|err| convert_error(err, tokens, token_slice.eof_offset()))
}
