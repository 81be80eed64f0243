//! Lexical analyzer for gmdsl source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Whitespace, newlines and `//` comments are recognized and then dropped:
//! they may appear between any two tokens and carry no meaning, so the
//! parser never sees them.
//!
//! The public entry point is [`tokenize`]. Lexing stops at the first
//! malformed token.

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    Span,
    error::{Diagnostic, ErrorCode, FrontendError},
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Returns `true` for characters that may continue an identifier.
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a standard escape character in a string after the backslash.
fn string_escape_char(input: &mut Input<'_>) -> IResult<char> {
    one_of(['n', 'r', 't', '\\', '"'])
        .map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            other => other,
        })
        .parse_next(input)
}

/// Parse an escape sequence in a string starting with backslash.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    if let Ok(ch) = string_escape_char(input) {
        return Ok(ch);
    }

    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some("valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`"),
            start: escape_start,
        },
    )))
}

/// Parse a double-quoted string literal. Strings may not span lines.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let string_char = none_of(['"', '\\', '\n', '\r']);

    let string_content =
        repeat(0.., alt((string_escape, string_char))).fold(String::new, |mut acc, ch| {
            acc.push(ch);
            acc
        });

    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    // Committed after the opening quote.
    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"` before the end of the line"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse a decimal number with an optional fractional part.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        (digit1, opt(('.', digit1))).take(),
        peek(not(one_of(is_identifier_char))),
    )
    .map(Token::NumberLiteral)
    .parse_next(input)
}

/// Reject a word such as `1abc` as a whole instead of stopping at its digit.
fn digit_led_word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    (digit1, take_while(1.., is_identifier_char)).parse_next(input)?;

    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::E002,
            message: "identifiers cannot start with a digit",
            help: Some("start the name with a letter or `_`"),
            start,
        },
    )))
}

/// Parse line comment starting with '//'
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse keywords with word boundary checking
fn keyword<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        alt((
            literal("namespace"),
            literal("import"),
            literal("type"),
            literal("node"),
            literal("edge"),
            literal("annotation"),
        )),
        peek(not(one_of(is_identifier_char))),
    )
    .map(|keyword: &str| match keyword {
        "namespace" => Token::Namespace,
        "import" => Token::Import,
        "type" => Token::Type,
        "node" => Token::Node,
        "edge" => Token::Edge,
        _ => Token::Annotation,
    })
    .parse_next(input)
}

/// Parse identifiers: `[a-zA-Z_][a-zA-Z0-9_]*`
fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., is_identifier_char)
        .verify(|s: &str| {
            s.chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        })
        .map(Token::Identifier)
        .parse_next(input)
}

/// Parse multi-character operators (longest first)
fn multi_char_operator<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        literal("<->").value(Token::DoubleArrow),
        literal("->").value(Token::Arrow),
    ))
    .parse_next(input)
}

/// Parse single character tokens
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        ':'.value(Token::Colon),
        '.'.value(Token::Dot),
        '@'.value(Token::At),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Parse newline
fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,        // Must come before any single char
        string_literal,      // Must come before any single char
        multi_char_operator, // Must come before single char operators
        keyword,             // Must come before identifier
        number_literal,      // Must come before single chars
        digit_led_word,      // After number_literal, before single chars
        identifier,          // Must come before single chars
        single_char_token,   // Single character tokens
        newline,             // Must come before whitespace
        whitespace,          // General whitespace
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();

    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Convert a winnow error and the position it stopped at to a Diagnostic.
///
/// Uses the first `LexerDiagnostic` context if present, and falls back to
/// E002 (unexpected character) otherwise.
fn convert_err_mode(
    err: ErrMode<ContextError<LexerDiagnostic>>,
    error_pos: usize,
    source: &str,
) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(LexerDiagnostic {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let span = Span::new(*start..error_pos.max(*start + 1));

        let mut diag = Diagnostic::error(*message)
            .with_code(*code)
            .with_label(span, code.description());
        if let Some(h) = help {
            diag = diag.with_help(*h);
        }
        return diag;
    }

    let found = source.get(error_pos..).and_then(|rest| rest.chars().next());
    let width = found.map_or(1, char::len_utf8);
    let message = match found {
        Some(ch) => format!("unexpected character `{}`", ch.escape_debug()),
        None => "unexpected end of input".to_string(),
    };
    Diagnostic::error(message)
        .with_code(ErrorCode::E002)
        .with_label(
            Span::new(error_pos..error_pos + width),
            ErrorCode::E002.description(),
        )
}

/// Tokenize source text, dropping whitespace, newlines and comments.
///
/// # Errors
///
/// Returns a [`FrontendError`] holding one diagnostic for the first
/// malformed token.
pub fn tokenize(source: &str) -> Result<Vec<PositionedToken<'_>>, FrontendError> {
    lex(source, |token| !token.is_trivia())
}

/// Spans of the `//` comments in `source`, in source order.
///
/// # Errors
///
/// Fails like [`tokenize`] on malformed input.
pub fn line_comments(source: &str) -> Result<Vec<Span>, FrontendError> {
    let comments = lex(source, |token| matches!(token, Token::LineComment(_)))?;
    Ok(comments.into_iter().map(|comment| comment.span).collect())
}

fn lex<'a>(
    source: &'a str,
    keep: fn(&Token<'a>) -> bool,
) -> Result<Vec<PositionedToken<'a>>, FrontendError> {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();

    while !input.is_empty() {
        match positioned_token(&mut input) {
            Ok(token) if !keep(&token.token) => {}
            Ok(token) => tokens.push(token),
            Err(err) => {
                let error_pos = input.current_token_start();
                return Err(convert_err_mode(err, error_pos, source).into());
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {}", input);
        let positioned = result.unwrap();
        assert_eq!(positioned.token, expected);
        assert!(located_input.is_empty(), "Trailing input for: {}", input);
    }

    fn kinds(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("tokenize failed")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn lex_error(input: &str) -> Diagnostic {
        let err = tokenize(input).expect_err("expected lexer error");
        assert_eq!(err.diagnostics().len(), 1);
        err.diagnostics()[0].clone()
    }

    #[test]
    fn test_keywords() {
        test_single_token("namespace", Token::Namespace);
        test_single_token("import", Token::Import);
        test_single_token("type", Token::Type);
        test_single_token("node", Token::Node);
        test_single_token("edge", Token::Edge);
        test_single_token("annotation", Token::Annotation);
    }

    #[test]
    fn test_keyword_word_boundaries() {
        test_single_token("types", Token::Identifier("types"));
        test_single_token("node_id", Token::Identifier("node_id"));
        test_single_token("edges2", Token::Identifier("edges2"));
        test_single_token("annotations", Token::Identifier("annotations"));
        test_single_token("Type", Token::Identifier("Type"));

        assert_eq!(
            kinds("node Person"),
            vec![Token::Node, Token::Identifier("Person")]
        );
    }

    #[test]
    fn test_identifiers() {
        test_single_token("hello", Token::Identifier("hello"));
        test_single_token("_private", Token::Identifier("_private"));
        test_single_token("var123", Token::Identifier("var123"));
        test_single_token("CamelCase", Token::Identifier("CamelCase"));
    }

    #[test]
    fn test_operators_and_punctuation() {
        test_single_token("<->", Token::DoubleArrow);
        test_single_token("->", Token::Arrow);
        test_single_token(":", Token::Colon);
        test_single_token(".", Token::Dot);
        test_single_token("@", Token::At);
        test_single_token("{", Token::LeftBrace);
        test_single_token("}", Token::RightBrace);
        test_single_token("(", Token::LeftParen);
        test_single_token(")", Token::RightParen);
        test_single_token(",", Token::Comma);
    }

    #[test]
    fn test_number_literals() {
        test_single_token("0", Token::NumberLiteral("0"));
        test_single_token("42", Token::NumberLiteral("42"));
        test_single_token("3.25", Token::NumberLiteral("3.25"));

        // A trailing dot is not part of the number.
        assert_eq!(
            kinds("1.x"),
            vec![
                Token::NumberLiteral("1"),
                Token::Dot,
                Token::Identifier("x")
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        test_single_token(
            "\"hello world\"",
            Token::StringLiteral("hello world".to_string()),
        );
        test_single_token("\"\"", Token::StringLiteral(String::new()));
        test_single_token(
            r#""say \"hi\"\n""#,
            Token::StringLiteral("say \"hi\"\n".to_string()),
        );
        test_single_token(r#""a\\b""#, Token::StringLiteral("a\\b".to_string()));
    }

    #[test]
    fn test_qualified_name_tokens() {
        assert_eq!(
            kinds("gm.CoreTypes"),
            vec![
                Token::Identifier("gm"),
                Token::Dot,
                Token::Identifier("CoreTypes")
            ]
        );
    }

    #[test]
    fn test_trivia_is_dropped() {
        let source = "// header\nnode   A {\n\t// inside\n}\r\n";
        assert_eq!(
            kinds(source),
            vec![
                Token::Node,
                Token::Identifier("A"),
                Token::LeftBrace,
                Token::RightBrace
            ]
        );
        assert!(kinds("  \n // only a comment").is_empty());
        assert!(kinds("").is_empty());
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("edge Knows(A <-> B)").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| t.span.range()).collect();
        assert_eq!(
            spans,
            vec![0..4, 5..10, 10..11, 11..12, 13..16, 17..18, 18..19]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let diag = lex_error("@Label(\"open\nnode A {}");
        assert_eq!(diag.code(), Some(ErrorCode::E001));
        assert_eq!(diag.primary_label().unwrap().span().start(), 7);
    }

    #[test]
    fn test_invalid_escape() {
        let diag = lex_error(r#"@Label("bad \q")"#);
        assert_eq!(diag.code(), Some(ErrorCode::E003));
        assert_eq!(diag.primary_label().unwrap().span().start(), 12);
    }

    #[test]
    fn test_unexpected_character() {
        let diag = lex_error("node A { x: Int; }");
        assert_eq!(diag.code(), Some(ErrorCode::E002));
        assert_eq!(diag.message(), "unexpected character `;`");
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(15..16));
    }

    #[test]
    fn test_identifier_starting_with_digit() {
        let diag = lex_error("node 1abc {}");
        assert_eq!(diag.code(), Some(ErrorCode::E002));
        assert_eq!(diag.message(), "identifiers cannot start with a digit");
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(5..9));
        assert!(diag.help().is_some());

        assert_eq!(
            kinds("@Max(10) node A {}")[3],
            Token::NumberLiteral("10")
        );
    }

    #[test]
    fn test_line_comment_spans() {
        let source = "// owner\ntype A // trailing\nnode B {}";
        let spans = line_comments(source).unwrap();

        assert_eq!(spans, vec![Span::new(0..8), Span::new(16..27)]);
        assert!(tokenize(source).unwrap().iter().all(|t| !t.token.is_trivia()));
        assert!(line_comments("node B {}").unwrap().is_empty());
    }

    #[test]
    fn test_lone_dash_is_rejected() {
        let diag = lex_error("edge E(A - B)");
        assert_eq!(diag.code(), Some(ErrorCode::E002));
    }
}
