//! Token types produced by the [`lexer`](super::lexer).

use std::fmt;

use winnow::stream::Location;

use crate::Span;

/// Token types for the gmdsl language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    // Keywords
    Namespace,
    Import,
    Type,
    Node,
    Edge,
    Annotation,

    // Literals
    StringLiteral(String),
    NumberLiteral(&'src str),
    Identifier(&'src str),

    // Operators
    Arrow,       // ->
    DoubleArrow, // <->
    Colon,       // :
    Dot,         // .
    At,          // @

    // Punctuation
    LeftBrace,  // {
    RightBrace, // }
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,

    // Ignorable
    LineComment(&'src str), // // comment
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Whitespace, newlines and comments carry no meaning for the parser.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    }

    /// The keyword spelling, if this token is a keyword.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Token::Namespace => Some("namespace"),
            Token::Import => Some("import"),
            Token::Type => Some("type"),
            Token::Node => Some("node"),
            Token::Edge => Some("edge"),
            Token::Annotation => Some("annotation"),
            _ => None,
        }
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword() {
            return write!(f, "{keyword}");
        }
        match self {
            Token::StringLiteral(s) => write!(f, "{s:?}"),
            Token::NumberLiteral(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::Arrow => write!(f, "->"),
            Token::DoubleArrow => write!(f, "<->"),
            Token::Colon => write!(f, ":"),
            Token::Dot => write!(f, "."),
            Token::At => write!(f, "@"),

            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),

            Token::LineComment(comment) => write!(f, "//{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),

            Token::Namespace
            | Token::Import
            | Token::Type
            | Token::Node
            | Token::Edge
            | Token::Annotation => Ok(()),
        }
    }
}
