use std::fmt;

use crate::token::Source;

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,

    /// Position of first character in token.
    pub pos: Pos,
    /// Position of character immediately after token
    pub end_pos: Pos,
    /// Is the token an EOF token?
    pub eof: bool,
    /// Is the token invalid?
    pub invalid: bool,
    /// Byte length of token
    pub length: usize,
}

impl Token {
    /// Create new Token. Sets token flags based on kind.
    pub fn new(kind: TokenKind, length: usize, pos: Pos) -> Token {
        let end_pos = Pos {
            row: pos.row,
            col: pos.col + length,
            offset: pos.offset + length,
            line_begin: pos.line_begin,
        };

        Token {
            length,
            eof: kind.eq(&TokenKind::Eof),
            invalid: kind.eq(&TokenKind::Invalid),
            pos,
            end_pos,
            kind,
        }
    }

    /// The source text this token was scanned from.
    pub fn lexeme<'a>(&self, source: &'a Source) -> &'a str {
        source.str_range(self.pos.offset, self.pos.offset + self.length)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({}, {})", self.kind, self.pos.row, self.pos.col)
    }
}

pub fn display_tokens(tokens: &[Token]) -> String {
    format!(
        "[\n{}\n]",
        tokens
            .iter()
            .map(|t| format!("    {}", t))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    /// Row in file, starting at 0
    pub row: usize,
    /// Column on line, starting at 0
    pub col: usize,
    /// Byte offset in file
    pub offset: usize,
    /// Offset of first character on same line as this Pos
    pub line_begin: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Invalid,
    Whitespace, // Ignored by scanner
    Newline,    // Ignored by scanner, advances row counter
    Eof,

    // Literals, contain the decoded literal value
    IdentLit(String),
    IntLit(i64),
    DecLit(f64),
    StringLit(String), // String does not include quotes
    CharLit(char),

    // Keywords
    Class,
    Extends,
    Func,
    Returns,
    Public,
    Private,
    If,
    Else,
    While,
    Return,
    Break,
    Continue,
    New,
    This,
    Super,
    And,
    Or,
    Mod,
    True,
    False,
    Null,

    // Math
    Plus,
    Minus,
    Star,
    Slash,

    // Logic
    Eq,
    EqEq,
    BangEq,
    Bang,
    Less,
    LessEq,
    Greater,
    GreaterEq,

    // Graph operators
    Arrow,       // => directed edge
    DoubleArrow, // <=> bidirectional edge
    NotArrow,    // =/= disconnect
    LeftLeft,    // << retag
    PlusPlus,    // ++ tag add
    MinusMinus,  // -- tag remove

    // Parenthesis & Brackets
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBrack,
    RBrack,

    // Other symbols
    Dot,
    Comma,
    Semi,

    // Primitive types
    Void,
    IntType,
    DecType,
    StringType,
    CharType,
    BoolType,
    ListType,
    SetType,
}

/// Reserved token lexemes
static RESERVED: &[(&str, TokenKind)] = &[
    // Keywords
    ("class", TokenKind::Class),
    ("extends", TokenKind::Extends),
    ("func", TokenKind::Func),
    ("returns", TokenKind::Returns),
    ("public", TokenKind::Public),
    ("private", TokenKind::Private),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("return", TokenKind::Return),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("new", TokenKind::New),
    ("this", TokenKind::This),
    ("super", TokenKind::Super),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("mod", TokenKind::Mod),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
    // Math
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    // Logic
    ("=", TokenKind::Eq),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Less),
    ("<=", TokenKind::LessEq),
    (">", TokenKind::Greater),
    (">=", TokenKind::GreaterEq),
    // Graph operators
    ("=>", TokenKind::Arrow),
    ("<=>", TokenKind::DoubleArrow),
    ("=/=", TokenKind::NotArrow),
    ("<<", TokenKind::LeftLeft),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    // Parenthesis & Brackets
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBrack),
    ("]", TokenKind::RBrack),
    // Other symbols
    (".", TokenKind::Dot),
    (",", TokenKind::Comma),
    (";", TokenKind::Semi),
    // Primitive types
    ("void", TokenKind::Void),
    ("int", TokenKind::IntType),
    ("dec", TokenKind::DecType),
    ("string", TokenKind::StringType),
    ("char", TokenKind::CharType),
    ("bool", TokenKind::BoolType),
    ("list", TokenKind::ListType),
    ("set", TokenKind::SetType),
];

pub fn str_to_token(s: &str) -> Option<&TokenKind> {
    RESERVED.iter().find(|(kw, _)| *kw == s).map(|(_, t)| t)
}

pub fn token_to_str(t: &TokenKind) -> Option<&'static str> {
    RESERVED
        .iter()
        .find(|(_, tok)| tok == t)
        .map(|(kw, _)| *kw)
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Whitespace | TokenKind::Newline => {
                panic!("whitespace tokens should be discarded")
            }

            TokenKind::Invalid => write!(f, "INVALID"),
            TokenKind::Eof => write!(f, "EOF"),

            // Literals
            TokenKind::IdentLit(ident) => write!(f, "{}", ident),
            TokenKind::IntLit(n) => write!(f, "{}", n),
            TokenKind::DecLit(d) => write!(f, "{}", d),
            TokenKind::StringLit(s) => write!(f, "{}", s),
            TokenKind::CharLit(c) => write!(f, "{}", c),

            k => {
                let s = token_to_str(k).expect("kind was not found in RESERVED map");
                write!(f, "{}", s)
            }
        }
    }
}
