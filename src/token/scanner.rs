use tracing::{debug, info, trace};

use crate::{
    config::Config,
    error::{Report, Res},
    token::{Pos, Source, Token, TokenKind, str_to_token},
};

pub fn scan(src: &Source, config: &Config) -> Res<Vec<Token>> {
    let scanner = Scanner::new(src, config);
    scanner.scan()
}

struct Scanner<'a> {
    source: &'a Source,
    pos: usize,
    row: usize,
    col: usize,
    line_begin: usize,
    _config: &'a Config,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a Source, config: &'a Config) -> Self {
        Scanner {
            _config: config,
            source,
            pos: 0,
            col: 0,
            row: 0,
            line_begin: 0,
        }
    }

    fn scan(mut self) -> Res<Vec<Token>> {
        info!("scanning file: {}", self.source.filepath);

        let mut tokens = Vec::new();

        while !self.eof() {
            let (token, consumed) = match self.cur() {
                // Whitespace tokens are ignored and not added to token list
                v if Scanner::is_whitespace(v) => (
                    Token::new(TokenKind::Whitespace, 0, self.pos()),
                    self.peek_while(Scanner::is_whitespace),
                ),

                // Line comment, discarded through end of line
                b'#' => (
                    Token::new(TokenKind::Whitespace, 0, self.pos()),
                    self.peek_while(|b| b != b'\n'),
                ),

                // Newline character resets the row and col.
                b'\n' => {
                    let pos = self.pos();
                    self.row += 1;
                    self.col = 0;
                    self.line_begin = self.pos + 1;
                    (Token::new(TokenKind::Newline, 1, pos), 1)
                }

                // Identifier or keyword
                v if Scanner::is_alpha(v) => {
                    let length = self.peek_while(Scanner::is_alphanum);
                    let lexeme = self.source.str_range(self.pos, self.pos + length);

                    if let Some(k) = str_to_token(lexeme) {
                        (Token::new(k.clone(), length, self.pos()), length)
                    } else {
                        (
                            Token::new(TokenKind::IdentLit(lexeme.to_owned()), length, self.pos()),
                            length,
                        )
                    }
                }

                // Number
                v if Scanner::is_number(v) => {
                    let mut length = self.peek_while(Scanner::is_number);
                    let mut is_dec = false;

                    // A fractional part begins only when a digit follows the
                    // dot. A trailing dot is left for the next token.
                    if self.at_or(self.pos + length) == Some(b'.') {
                        let digits = self.count_while(self.pos + length + 1, Scanner::is_number);
                        if digits > 0 {
                            length += 1 + digits;
                            is_dec = true;
                        }
                    }

                    let lexeme = self.source.str_range(self.pos, self.pos + length);
                    let kind = if is_dec {
                        match lexeme.parse() {
                            Ok(d) => TokenKind::DecLit(d),
                            _ => return Err(self.error("invalid number literal", length)),
                        }
                    } else {
                        match lexeme.parse() {
                            Ok(n) => TokenKind::IntLit(n),
                            _ => return Err(self.error("invalid number literal", length)),
                        }
                    };

                    (Token::new(kind, length, self.pos()), length)
                }

                // String
                b'"' => self.scan_string()?,

                // Char
                b'\'' => self.scan_char()?,

                // Multi-character operators, resolved by greedy forward matching
                b'=' => match self.at_or(self.pos + 1) {
                    Some(b'=') => (self.symbol(TokenKind::EqEq, 2), 2),
                    Some(b'>') => (self.symbol(TokenKind::Arrow, 2), 2),
                    Some(b'/') => {
                        if self.at_or(self.pos + 2) == Some(b'=') {
                            (self.symbol(TokenKind::NotArrow, 3), 3)
                        } else {
                            return Err(self.error("expected '=' to complete '=/='", 2));
                        }
                    }
                    _ => (self.symbol(TokenKind::Eq, 1), 1),
                },

                b'<' => match self.at_or(self.pos + 1) {
                    Some(b'=') => {
                        if self.at_or(self.pos + 2) == Some(b'>') {
                            (self.symbol(TokenKind::DoubleArrow, 3), 3)
                        } else {
                            (self.symbol(TokenKind::LessEq, 2), 2)
                        }
                    }
                    Some(b'<') => (self.symbol(TokenKind::LeftLeft, 2), 2),
                    _ => (self.symbol(TokenKind::Less, 1), 1),
                },

                b'>' => match self.at_or(self.pos + 1) {
                    Some(b'=') => (self.symbol(TokenKind::GreaterEq, 2), 2),
                    _ => (self.symbol(TokenKind::Greater, 1), 1),
                },

                b'!' => match self.at_or(self.pos + 1) {
                    Some(b'=') => (self.symbol(TokenKind::BangEq, 2), 2),
                    _ => (self.symbol(TokenKind::Bang, 1), 1),
                },

                b'+' => match self.at_or(self.pos + 1) {
                    Some(b'+') => (self.symbol(TokenKind::PlusPlus, 2), 2),
                    _ => (self.symbol(TokenKind::Plus, 1), 1),
                },

                b'-' => match self.at_or(self.pos + 1) {
                    Some(b'-') => (self.symbol(TokenKind::MinusMinus, 2), 2),
                    _ => (self.symbol(TokenKind::Minus, 1), 1),
                },

                // Single symbol
                _ => {
                    let lexeme = self.source.str_range(self.pos, self.pos + 1);
                    match str_to_token(lexeme) {
                        Some(kind) => (self.symbol(kind.clone(), 1), 1),
                        None => {
                            return Err(
                                self.error(&format!("unexpected character '{}'", lexeme), 1)
                            );
                        }
                    }
                }
            };

            trace!("consumed token: '{}'", token);
            self.pos += consumed;

            // Col must not advance after a newline. It is reset to 0 above and must remain 0
            // before next iteration. Incrementing now would cause the first token on the new
            // line to have col=1
            if !token.kind.eq(&TokenKind::Newline) {
                self.col += consumed;
            }

            if !matches!(token.kind, TokenKind::Whitespace | TokenKind::Newline) {
                tokens.push(token);
            }
        }

        // The token sequence always ends with exactly one EOF sentinel
        tokens.push(Token::new(TokenKind::Eof, 0, self.pos()));

        debug!("success: {} tokens", tokens.len());
        Ok(tokens)
    }

    fn pos(&self) -> Pos {
        Pos {
            row: self.row,
            col: self.col,
            offset: self.pos,
            line_begin: self.line_begin,
        }
    }

    fn at(&self, pos: usize) -> u8 {
        assert!(
            pos < self.len(),
            "tried to access pos {} when src is {}",
            pos,
            self.len()
        );
        self.source.src[pos]
    }

    fn at_or(&self, pos: usize) -> Option<u8> {
        if pos >= self.len() {
            None
        } else {
            Some(self.at(pos))
        }
    }

    fn cur(&self) -> u8 {
        self.source.src[self.pos]
    }

    fn eof(&self) -> bool {
        self.pos >= self.len()
    }

    fn len(&self) -> usize {
        self.source.src.len()
    }

    fn symbol(&self, kind: TokenKind, length: usize) -> Token {
        Token::new(kind, length, self.pos())
    }

    fn error(&self, msg: &str, length: usize) -> Report {
        Report::lexical(msg, &self.pos(), length)
    }

    /// Peeks characters from the current position while predicate returns
    /// true. Returns number of characters peeked.
    fn peek_while<P>(&self, predicate: P) -> usize
    where
        P: Fn(u8) -> bool,
    {
        self.count_while(self.pos, predicate)
    }

    /// Same as peek_while but starting at an arbitrary offset.
    fn count_while<P>(&self, from: usize, predicate: P) -> usize
    where
        P: Fn(u8) -> bool,
    {
        let mut consumed = 0;
        while from + consumed < self.len() && predicate(self.source.src[from + consumed]) {
            consumed += 1;
        }

        consumed
    }

    /// Scans a string literal, starting at the current position.
    fn scan_string(&mut self) -> Result<(Token, usize), Report> {
        let length = self.count_while(self.pos + 1, |b| b != b'"' && b != b'\n');

        // Was string actually closed?
        let check_pos = self.pos + length + 1; // Of end quote
        if check_pos >= self.len() || self.at(check_pos) != b'"' {
            let mut pos = self.pos();
            pos.col += length + 1;
            pos.offset += length + 1;
            return Err(Report::lexical("expected end quote", &pos, 1));
        }

        let length = length + 2; // Include start and end quote
        let lexeme = self.source.str_range(self.pos + 1, self.pos + length - 1);

        Ok((
            Token::new(TokenKind::StringLit(lexeme.to_string()), length, self.pos()),
            length,
        ))
    }

    /// Scans a char literal: exactly one letter or digit between two quotes.
    fn scan_char(&mut self) -> Result<(Token, usize), Report> {
        let inner = self.at_or(self.pos + 1);
        let close = self.at_or(self.pos + 2);

        match (inner, close) {
            (Some(c), Some(b'\'')) if Scanner::is_letter_or_digit(c) => Ok((
                Token::new(TokenKind::CharLit(c as char), 3, self.pos()),
                3,
            )),
            _ => Err(self.error("char literal must be exactly one letter or digit", 1)),
        }
    }

    fn is_number(n: u8) -> bool {
        n >= b'0' && n <= b'9'
    }

    fn is_whitespace(b: u8) -> bool {
        b == b' ' || b == b'\t' || b == b'\r'
    }

    fn is_alpha(b: u8) -> bool {
        (b >= b'a' && b <= b'z') || (b >= b'A' && b <= b'Z') || b == b'_'
    }

    fn is_alphanum(b: u8) -> bool {
        Scanner::is_alpha(b) || Scanner::is_number(b)
    }

    fn is_letter_or_digit(b: u8) -> bool {
        (b >= b'a' && b <= b'z') || (b >= b'A' && b <= b'Z') || Scanner::is_number(b)
    }
}
