// edn-codec - Lexer for edn text
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for edn text.
//!
//! Converts a character [`Source`] into a stream of [`Lexeme`]s. Most of
//! the grammar is resolved right here: a lexeme is either a structural
//! [`Token`], a complete atomic [`Value`], or a bare [`Tag`] that the
//! parser resolves against its handler registry.
//!
//! Parsed number literals are routed through the numeric pseudo-tag
//! handlers taken from the parser configuration, so an embedding
//! application can substitute its own numeric representations without
//! touching the scanning code.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::{EdnError, Position, Result};
use crate::handlers::{self, TagHandler};
use crate::keyword::Keyword;
use crate::parser::ParserConfig;
use crate::source::Source;
use crate::symbol::{Symbol, Tag};
use crate::value::Value;

/// A structural token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The end of the input.
    EndOfInput,
    /// A `(`, which begins a list.
    BeginList,
    /// A `)`, which ends a list.
    EndList,
    /// A `[`, which begins a vector.
    BeginVector,
    /// A `]`, which ends a vector.
    EndVector,
    /// A `#{`, which begins a set.
    BeginSet,
    /// A `{`, which begins a map.
    BeginMap,
    /// A `}`, which ends a set or a map.
    EndMapOrSet,
    /// A `nil` literal.
    Nil,
    /// A `#_`, which discards the next value.
    Discard,
    /// A `#:`, which introduces a namespaced map.
    DefaultNamespaceFollows,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::EndOfInput => write!(f, "end of input"),
            Token::BeginList => write!(f, "'('"),
            Token::EndList => write!(f, "')'"),
            Token::BeginVector => write!(f, "'['"),
            Token::EndVector => write!(f, "']'"),
            Token::BeginSet => write!(f, "'#{{'"),
            Token::BeginMap => write!(f, "'{{'"),
            Token::EndMapOrSet => write!(f, "'}}'"),
            Token::Nil => write!(f, "'nil'"),
            Token::Discard => write!(f, "'#_'"),
            Token::DefaultNamespaceFollows => write!(f, "'#:'"),
        }
    }
}

/// One unit of lexer output.
#[derive(Debug, Clone)]
pub enum Lexeme {
    /// A structural token.
    Token(Token),
    /// A complete atomic value.
    Value(Value),
    /// A bare tag, to be resolved by the parser.
    Tag(Tag),
}

// ============================================================================
// Character classes
// ============================================================================

/// Whitespace separates values; commas count as whitespace.
pub(crate) fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == ','
}

pub(crate) fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Characters that end the token being scanned.
pub(crate) fn separates_tokens(c: char) -> bool {
    matches!(c, '"' | ';' | '(' | ')' | '[' | ']' | '{' | '}' | '\\') || is_whitespace(c)
}

/// Characters that may start a symbol.
pub(crate) fn symbol_start(c: char) -> bool {
    c.is_alphabetic()
        || matches!(
            c,
            '!' | '$' | '%' | '&' | '*' | '+' | '-' | '.' | '/' | '<' | '=' | '>' | '?' | '_'
        )
}

/// Characters that may continue a symbol.
pub(crate) fn symbol_constituent(c: char) -> bool {
    symbol_start(c) || c.is_ascii_digit() || c == '#' || c == ':'
}

// ============================================================================
// Lexer
// ============================================================================

/// The lexer converts characters from a [`Source`] into [`Lexeme`]s.
pub struct Lexer {
    long_handler: Arc<dyn TagHandler>,
    big_integer_handler: Arc<dyn TagHandler>,
    double_handler: Arc<dyn TagHandler>,
    big_decimal_handler: Arc<dyn TagHandler>,
    accept_unicode_escapes: bool,
    line: usize,
    column: usize,
    prev_line: usize,
    prev_column: usize,
}

impl Lexer {
    /// Create a lexer using the numeric handlers and string-escape policy
    /// of `cfg`.
    pub fn new(cfg: &ParserConfig) -> Lexer {
        let identity: Arc<dyn TagHandler> = Arc::new(handlers::IdentityHandler);
        let handler = |tag| {
            cfg.tag_handler(&tag)
                .cloned()
                .unwrap_or_else(|| Arc::clone(&identity))
        };
        Lexer {
            long_handler: handler(handlers::long_tag()),
            big_integer_handler: handler(handlers::big_integer_tag()),
            double_handler: handler(handlers::double_tag()),
            big_decimal_handler: handler(handlers::big_decimal_tag()),
            accept_unicode_escapes: cfg.accept_unicode_escapes(),
            line: 1,
            column: 1,
            prev_line: 1,
            prev_column: 1,
        }
    }

    /// The current position (1-indexed) in the characters read so far.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Scan the next lexeme from `src`.
    pub fn next_lexeme(&mut self, src: &mut dyn Source) -> Result<Lexeme> {
        self.scan(src)
            .map_err(|e| e.with_position(self.position()))
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn read(&mut self, src: &mut dyn Source) -> Result<Option<char>> {
        let c = src.read()?;
        if let Some(ch) = c {
            self.prev_line = self.line;
            self.prev_column = self.column;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        Ok(c)
    }

    fn unread(&mut self, src: &mut dyn Source, ch: char) {
        src.unread(ch);
        self.line = self.prev_line;
        self.column = self.prev_column;
    }

    fn error(&self, message: impl Into<String>) -> EdnError {
        EdnError::syntax_at(message, self.position())
    }

    fn scan(&mut self, src: &mut dyn Source) -> Result<Lexeme> {
        self.skip_whitespace_and_comments(src)?;

        let c = match self.read(src)? {
            None => return Ok(Lexeme::Token(Token::EndOfInput)),
            Some(c) => c,
        };

        match c {
            '(' => Ok(Lexeme::Token(Token::BeginList)),
            ')' => Ok(Lexeme::Token(Token::EndList)),
            '[' => Ok(Lexeme::Token(Token::BeginVector)),
            ']' => Ok(Lexeme::Token(Token::EndVector)),
            '{' => Ok(Lexeme::Token(Token::BeginMap)),
            '}' => Ok(Lexeme::Token(Token::EndMapOrSet)),
            '#' => self.read_hash_dispatched(src),
            '"' => self.read_string(src),
            '\\' => self.read_character_literal(src),
            ':' => self.read_keyword(src),
            '+' | '-' => self.read_symbol_or_number(c, src),
            _ if is_digit(c) => self.read_number(c, src),
            _ if symbol_start(c) => self.read_symbol_or_literal(c, src),
            _ => Err(self.error(format!(
                "Unexpected character '{}', \\u{:04x}",
                c, c as u32
            ))),
        }
    }

    fn skip_whitespace_and_comments(&mut self, src: &mut dyn Source) -> Result<()> {
        loop {
            // Whitespace (including commas)
            loop {
                match self.read(src)? {
                    Some(c) if is_whitespace(c) => {}
                    Some(c) => {
                        self.unread(src, c);
                        break;
                    }
                    None => return Ok(()),
                }
            }
            // A ';' comment runs to the end of the line
            match self.read(src)? {
                Some(';') => loop {
                    match self.read(src)? {
                        Some('\n') | Some('\r') | None => break,
                        Some(_) => {}
                    }
                },
                Some(c) => {
                    self.unread(src, c);
                    return Ok(());
                }
                None => return Ok(()),
            }
        }
    }

    fn read_hash_dispatched(&mut self, src: &mut dyn Source) -> Result<Lexeme> {
        match self.read(src)? {
            None => Err(self.error("Unexpected end of input following '#'")),
            Some('{') => Ok(Lexeme::Token(Token::BeginSet)),
            Some('_') => Ok(Lexeme::Token(Token::Discard)),
            Some(':') => Ok(Lexeme::Token(Token::DefaultNamespaceFollows)),
            Some(c) => {
                let sym = self.read_symbol(c, src)?;
                Ok(Lexeme::Tag(Tag::from_symbol(sym)))
            }
        }
    }

    fn read_symbol_or_number(&mut self, sign: char, src: &mut dyn Source) -> Result<Lexeme> {
        match self.read(src)? {
            None => self
                .read_symbol(sign, src)
                .map(|sym| Lexeme::Value(Value::Symbol(sym))),
            Some(peek) => {
                self.unread(src, peek);
                if is_digit(peek) {
                    self.read_number(sign, src)
                } else {
                    self.read_symbol(sign, src)
                        .map(|sym| Lexeme::Value(Value::Symbol(sym)))
                }
            }
        }
    }

    /// A symbol, unless it spells `nil`, `true` or `false`.
    fn read_symbol_or_literal(&mut self, first: char, src: &mut dyn Source) -> Result<Lexeme> {
        let sym = self.read_symbol(first, src)?;
        if !sym.has_prefix() {
            match sym.name() {
                "nil" => return Ok(Lexeme::Token(Token::Nil)),
                "true" => return Ok(Lexeme::Value(Value::Bool(true))),
                "false" => return Ok(Lexeme::Value(Value::Bool(false))),
                _ => {}
            }
        }
        Ok(Lexeme::Value(Value::Symbol(sym)))
    }

    fn read_keyword(&mut self, src: &mut dyn Source) -> Result<Lexeme> {
        let first = match self.read(src)? {
            None => return Err(self.error("Unexpected end of input while reading an identifier")),
            Some(c) => c,
        };
        let sym = self.read_symbol(first, src)?;
        if !sym.has_prefix() && sym.name() == "/" {
            return Err(self.error("':/' is not a valid keyword."));
        }
        Ok(Lexeme::Value(Value::Keyword(Keyword::from_symbol(sym))))
    }

    /// Accumulate symbol constituents, then validate the use of '/'. A
    /// single interior '/' splits prefix from name; `ns//` names the
    /// symbol `/` in namespace `ns`; everything else involving '/' is an
    /// error.
    fn read_symbol(&mut self, first: char, src: &mut dyn Source) -> Result<Symbol> {
        let mut text = String::new();
        let mut slashes = 0usize;
        let mut last_slash = 0usize;

        let mut c = first;
        loop {
            if c == '/' {
                slashes += 1;
                last_slash = text.len();
            }
            text.push(c);
            match self.read(src)? {
                Some(n) if symbol_constituent(n) => c = n,
                Some(n) => {
                    self.unread(src, n);
                    break;
                }
                None => break,
            }
        }

        self.validate_slashes(&text, slashes, last_slash)?;
        match slashes {
            0 => Symbol::new(&text),
            1 if text.len() == 1 => Symbol::new("/"),
            1 => Symbol::namespaced(&text[..last_slash], &text[last_slash + 1..]),
            _ => {
                // Validated as the two-character "//" suffix: name is '/'.
                Symbol::namespaced(&text[..last_slash - 1], "/")
            }
        }
    }

    fn validate_slashes(&self, text: &str, slashes: usize, last_slash: usize) -> Result<()> {
        match slashes {
            0 => Ok(()),
            1 => {
                if text.len() == 1 {
                    Ok(()) // the symbol '/'
                } else if last_slash == text.len() - 1 {
                    Err(self.error(format!("The name '{}' must not end with '/'.", text)))
                } else if last_slash == 0 {
                    Err(self.error(format!("The name '{}' must not start with '/'.", text)))
                } else {
                    Ok(())
                }
            }
            2 => {
                if text.len() == 2 {
                    Err(self.error("The name '//' is not valid."))
                } else if last_slash != text.len() - 1
                    || text.as_bytes()[last_slash - 1] != b'/'
                {
                    Err(self.error(format!("Incorrect use of '/' in name '{}'.", text)))
                } else {
                    Ok(())
                }
            }
            _ => Err(self.error(format!("Too many '/' in name '{}'.", text))),
        }
    }

    // ========================================================================
    // Strings and characters
    // ========================================================================

    fn read_string(&mut self, src: &mut dyn Source) -> Result<Lexeme> {
        let mut s = String::new();
        loop {
            match self.read(src)? {
                None => return Err(self.error("Unexpected end of input in string literal")),
                Some('"') => return Ok(Lexeme::Value(Value::string(s))),
                Some('\\') => match self.read(src)? {
                    None => return Err(self.error("Unexpected end of input in string literal")),
                    Some('b') => s.push('\u{0008}'),
                    Some('t') => s.push('\t'),
                    Some('n') => s.push('\n'),
                    Some('f') => s.push('\u{000c}'),
                    Some('r') => s.push('\r'),
                    Some('"') => s.push('"'),
                    Some('\'') => s.push('\''),
                    Some('\\') => s.push('\\'),
                    Some('u') => {
                        if !self.accept_unicode_escapes {
                            return Err(self.error(
                                "Unsupported 'u' escape in string. \
                                 (Unicode escapes disabled by parser configuration)",
                            ));
                        }
                        s.push(self.read_unicode_escape(src)?);
                    }
                    Some(c) => {
                        return Err(self.error(format!("Unsupported '{}' escape in string", c)));
                    }
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn read_unicode_escape(&mut self, src: &mut dyn Source) -> Result<char> {
        let mut v: u32 = 0;
        for _ in 0..4 {
            let d = self
                .read(src)?
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("Invalid \\u Unicode escape in string."))?;
            v = v * 16 + d;
        }
        char::from_u32(v).ok_or_else(|| self.error("Invalid \\u Unicode escape in string."))
    }

    fn read_character_literal(&mut self, src: &mut dyn Source) -> Result<Lexeme> {
        let first = match self.read(src)? {
            None => return Err(self.error("Unexpected end of input in character literal")),
            Some(c) => c,
        };
        if is_whitespace(first) && first != ',' {
            return Err(self.error(
                "A backslash introducing a character literal must not be \
                 immediately followed by whitespace.",
            ));
        }

        let mut name = String::new();
        name.push(first);
        loop {
            match self.read(src)? {
                Some(c) if !separates_tokens(c) => name.push(c),
                Some(c) => {
                    self.unread(src, c);
                    break;
                }
                None => break,
            }
        }

        if name.chars().count() == 1 {
            Ok(Lexeme::Value(Value::Char(first)))
        } else {
            self.char_for_name(&name).map(|c| Lexeme::Value(Value::Char(c)))
        }
    }

    fn char_for_name(&self, name: &str) -> Result<char> {
        match name {
            "newline" => return Ok('\n'),
            "space" => return Ok(' '),
            "tab" => return Ok('\t'),
            "backspace" => return Ok('\u{0008}'),
            "formfeed" => return Ok('\u{000c}'),
            "return" => return Ok('\r'),
            _ => {}
        }
        if let Some(hex) = name.strip_prefix('u') {
            if hex.len() == 4 {
                if let Ok(n) = u32::from_str_radix(hex, 16) {
                    if let Some(c) = char::from_u32(n) {
                        return Ok(c);
                    }
                }
            }
        }
        Err(self.error(format!("The character \\{} was not recognized.", name)))
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    /// Scan a number. A trailing `N` forces an arbitrary-precision
    /// integer, a `.`/`e`/`E` makes it a float, a trailing `M` an
    /// arbitrary-precision decimal. Integers outside the 64-bit range
    /// are promoted. Each outcome is routed through its pseudo-tag
    /// handler.
    fn read_number(&mut self, first: char, src: &mut dyn Source) -> Result<Lexeme> {
        let mut digits = String::new();
        if first != '+' {
            digits.push(first);
        }
        let mut curr = self.read(src)?;
        while let Some(c) = curr {
            if !is_digit(c) {
                break;
            }
            digits.push(c);
            curr = self.read(src)?;
        }

        if matches!(curr, Some('.') | Some('e') | Some('E') | Some('M')) {
            if curr == Some('.') {
                loop {
                    digits.push(curr.unwrap_or('.'));
                    curr = self.read(src)?;
                    if !curr.is_some_and(is_digit) {
                        break;
                    }
                }
            }

            if matches!(curr, Some('e') | Some('E')) {
                digits.push(curr.unwrap_or('e'));
                curr = self.read(src)?;
                match curr {
                    None => {
                        return Err(self.error("Unexpected end of input in numeric literal"));
                    }
                    Some(c) if c == '-' || c == '+' || is_digit(c) => {}
                    Some(c) => {
                        return Err(self.error(format!("Not a number: '{}{}'.", digits, c)));
                    }
                }
                loop {
                    digits.push(curr.unwrap_or('0'));
                    curr = self.read(src)?;
                    if !curr.is_some_and(is_digit) {
                        break;
                    }
                }
            }

            let decimal = curr == Some('M');
            if decimal {
                curr = self.read(src)?;
            }
            self.require_number_end(&digits, curr, src)?;

            let transformed = if decimal {
                let d = BigDecimal::from_str(&digits)
                    .map_err(|_| self.error(format!("Not a number: '{}M'.", digits)))?;
                let tag = handlers::big_decimal_tag();
                self.big_decimal_handler.transform(&tag, Value::Decimal(d))
            } else {
                let d: f64 = digits
                    .parse()
                    .map_err(|_| self.error(format!("Not a number: '{}'.", digits)))?;
                let tag = handlers::double_tag();
                self.double_handler.transform(&tag, Value::Float(d))
            };
            transformed.map(Lexeme::Value)
        } else {
            let bigint = curr == Some('N');
            if bigint {
                curr = self.read(src)?;
            }
            self.require_number_end(&digits, curr, src)?;

            let transformed = if bigint {
                let n = BigInt::from_str(&digits)
                    .map_err(|_| self.error(format!("Not a number: '{}N'.", digits)))?;
                let tag = handlers::big_integer_tag();
                self.big_integer_handler.transform(&tag, Value::BigInt(n))
            } else if let Ok(n) = digits.parse::<i64>() {
                let tag = handlers::long_tag();
                self.long_handler.transform(&tag, Value::Int(n))
            } else {
                // Magnitude outside the 64-bit range: promote.
                let n = BigInt::from_str(&digits)
                    .map_err(|_| self.error(format!("Not a number: '{}'.", digits)))?;
                let tag = handlers::big_integer_tag();
                self.big_integer_handler.transform(&tag, Value::BigInt(n))
            };
            transformed.map(Lexeme::Value)
        }
    }

    /// After a number (and its optional suffix) the next character must
    /// separate tokens or be the end of input.
    fn require_number_end(
        &mut self,
        digits: &str,
        curr: Option<char>,
        src: &mut dyn Source,
    ) -> Result<()> {
        if let Some(c) = curr {
            if !separates_tokens(c) {
                return Err(self.error(format!("Not a number: '{}{}'.", digits, c)));
            }
            self.unread(src, c);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
