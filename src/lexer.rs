use crate::error::{Span, TernError};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    Semicolon,
    Colon,
    Comma,
    Period,

    // Operator classes
    BinaryOperator,
    ComparisonOperator,
    LogicalOperator,
    UnaryOperator,
    Equals,

    // Literals
    Number,
    StringLiteral,
    Identifier,

    // Keywords
    Let,
    Const,
    Function,
    IfStatement,
    ElseIfStatement,
    ElseStatement,

    // Special
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenCurly => "'{'",
            TokenKind::CloseCurly => "'}'",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Period => "'.'",
            TokenKind::BinaryOperator => "binary operator",
            TokenKind::ComparisonOperator => "comparison operator",
            TokenKind::LogicalOperator => "logical operator",
            TokenKind::UnaryOperator => "unary operator",
            TokenKind::Equals => "'='",
            TokenKind::Number => "number",
            TokenKind::StringLiteral => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Let => "'let'",
            TokenKind::Const => "'const'",
            TokenKind::Function => "'fn'",
            TokenKind::IfStatement => "'if'",
            TokenKind::ElseIfStatement => "'elseif'",
            TokenKind::ElseStatement => "'else'",
            TokenKind::EndOfInput => "end of input",
        };
        write!(f, "{}", name)
    }
}

/// A classified lexeme. String literals keep their surrounding quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: String, span: Span) -> Self {
        Self { value, kind, span }
    }
}

/// Tokenize `source` in a single pass.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TernError> {
    Lexer::new(source).scan_tokens()
}

/// Single-pass scanner. Positions are character offsets, which is what the
/// diagnostic renderer expects.
pub struct Lexer {
    chars: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    keywords: HashMap<&'static str, TokenKind>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("let", TokenKind::Let);
        keywords.insert("const", TokenKind::Const);
        keywords.insert("fn", TokenKind::Function);
        keywords.insert("if", TokenKind::IfStatement);
        keywords.insert("elseif", TokenKind::ElseIfStatement);
        keywords.insert("else", TokenKind::ElseStatement);

        Self {
            chars: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            keywords,
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, TernError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenKind::EndOfInput,
            "EOF".to_string(),
            Span::new(self.current, self.current),
        ));

        tracing::debug!(count = self.tokens.len(), "tokenized source");
        Ok(self.tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn scan_token(&mut self) -> Result<(), TernError> {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenKind::OpenParen),
            ')' => self.add_token(TokenKind::CloseParen),
            '{' => self.add_token(TokenKind::OpenCurly),
            '}' => self.add_token(TokenKind::CloseCurly),
            ';' => self.add_token(TokenKind::Semicolon),
            ':' => self.add_token(TokenKind::Colon),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Period),
            '+' | '-' | '*' | '/' | '%' => self.add_token(TokenKind::BinaryOperator),
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::ComparisonOperator
                } else {
                    TokenKind::Equals
                };
                self.add_token(kind);
            }
            '!' => {
                let kind = if self.match_char('=') {
                    TokenKind::ComparisonOperator
                } else {
                    TokenKind::UnaryOperator
                };
                self.add_token(kind);
            }
            '<' | '>' => {
                self.match_char('=');
                self.add_token(TokenKind::ComparisonOperator);
            }
            '&' | '|' => {
                if self.match_char(c) {
                    self.add_token(TokenKind::LogicalOperator);
                } else {
                    return Err(TernError::lex_error_with_help(
                        Span::single(self.start),
                        format!("Unrecognized character: '{}'", c),
                        format!("Did you mean the logical operator '{}{}'?", c, c),
                    ));
                }
            }
            ' ' | '\t' | '\n' | '\r' => {}
            '"' | '\'' => self.string(c)?,
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() => self.identifier(),
            _ => {
                return Err(TernError::lex_error(
                    Span::single(self.start),
                    format!("Unrecognized character: '{}'", c),
                ));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn string(&mut self, quote: char) -> Result<(), TernError> {
        // No escape processing: everything up to the matching quote is verbatim.
        while !self.is_at_end() && self.peek() != quote {
            self.current += 1;
        }

        if self.is_at_end() {
            return Err(TernError::lex_error_with_help(
                Span::new(self.start, self.current),
                "Unterminated string".to_string(),
                format!("Close the string literal with a matching {}.", quote),
            ));
        }

        self.current += 1;
        self.add_token(TokenKind::StringLiteral);
        Ok(())
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.current += 1;
        }
        self.add_token(TokenKind::Number);
    }

    fn identifier(&mut self) {
        while !self.is_at_end() && self.peek().is_alphabetic() {
            self.current += 1;
        }

        let text = self.lexeme();
        let kind = self
            .keywords
            .get(text.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);

        self.tokens
            .push(Token::new(kind, text, Span::new(self.start, self.current)));
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let text = self.lexeme();
        self.tokens
            .push(Token::new(kind, text, Span::new(self.start, self.current)));
    }
}
