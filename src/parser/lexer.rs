//! Very small hand-written lexer for one IDL statement line.
//!
//! The grammars are line-oriented, so the lexer never sees more than one
//! trimmed line. Whitespace is *kept* as a token: the line grammars allow
//! exactly one space between words and the parsers check that literally.
//
//  Lexical items:
//
//      Word     ::= [A-Za-z][A-Za-z0-9_]*
//      Number   ::= [0-9]+
//      Space    ::= [ \t]+
//      Symbols  ::= '(' | ')' | '[' | ']' | '{' | '}' | ';'

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Number(String),
    Space(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
        }
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(&c) = self.chars.peek() {
            if pred(c) {
                buf.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_run<F: Fn(char) -> bool>(&mut self, first: char, pred: F) -> String {
        let mut buf = String::new();
        buf.push(first);
        self.consume_while(pred, &mut buf);
        buf
    }
}

impl Iterator for Lexer<'_> {
    /// `Err` carries the character that starts no token.
    type Item = Result<Token, char>;

    fn next(&mut self) -> Option<Self::Item> {
        let ch = self.chars.next()?;

        let tok = match ch {
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '[' => Ok(Token::LBracket),
            ']' => Ok(Token::RBracket),
            '{' => Ok(Token::LBrace),
            '}' => Ok(Token::RBrace),
            ';' => Ok(Token::Semicolon),
            ' ' | '\t' => Ok(Token::Space(self.read_run(ch, |c| c == ' ' || c == '\t'))),
            c if c.is_ascii_digit() => Ok(Token::Number(self.read_run(c, |c| c.is_ascii_digit()))),
            c if c.is_ascii_alphabetic() => Ok(Token::Word(
                self.read_run(c, |c| c.is_ascii_alphanumeric() || c == '_'),
            )),
            e => Err(e),
        };

        Some(tok)
    }
}

/// Token stream of one line plus the matching primitives the grammars are
/// written in. Every matcher returns `None` on mismatch, so a grammar reads
/// as a chain of `?`.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    /// `None` when the line contains a character no token starts with.
    pub fn new(line: &str) -> Option<Self> {
        let tokens = Lexer::new(line).collect::<Result<Vec<_>, _>>().ok()?;
        Some(Self { tokens, pos: 0 })
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance_if(&mut self, hit: bool) -> Option<()> {
        if hit {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    pub fn word(&mut self) -> Option<String> {
        let Some(Token::Word(w)) = self.peek() else {
            return None;
        };
        let w = w.clone();
        self.pos += 1;
        Some(w)
    }

    pub fn keyword(&mut self, kw: &str) -> Option<()> {
        let hit = matches!(self.peek(), Some(Token::Word(w)) if w == kw);
        self.advance_if(hit)
    }

    pub fn number(&mut self) -> Option<String> {
        let Some(Token::Number(n)) = self.peek() else {
            return None;
        };
        let n = n.clone();
        self.pos += 1;
        Some(n)
    }

    /// Exactly one ASCII space.
    pub fn space(&mut self) -> Option<()> {
        let hit = matches!(self.peek(), Some(Token::Space(s)) if s == " ");
        self.advance_if(hit)
    }

    /// Consume `tok` if it is next.
    pub fn eat(&mut self, tok: &Token) -> Option<()> {
        let hit = self.peek() == Some(tok);
        self.advance_if(hit)
    }

    /// Succeeds only when every token has been consumed.
    pub fn finish(&self) -> Option<()> {
        (self.pos == self.tokens.len()).then_some(())
    }
}
