//! Splits raw IDL text into top-level `message` / `service` frames.
//!
//! A frame is the header line, its statement lines and the closing `}`,
//! all left-trimmed. Blank lines and single-line block comments are dropped
//! here; nothing downstream ever sees them.

use super::ParseError;
use super::lexer::{Cursor, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Message,
    Service,
}

impl FrameKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            FrameKind::Message => "message",
            FrameKind::Service => "service",
        }
    }
}

/// One trimmed source line and its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub header: Line,
    /// Statement lines, then the closing `}`.
    pub body: Vec<Line>,
}

/// Match `^(message|service) <identifier> {$`.
pub fn parse_header(text: &str) -> Option<(FrameKind, String)> {
    let mut cur = Cursor::new(text)?;
    let kind = match cur.word()?.as_str() {
        "message" => FrameKind::Message,
        "service" => FrameKind::Service,
        _ => return None,
    };
    cur.space()?;
    let name = cur.word()?;
    cur.space()?;
    cur.eat(&Token::LBrace)?;
    cur.finish()?;
    Some((kind, name))
}

pub fn extract_frames(src: &str) -> Result<Vec<Frame>, ParseError> {
    let mut frames = Vec::new();
    let mut open: Option<Frame> = None;

    for (idx, raw) in src.lines().enumerate() {
        let text = raw.trim_start();
        if text.is_empty() {
            continue;
        }
        let line = Line {
            number: idx + 1,
            text: text.to_string(),
        };

        if text.starts_with("/*") {
            // "/*/" starts and ends with the markers but closes nothing
            if text.len() < 4 || !text.ends_with("*/") {
                return Err(ParseError::MalformedComment {
                    line: line.number,
                    text: line.text,
                });
            }
        } else if text.ends_with('{') {
            let Some((kind, _)) = parse_header(text) else {
                return Err(ParseError::MalformedFrameHeader {
                    line: line.number,
                    text: line.text,
                });
            };
            if let Some(outer) = &open {
                return Err(ParseError::NestedFrame {
                    line: line.number,
                    text: line.text,
                    outer: outer.header.number,
                });
            }
            open = Some(Frame {
                kind,
                header: line,
                body: Vec::new(),
            });
        } else if text.starts_with('}') {
            if text != "}" {
                return Err(ParseError::UnexpectedClosingBrace {
                    line: line.number,
                    text: line.text,
                });
            }
            let Some(mut frame) = open.take() else {
                return Err(ParseError::UnexpectedClosingBrace {
                    line: line.number,
                    text: line.text,
                });
            };
            frame.body.push(line);
            frames.push(frame);
        } else {
            if !text.ends_with(';') {
                return Err(ParseError::MissingTerminator {
                    line: line.number,
                    text: line.text,
                });
            }
            match open.as_mut() {
                Some(frame) => frame.body.push(line),
                None => {
                    return Err(ParseError::StatementOutsideFrame {
                        line: line.number,
                        text: line.text,
                    });
                }
            }
        }
    }

    if let Some(Frame { header, .. }) = open {
        return Err(ParseError::MissingClosingBrace {
            line: header.number,
            text: header.text,
        });
    }

    Ok(frames)
}
