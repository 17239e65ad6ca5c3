//! `message` frame → ordered field list.

use super::ParseError;
use super::frames::{Frame, FrameKind, Line, parse_header};
use super::lexer::{Cursor, Token};
use crate::model::{Field, Message, Primitive};

pub fn parse_message(frame: &Frame) -> Result<Message, ParseError> {
    let header = &frame.header;

    let name = match parse_header(&header.text) {
        Some((FrameKind::Message, name)) => name,
        _ => {
            return Err(ParseError::MalformedFrameHeader {
                line: header.number,
                text: header.text.clone(),
            });
        }
    };

    let Some((closer, body)) = frame.body.split_last() else {
        return Err(ParseError::MissingClosingBrace {
            line: header.number,
            text: header.text.clone(),
        });
    };
    if closer.text != "}" {
        return Err(ParseError::MissingClosingBrace {
            line: closer.number,
            text: closer.text.clone(),
        });
    }

    let mut fields: Vec<Field> = Vec::with_capacity(body.len());
    let mut size = 0usize;
    for line in body {
        let field = parse_field(line)?;
        if fields.iter().any(|f| f.name == field.name) {
            return Err(ParseError::DuplicateMember {
                line: line.number,
                owner: name,
                name: field.name,
            });
        }
        // `Message::declared_size` must not overflow.
        size = field
            .ty
            .width()
            .checked_mul(field.array_len.unwrap_or(1))
            .and_then(|width| size.checked_add(width))
            .ok_or_else(|| ParseError::MalformedMessageBody {
                line: line.number,
                text: line.text.clone(),
            })?;
        fields.push(field);
    }

    Ok(Message { name, fields })
}

/// `^<prim> <ident>;$` or `^<prim>\[<digits>\] <ident>;$`.
fn parse_field(line: &Line) -> Result<Field, ParseError> {
    let malformed = || ParseError::MalformedMessageBody {
        line: line.number,
        text: line.text.clone(),
    };

    let (ty_name, array_len, name) = match_field(&line.text).ok_or_else(malformed)?;
    if !is_primitive_spelling(&ty_name) {
        return Err(malformed());
    }
    let ty = Primitive::from_idl(&ty_name).ok_or_else(|| ParseError::UnknownPrimitiveType {
        line: line.number,
        text: line.text.clone(),
        name: ty_name,
    })?;

    Ok(Field {
        ty,
        name,
        array_len,
    })
}

fn match_field(text: &str) -> Option<(String, Option<usize>, String)> {
    let mut cur = Cursor::new(text)?;
    let ty = cur.word()?;
    let array_len = if cur.peek() == Some(&Token::LBracket) {
        cur.eat(&Token::LBracket)?;
        let digits = cur.number()?;
        cur.eat(&Token::RBracket)?;
        Some(digits.parse::<usize>().ok()?)
    } else {
        None
    };
    cur.space()?;
    let name = cur.word()?;
    cur.eat(&Token::Semicolon)?;
    cur.finish()?;
    Some((ty, array_len, name))
}

/// Primitive names are `[a-z][a-z0-9]*`.
fn is_primitive_spelling(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
