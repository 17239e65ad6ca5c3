//! `service` frame → ordered RPC method list with positional IDs.

use super::ParseError;
use super::frames::{Frame, FrameKind, parse_header};
use super::lexer::{Cursor, Token};
use crate::model::{RpcMethod, Service};

pub fn parse_service(frame: &Frame) -> Result<Service, ParseError> {
    let header = &frame.header;

    let name = match parse_header(&header.text) {
        Some((FrameKind::Service, name)) => name,
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

    let mut methods: Vec<RpcMethod> = Vec::with_capacity(body.len());
    for line in body {
        let (method, arg, ret) =
            match_rpc(&line.text).ok_or_else(|| ParseError::MalformedRpcDeclaration {
                line: line.number,
                text: line.text.clone(),
            })?;
        if methods.iter().any(|m| m.name == method) {
            return Err(ParseError::DuplicateMember {
                line: line.number,
                owner: name,
                name: method,
            });
        }

        // The ID is the declaration index; it is what the server switches on.
        let id = u32::try_from(methods.len()).map_err(|_| ParseError::TooManyMethods {
            line: line.number,
            service: name.clone(),
        })?;
        methods.push(RpcMethod {
            id,
            name: method,
            arg,
            ret,
        });
    }

    Ok(Service { name, methods })
}

/// `^rpc <ident>\(<ident>\) returns \(<ident>\);$`
fn match_rpc(text: &str) -> Option<(String, String, String)> {
    let mut cur = Cursor::new(text)?;
    cur.keyword("rpc")?;
    cur.space()?;
    let name = cur.word()?;
    cur.eat(&Token::LParen)?;
    let arg = cur.word()?;
    cur.eat(&Token::RParen)?;
    cur.space()?;
    cur.keyword("returns")?;
    cur.space()?;
    cur.eat(&Token::LParen)?;
    let ret = cur.word()?;
    cur.eat(&Token::RParen)?;
    cur.eat(&Token::Semicolon)?;
    cur.finish()?;
    Some((name, arg, ret))
}
