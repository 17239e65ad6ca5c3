//! IDL front end: frames → message / service parsers → `CompilationUnit`.
//!
//! Parsing never looks across frames beyond name uniqueness. Whether an
//! RPC's argument and return types exist is decided later, when code for
//! the service is generated (see `processor`).

pub mod frames;
pub mod lexer;
pub mod message;
pub mod service;

use thiserror::Error;
use tracing::debug;

use crate::model::CompilationUnit;
use frames::FrameKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: malformed comment, `/*` must be closed by `*/` on the same line: `{text}`")]
    MalformedComment { line: usize, text: String },

    #[error("line {line}: malformed frame header, expected `message <Name> {{` or `service <Name> {{`: `{text}`")]
    MalformedFrameHeader { line: usize, text: String },

    #[error("line {line}: frame opened while the frame from line {outer} is still open: `{text}`")]
    NestedFrame {
        line: usize,
        text: String,
        outer: usize,
    },

    #[error("line {line}: missing `;` at the end of the statement: `{text}`")]
    MissingTerminator { line: usize, text: String },

    #[error("line {line}: frame is missing its closing `}}`: `{text}`")]
    MissingClosingBrace { line: usize, text: String },

    #[error("line {line}: `}}` must stand alone and close an open frame: `{text}`")]
    UnexpectedClosingBrace { line: usize, text: String },

    #[error("line {line}: statement outside of any message or service: `{text}`")]
    StatementOutsideFrame { line: usize, text: String },

    #[error("line {line}: malformed message field, expected `<type> <name>;` or `<type>[<N>] <name>;`: `{text}`")]
    MalformedMessageBody { line: usize, text: String },

    #[error("line {line}: malformed rpc, expected `rpc <name>(<Arg>) returns (<Ret>);`: `{text}`")]
    MalformedRpcDeclaration { line: usize, text: String },

    #[error("line {line}: unknown primitive type `{name}`: `{text}`")]
    UnknownPrimitiveType {
        line: usize,
        text: String,
        name: String,
    },

    #[error("line {line}: {kind} `{name}` is already defined")]
    DuplicateDefinition {
        line: usize,
        kind: &'static str,
        name: String,
    },

    #[error("line {line}: `{name}` is declared twice in `{owner}`")]
    DuplicateMember {
        line: usize,
        owner: String,
        name: String,
    },

    #[error("line {line}: service `{service}` has more methods than fit in a function id")]
    TooManyMethods { line: usize, service: String },
}

/// Parse a whole IDL source into its message and service tables.
pub fn parse(src: &str) -> Result<CompilationUnit, ParseError> {
    let frames = frames::extract_frames(src)?;
    debug!(frames = frames.len(), "frames extracted");

    let mut unit = CompilationUnit::default();

    for frame in &frames {
        let line = frame.header.number;
        match frame.kind {
            FrameKind::Message => {
                let msg = message::parse_message(frame)?;
                if unit.message(&msg.name).is_some() {
                    return Err(ParseError::DuplicateDefinition {
                        line,
                        kind: FrameKind::Message.keyword(),
                        name: msg.name,
                    });
                }
                debug!(message = %msg.name, fields = msg.fields.len(), "message parsed");
                unit.messages.push(msg);
            }
            FrameKind::Service => {
                let svc = service::parse_service(frame)?;
                if unit.service(&svc.name).is_some() {
                    return Err(ParseError::DuplicateDefinition {
                        line,
                        kind: FrameKind::Service.keyword(),
                        name: svc.name,
                    });
                }
                debug!(service = %svc.name, methods = svc.methods.len(), "service parsed");
                unit.services.push(svc);
            }
        }
    }

    Ok(unit)
}
