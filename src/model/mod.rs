//! In-memory tables produced by the IDL front end.
//!
//! Ordering is significant everywhere in this module: field order is the
//! wire layout of a message and method order is the source of the numeric
//! dispatch IDs. Nothing here is ever re-sorted.

pub mod primitive;

pub use primitive::Primitive;

use std::fmt;

use serde::Serialize;

/// One member of a message. `array_len == None` is a scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub ty: Primitive,
    pub name: String,
    pub array_len: Option<usize>,
}

impl Field {
    /// Bytes this field occupies before any target-side padding. The
    /// message parser rejects fields and messages whose width overflows.
    pub fn declared_width(&self) -> usize {
        self.ty.width() * self.array_len.unwrap_or(1)
    }
}

/// A fixed-layout record laid directly onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Message {
    /// Sum of the declared field widths. The target compiler may pad the
    /// struct beyond this; the generator neither computes nor controls that.
    pub fn declared_size(&self) -> usize {
        self.fields.iter().map(Field::declared_width).sum()
    }
}

/// A remote call. `id` is its position inside the owning service and is
/// part of the client/server binary contract: reordering declarations
/// renumbers the methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcMethod {
    pub id: u32,
    pub name: String,
    pub arg: String,
    pub ret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub name: String,
    pub methods: Vec<RpcMethod>,
}

impl Service {
    pub fn method(&self, name: &str) -> Option<&RpcMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Everything parsed out of one IDL source. Rebuilt on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompilationUnit {
    pub messages: Vec<Message>,
    pub services: Vec<Service>,
}

impl CompilationUnit {
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Render the unit back into IDL source: all messages, then all services.
    pub fn to_idl(&self) -> String {
        self.to_string()
    }
}

// ─────────────────────────────────────────────────────
// Canonical IDL rendering
// ─────────────────────────────────────────────────────

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_len {
            Some(len) => write!(f, "{}[{}] {};", self.ty, len, self.name),
            None => write!(f, "{} {};", self.ty, self.name),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message {} {{", self.name)?;
        for field in &self.fields {
            writeln!(f, "    {field}")?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc {}({}) returns ({});", self.name, self.arg, self.ret)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "service {} {{", self.name)?;
        for method in &self.methods {
            writeln!(f, "    {method}")?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in &self.messages {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{message}")?;
        }
        for service in &self.services {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{service}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ty: Primitive, name: &str, array_len: Option<usize>) -> Field {
        Field {
            ty,
            name: name.into(),
            array_len,
        }
    }

    #[test]
    fn declared_size_ignores_padding() {
        let msg = Message {
            name: "Mixed".into(),
            fields: vec![
                field(Primitive::Int32, "a", None),
                field(Primitive::Int8, "b", Some(4)),
            ],
        };
        assert_eq!(msg.fields[0].declared_width(), 4);
        assert_eq!(msg.fields[1].declared_width(), 4);
        assert_eq!(msg.declared_size(), 8);
    }

    #[test]
    fn renders_canonical_idl() {
        let unit = CompilationUnit {
            messages: vec![Message {
                name: "Req".into(),
                fields: vec![field(Primitive::Int64, "ts", None), field(Primitive::Char, "key", Some(16))],
            }],
            services: vec![Service {
                name: "Kvs".into(),
                methods: vec![RpcMethod {
                    id: 0,
                    name: "get".into(),
                    arg: "Req".into(),
                    ret: "Req".into(),
                }],
            }],
        };

        let expected = "\
message Req {
    int64 ts;
    char[16] key;
}

service Kvs {
    rpc get(Req) returns (Req);
}
";
        assert_eq!(unit.to_idl(), expected);
    }
}
