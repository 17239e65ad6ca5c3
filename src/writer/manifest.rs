//! JSON record of the wire contract of one service.
//!
//! Method ids and field layouts are what independently generated clients
//! and servers must agree on; diffing two manifests shows when a change to
//! the IDL breaks that agreement.

use serde::Serialize;

use crate::model::Message;
use crate::processor::ResolvedService;

#[derive(Debug, Serialize)]
pub struct Manifest<'u> {
    pub service: &'u str,
    pub methods: Vec<MethodEntry<'u>>,
    pub messages: Vec<MessageEntry<'u>>,
}

#[derive(Debug, Serialize)]
pub struct MethodEntry<'u> {
    pub id: u32,
    pub name: &'u str,
    pub arg: &'u str,
    pub ret: &'u str,
    pub arg_size: usize,
    pub ret_size: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageEntry<'u> {
    pub name: &'u str,
    pub declared_size: usize,
    pub fields: Vec<FieldEntry<'u>>,
}

#[derive(Debug, Serialize)]
pub struct FieldEntry<'u> {
    pub name: &'u str,
    pub idl_type: &'static str,
    pub target_type: &'static str,
    pub width: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_len: Option<usize>,
}

impl<'u> Manifest<'u> {
    /// Only the messages the service actually sends or returns are listed,
    /// each once, in order of first use.
    pub fn build(service: &ResolvedService<'u>) -> Self {
        let methods = service
            .methods
            .iter()
            .map(|m| MethodEntry {
                id: m.method.id,
                name: &m.method.name,
                arg: &m.arg.name,
                ret: &m.ret.name,
                arg_size: m.arg.declared_size(),
                ret_size: m.ret.declared_size(),
            })
            .collect();

        let mut used: Vec<&'u Message> = Vec::new();
        for m in &service.methods {
            for msg in [m.arg, m.ret] {
                if !used.iter().any(|u| u.name == msg.name) {
                    used.push(msg);
                }
            }
        }

        Self {
            service: service.name(),
            methods,
            messages: used.into_iter().map(MessageEntry::from_message).collect(),
        }
    }
}

impl<'u> MessageEntry<'u> {
    fn from_message(msg: &'u Message) -> Self {
        Self {
            name: &msg.name,
            declared_size: msg.declared_size(),
            fields: msg
                .fields
                .iter()
                .map(|f| FieldEntry {
                    name: &f.name,
                    idl_type: f.ty.idl_name(),
                    target_type: f.ty.target_name(),
                    width: f.declared_width(),
                    array_len: f.array_len,
                })
                .collect(),
        }
    }
}

pub fn render(service: &ResolvedService<'_>) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(&Manifest::build(service))?;
    json.push('\n');
    Ok(json)
}
