//! C++ emission for one resolved service: type unit, server dispatch unit
//! and client stub unit.
//!
//! Both the server and the client write their outgoing packet through the
//! same write template. The template has one payload slot per transport
//! layout, MMIO first and then the polling / DMA pair, and each unit fills
//! those slots with its own payload-copy statement.

pub mod client;
pub mod server;
pub mod types;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use super::template::{Accumulator, TemplateError};
use super::{ArtifactNames, manifest};
use crate::model::CompilationUnit;
use crate::processor::{self, ResolveError};

/// Leading block of every generated artifact.
pub const GENERATED_MARKER: &str = "\
/*
 * Autogenerated with rpcgen-rust
 *
 *        DO NOT CHANGE
 */
";

/// Skeleton placeholder for the per-service include guard.
const GUARD_TOKEN: &str = "<INCLUDE_GUARD>";
/// Skeleton placeholder for the type unit the server and client include.
const TYPES_HEADER_TOKEN: &str = "<TYPES_HEADER>";

/// Payload slot of the MMIO layout.
pub const MMIO_SLOT: &str = "/*DATA_LAYOUT_MMIO*/";
/// Payload slot shared by the polling and DMA layouts.
pub const GENERIC_SLOT: &str = "/*DATA_LAYOUT*/";

const BUILTIN_WRITE_TEMPLATE: &str = include_str!("rpc_write.tmpl");

#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("write template has {found} `{token}` slot(s), expected {expected}")]
    SlotCount {
        token: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("no service named `{0}` in the compilation unit")]
    UnknownService(String),

    #[error("serializing the ABI manifest")]
    Manifest(#[from] serde_json::Error),

    #[error("formatting generated code")]
    Format(#[from] fmt::Error),
}

/// Where the shared packet-write template comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WriteTemplate {
    /// The template compiled into this binary.
    #[default]
    Builtin,
    /// A replacement template read from disk every time it is expanded.
    File(PathBuf),
}

impl WriteTemplate {
    fn append_to(&self, acc: &mut Accumulator) -> Result<(), TemplateError> {
        match self {
            WriteTemplate::Builtin => {
                acc.append(BUILTIN_WRITE_TEMPLATE);
                Ok(())
            }
            WriteTemplate::File(path) => acc.append_file(path),
        }
    }
}

/// The three ways a payload reaches the transmit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Mmio,
    Polling,
    Dma,
}

impl Layout {
    /// Expansion order. It matches the slot order of the write template.
    pub const ALL: [Layout; 3] = [Layout::Mmio, Layout::Polling, Layout::Dma];

    pub const fn slot(self) -> &'static str {
        match self {
            Layout::Mmio => MMIO_SLOT,
            Layout::Polling | Layout::Dma => GENERIC_SLOT,
        }
    }

    fn expected_slots(token: &str) -> usize {
        Self::ALL.iter().filter(|l| l.slot() == token).count()
    }
}

/// Point a rendered skeleton at its own guard and at the type unit of the
/// same service.
fn bind_skeleton(code: &mut Accumulator, names: &ArtifactNames, guard_stem: &str) {
    code.replace_all(GUARD_TOKEN, &names.include_guard(guard_stem));
    code.replace_all(TYPES_HEADER_TOKEN, &names.types);
}

/// Values for the scalar placeholders of the write template.
pub(crate) struct WriteParams<'a> {
    pub tx_queue: &'a str,
    pub conn_id: &'a str,
    pub rpc_id: &'a str,
    pub num_of_frames: u32,
    pub function_id: String,
    pub arg_len: String,
    pub req_type: &'a str,
}

impl WriteParams<'_> {
    fn substitutions(&self) -> [(&'static str, String); 7] {
        [
            ("<TX_QUEUE>", self.tx_queue.to_string()),
            ("<CONN_ID>", self.conn_id.to_string()),
            ("<RPC_ID>", self.rpc_id.to_string()),
            ("<FUN_NUM_OF_FRAMES>", self.num_of_frames.to_string()),
            ("<FUN_FUNCTION_ID>", self.function_id.clone()),
            ("<FUN_ARG_LENGTH_BYTES>", self.arg_len.clone()),
            ("<REQ_TYPE>", self.req_type.to_string()),
        ]
    }
}

/// Append the write template to `acc`, fill its scalar placeholders and
/// splice `payload(layout)` into each layout slot, in `Layout::ALL` order.
pub(crate) fn expand_write<F>(
    acc: &mut Accumulator,
    template: &WriteTemplate,
    params: &WriteParams<'_>,
    payload: F,
) -> Result<(), EmitError>
where
    F: Fn(Layout) -> String,
{
    template.append_to(acc)?;

    for (token, value) in params.substitutions() {
        acc.replace_all(token, &value);
    }

    for token in [MMIO_SLOT, GENERIC_SLOT] {
        let expected = Layout::expected_slots(token);
        let found = acc.occurrences(token);
        if found != expected {
            return Err(EmitError::SlotCount {
                token,
                expected,
                found,
            });
        }
    }

    for layout in Layout::ALL {
        acc.splice_at_first(layout.slot(), &payload(layout))?;
    }

    Ok(())
}

/// Everything generated for one service, still in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedService {
    pub service: String,
    pub names: ArtifactNames,
    pub types: String,
    pub server: String,
    pub client: String,
    pub manifest: String,
}

/// Resolve `name` against the unit and render its three artifacts.
pub fn generate_service(
    unit: &CompilationUnit,
    name: &str,
    template: &WriteTemplate,
) -> Result<GeneratedService, EmitError> {
    let service = unit
        .service(name)
        .ok_or_else(|| EmitError::UnknownService(name.to_string()))?;
    let resolved = processor::resolve_service(unit, service)?;
    let names = ArtifactNames::for_service(resolved.name(), unit.services.len());

    info!("generating service {}", resolved.name());
    for m in &resolved.methods {
        info!("  <{} {}({})>", m.ret.name, m.method.name, m.arg.name);
    }

    Ok(GeneratedService {
        service: resolved.name().to_string(),
        types: types::render(unit, &names)?,
        server: server::render(&resolved, &names, template)?,
        client: client::render(&resolved, &names, template)?,
        manifest: manifest::render(&resolved)?,
        names,
    })
}

/// Render every service of the unit. Nothing is returned unless all of
/// them succeed.
pub fn generate(
    unit: &CompilationUnit,
    template: &WriteTemplate,
) -> Result<Vec<GeneratedService>, EmitError> {
    unit.services
        .iter()
        .map(|s| generate_service(unit, &s.name, template))
        .collect()
}
