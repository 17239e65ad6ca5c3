//! Output side: C++ rendering, the ABI manifest and artifact files.

pub mod cpp;
pub mod manifest;
pub mod template;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use cpp::GeneratedService;

pub const TYPES_FILENAME: &str = "rpc_types.h";
pub const SERVER_FILENAME: &str = "rpc_server_callback.h";
pub const CLIENT_FILENAME: &str = "rpc_client.h";
pub const MANIFEST_FILENAME: &str = "rpc_manifest.json";

/// File names of the artifacts generated for one service, and the prefix
/// their include guards carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub prefix: String,
    pub types: String,
    pub server: String,
    pub client: String,
    pub manifest: String,
}

impl ArtifactNames {
    /// A unit with a single service gets the plain names. With several
    /// services each name is prefixed by `<Service>_`, otherwise every
    /// service would overwrite the previous one.
    pub fn for_service(service: &str, services_in_unit: usize) -> Self {
        let prefix = if services_in_unit > 1 {
            format!("{service}_")
        } else {
            String::new()
        };
        Self {
            types: format!("{prefix}{TYPES_FILENAME}"),
            server: format!("{prefix}{SERVER_FILENAME}"),
            client: format!("{prefix}{CLIENT_FILENAME}"),
            manifest: format!("{prefix}{MANIFEST_FILENAME}"),
            prefix,
        }
    }

    /// `_RPC_TYPES_H_` for a lone service, `_KVS_RPC_TYPES_H_` for `Kvs`.
    pub fn include_guard(&self, stem: &str) -> String {
        format!("_{}{stem}_", self.prefix.to_ascii_uppercase())
    }
}

/// Write every generated artifact into `out_dir`, returning the paths
/// written. Writes are not atomic; a failed run leaves no valid output.
pub fn write_all(
    out_dir: &Path,
    services: &[GeneratedService],
    with_manifest: bool,
) -> Result<Vec<PathBuf>> {
    if services.is_empty() {
        warn!("no service defined, nothing to write");
        return Ok(Vec::new());
    }

    fs::create_dir_all(out_dir).with_context(|| format!("Creating {}", out_dir.display()))?;

    let mut written = Vec::new();
    for svc in services {
        let names = &svc.names;
        let mut files = vec![
            (&names.types, &svc.types),
            (&names.server, &svc.server),
            (&names.client, &svc.client),
        ];
        if with_manifest {
            files.push((&names.manifest, &svc.manifest));
        }

        for (name, text) in files {
            let path = out_dir.join(name);
            fs::write(&path, text).with_context(|| format!("Writing {}", path.display()))?;
            info!("wrote {}", path.display());
            written.push(path);
        }
    }

    Ok(written)
}
