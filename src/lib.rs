pub mod cli;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use writer::cpp::WriteTemplate;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    compile(&args)?;
    Ok(())
}

/// Parse the IDL named by `args`, generate every service and write the
/// artifacts. Returns the paths written.
pub fn compile(args: &cli::Cli) -> anyhow::Result<Vec<PathBuf>> {
    // 1. ── Parse ──────────────────────────────────────────────────────
    let src = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    let unit = parser::parse(&src).with_context(|| format!("Parsing {}", args.input.display()))?;
    info!(
        "parsed {} message(s), {} service(s)",
        unit.messages.len(),
        unit.services.len()
    );

    // 2. ── Generate ───────────────────────────────────────────────────
    let template = args
        .write_template
        .clone()
        .map_or(WriteTemplate::Builtin, WriteTemplate::File);
    let generated =
        writer::cpp::generate(&unit, &template).with_context(|| "Generating RPC code")?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    writer::write_all(&args.output, &generated, args.manifest)
        .with_context(|| "Writing generated artifacts")
}
