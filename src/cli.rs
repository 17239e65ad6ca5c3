use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input .idl file with message and service definitions
    pub input: PathBuf,
    /// Output directory for the generated headers
    pub output: PathBuf,
    /// Replace the built-in packet write template
    #[arg(long, value_name = "PATH")]
    pub write_template: Option<PathBuf>,
    /// Also write a JSON manifest of method ids and message layouts
    #[arg(long)]
    pub manifest: bool,
}
