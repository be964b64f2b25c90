//! CLI arguments for the `tsdoc` binary (§2.2).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "tsdoc",
    version,
    about = "Documentation graph loader for TypeScript source files"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Entry file to load, when no subcommand is given.
    pub file: Option<PathBuf>,

    /// Restrict the load to these comma-separated exported names, instead
    /// of every public export.
    #[arg(long, value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// Re-run the load on every change under the entry file's directory,
    /// invalidating only what changed (§2.2).
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load every `.ts`/`.tsx` file under `dir` (excluding `.d.ts`) as its
    /// own entry file, sharing one cache across the whole walk (§2.2).
    Scan {
        dir: PathBuf,

        /// Pretty-print each file's JSON result.
        #[arg(long)]
        pretty: bool,
    },
}
