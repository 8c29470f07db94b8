use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use crate::cli::load_workspace;
use crate::export::write_selections;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Delimiter {
    Csv,
    Tsv,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Column delimiter
    #[arg(long, default_value = "csv")]
    pub delimiter: Delimiter,
}

/// Execute export subcommand
///
/// # Errors
///
/// Returns an error if the workspace cannot be loaded or the output cannot be
/// written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ExportArgs, workspace_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let workspace = load_workspace(workspace_path)?;
    let delimiter = args.delimiter.byte();

    let rows = match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            write_selections(&workspace, BufWriter::new(file), delimiter)?
        }
        None => write_selections(&workspace, std::io::stdout().lock(), delimiter)?,
    };

    if verbose {
        eprintln!("Exported {rows} selections");
    }

    Ok(())
}
