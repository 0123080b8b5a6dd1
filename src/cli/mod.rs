pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "genofile",
    version,
    about = "Genome annotation migration and file export",
    long_about = "Genofile migrates stored genome annotation documents to the canonical \
                  model and exports them as GFF3, GTF, GenBank or FASTA files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Log directive implied by the repeatable `--verbose` flag. Without the
/// flag the `GENOFILE_LOG` value (or "info") applies.
pub fn log_directive(verbose: u8, env_level: Option<String>) -> String {
    match verbose {
        0 => env_level.unwrap_or_else(|| "info".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate a genome document to the canonical model
    Migrate(commands::migrate::MigrateArgs),

    /// Export a genome as GFF3, GTF, GenBank or FASTA
    Export(commands::export::ExportArgs),
}
