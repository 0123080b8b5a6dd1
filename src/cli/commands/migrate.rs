use crate::core::Migrator;
use crate::services::local::{FileAssemblyProvider, FileTaxonProvider};
use crate::services::{AssemblyProvider, NullProvider, TaxonProvider};
use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct MigrateArgs {
    /// Genome document to migrate (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the migrated genome (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// JSON file mapping NCBI taxonomy ids to taxon data
    #[arg(long, value_name = "FILE")]
    pub taxon_file: Option<PathBuf>,

    /// JSON file with assembly statistics
    #[arg(long, value_name = "FILE")]
    pub assembly_file: Option<PathBuf>,

    /// Override the serialized size limit, in bytes
    #[arg(long)]
    pub max_size: Option<u64>,
}

pub fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("opening genome {}", args.input.display()))?;
    let doc: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    let taxa: Box<dyn TaxonProvider> = match &args.taxon_file {
        Some(path) => Box::new(FileTaxonProvider::open(path)?),
        None => Box::new(NullProvider),
    };
    let assemblies: Box<dyn AssemblyProvider> = match &args.assembly_file {
        Some(path) => Box::new(FileAssemblyProvider::open(path)?),
        None => Box::new(NullProvider),
    };

    let mut migrator = Migrator::new(taxa.as_ref(), assemblies.as_ref());
    if let Some(max_size) = args.max_size {
        migrator = migrator.with_max_size(max_size);
    }
    let genome = migrator.migrate(doc)?;

    let out = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(out), &genome)?;
    info!(
        features = genome.features.len(),
        cdss = genome.cdss.len(),
        mrnas = genome.mrnas.len(),
        non_coding = genome.non_coding_features.len(),
        "wrote migrated genome to {}",
        args.output.display()
    );
    Ok(())
}
