use crate::cli::commands::load_genome;
use crate::export::{FastaParams, FeatureFastaExporter, GenbankWriter, GffDialect, GffWriter};
use crate::services::local::FastaSequenceProvider;
use anyhow::Context;
use clap::{Args, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub format: ExportFormat,
}

#[derive(Args)]
pub struct CommonArgs {
    /// Genome document to export (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct GenbankArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// FASTA file with the assembly's contig sequences
    #[arg(long, value_name = "FILE")]
    pub assembly_fasta: PathBuf,
}

#[derive(Args)]
pub struct FastaArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Export protein translations from the CDS collection
    #[arg(long)]
    pub protein: bool,

    /// Feature collections to draw nucleotide sequences from
    #[arg(long, value_delimiter = ',', default_value = "features")]
    pub feature_lists: Vec<String>,

    /// Only export these feature ids
    #[arg(long, value_delimiter = ',')]
    pub filter_ids: Vec<String>,

    /// Leave functions out of the FASTA headers
    #[arg(long)]
    pub no_functions: bool,

    /// Leave aliases out of the FASTA headers
    #[arg(long)]
    pub no_aliases: bool,
}

#[derive(Subcommand)]
pub enum ExportFormat {
    /// Export as GFF3
    Gff3(CommonArgs),

    /// Export as GTF
    Gtf(CommonArgs),

    /// Export as a GenBank flat file
    Genbank(GenbankArgs),

    /// Export feature sequences as FASTA
    Fasta(FastaArgs),
}

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    match args.format {
        ExportFormat::Gff3(common) => write_gff(common, GffDialect::Gff3),
        ExportFormat::Gtf(common) => write_gff(common, GffDialect::Gtf),
        ExportFormat::Genbank(args) => write_genbank(args),
        ExportFormat::Fasta(args) => write_fasta(args),
    }
}

fn create_output(path: &PathBuf) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_gff(common: CommonArgs, dialect: GffDialect) -> anyhow::Result<()> {
    let genome = load_genome(&common.input)?;
    let mut out = create_output(&common.output)?;
    GffWriter::new(&genome, dialect).write(&mut out)?;
    info!("wrote {} to {}", dialect.extension(), common.output.display());
    Ok(())
}

fn write_genbank(args: GenbankArgs) -> anyhow::Result<()> {
    let genome = load_genome(&args.common.input)?;
    let sequences = FastaSequenceProvider::open(&args.assembly_fasta)?;
    let mut out = create_output(&args.common.output)?;
    GenbankWriter::new(&genome, &sequences).write(&mut out)?;
    info!("wrote GenBank to {}", args.common.output.display());
    Ok(())
}

fn write_fasta(args: FastaArgs) -> anyhow::Result<()> {
    let genome = load_genome(&args.common.input)?;
    let params = FastaParams {
        feature_lists: args.feature_lists,
        filter_ids: args.filter_ids.into_iter().collect(),
        include_functions: !args.no_functions,
        include_aliases: !args.no_aliases,
    };
    let exporter = FeatureFastaExporter::new(&genome, params);
    let mut out = create_output(&args.common.output)?;
    if args.protein {
        exporter.write_protein(&mut out)?;
    } else {
        exporter.write_nucleotide(&mut out)?;
    }
    info!("wrote FASTA to {}", args.common.output.display());
    Ok(())
}
