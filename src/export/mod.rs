pub mod fasta;
pub mod genbank;
pub mod gff;

pub use fasta::{FastaParams, FeatureFastaExporter};
pub use genbank::GenbankWriter;
pub use gff::{GffDialect, GffWriter};
