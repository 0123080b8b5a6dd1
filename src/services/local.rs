use crate::bio::fasta;
use crate::bio::taxonomy::TaxonInfo;
use crate::services::{AssemblyProvider, AssemblyStats, SequenceProvider, TaxonProvider};
use anyhow::Context;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Taxon lookups backed by a local JSON file mapping taxonomy id to
/// [`TaxonInfo`].
#[derive(Debug, Clone)]
pub struct FileTaxonProvider {
    taxa: HashMap<String, TaxonInfo>,
}

impl FileTaxonProvider {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("opening taxon file {}", path.display()))?;
        let taxa = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing taxon file {}", path.display()))?;
        Ok(FileTaxonProvider { taxa })
    }
}

impl TaxonProvider for FileTaxonProvider {
    fn fetch_taxon(&self, tax_id: &str) -> anyhow::Result<TaxonInfo> {
        self.taxa
            .get(tax_id)
            .cloned()
            .with_context(|| format!("taxon {tax_id} not present in taxon file"))
    }
}

/// Assembly statistics backed by a single local JSON file.
#[derive(Debug, Clone)]
pub struct FileAssemblyProvider {
    stats: AssemblyStats,
}

impl FileAssemblyProvider {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("opening assembly file {}", path.display()))?;
        let stats = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing assembly file {}", path.display()))?;
        Ok(FileAssemblyProvider { stats })
    }
}

impl AssemblyProvider for FileAssemblyProvider {
    fn fetch_assembly_stats(&self, _assembly_ref: &str) -> anyhow::Result<AssemblyStats> {
        Ok(self.stats.clone())
    }
}

/// Contig sequences read from a local FASTA file, held in memory.
#[derive(Debug, Clone)]
pub struct FastaSequenceProvider {
    sequences: HashMap<String, String>,
}

impl FastaSequenceProvider {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let records = fasta::parse_fasta(&path)
            .with_context(|| format!("parsing FASTA {}", path.as_ref().display()))?;
        let sequences = records
            .into_iter()
            .map(|rec| (rec.id, rec.sequence))
            .collect();
        Ok(FastaSequenceProvider { sequences })
    }
}

impl SequenceProvider for FastaSequenceProvider {
    fn fetch_sequence(&self, contig_id: &str) -> anyhow::Result<String> {
        self.sequences
            .get(contig_id)
            .cloned()
            .with_context(|| format!("contig {contig_id} not present in FASTA"))
    }
}
