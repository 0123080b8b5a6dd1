pub mod local;

use crate::bio::taxonomy::TaxonInfo;
use serde::{Deserialize, Serialize};

/// Assembly-level statistics fetched from the assembly collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gc_content: Option<f64>,
    pub dna_size: u64,
    pub md5: String,
    pub num_contigs: u64,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub assembly_type: Option<String>,
}

/// Resolves NCBI taxonomy ids to taxon data.
pub trait TaxonProvider {
    fn fetch_taxon(&self, tax_id: &str) -> anyhow::Result<TaxonInfo>;
}

/// Resolves assembly references to assembly statistics.
pub trait AssemblyProvider {
    fn fetch_assembly_stats(&self, assembly_ref: &str) -> anyhow::Result<AssemblyStats>;
}

/// Resolves contig ids to their DNA sequence. Used by the GenBank emitter,
/// which embeds the ORIGIN block.
pub trait SequenceProvider {
    fn fetch_sequence(&self, contig_id: &str) -> anyhow::Result<String>;
}

/// Provider that answers nothing. Stands in when a collaborator is not
/// configured; any lookup through it is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProvider;

impl TaxonProvider for NullProvider {
    fn fetch_taxon(&self, tax_id: &str) -> anyhow::Result<TaxonInfo> {
        anyhow::bail!("no taxonomy source configured, cannot resolve taxon {tax_id}")
    }
}

impl AssemblyProvider for NullProvider {
    fn fetch_assembly_stats(&self, assembly_ref: &str) -> anyhow::Result<AssemblyStats> {
        anyhow::bail!("no assembly source configured, cannot resolve {assembly_ref}")
    }
}

impl SequenceProvider for NullProvider {
    fn fetch_sequence(&self, contig_id: &str) -> anyhow::Result<String> {
        anyhow::bail!("no sequence source configured, cannot resolve contig {contig_id}")
    }
}
