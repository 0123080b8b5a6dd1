use crate::bio::feature::{Cds, FeatureRef, Gene, Mrna, NonCodingFeature, OntologyEvidence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum serialized genome size accepted for persistence, in bytes.
pub const MAX_GENOME_SIZE: u64 = 1 << 30;

/// Genome tiers that may legally appear in `genome_tiers`.
pub const ALLOWED_TIERS: [&str; 4] = ["Representative", "Reference", "ExternalDB", "User"];

/// Wire format for a publication:
/// `(pubmed id, source, title, link, date, authors, journal)`.
type PublicationTuple = (f64, String, String, String, String, String, String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PublicationTuple", into = "PublicationTuple")]
pub struct Publication {
    pub pubmed_id: f64,
    pub source: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub authors: String,
    pub journal: String,
}

impl From<PublicationTuple> for Publication {
    fn from(t: PublicationTuple) -> Self {
        Publication {
            pubmed_id: t.0,
            source: t.1,
            title: t.2,
            link: t.3,
            date: t.4,
            authors: t.5,
            journal: t.6,
        }
    }
}

impl From<Publication> for PublicationTuple {
    fn from(p: Publication) -> Self {
        (
            p.pubmed_id, p.source, p.title, p.link, p.date, p.authors, p.journal,
        )
    }
}

impl Publication {
    /// Pubmed id as rendered in GenBank REFERENCE blocks; `0` means absent.
    pub fn pubmed_string(&self) -> Option<String> {
        if self.pubmed_id == 0.0 {
            None
        } else if self.pubmed_id.fract() == 0.0 {
            Some(format!("{}", self.pubmed_id as i64))
        } else {
            Some(self.pubmed_id.to_string())
        }
    }
}

/// The canonical genome annotation model produced by migration.
///
/// Feature ids are unique across the four collections; every feature has
/// at least one location; `ontology_events` is the interned evidence list
/// referenced by index from feature `ontology_terms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genome {
    pub scientific_name: String,
    pub domain: String,
    pub taxonomy: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub taxon_assignments: BTreeMap<String, String>,
    pub genetic_code: i64,
    pub source: String,
    pub genome_tiers: Vec<String>,
    pub molecule_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genome_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contigset_ref: Option<String>,
    pub contig_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dna_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gc_content: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_contigs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub publications: Vec<Publication>,
    /// Protein-encoding genes.
    pub features: Vec<Gene>,
    pub mrnas: Vec<Mrna>,
    pub cdss: Vec<Cds>,
    pub non_coding_features: Vec<NonCodingFeature>,
    pub feature_counts: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ontologies_present: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ontology_events: Vec<OntologyEvidence>,
    pub warnings: Vec<String>,
}

impl Genome {
    /// Iterates every feature across the four collections as a uniform view.
    pub fn all_features(&self) -> impl Iterator<Item = FeatureRef<'_>> {
        self.features
            .iter()
            .map(FeatureRef::Gene)
            .chain(self.mrnas.iter().map(FeatureRef::Mrna))
            .chain(self.cdss.iter().map(FeatureRef::Cds))
            .chain(self.non_coding_features.iter().map(FeatureRef::NonCoding))
    }
}
