use crate::bio::feature::{InferenceData, OntologyEvidence};
use crate::bio::location::Location;
use crate::bio::genome::Publication;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The schema family a stored genome document belongs to. Detected once,
/// up front, from structural markers; migration branches on the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Already in the canonical four-collection layout.
    Canonical,
    /// Legacy layout with a single flat `features` list mixing all kinds.
    LegacyFlat,
    /// Metagenome-style document whose features live in an external handle.
    Metagenome,
}

impl SchemaVersion {
    pub fn detect(doc: &Value) -> SchemaVersion {
        if doc.get("features_handle_ref").is_some() {
            SchemaVersion::Metagenome
        } else if doc.get("feature_counts").is_some() {
            SchemaVersion::Canonical
        } else {
            SchemaVersion::LegacyFlat
        }
    }
}

/// An alias as found in the wild: either the modern `[namespace, value]`
/// pair or a bare legacy string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAlias {
    Pair(String, String),
    Bare(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTermRecord {
    pub id: String,
    pub term_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ontology_ref: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<OntologyEvidence>,
}

/// An ontology term entry: either already-interned event indices or a
/// legacy inline record carrying its own evidence list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTerm {
    Indexed(Vec<usize>),
    Record(RawTermRecord),
}

/// A feature as stored, before normalization. Permissive by design: any
/// of the four collections (or the legacy flat list) deserializes into
/// this one shape and the migrator sorts out what applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFeature {
    pub id: String,
    pub location: Vec<Location>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functional_descriptions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<RawAlias>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub db_xrefs: Vec<(String, String)>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ontology_terms: BTreeMap<String, BTreeMap<String, RawTerm>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dna_sequence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dna_sequence_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_translation_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inference_data: Vec<InferenceData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_gene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_mrna: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cds: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cdss: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mrnas: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

/// A stored genome document, any vintage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGenome {
    pub scientific_name: String,
    pub domain: String,
    pub taxonomy: String,
    pub taxon_assignments: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxon_ref: Option<String>,
    pub genetic_code: i64,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub genome_tiers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molecule_type: Option<String>,
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
    pub publications: Vec<Publication>,
    pub features: Vec<RawFeature>,
    pub mrnas: Vec<RawFeature>,
    pub cdss: Vec<RawFeature>,
    pub non_coding_features: Vec<RawFeature>,
    pub feature_counts: BTreeMap<String, u64>,
    pub ontologies_present: BTreeMap<String, BTreeMap<String, String>>,
    pub ontology_events: Vec<OntologyEvidence>,
    pub warnings: Vec<String>,
}
