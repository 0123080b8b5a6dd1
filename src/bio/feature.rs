use crate::bio::location::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An alias pair: `(namespace, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias(pub String, pub String);

/// A database cross-reference: `(db, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbXref(pub String, pub String);

/// A single annotation-inference record, rendered in GFF and GenBank
/// output as `category:type:evidence` with empty parts elided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceData {
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub evidence: String,
}

impl InferenceData {
    pub fn render(&self) -> String {
        [&self.category, &self.kind, &self.evidence]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// One ontology-evidence record. Structural equality drives evidence
/// interning during migration: identical records across features share a
/// single entry in `Genome::ontology_events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntologyEvidence {
    /// Ontology name this evidence was recorded under.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Ontology terms carried by a feature: ontology name -> term id ->
/// indices into `Genome::ontology_events`.
pub type OntologyTerms = BTreeMap<String, BTreeMap<String, Vec<usize>>>;

/// Fields shared by every feature kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCore {
    pub id: String,
    pub location: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
    /// Legacy singular function. Normalized into `functions` during
    /// migration for the historical mrnas/cdss/features lists; non-coding
    /// features may still carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functional_descriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<Alias>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub db_xrefs: Vec<DbXref>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ontology_terms: OntologyTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dna_sequence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dna_sequence_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_translation_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inference_data: Vec<InferenceData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A protein-encoding gene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    #[serde(flatten)]
    pub core: FeatureCore,
    #[serde(default)]
    pub cdss: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mrnas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

/// A messenger RNA transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mrna {
    #[serde(flatten)]
    pub core: FeatureCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_gene: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cds: Option<String>,
}

/// A coding sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cds {
    #[serde(flatten)]
    pub core: FeatureCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_gene: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_mrna: Option<String>,
}

/// Any feature outside the gene/mRNA/CDS triple: non-coding genes, tRNAs,
/// rRNAs, regulatory regions and the like. `kind` carries the raw type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NonCodingFeature {
    #[serde(flatten)]
    pub core: FeatureCore,
    #[serde(rename = "type", default = "default_noncoding_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_gene: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

fn default_noncoding_kind() -> String {
    "gene".to_string()
}

const EMPTY_IDS: &[String] = &[];

/// A borrowed, kind-erased view over any feature variant. The feature
/// graph and the emitters traverse features uniformly through this view.
#[derive(Debug, Clone, Copy)]
pub enum FeatureRef<'a> {
    Gene(&'a Gene),
    Mrna(&'a Mrna),
    Cds(&'a Cds),
    NonCoding(&'a NonCodingFeature),
}

impl<'a> FeatureRef<'a> {
    pub fn core(&self) -> &'a FeatureCore {
        match self {
            FeatureRef::Gene(f) => &f.core,
            FeatureRef::Mrna(f) => &f.core,
            FeatureRef::Cds(f) => &f.core,
            FeatureRef::NonCoding(f) => &f.core,
        }
    }

    pub fn id(&self) -> &'a str {
        &self.core().id
    }

    pub fn kind(&self) -> &'a str {
        match self {
            FeatureRef::Gene(_) => "gene",
            FeatureRef::Mrna(_) => "mRNA",
            FeatureRef::Cds(_) => "CDS",
            FeatureRef::NonCoding(f) => &f.kind,
        }
    }

    pub fn locations(&self) -> &'a [Location] {
        &self.core().location
    }

    /// Raw declared parent gene, empty strings included.
    pub fn parent_gene_raw(&self) -> Option<&'a str> {
        match self {
            FeatureRef::Gene(_) => None,
            FeatureRef::Mrna(f) => f.parent_gene.as_deref(),
            FeatureRef::Cds(f) => f.parent_gene.as_deref(),
            FeatureRef::NonCoding(f) => f.parent_gene.as_deref(),
        }
    }

    /// Declared parent gene, ignoring the defaulted empty string.
    pub fn parent_gene(&self) -> Option<&'a str> {
        self.parent_gene_raw().filter(|id| !id.is_empty())
    }

    pub fn parent_mrna_raw(&self) -> Option<&'a str> {
        match self {
            FeatureRef::Cds(f) => f.parent_mrna.as_deref(),
            _ => None,
        }
    }

    pub fn parent_mrna(&self) -> Option<&'a str> {
        self.parent_mrna_raw().filter(|id| !id.is_empty())
    }

    pub fn mrna_ids(&self) -> &'a [String] {
        match self {
            FeatureRef::Gene(f) => &f.mrnas,
            _ => EMPTY_IDS,
        }
    }

    pub fn cds_ids(&self) -> &'a [String] {
        match self {
            FeatureRef::Gene(f) => &f.cdss,
            _ => EMPTY_IDS,
        }
    }

    /// A mRNA's single corresponding CDS, when declared.
    pub fn cds_id(&self) -> Option<&'a str> {
        match self {
            FeatureRef::Mrna(f) => f.cds.as_deref().filter(|id| !id.is_empty()),
            _ => None,
        }
    }

    pub fn child_ids(&self) -> &'a [String] {
        match self {
            FeatureRef::Gene(f) => &f.children,
            FeatureRef::NonCoding(f) => &f.children,
            _ => EMPTY_IDS,
        }
    }
}
