use crate::bio::feature::FeatureRef;
use crate::bio::genome::Genome;
use crate::{GenofileError, Result};
use std::collections::HashSet;
use std::io::Write;
use tracing::warn;

const WRAP_WIDTH: usize = 60;
const VALID_FEATURE_LISTS: [&str; 4] = ["features", "mrnas", "cdss", "non_coding_features"];

/// Selection and header options for the feature FASTA export.
#[derive(Debug, Clone)]
pub struct FastaParams {
    /// Feature collections to draw nucleotide sequences from.
    pub feature_lists: Vec<String>,
    /// When non-empty, only these feature ids are exported.
    pub filter_ids: HashSet<String>,
    pub include_functions: bool,
    pub include_aliases: bool,
}

impl Default for FastaParams {
    fn default() -> Self {
        FastaParams {
            feature_lists: vec!["features".to_string()],
            filter_ids: HashSet::new(),
            include_functions: true,
            include_aliases: true,
        }
    }
}

/// Writes feature sequences as FASTA: protein translations from the CDS
/// collection, or nucleotide sequences from any selection of collections.
pub struct FeatureFastaExporter<'a> {
    genome: &'a Genome,
    params: FastaParams,
}

impl<'a> FeatureFastaExporter<'a> {
    pub fn new(genome: &'a Genome, params: FastaParams) -> Self {
        FeatureFastaExporter { genome, params }
    }

    pub fn write_protein<W: Write>(&self, out: &mut W) -> Result<()> {
        let features = self.genome.cdss.iter().map(FeatureRef::Cds);
        self.write_features(out, features, |f| {
            f.core().protein_translation.as_deref()
        })
    }

    pub fn write_nucleotide<W: Write>(&self, out: &mut W) -> Result<()> {
        let unknown: Vec<&str> = self
            .params
            .feature_lists
            .iter()
            .map(String::as_str)
            .filter(|list| !VALID_FEATURE_LISTS.contains(list))
            .collect();
        if !unknown.is_empty() {
            return Err(GenofileError::Validation(format!(
                "Unknown feature_lists specified: {}. Must be one of {}",
                unknown.join(", "),
                VALID_FEATURE_LISTS.join(", ")
            )));
        }

        let mut features = Vec::new();
        for list in &self.params.feature_lists {
            match list.as_str() {
                "features" => features.extend(self.genome.features.iter().map(FeatureRef::Gene)),
                "mrnas" => features.extend(self.genome.mrnas.iter().map(FeatureRef::Mrna)),
                "cdss" => features.extend(self.genome.cdss.iter().map(FeatureRef::Cds)),
                _ => features.extend(
                    self.genome
                        .non_coding_features
                        .iter()
                        .map(FeatureRef::NonCoding),
                ),
            }
        }
        self.write_features(out, features.into_iter(), |f| {
            f.core().dna_sequence.as_deref()
        })
    }

    fn write_features<W, I, S>(&self, out: &mut W, features: I, sequence: S) -> Result<()>
    where
        W: Write,
        I: Iterator<Item = FeatureRef<'a>>,
        S: Fn(&FeatureRef<'a>) -> Option<&'a str>,
    {
        let mut missing = 0usize;
        for feature in features {
            if !self.params.filter_ids.is_empty() && !self.params.filter_ids.contains(feature.id())
            {
                continue;
            }
            let Some(seq) = sequence(&feature).filter(|s| !s.is_empty()) else {
                missing += 1;
                continue;
            };
            writeln!(out, "{}", self.build_header(feature))?;
            for chunk in seq.as_bytes().chunks(WRAP_WIDTH) {
                out.write_all(chunk)?;
                out.write_all(b"\n")?;
            }
        }
        if missing > 0 {
            warn!(missing, "features were missing a sequence and were skipped");
        }
        Ok(())
    }

    fn build_header(&self, feature: FeatureRef) -> String {
        let core = feature.core();
        let mut header = format!(">{}", core.id);
        if self.params.include_functions {
            if !core.functions.is_empty() {
                header.push_str(&format!(" functions={}", core.functions.join(",")));
            }
            if !core.functional_descriptions.is_empty() {
                header.push_str(&format!(
                    " functional_descriptions={}",
                    core.functional_descriptions.join(",")
                ));
            }
        }
        if self.params.include_aliases {
            if !core.aliases.is_empty() {
                let aliases: Vec<&str> = core.aliases.iter().map(|a| a.1.as_str()).collect();
                header.push_str(&format!(" aliases={}", aliases.join(",")));
            }
            if !core.db_xrefs.is_empty() {
                let xrefs: Vec<String> = core
                    .db_xrefs
                    .iter()
                    .map(|x| format!("{}:{}", x.0, x.1))
                    .collect();
                header.push_str(&format!(" db_xrefs={}", xrefs.join(",")));
            }
        }
        header
    }
}
