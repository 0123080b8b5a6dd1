use crate::bio::genome::{Genome, ALLOWED_TIERS};
use crate::{GenofileError, Result};
use std::collections::HashSet;
use tracing::warn;

/// Fails when any feature id appears more than once across the four
/// feature collections.
pub fn check_feature_id_uniqueness(genome: &Genome) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for feature in genome.all_features() {
        if !seen.insert(feature.id()) {
            duplicates.push(feature.id().to_string());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(GenofileError::Validation(format!(
            "Duplicate feature ids: {}",
            duplicates.join(", ")
        )))
    }
}

/// Sanity checks that do not block migration. Returns the warnings to be
/// appended to the genome's warning list.
pub fn validate_genome(genome: &Genome) -> Vec<String> {
    let mut warnings = Vec::new();

    if genome.domain == "Bacteria" && genome.cdss.len() != genome.features.len() {
        warnings.push(
            "For prokaryotes, CDS array should generally be the same length as the \
             Features array."
                .to_string(),
        );
    } else if genome.domain == "Eukaryota" && genome.cdss.len() == genome.features.len() {
        warnings.push(
            "For Eukaryotes, CDS array should not be the same length as the Features \
             array due to RNA splicing."
                .to_string(),
        );
    }

    if genome.molecule_type != "DNA"
        && genome.molecule_type != "ds-DNA"
        && genome.domain != "Virus"
        && genome.domain != "Viroid"
    {
        warnings.push(format!(
            "Genome molecule_type {} is not expected for domain {}.",
            genome.molecule_type, genome.domain
        ));
    }

    let undefined: Vec<&str> = genome
        .genome_tiers
        .iter()
        .map(String::as_str)
        .filter(|tier| !ALLOWED_TIERS.contains(tier))
        .collect();
    if !undefined.is_empty() {
        warnings.push(format!(
            "Undefined terms in genome_tiers: {}",
            undefined.join(", ")
        ));
    }

    if !genome.taxon_assignments.contains_key("ncbi") {
        warnings.push("Unable to determine organism taxonomy".to_string());
    }

    for warning in &warnings {
        warn!(%warning, "genome validation");
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::feature::{Cds, FeatureCore, Gene};

    fn gene(id: &str) -> Gene {
        Gene {
            core: FeatureCore {
                id: id.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn cds(id: &str) -> Cds {
        Cds {
            core: FeatureCore {
                id: id.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_ids_rejected_across_collections() {
        let genome = Genome {
            features: vec![gene("f1")],
            cdss: vec![cds("f1")],
            ..Default::default()
        };
        let err = check_feature_id_uniqueness(&genome).unwrap_err();
        assert!(err.to_string().contains("f1"));
    }

    #[test]
    fn test_unique_ids_pass() {
        let genome = Genome {
            features: vec![gene("g1"), gene("g2")],
            cdss: vec![cds("g1_CDS_1")],
            ..Default::default()
        };
        assert!(check_feature_id_uniqueness(&genome).is_ok());
    }

    fn ncbi_assigned() -> std::collections::BTreeMap<String, String> {
        [("ncbi".to_string(), "562".to_string())].into_iter().collect()
    }

    #[test]
    fn test_prokaryote_cds_count_warning() {
        let genome = Genome {
            domain: "Bacteria".to_string(),
            molecule_type: "DNA".to_string(),
            taxonomy: "Bacteria; Proteobacteria".to_string(),
            taxon_assignments: ncbi_assigned(),
            features: vec![gene("g1"), gene("g2")],
            cdss: vec![cds("c1")],
            ..Default::default()
        };
        let warnings = validate_genome(&genome);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("For prokaryotes"));
    }

    #[test]
    fn test_prokaryote_warning_fires_without_genes() {
        let genome = Genome {
            domain: "Bacteria".to_string(),
            molecule_type: "DNA".to_string(),
            taxon_assignments: ncbi_assigned(),
            cdss: vec![cds("c1")],
            ..Default::default()
        };
        let warnings = validate_genome(&genome);
        assert!(warnings.iter().any(|w| w.starts_with("For prokaryotes")));
    }

    #[test]
    fn test_ds_dna_molecule_type_accepted() {
        let genome = Genome {
            domain: "Virus".to_string(),
            molecule_type: "ds-DNA".to_string(),
            taxon_assignments: ncbi_assigned(),
            ..Default::default()
        };
        let warnings = validate_genome(&genome);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_molecule_type_and_tier_warnings() {
        let genome = Genome {
            domain: "Eukaryota".to_string(),
            molecule_type: "RNA".to_string(),
            taxonomy: "Eukaryota".to_string(),
            genome_tiers: vec!["Reference".to_string(), "Bogus".to_string()],
            ..Default::default()
        };
        let warnings = validate_genome(&genome);
        assert!(warnings
            .iter()
            .any(|w| w == "Genome molecule_type RNA is not expected for domain Eukaryota."));
        assert!(warnings
            .iter()
            .any(|w| w == "Undefined terms in genome_tiers: Bogus"));
    }

    #[test]
    fn test_missing_ncbi_assignment_warns() {
        let genome = Genome {
            domain: "Bacteria".to_string(),
            molecule_type: "DNA".to_string(),
            taxonomy: "Unconfirmed Organism".to_string(),
            ..Default::default()
        };
        let warnings = validate_genome(&genome);
        assert!(warnings
            .iter()
            .any(|w| w == "Unable to determine organism taxonomy"));

        let assigned = Genome {
            taxon_assignments: ncbi_assigned(),
            ..genome
        };
        assert!(!validate_genome(&assigned)
            .iter()
            .any(|w| w == "Unable to determine organism taxonomy"));
    }
}
