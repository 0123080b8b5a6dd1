use crate::bio::feature::{
    Alias, Cds, DbXref, FeatureCore, Gene, Mrna, NonCodingFeature, OntologyEvidence,
    OntologyTerms,
};
use crate::bio::genome::{Genome, MAX_GENOME_SIZE};
use crate::core::schema::{RawAlias, RawFeature, RawGenome, RawTerm, SchemaVersion};
use crate::core::{size_guard, validator};
use crate::services::{AssemblyProvider, TaxonProvider};
use crate::{GenofileError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Given a user-provided source string, assign the canonical source name
/// and the genome tiers it implies. Matching is case-insensitive.
pub fn determine_tier(source: &str) -> (String, Vec<String>) {
    let low = source.to_lowercase();
    let tiers = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    if low.contains("refseq") {
        if low.contains("reference") {
            return ("RefSeq".to_string(), tiers(&["Reference", "Representative", "ExternalDB"]));
        }
        if low.contains("representative") {
            return ("RefSeq".to_string(), tiers(&["Representative", "ExternalDB"]));
        }
        if low.contains("user") {
            return ("RefSeq".to_string(), tiers(&["ExternalDB", "User"]));
        }
        return ("RefSeq".to_string(), tiers(&["ExternalDB"]));
    }
    if low.contains("phytozome") {
        if low.contains("flagship") {
            return ("Phytozome".to_string(), tiers(&["Reference", "Representative", "ExternalDB"]));
        }
        return ("Phytozome".to_string(), tiers(&["Representative", "ExternalDB"]));
    }
    if low.contains("ensembl") {
        if low.contains("user") {
            return ("Ensembl".to_string(), tiers(&["ExternalDB", "User"]));
        }
        return ("Ensembl".to_string(), tiers(&["Representative", "ExternalDB"]));
    }
    (source.to_string(), tiers(&["User"]))
}

/// Deduplicates ontology evidence records across features. Structurally
/// identical records share one slot in the genome's `ontology_events`
/// list; features refer to them by index.
#[derive(Default)]
struct EvidenceInterner {
    events: Vec<OntologyEvidence>,
    present: BTreeMap<String, BTreeMap<String, String>>,
}

impl EvidenceInterner {
    fn with_existing(
        events: Vec<OntologyEvidence>,
        present: BTreeMap<String, BTreeMap<String, String>>,
    ) -> Self {
        EvidenceInterner { events, present }
    }

    fn intern(&mut self, event: OntologyEvidence) -> usize {
        if let Some(idx) = self.events.iter().position(|e| e == &event) {
            idx
        } else {
            self.events.push(event);
            self.events.len() - 1
        }
    }

    /// Converts raw ontology terms into interned index lists, recording
    /// every term name under `ontologies_present`.
    fn convert_terms(
        &mut self,
        raw: BTreeMap<String, BTreeMap<String, RawTerm>>,
    ) -> OntologyTerms {
        let mut out = OntologyTerms::new();
        for (ontology, terms) in raw {
            let mut converted = BTreeMap::new();
            for (term_id, term) in terms {
                let indices = match term {
                    RawTerm::Indexed(indices) => indices,
                    RawTerm::Record(rec) => {
                        self.present
                            .entry(ontology.clone())
                            .or_default()
                            .insert(rec.id.clone(), rec.term_name.clone());
                        rec.evidence
                            .into_iter()
                            .map(|mut ev| {
                                ev.id = ontology.clone();
                                ev.ontology_ref = rec.ontology_ref.clone();
                                self.intern(ev)
                            })
                            .collect()
                    }
                };
                converted.insert(term_id, indices);
            }
            out.insert(ontology, converted);
        }
        out
    }
}

/// Migrates stored genome documents of any vintage into the canonical
/// model, consulting taxonomy and assembly collaborators for fields the
/// document does not carry itself.
pub struct Migrator<'a> {
    taxa: &'a dyn TaxonProvider,
    assemblies: &'a dyn AssemblyProvider,
    max_size: u64,
}

impl<'a> Migrator<'a> {
    pub fn new(taxa: &'a dyn TaxonProvider, assemblies: &'a dyn AssemblyProvider) -> Self {
        Migrator {
            taxa,
            assemblies,
            max_size: MAX_GENOME_SIZE,
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn migrate(&self, doc: Value) -> Result<Genome> {
        let schema = SchemaVersion::detect(&doc);
        if schema == SchemaVersion::Metagenome {
            return Err(GenofileError::Validation(
                "metagenome documents keep their features in an external handle and \
                 cannot be migrated to the canonical genome model"
                    .to_string(),
            ));
        }
        info!(?schema, "migrating genome document");
        let raw: RawGenome = serde_json::from_value(doc)?;
        let mut warnings = raw.warnings.clone();

        let (source, genome_tiers) = if raw.genome_tiers.is_empty() {
            determine_tier(&raw.source)
        } else {
            (raw.source.clone(), raw.genome_tiers.clone())
        };
        let molecule_type = raw
            .molecule_type
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());

        let mut genome = Genome {
            scientific_name: raw.scientific_name.clone(),
            domain: raw.domain.clone(),
            taxonomy: raw.taxonomy.clone(),
            taxon_assignments: raw.taxon_assignments.clone(),
            genetic_code: raw.genetic_code,
            source,
            genome_tiers,
            molecule_type,
            genome_type: raw.genome_type.clone(),
            assembly_ref: raw.assembly_ref.clone(),
            contigset_ref: raw.contigset_ref.clone(),
            contig_ids: raw.contig_ids.clone(),
            dna_size: raw.dna_size,
            md5: raw.md5.clone(),
            gc_content: raw.gc_content,
            num_contigs: raw.num_contigs,
            notes: raw.notes.clone(),
            publications: raw.publications.clone(),
            ontologies_present: BTreeMap::new(),
            ontology_events: Vec::new(),
            ..Default::default()
        };

        self.resolve_taxonomy(&raw, &mut genome, &mut warnings)?;
        self.resolve_assembly_stats(&mut genome)?;
        self.migrate_features(raw, &mut genome)?;

        validator::check_feature_id_uniqueness(&genome)?;
        // validation runs on every migration; only new warnings are added
        for warning in validator::validate_genome(&genome) {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
        genome.warnings = warnings;

        size_guard::enforce_size_limit(&mut genome, self.max_size)?;
        Ok(genome)
    }

    /// Reconciles document taxonomy fields against the taxonomy
    /// collaborator when an NCBI id is assigned, or fills defaults.
    fn resolve_taxonomy(
        &self,
        raw: &RawGenome,
        genome: &mut Genome,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let ncbi_id = raw
            .taxon_assignments
            .get("ncbi")
            .filter(|id| !id.is_empty());
        let Some(tax_id) = ncbi_id else {
            if genome.taxonomy.is_empty() {
                genome.taxonomy = if genome.scientific_name.is_empty() {
                    "Unconfirmed Organism".to_string()
                } else {
                    format!("Unconfirmed Organism: {}", genome.scientific_name)
                };
            }
            if genome.genetic_code == 0 {
                genome.genetic_code = 11;
            }
            if genome.domain.is_empty() {
                genome.domain = "Unknown".to_string();
            }
            return Ok(());
        };

        let taxon = self.taxa.fetch_taxon(tax_id)?;
        if genome.genetic_code != 0 && genome.genetic_code != taxon.genetic_code {
            warnings.push(format!(
                "The genetic code provided by NCBI ({}) does not match the one given by the user ({})",
                taxon.genetic_code, genome.genetic_code
            ));
        }
        genome.genetic_code = taxon.genetic_code;

        match taxon.domain() {
            Some(domain) => {
                if !genome.domain.is_empty() && genome.domain != domain {
                    warnings.push(format!(
                        "The domain provided by NCBI ({}) does not match the one given by the user ({})",
                        domain, genome.domain
                    ));
                }
                genome.domain = domain.to_string();
            }
            None => {
                if genome.domain.is_empty() {
                    genome.domain = "Unknown".to_string();
                }
            }
        }

        genome.taxonomy = taxon.taxonomy_string();
        if !genome.scientific_name.is_empty() && genome.scientific_name != taxon.scientific_name {
            warnings.push(format!(
                "The scientific name provided by NCBI ('{}') does not match the one given by the user ('{}')",
                taxon.scientific_name, genome.scientific_name
            ));
        }
        genome.scientific_name = taxon.scientific_name;
        Ok(())
    }

    /// Fills assembly statistics from the assembly collaborator when the
    /// document is missing any of them. The assembly reference is used
    /// when present, the legacy contigset reference otherwise.
    fn resolve_assembly_stats(&self, genome: &mut Genome) -> Result<()> {
        let missing = genome.dna_size.is_none()
            || genome.md5.is_none()
            || genome.gc_content.is_none()
            || genome.num_contigs.is_none();
        if !missing {
            return Ok(());
        }
        let assembly_ref = genome
            .assembly_ref
            .clone()
            .or_else(|| genome.contigset_ref.clone());
        let Some(assembly_ref) = assembly_ref else {
            return Ok(());
        };
        let stats = self.assemblies.fetch_assembly_stats(&assembly_ref)?;
        genome.gc_content = stats.gc_content;
        genome.dna_size = Some(stats.dna_size);
        genome.md5 = Some(stats.md5);
        genome.num_contigs = Some(stats.num_contigs);
        if stats.assembly_type.is_some() {
            genome.genome_type = stats.assembly_type;
        }
        Ok(())
    }

    /// Normalizes every feature and re-buckets the legacy flat `features`
    /// list into the four canonical collections.
    fn migrate_features(&self, raw: RawGenome, genome: &mut Genome) -> Result<()> {
        let mut interner =
            EvidenceInterner::with_existing(raw.ontology_events, raw.ontologies_present);

        for feat in raw.mrnas {
            let core = normalize_feature(feat.clone(), &mut interner);
            genome.mrnas.push(Mrna {
                core,
                parent_gene: feat.parent_gene,
                cds: feat.cds,
            });
        }
        for feat in raw.cdss {
            let core = normalize_feature(feat.clone(), &mut interner);
            genome.cdss.push(Cds {
                core,
                parent_gene: feat.parent_gene,
                parent_mrna: feat.parent_mrna,
            });
        }
        for feat in raw.non_coding_features {
            let kind = feat.kind.clone().unwrap_or_else(|| "gene".to_string());
            let parent_gene = feat.parent_gene.clone();
            let children = feat.children.clone();
            let core = noncoding_core(feat, &mut interner);
            genome.non_coding_features.push(NonCodingFeature {
                core,
                kind,
                parent_gene,
                children,
            });
        }

        for feat in raw.features {
            let kind = feat.kind.clone().unwrap_or_else(|| "gene".to_string());
            let core = normalize_feature(feat.clone(), &mut interner);
            match kind.as_str() {
                "gene" => {
                    if feat.cdss.is_empty() {
                        genome.non_coding_features.push(NonCodingFeature {
                            core,
                            kind,
                            parent_gene: feat.parent_gene,
                            children: feat.children,
                        });
                    } else {
                        genome.features.push(Gene {
                            core,
                            cdss: feat.cdss,
                            mrnas: feat.mrnas,
                            children: feat.children,
                        });
                    }
                }
                "CDS" => {
                    genome.cdss.push(Cds {
                        core,
                        parent_gene: Some(feat.parent_gene.unwrap_or_default()),
                        parent_mrna: feat.parent_mrna,
                    });
                }
                "mRNA" => {
                    genome.mrnas.push(Mrna {
                        core,
                        parent_gene: Some(feat.parent_gene.unwrap_or_default()),
                        cds: feat.cds,
                    });
                }
                other => {
                    warn!(
                        feature_id = %core.id,
                        kind = other,
                        "dropping flat-list feature of unsupported kind"
                    );
                }
            }
        }

        // counts are derived from the final collections so a second
        // migration of the same genome lands on identical numbers
        let mut type_counts: BTreeMap<String, u64> = BTreeMap::new();
        for nc in &genome.non_coding_features {
            *type_counts.entry(nc.kind.clone()).or_insert(0) += 1;
        }
        let non_coding_genes = genome
            .non_coding_features
            .iter()
            .filter(|f| f.kind == "gene")
            .count() as u64;
        *type_counts.entry("gene".to_string()).or_insert(0) += genome.features.len() as u64;
        type_counts.insert("non_coding_genes".to_string(), non_coding_genes);
        type_counts.insert("mRNA".to_string(), genome.mrnas.len() as u64);
        type_counts.insert("CDS".to_string(), genome.cdss.len() as u64);
        type_counts.insert(
            "protein_encoding_gene".to_string(),
            genome.features.len() as u64,
        );
        type_counts.insert(
            "non_coding_features".to_string(),
            genome.non_coding_features.len() as u64,
        );
        genome.feature_counts = type_counts;
        genome.ontology_events = interner.events;
        genome.ontologies_present = interner.present;
        Ok(())
    }
}

fn convert_aliases(raw: Vec<RawAlias>) -> Vec<Alias> {
    raw.into_iter()
        .map(|alias| match alias {
            RawAlias::Pair(namespace, value) => Alias(namespace, value),
            RawAlias::Bare(value) => Alias("gene_synonym".to_string(), value),
        })
        .collect()
}

fn base_core(feat: RawFeature, interner: &mut EvidenceInterner) -> FeatureCore {
    let dna_sequence_length = feat
        .dna_sequence_length
        .or_else(|| Some(feat.location.iter().map(|l| l.length).sum::<i64>() as u64));
    let protein_md5 = feat.protein_md5.clone().or_else(|| {
        feat.protein_translation
            .as_ref()
            .map(|pt| format!("{:x}", md5::compute(pt.as_bytes())))
    });
    FeatureCore {
        id: feat.id,
        location: feat.location,
        functions: feat.functions.unwrap_or_default(),
        function: feat.function,
        functional_descriptions: feat.functional_descriptions,
        aliases: convert_aliases(feat.aliases),
        db_xrefs: feat
            .db_xrefs
            .into_iter()
            .map(|(db, id)| DbXref(db, id))
            .collect(),
        ontology_terms: interner.convert_terms(feat.ontology_terms),
        dna_sequence: feat.dna_sequence,
        dna_sequence_length,
        protein_translation: feat.protein_translation,
        protein_translation_length: feat.protein_translation_length,
        protein_md5,
        note: feat.note,
        flags: feat.flags,
        inference_data: feat.inference_data,
        warnings: feat.warnings,
    }
}

/// Full normalization applied to the mrnas, cdss and flat features lists:
/// the singular `function` field is split into `functions`.
fn normalize_feature(feat: RawFeature, interner: &mut EvidenceInterner) -> FeatureCore {
    let mut core = base_core(feat, interner);
    if let Some(function) = core.function.take() {
        core.functions = function.split("; ").map(str::to_string).collect();
    }
    core
}

/// The non_coding_features list keeps its legacy singular `function`
/// field untouched; only evidence interning and the derived-field fills
/// apply.
fn noncoding_core(feat: RawFeature, interner: &mut EvidenceInterner) -> FeatureCore {
    base_core(feat, interner)
}
