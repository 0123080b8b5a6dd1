use crate::bio::feature::FeatureRef;
use crate::bio::genome::Genome;
use crate::core::graph::FeatureGraph;
use crate::services::SequenceProvider;
use crate::{GenofileError, Result};
use chrono::{Datelike, Local};
use gb_io::seq::{Date, Feature, Location, Qualifier, Reference, Seq, Source, Topology};
use std::io::Write;
use tracing::info;

/// LOCUS names longer than this get replaced; the fixed-width LOCUS line
/// cannot carry them.
const CONTIG_ID_FIELD_LENGTH: usize = 16;

/// Emits a genome as a multi-record GenBank flat file, one record per
/// contig, with the ORIGIN block filled from the sequence collaborator.
pub struct GenbankWriter<'a> {
    genome: &'a Genome,
    sequences: &'a dyn SequenceProvider,
}

impl<'a> GenbankWriter<'a> {
    pub fn new(genome: &'a Genome, sequences: &'a dyn SequenceProvider) -> Self {
        GenbankWriter { genome, sequences }
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        let graph = FeatureGraph::build(self.genome);
        let contigs = graph.contigs();
        if contigs.is_empty() {
            return Err(GenofileError::Validation(
                "No sequence data to write!".to_string(),
            ));
        }

        let mut renamed_contigs = 0;
        for (index, contig_id) in contigs.iter().enumerate() {
            let record = self.build_record(&graph, contig_id, index == 0, &mut renamed_contigs)?;
            gb_io::writer::write(&mut *out, &record)?;
        }
        info!(contigs = contigs.len(), renamed_contigs, "wrote GenBank records");
        Ok(())
    }

    fn build_record(
        &self,
        graph: &FeatureGraph<'a>,
        contig_id: &str,
        first: bool,
        renamed_contigs: &mut usize,
    ) -> Result<Seq> {
        let genome = self.genome;
        let sequence = self.sequences.fetch_sequence(contig_id)?;

        let mut record = Seq::empty();
        let mut comments = Vec::new();
        if let Some(notes) = genome.notes.as_deref().filter(|n| !n.is_empty()) {
            comments.push(notes.to_string());
        }
        let name = if contig_id.len() > CONTIG_ID_FIELD_LENGTH {
            *renamed_contigs += 1;
            comments.push(format!(
                "Renamed contig from {} because the original name exceeded {} characters",
                contig_id, CONTIG_ID_FIELD_LENGTH
            ));
            format!("scaffold{:0>8}", renamed_contigs)
        } else {
            contig_id.to_string()
        };

        record.name = Some(name);
        record.topology = Topology::Linear;
        record.molecule_type = Some(genome.molecule_type.clone());
        let today = Local::now().date_naive();
        record.date = Date::from_ymd(today.year(), today.month(), today.day()).ok();
        record.source = Some(Source {
            source: format!("KBase_{}", genome.source),
            organism: Some(format!("{}\n{}", genome.scientific_name, genome.taxonomy)),
        });
        if first {
            record.references = self.format_publications();
        }
        record.comments = comments;
        record.len = Some(sequence.len());
        record.seq = sequence.into_bytes();

        for feature in graph.top_level(contig_id) {
            self.append_feature_tree(&mut record, graph, *feature, contig_id)?;
        }
        Ok(record)
    }

    /// A top-level feature followed by its declared children: a gene's
    /// mRNAs then its CDSs, or an orphan mRNA's CDS when no gene will
    /// otherwise print it.
    fn append_feature_tree(
        &self,
        record: &mut Seq,
        graph: &FeatureGraph<'a>,
        feature: FeatureRef<'a>,
        contig_id: &str,
    ) -> Result<()> {
        record.features.push(format_feature(feature, contig_id)?);
        let child = |id: &str| {
            graph.get(id).ok_or_else(|| GenofileError::Render {
                feature_id: feature.id().to_string(),
                reason: format!("child feature {id} does not exist"),
            })
        };
        for mrna_id in feature.mrna_ids() {
            record.features.push(format_feature(child(mrna_id)?, contig_id)?);
        }
        for cds_id in feature.cds_ids() {
            record.features.push(format_feature(child(cds_id)?, contig_id)?);
        }
        if let Some(cds_id) = feature.cds_id() {
            let cds = child(cds_id)?;
            if cds.parent_gene().is_none() {
                record.features.push(format_feature(cds, contig_id)?);
            }
        }
        Ok(())
    }

    fn format_publications(&self) -> Vec<Reference> {
        self.genome
            .publications
            .iter()
            .map(|pub_| Reference {
                description: String::new(),
                authors: Some(pub_.authors.clone()),
                consortium: None,
                title: pub_.title.clone(),
                journal: Some(pub_.journal.clone()),
                pubmed: pub_.pubmed_string(),
                remark: None,
            })
            .collect()
    }
}

/// Renders one location segment. Segments on another contig reference it
/// explicitly, which GenBank allows for trans-spliced features.
fn segment_location(loc: &crate::bio::location::Location, current_contig: &str) -> Location {
    let range = if loc.strand == "-" {
        Location::simple_range(loc.anchor - loc.length, loc.anchor)
    } else {
        Location::simple_range(loc.anchor - 1, loc.anchor + loc.length - 1)
    };
    let range = if loc.contig_id == current_contig {
        range
    } else {
        Location::External(loc.contig_id.clone(), Some(Box::new(range)))
    };
    if loc.strand == "-" {
        Location::Complement(Box::new(range))
    } else {
        range
    }
}

fn feature_location(feature: FeatureRef, current_contig: &str) -> Result<Location> {
    let mut segments: Vec<Location> = feature
        .locations()
        .iter()
        .map(|loc| segment_location(loc, current_contig))
        .collect();
    match segments.len() {
        0 => Err(GenofileError::Render {
            feature_id: feature.id().to_string(),
            reason: "feature has no location".to_string(),
        }),
        1 => Ok(segments.remove(0)),
        _ => Ok(Location::Join(segments)),
    }
}

fn format_feature(feature: FeatureRef, current_contig: &str) -> Result<Feature> {
    let core = feature.core();
    let mut qualifiers: Vec<Qualifier> = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        qualifiers.push((key.to_string().into(), value));
    };

    match feature {
        FeatureRef::Gene(_) => push("locus_tag", Some(core.id.clone())),
        FeatureRef::Mrna(_) | FeatureRef::Cds(_) => {
            if let Some(parent) = feature.parent_gene() {
                push("locus_tag", Some(parent.to_string()));
            }
        }
        FeatureRef::NonCoding(_) => {}
    }

    if !core.functional_descriptions.is_empty() {
        push("function", Some(core.functional_descriptions.join("; ")));
    }
    // the legacy singular function, where still present, wins
    if let Some(function) = core.function.as_deref() {
        push("product", Some(function.to_string()));
    } else if !core.functions.is_empty() {
        push("product", Some(core.functions.join("; ")));
    }

    let mut note = core.note.clone().unwrap_or_default();
    if !core.warnings.is_empty() {
        note = format!("{}Warnings: {}", note, core.warnings.join(","));
    }
    if !note.is_empty() {
        push("note", Some(note));
    }

    if let Some(translation) = core.protein_translation.as_deref().filter(|t| !t.is_empty()) {
        push("translation", Some(translation.to_string()));
    }
    for xref in &core.db_xrefs {
        push("db_xref", Some(format!("{}:{}", xref.0, xref.1)));
    }
    for terms in core.ontology_terms.values() {
        for term_id in terms.keys() {
            push("db_xref", Some(term_id.clone()));
        }
    }
    for alias in &core.aliases {
        push(&alias.0, Some(alias.1.clone()));
    }
    for flag in &core.flags {
        push(flag, None);
    }
    for inference in &core.inference_data {
        push("inference", Some(inference.render()));
    }

    Ok(Feature {
        kind: feature.kind().to_string().into(),
        location: feature_location(feature, current_contig)?,
        qualifiers,
    })
}
