use crate::bio::feature::FeatureRef;
use crate::bio::genome::Genome;
use crate::bio::location::Location;
use crate::core::graph::FeatureGraph;
use crate::{GenofileError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io::Write;
use tracing::info;

/// Characters escaped in GFF3 attribute values. Everything non-alphanumeric
/// except the characters historically left readable in this format.
const GFF_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b' ')
    .remove(b'/')
    .remove(b':');

/// Feature kinds whose compound locations expand into exon lines instead
/// of repeated feature lines.
const SPLICEABLE: [&str; 6] = ["RNA", "mRNA", "tRNA", "rRNA", "misc_RNA", "transcript"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GffDialect {
    Gff3,
    Gtf,
}

impl GffDialect {
    pub fn extension(&self) -> &'static str {
        match self {
            GffDialect::Gff3 => "gff",
            GffDialect::Gtf => "gtf",
        }
    }
}

/// A single row of the tab-separated output. Exon rows are synthesized
/// and carry parent ids of their own.
struct Row<'a> {
    kind: &'a str,
    id: &'a str,
    parent_gene: Option<&'a str>,
    parent_mrna: Option<&'a str>,
    feature: Option<FeatureRef<'a>>,
}

/// Emits a genome as GFF3 or GTF, walking the feature graph per contig so
/// parents always precede their children.
pub struct GffWriter<'a> {
    genome: &'a Genome,
    dialect: GffDialect,
}

impl<'a> GffWriter<'a> {
    pub fn new(genome: &'a Genome, dialect: GffDialect) -> Self {
        GffWriter { genome, dialect }
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        let graph = FeatureGraph::build(self.genome);
        let mut lines = 0usize;
        for contig in graph.contigs() {
            writeln!(out, "##sequence-region {}", contig)?;
            for feature in graph.top_level(contig) {
                lines += self.write_feature_group(out, &graph, *feature)?;
            }
        }
        info!(lines, dialect = ?self.dialect, "wrote feature lines");
        Ok(())
    }

    /// Writes a feature, its synthesized exons, and all its descendants.
    fn write_feature_group<W: Write>(
        &self,
        out: &mut W,
        graph: &FeatureGraph<'a>,
        feature: FeatureRef<'a>,
    ) -> Result<usize> {
        let mut lines = 0;
        let row = Row {
            kind: feature.kind(),
            id: feature.id(),
            parent_gene: feature.parent_gene_raw(),
            parent_mrna: feature.parent_mrna_raw(),
            feature: Some(feature),
        };

        if SPLICEABLE.contains(&feature.kind()) {
            let envelope = Location::common(feature.locations());
            self.write_row(out, &envelope, &row)?;
            lines += 1;
            for (i, loc) in feature.locations().iter().enumerate() {
                let exon_id = format!("{}_exon_{}", feature.id(), i + 1);
                let exon = Row {
                    kind: "exon",
                    id: &exon_id,
                    parent_gene: Some(feature.parent_gene_raw().unwrap_or("")),
                    parent_mrna: Some(feature.id()),
                    feature: None,
                };
                self.write_row(out, loc, &exon)?;
                lines += 1;
            }
        } else {
            for loc in feature.locations() {
                self.write_row(out, loc, &row)?;
                lines += 1;
            }
        }

        let child = |id: &str| {
            graph.get(id).ok_or_else(|| GenofileError::Render {
                feature_id: feature.id().to_string(),
                reason: format!("child feature {id} does not exist"),
            })
        };
        if !feature.mrna_ids().is_empty() {
            for mrna_id in feature.mrna_ids() {
                lines += self.write_feature_group(out, graph, child(mrna_id)?)?;
            }
        } else if !feature.cds_ids().is_empty() {
            for cds_id in feature.cds_ids() {
                lines += self.write_feature_group(out, graph, child(cds_id)?)?;
            }
        } else if let Some(cds_id) = feature.cds_id() {
            lines += self.write_feature_group(out, graph, child(cds_id)?)?;
        }
        Ok(lines)
    }

    fn write_row<W: Write>(&self, out: &mut W, location: &Location, row: &Row) -> Result<()> {
        let attribute = match self.dialect {
            GffDialect::Gtf => gtf_attributes(row),
            GffDialect::Gff3 => gff_attributes(row),
        };
        writeln!(
            out,
            "{}\tKBase\t{}\t{}\t{}\t.\t{}\t0\t{}",
            location.contig_id,
            row.kind,
            location.start(),
            location.end(),
            location.strand,
            attribute
        )?;
        Ok(())
    }
}

fn gtf_attributes(row: &Row) -> String {
    if row.kind == "gene" {
        return format!(r#"gene_id "{}"; transcript_id """#, row.id);
    }
    let gene_id = row.parent_gene.unwrap_or(row.id);
    let transcript_id = row.parent_mrna.unwrap_or(row.id);
    format!(r#"gene_id "{}"; transcript_id "{}""#, gene_id, transcript_id)
}

fn one_attr(key: &str, value: &str) -> String {
    format!("{}={}", key, utf8_percent_encode(value, GFF_VALUE))
}

fn gff_attributes(row: &Row) -> String {
    let mut attrs = Vec::new();
    if !row.id.is_empty() {
        attrs.push(one_attr("ID", row.id));
    }
    // parent_mrna wins over parent_gene; empty strings are not parents
    let parent = row
        .parent_mrna
        .filter(|p| !p.is_empty())
        .or_else(|| row.parent_gene.filter(|p| !p.is_empty()));
    if let Some(parent) = parent {
        attrs.push(one_attr("Parent", parent));
    }

    let Some(feature) = row.feature else {
        return attrs.join("; ");
    };
    let core = feature.core();

    if let Some(note) = core.note.as_deref().filter(|n| !n.is_empty()) {
        attrs.push(one_attr("note", note));
    }
    for xref in &core.db_xrefs {
        attrs.push(one_attr("db_xref", &format!("{}:{}", xref.0, xref.1)));
    }
    for alias in &core.aliases {
        attrs.push(one_attr(&alias.0, &alias.1));
    }
    if !core.functional_descriptions.is_empty() {
        attrs.push(one_attr(
            "function",
            &core.functional_descriptions.join(";"),
        ));
    }
    if !core.functions.is_empty() {
        attrs.push(one_attr("product", &core.functions.join(";")));
    } else if let Some(function) = core.function.as_deref().filter(|f| !f.is_empty()) {
        attrs.push(one_attr("product", function));
    }
    for (ontology, terms) in &core.ontology_terms {
        for term_id in terms.keys() {
            attrs.push(one_attr(&ontology.to_lowercase(), term_id));
        }
    }
    for inference in &core.inference_data {
        attrs.push(one_attr("inference", &inference.render()));
    }
    if core.flags.iter().any(|f| f == "trans_splicing") {
        attrs.push(one_attr("exception", "trans-splicing"));
    }
    attrs.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::feature::{Alias, Cds, DbXref, FeatureCore, Gene, Mrna};
    use pretty_assertions::assert_eq;

    fn core(id: &str, locs: Vec<Location>) -> FeatureCore {
        FeatureCore {
            id: id.to_string(),
            location: locs,
            ..Default::default()
        }
    }

    fn render(genome: &Genome, dialect: GffDialect) -> String {
        let mut buf = Vec::new();
        GffWriter::new(genome, dialect).write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn one_gene_genome() -> Genome {
        Genome {
            contig_ids: vec!["c1".to_string()],
            features: vec![Gene {
                core: FeatureCore {
                    functions: vec!["DNA gyrase subunit B".to_string()],
                    db_xrefs: vec![DbXref("GeneID".to_string(), "948211".to_string())],
                    aliases: vec![Alias("locus_tag".to_string(), "b3699".to_string())],
                    ..core("g1", vec![Location::new("c1", 100, "+", 300)])
                },
                cdss: vec!["cds1".to_string()],
                mrnas: Vec::new(),
                children: Vec::new(),
            }],
            cdss: vec![Cds {
                core: core("cds1", vec![Location::new("c1", 100, "+", 300)]),
                parent_gene: Some("g1".to_string()),
                parent_mrna: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_gff3_gene_then_cds_with_attributes() {
        let output = render(&one_gene_genome(), GffDialect::Gff3);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "##sequence-region c1");
        assert_eq!(
            lines[1],
            "c1\tKBase\tgene\t100\t399\t.\t+\t0\tID=g1; db_xref=GeneID:948211; \
             locus_tag=b3699; product=DNA gyrase subunit B"
        );
        assert_eq!(lines[2], "c1\tKBase\tCDS\t100\t399\t.\t+\t0\tID=cds1; Parent=g1");
    }

    #[test]
    fn test_gtf_cds_falls_back_to_own_id_for_transcript() {
        let output = render(&one_gene_genome(), GffDialect::Gtf);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[1],
            "c1\tKBase\tgene\t100\t399\t.\t+\t0\tgene_id \"g1\"; transcript_id \"\""
        );
        assert_eq!(
            lines[2],
            "c1\tKBase\tCDS\t100\t399\t.\t+\t0\tgene_id \"g1\"; transcript_id \"cds1\""
        );
    }

    #[test]
    fn test_spliced_mrna_expands_exons() {
        let genome = Genome {
            contig_ids: vec!["c1".to_string()],
            mrnas: vec![Mrna {
                core: core(
                    "m1",
                    vec![
                        Location::new("c1", 100, "+", 50),
                        Location::new("c1", 200, "+", 50),
                    ],
                ),
                parent_gene: None,
                cds: None,
            }],
            ..Default::default()
        };
        let output = render(&genome, GffDialect::Gff3);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "c1\tKBase\tmRNA\t100\t249\t.\t+\t0\tID=m1");
        assert_eq!(
            lines[2],
            "c1\tKBase\texon\t100\t149\t.\t+\t0\tID=m1_exon_1; Parent=m1"
        );
        assert_eq!(
            lines[3],
            "c1\tKBase\texon\t200\t249\t.\t+\t0\tID=m1_exon_2; Parent=m1"
        );
    }

    #[test]
    fn test_gtf_exon_preserves_empty_gene_id() {
        let genome = Genome {
            contig_ids: vec!["c1".to_string()],
            mrnas: vec![Mrna {
                core: core("m1", vec![Location::new("c1", 100, "+", 50)]),
                parent_gene: None,
                cds: None,
            }],
            ..Default::default()
        };
        let output = render(&genome, GffDialect::Gtf);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[2],
            "c1\tKBase\texon\t100\t149\t.\t+\t0\tgene_id \"\"; transcript_id \"m1\""
        );
    }

    #[test]
    fn test_attribute_values_percent_encoded() {
        let genome = Genome {
            contig_ids: vec!["c1".to_string()],
            non_coding_features: vec![crate::bio::feature::NonCodingFeature {
                core: FeatureCore {
                    functions: vec!["2,3-bisphosphoglycerate mutase".to_string()],
                    ..core("nc1", vec![Location::new("c1", 10, "+", 20)])
                },
                kind: "gene".to_string(),
                parent_gene: None,
                children: Vec::new(),
            }],
            ..Default::default()
        };
        let output = render(&genome, GffDialect::Gff3);
        assert!(output.contains("product=2%2C3-bisphosphoglycerate mutase"));
    }

    #[test]
    fn test_missing_child_is_render_error() {
        let mut genome = one_gene_genome();
        genome.cdss.clear();
        let mut buf = Vec::new();
        let err = GffWriter::new(&genome, GffDialect::Gff3)
            .write(&mut buf)
            .unwrap_err();
        assert!(matches!(err, GenofileError::Render { .. }));
    }
}
