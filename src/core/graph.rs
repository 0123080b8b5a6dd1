use crate::bio::feature::FeatureRef;
use crate::bio::genome::Genome;
use crate::bio::location::Location;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

fn sort_priority(feature: &FeatureRef) -> usize {
    if !feature.child_ids().is_empty() {
        return 0;
    }
    match feature.kind() {
        "gene" => 0,
        "mRNA" => 1,
        "CDS" => 2,
        _ => 3,
    }
}

/// Parent/child index over a genome's features.
///
/// Features that declare a parent are reachable only through that parent;
/// everything else is a top-level feature of its contig, ordered by
/// envelope start, then by kind, with parents ahead of their children at
/// equal coordinates. Both emitters walk this graph.
pub struct FeatureGraph<'a> {
    by_contig: IndexMap<String, Vec<FeatureRef<'a>>>,
    by_id: HashMap<&'a str, FeatureRef<'a>>,
    contig_ids: &'a [String],
}

impl<'a> FeatureGraph<'a> {
    pub fn build(genome: &'a Genome) -> Self {
        let mut by_contig: IndexMap<String, Vec<FeatureRef<'a>>> = IndexMap::new();
        let mut by_id = HashMap::new();
        let push_top = |by_contig: &mut IndexMap<String, Vec<FeatureRef<'a>>>,
                            feature: FeatureRef<'a>| {
            if let Some(first) = feature.locations().first() {
                by_contig
                    .entry(first.contig_id.clone())
                    .or_default()
                    .push(feature);
            }
        };

        for gene in &genome.features {
            let feature = FeatureRef::Gene(gene);
            by_id.insert(feature.id(), feature);
            push_top(&mut by_contig, feature);
        }
        for nc in &genome.non_coding_features {
            let feature = FeatureRef::NonCoding(nc);
            by_id.insert(feature.id(), feature);
            push_top(&mut by_contig, feature);
        }
        for mrna in &genome.mrnas {
            let feature = FeatureRef::Mrna(mrna);
            by_id.insert(feature.id(), feature);
            if feature.parent_gene().is_none() {
                push_top(&mut by_contig, feature);
            }
        }
        for cds in &genome.cdss {
            let feature = FeatureRef::Cds(cds);
            by_id.insert(feature.id(), feature);
            if feature.parent_gene().is_none() && feature.parent_mrna().is_none() {
                push_top(&mut by_contig, feature);
            }
        }

        for features in by_contig.values_mut() {
            features.sort_by_key(|f| {
                let envelope = Location::common(f.locations());
                (envelope.start(), sort_priority(f))
            });
        }

        FeatureGraph {
            by_contig,
            by_id,
            contig_ids: &genome.contig_ids,
        }
    }

    /// Contigs in emission order: the genome's declared `contig_ids` when
    /// present, otherwise the contigs discovered from feature locations.
    pub fn contigs(&self) -> Vec<&str> {
        if self.contig_ids.is_empty() {
            self.by_contig.keys().map(String::as_str).collect()
        } else {
            self.contig_ids.iter().map(String::as_str).collect()
        }
    }

    pub fn top_level(&self, contig: &str) -> &[FeatureRef<'a>] {
        self.by_contig.get(contig).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<FeatureRef<'a>> {
        self.by_id.get(id).copied()
    }
}

/// True when every location segment of `child` falls within `parent`.
///
/// For gene parents containment alone suffices. For spliced parents the
/// exon structure must line up: the first child segment must share its 3'
/// boundary with the matched parent segment, the last must share its
/// anchor, and interior segments must match exactly.
pub fn is_parent(parent: FeatureRef, child: FeatureRef) -> bool {
    let parent_locs = parent.locations();
    let child_locs = child.locations();
    let parent_is_gene = parent.kind() == "gene";

    let mut j = 0;
    for (i, l2) in child_locs.iter().enumerate() {
        if j >= parent_locs.len() {
            debug!(parent = parent.id(), child = child.id(), "no part contains segment");
            return false;
        }
        if parent_is_gene || i == 0 {
            while !parent_locs[j].contains(l2) {
                j += 1;
                if j == parent_locs.len() {
                    debug!(parent = parent.id(), child = child.id(), "no part contains segment");
                    return false;
                }
            }
            if parent_is_gene || child_locs.len() == 1 {
                continue;
            }
        }

        let l1 = &parent_locs[j];
        if i == 0 && l2.bio_end() != l1.bio_end() {
            debug!(parent = parent.id(), child = child.id(), "first segment end sites differ");
            return false;
        } else if i == child_locs.len() - 1 && l2.anchor != l1.anchor {
            debug!(parent = parent.id(), child = child.id(), "last segment start sites differ");
            return false;
        } else if 0 < i && i < child_locs.len() - 1 && l1 != l2 {
            debug!(parent = parent.id(), child = child.id(), "interior segment differs");
            return false;
        }
        j += 1;
    }
    true
}

type MissingRelationships = BTreeMap<String, Vec<String>>;

fn missing_from<'a>(
    ids: impl IntoIterator<Item = &'a String>,
    universe: &HashSet<&str>,
) -> Vec<String> {
    ids.into_iter()
        .filter(|id| !universe.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Checks that every relationship a feature declares points at an
/// existing feature. Declared-but-empty parents count as declared and are
/// reported missing. Does not verify that relationships are reciprocal.
fn confirm_feature_relationships(
    feature: FeatureRef,
    genes: &HashSet<&str>,
    mrnas: &HashSet<&str>,
    cdss: &HashSet<&str>,
    non_coding: &HashSet<&str>,
) -> MissingRelationships {
    let mut missing = MissingRelationships::new();
    let mut record = |key: &str, ids: Vec<String>| {
        if !ids.is_empty() {
            missing.insert(key.to_string(), ids);
        }
    };

    match feature {
        FeatureRef::Gene(gene) => {
            record("cdss", missing_from(&gene.cdss, cdss));
            record("mrnas", missing_from(&gene.mrnas, mrnas));
            record("children", missing_from(&gene.children, non_coding));
        }
        FeatureRef::Mrna(mrna) => {
            if let Some(parent) = &mrna.parent_gene {
                if !genes.contains(parent.as_str()) {
                    record("parent_gene", vec![parent.clone()]);
                }
            }
            if let Some(cds) = &mrna.cds {
                if !cdss.contains(cds.as_str()) {
                    record("cds", vec![cds.clone()]);
                }
            }
        }
        FeatureRef::Cds(cds_feat) => {
            if let Some(parent) = &cds_feat.parent_gene {
                if !genes.contains(parent.as_str()) {
                    record("parent_gene", vec![parent.clone()]);
                }
            }
            if let Some(parent) = &cds_feat.parent_mrna {
                if !mrnas.contains(parent.as_str()) {
                    record("parent_mrna", vec![parent.clone()]);
                }
            }
        }
        FeatureRef::NonCoding(nc) => {
            if let Some(parent) = &nc.parent_gene {
                if !genes.contains(parent.as_str()) && !non_coding.contains(parent.as_str()) {
                    record("parent_gene", vec![parent.clone()]);
                }
            }
            record("children", missing_from(&nc.children, non_coding));
        }
    }
    missing
}

/// Checks the declared relationships of every feature in the genome.
/// Returns, per offending feature id, the relationship kinds and the ids
/// that could not be found. Empty result means the graph is closed.
pub fn confirm_genome_feature_relationships(
    genome: &Genome,
) -> BTreeMap<String, MissingRelationships> {
    let genes: HashSet<&str> = genome.features.iter().map(|f| f.core.id.as_str()).collect();
    let mrnas: HashSet<&str> = genome.mrnas.iter().map(|f| f.core.id.as_str()).collect();
    let cdss: HashSet<&str> = genome.cdss.iter().map(|f| f.core.id.as_str()).collect();
    let non_coding: HashSet<&str> = genome
        .non_coding_features
        .iter()
        .map(|f| f.core.id.as_str())
        .collect();

    let mut out = BTreeMap::new();
    for feature in genome.all_features() {
        let missing = confirm_feature_relationships(feature, &genes, &mrnas, &cdss, &non_coding);
        if !missing.is_empty() {
            out.insert(feature.id().to_string(), missing);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::feature::{Cds, FeatureCore, Gene, Mrna};
    use pretty_assertions::assert_eq;

    fn core(id: &str, locs: Vec<Location>) -> FeatureCore {
        FeatureCore {
            id: id.to_string(),
            location: locs,
            ..Default::default()
        }
    }

    fn gene(id: &str, locs: Vec<Location>, cdss: Vec<&str>, mrnas: Vec<&str>) -> Gene {
        Gene {
            core: core(id, locs),
            cdss: cdss.into_iter().map(str::to_string).collect(),
            mrnas: mrnas.into_iter().map(str::to_string).collect(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_graph_buries_parented_children() {
        let genome = Genome {
            features: vec![gene(
                "g1",
                vec![Location::new("c1", 100, "+", 300)],
                vec!["cds1"],
                vec![],
            )],
            cdss: vec![
                Cds {
                    core: core("cds1", vec![Location::new("c1", 120, "+", 90)]),
                    parent_gene: Some("g1".to_string()),
                    parent_mrna: None,
                },
                Cds {
                    core: core("cds_orphan", vec![Location::new("c1", 500, "+", 90)]),
                    parent_gene: None,
                    parent_mrna: None,
                },
            ],
            ..Default::default()
        };
        let graph = FeatureGraph::build(&genome);
        let top: Vec<&str> = graph.top_level("c1").iter().map(|f| f.id()).collect();
        assert_eq!(top, vec!["g1", "cds_orphan"]);
        assert!(graph.get("cds1").is_some());
    }

    #[test]
    fn test_graph_orders_by_start_then_kind() {
        let genome = Genome {
            features: vec![gene("g1", vec![Location::new("c1", 100, "+", 200)], vec![], vec![])],
            mrnas: vec![Mrna {
                core: core("m_orphan", vec![Location::new("c1", 100, "+", 50)]),
                parent_gene: None,
                cds: None,
            }],
            non_coding_features: vec![crate::bio::feature::NonCodingFeature {
                core: core("nc1", vec![Location::new("c1", 50, "+", 20)]),
                kind: "tRNA".to_string(),
                parent_gene: None,
                children: Vec::new(),
            }],
            ..Default::default()
        };
        let graph = FeatureGraph::build(&genome);
        let top: Vec<&str> = graph.top_level("c1").iter().map(|f| f.id()).collect();
        assert_eq!(top, vec!["nc1", "g1", "m_orphan"]);
    }

    #[test]
    fn test_contigs_prefer_declared_order() {
        let genome = Genome {
            contig_ids: vec!["c2".to_string(), "c1".to_string()],
            features: vec![gene("g1", vec![Location::new("c1", 1, "+", 10)], vec![], vec![])],
            ..Default::default()
        };
        let graph = FeatureGraph::build(&genome);
        assert_eq!(graph.contigs(), vec!["c2", "c1"]);
    }

    #[test]
    fn test_is_parent_gene_containment() {
        let g = gene("g1", vec![Location::new("c1", 100, "+", 300)], vec![], vec![]);
        let inside = Cds {
            core: core("cds1", vec![Location::new("c1", 150, "+", 60)]),
            parent_gene: None,
            parent_mrna: None,
        };
        let outside = Cds {
            core: core("cds2", vec![Location::new("c1", 390, "+", 60)]),
            parent_gene: None,
            parent_mrna: None,
        };
        assert!(is_parent(FeatureRef::Gene(&g), FeatureRef::Cds(&inside)));
        assert!(!is_parent(FeatureRef::Gene(&g), FeatureRef::Cds(&outside)));
    }

    #[test]
    fn test_is_parent_spliced_mrna_cds_boundaries() {
        // mRNA with two exons; the CDS trims only the outer boundaries
        let mrna = Mrna {
            core: core(
                "m1",
                vec![
                    Location::new("c1", 100, "+", 100),
                    Location::new("c1", 300, "+", 100),
                ],
            ),
            parent_gene: None,
            cds: None,
        };
        let good = Cds {
            core: core(
                "cds1",
                vec![
                    Location::new("c1", 130, "+", 70),
                    Location::new("c1", 300, "+", 60),
                ],
            ),
            parent_gene: None,
            parent_mrna: None,
        };
        assert!(is_parent(FeatureRef::Mrna(&mrna), FeatureRef::Cds(&good)));

        // first CDS segment must end where the matched exon ends
        let bad = Cds {
            core: core(
                "cds2",
                vec![
                    Location::new("c1", 130, "+", 60),
                    Location::new("c1", 300, "+", 60),
                ],
            ),
            parent_gene: None,
            parent_mrna: None,
        };
        assert!(!is_parent(FeatureRef::Mrna(&mrna), FeatureRef::Cds(&bad)));
    }

    #[test]
    fn test_confirm_relationships_reports_missing_and_empty_parents() {
        let genome = Genome {
            features: vec![gene(
                "g1",
                vec![Location::new("c1", 100, "+", 300)],
                vec!["cds1", "cds_gone"],
                vec![],
            )],
            cdss: vec![Cds {
                core: core("cds1", vec![Location::new("c1", 120, "+", 90)]),
                parent_gene: Some(String::new()),
                parent_mrna: None,
            }],
            ..Default::default()
        };
        let report = confirm_genome_feature_relationships(&genome);
        assert_eq!(report["g1"]["cdss"], vec!["cds_gone"]);
        assert_eq!(report["cds1"]["parent_gene"], vec![""]);
    }
}
