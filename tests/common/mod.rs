use genofile::bio::taxonomy::{LineageNode, TaxonInfo};
use genofile::services::{AssemblyProvider, AssemblyStats, SequenceProvider, TaxonProvider};
use serde_json::{json, Value};

/// Taxon provider with a single hardcoded E. coli entry under id 562.
pub struct StubTaxa;

impl TaxonProvider for StubTaxa {
    fn fetch_taxon(&self, tax_id: &str) -> anyhow::Result<TaxonInfo> {
        if tax_id != "562" {
            anyhow::bail!("unknown taxon {tax_id}");
        }
        Ok(TaxonInfo {
            scientific_name: "Escherichia coli".to_string(),
            genetic_code: 11,
            lineage: vec![
                LineageNode {
                    scientific_name: "root".to_string(),
                    rank: "no rank".to_string(),
                },
                LineageNode {
                    scientific_name: "Bacteria".to_string(),
                    rank: "superkingdom".to_string(),
                },
                LineageNode {
                    scientific_name: "Escherichia coli".to_string(),
                    rank: "species".to_string(),
                },
            ],
        })
    }
}

/// Assembly provider with fixed statistics.
pub struct StubAssemblies;

impl AssemblyProvider for StubAssemblies {
    fn fetch_assembly_stats(&self, _assembly_ref: &str) -> anyhow::Result<AssemblyStats> {
        Ok(AssemblyStats {
            gc_content: Some(0.507),
            dna_size: 4_641_652,
            md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            num_contigs: 1,
            assembly_type: Some("Isolate".to_string()),
        })
    }
}

/// Sequence provider returning a fixed sequence for any contig.
pub struct StubSequences;

impl SequenceProvider for StubSequences {
    fn fetch_sequence(&self, _contig_id: &str) -> anyhow::Result<String> {
        Ok("ATGC".repeat(250))
    }
}

/// A legacy genome document: flat `features` list mixing genes, a CDS and
/// an mRNA, bare aliases, a singular `function`, and inline ontology
/// evidence. No `feature_counts`, so schema detection sees it as legacy.
pub fn legacy_genome_doc() -> Value {
    json!({
        "scientific_name": "Escherichia coli",
        "domain": "Bacteria",
        "genetic_code": 11,
        "source": "RefSeq Reference",
        "taxon_assignments": {"ncbi": "562"},
        "assembly_ref": "1/2/3",
        "molecule_type": "DNA",
        "contig_ids": ["c1"],
        "features": [
            {
                "id": "g1",
                "type": "gene",
                "location": [["c1", 100, "+", 300]],
                "function": "DNA gyrase subunit B; ATPase",
                "aliases": ["gyrB"],
                "cdss": ["cds1"],
                "ontology_terms": {
                    "GO": {
                        "GO:0003918": {
                            "id": "GO:0003918",
                            "term_name": "DNA topoisomerase activity",
                            "ontology_ref": "ref/go",
                            "evidence": [
                                {"method": "interproscan", "method_version": "5.2"}
                            ]
                        }
                    }
                }
            },
            {
                "id": "nc_gene",
                "type": "gene",
                "location": [["c1", 900, "-", 80]]
            },
            {
                "id": "cds1",
                "type": "CDS",
                "location": [["c1", 100, "+", 300]],
                "parent_gene": "g1",
                "protein_translation": "MKT"
            },
            {
                "id": "m1",
                "type": "mRNA",
                "location": [["c1", 100, "+", 300]]
            }
        ]
    })
}

/// An already-canonical genome document with the four collections split
/// out and `feature_counts` present.
pub fn canonical_genome_doc() -> Value {
    json!({
        "scientific_name": "Escherichia coli",
        "domain": "Bacteria",
        "taxonomy": "Bacteria; Proteobacteria; Escherichia coli",
        "genetic_code": 11,
        "source": "RefSeq",
        "genome_tiers": ["Reference", "Representative", "ExternalDB"],
        "molecule_type": "DNA",
        "contig_ids": ["c1"],
        "dna_size": 4641652u64,
        "md5": "d41d8cd98f00b204e9800998ecf8427e",
        "gc_content": 0.507,
        "num_contigs": 1,
        "feature_counts": {"gene": 1, "CDS": 1},
        "features": [
            {
                "id": "g1",
                "location": [["c1", 100, "+", 300]],
                "functions": ["DNA gyrase subunit B"],
                "cdss": ["cds1"]
            }
        ],
        "cdss": [
            {
                "id": "cds1",
                "location": [["c1", 100, "+", 300]],
                "parent_gene": "g1",
                "protein_translation": "MKT",
                "protein_md5": "91c8e49823442d4effdc0d3d4cdef08c"
            }
        ],
        "mrnas": [],
        "non_coding_features": [],
        "warnings": []
    })
}
