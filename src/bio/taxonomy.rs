use serde::{Deserialize, Serialize};

/// One node of an NCBI lineage, most general first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageNode {
    pub scientific_name: String,
    pub rank: String,
}

/// Taxon data returned by the taxonomy collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonInfo {
    pub scientific_name: String,
    pub genetic_code: i64,
    pub lineage: Vec<LineageNode>,
}

impl TaxonInfo {
    /// Human-readable lineage string: names joined with "; ", the `root`
    /// node dropped, embedded newlines stripped.
    pub fn taxonomy_string(&self) -> String {
        self.lineage
            .iter()
            .filter(|node| node.scientific_name != "root")
            .map(|node| node.scientific_name.as_str())
            .collect::<Vec<_>>()
            .join("; ")
            .replace('\n', "")
    }

    /// The lineage's superkingdom, which NCBI taxonomy calls the domain.
    pub fn domain(&self) -> Option<&str> {
        self.lineage
            .iter()
            .find(|node| node.rank == "superkingdom")
            .map(|node| node.scientific_name.as_str())
    }
}
