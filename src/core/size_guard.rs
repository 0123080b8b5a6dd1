use crate::bio::genome::Genome;
use crate::{GenofileError, Result};
use std::fmt;
use tracing::{debug, warn};

/// Per-collection, per-field byte sizes gathered while shrinking an
/// oversized genome. Carried on the size error so callers can see where
/// the bytes went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeBreakdown(pub Vec<(String, Vec<(String, u64)>)>);

impl fmt::Display for SizeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (collection, fields) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: ", collection)?;
            let rendered: Vec<String> = fields
                .iter()
                .map(|(field, bytes)| format!("{} {}", field, format_size(*bytes)))
                .collect();
            write!(f, "{}", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Renders a byte count with a binary suffix, one decimal place.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:3.1}{}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:3.1}ZiB", value)
}

fn serialized_size(genome: &Genome) -> Result<u64> {
    Ok(serde_json::to_vec(genome)?.len() as u64)
}

fn field_sizes(value: &serde_json::Value) -> Vec<(String, u64)> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(field, v)| (field.clone(), v.to_string().len() as u64))
            .collect(),
        _ => Vec::new(),
    }
}

/// Shrinks a genome that serializes beyond `limit` bytes by dropping the
/// bulky `dna_sequence` field, one feature collection at a time, re-checking
/// the size after each. Fails with a per-field breakdown if the genome is
/// still oversized after all four collections have been stripped.
pub fn enforce_size_limit(genome: &mut Genome, limit: u64) -> Result<()> {
    let mut total = serialized_size(genome)?;
    if total <= limit {
        return Ok(());
    }
    warn!(
        total,
        limit, "genome exceeds size limit, dropping feature dna_sequence fields"
    );

    let mut breakdown = SizeBreakdown::default();
    for collection in ["mrnas", "features", "non_coding_features", "cdss"] {
        let mut fields: Vec<(String, u64)> = Vec::new();
        match collection {
            "mrnas" => {
                for f in &mut genome.mrnas {
                    f.core.dna_sequence = None;
                }
                if let Some(first) = genome.mrnas.first() {
                    fields = field_sizes(&serde_json::to_value(first)?);
                }
            }
            "features" => {
                for f in &mut genome.features {
                    f.core.dna_sequence = None;
                }
                if let Some(first) = genome.features.first() {
                    fields = field_sizes(&serde_json::to_value(first)?);
                }
            }
            "non_coding_features" => {
                for f in &mut genome.non_coding_features {
                    f.core.dna_sequence = None;
                }
                if let Some(first) = genome.non_coding_features.first() {
                    fields = field_sizes(&serde_json::to_value(first)?);
                }
            }
            _ => {
                for f in &mut genome.cdss {
                    f.core.dna_sequence = None;
                }
                if let Some(first) = genome.cdss.first() {
                    fields = field_sizes(&serde_json::to_value(first)?);
                }
            }
        }
        breakdown.0.push((collection.to_string(), fields));

        total = serialized_size(genome)?;
        debug!(collection, total, "re-measured after stripping sequences");
        if total <= limit {
            return Ok(());
        }
    }

    Err(GenofileError::SizeExceeded {
        total,
        limit,
        breakdown,
    })
}
