pub mod export;
pub mod migrate;

use crate::bio::genome::Genome;
use crate::core::Migrator;
use crate::services::NullProvider;
use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

/// Loads a genome document, migrating it first when it predates the
/// canonical model.
pub fn load_genome(path: &Path) -> anyhow::Result<Genome> {
    let file =
        File::open(path).with_context(|| format!("opening genome {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing genome {}", path.display()))?;
    if doc.get("feature_counts").is_none() {
        warn!("Updating legacy genome");
        let migrator = Migrator::new(&NullProvider, &NullProvider);
        return Ok(migrator.migrate(doc)?);
    }
    Ok(serde_json::from_value(doc)?)
}
