pub mod bio;
pub mod cli;
pub mod core;
pub mod export;
pub mod services;

pub use crate::bio::genome::Genome;
pub use crate::core::migrator::Migrator;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenofileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(
        "genome size of {} exceeds the maximum permitted size of {}; \
         breakdown for feature lists and their respective sizes: {breakdown}",
        crate::core::size_guard::format_size(*.total),
        crate::core::size_guard::format_size(*.limit)
    )]
    SizeExceeded {
        total: u64,
        limit: u64,
        breakdown: crate::core::size_guard::SizeBreakdown,
    },

    #[error("unable to render feature {feature_id}: {reason}")]
    Render { feature_id: String, reason: String },

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GenofileError>;
