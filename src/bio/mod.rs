pub mod fasta;
pub mod feature;
pub mod genome;
pub mod location;
pub mod taxonomy;

pub use feature::{Cds, FeatureCore, FeatureRef, Gene, Mrna, NonCodingFeature};
pub use genome::Genome;
pub use location::Location;
