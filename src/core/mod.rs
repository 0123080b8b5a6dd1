pub mod graph;
pub mod migrator;
pub mod schema;
pub mod size_guard;
pub mod validator;

pub use graph::FeatureGraph;
pub use migrator::Migrator;
pub use schema::SchemaVersion;
