pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export logic types
pub use logic::{Classifier, RelationPath, Replicator};

// Export all model types
pub use model::*;

// Export store types
pub use store::{EntityStore, InMemoryStore, JoinRow, StoreError};
