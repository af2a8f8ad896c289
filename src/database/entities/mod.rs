pub mod entity;
pub mod entity_relationship;
pub mod types;

pub use entity_relationship::Patient;
pub use types::*;
