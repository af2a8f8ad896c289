pub mod entity_relationship_service;
pub mod entity_service;

pub use entity_relationship_service::*;
pub use entity_service::*;
