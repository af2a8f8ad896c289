pub mod entities;
pub mod entity_relationships;
pub mod health;
pub mod hello;
