pub mod connection;
pub mod entities;
pub mod migrations;
pub mod seed_data;

pub use connection::*;
pub use entities::*;
