//! Persistence layer over the relational schema.
pub mod catalog;
pub mod orders;
pub mod settings;
