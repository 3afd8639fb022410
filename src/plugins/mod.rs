//! Subsystem implementations.

pub mod articles;
pub mod financial;
pub mod ledger;
pub mod settings;
pub mod shops;
