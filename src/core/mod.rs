//! Core primitives shared by every subsystem.
//!
//! Storage (records, broker, db, collection codec), configuration, time and
//! output helpers live here; subsystems only talk to the store through
//! [`records::RecordStore`].

pub mod broker;
pub mod collection;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod records;
pub mod schemas;
pub mod store;
pub mod time;
