//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Choosing between the subject/session file and the data directory file.
//! - Writing the default configuration on first use.
//! - Writing changes back to the data directory file.

pub mod config;
