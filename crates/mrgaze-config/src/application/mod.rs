//! Application layer use cases for the configuration tool.
//!
//! Use cases here orchestrate the domain types from `mrgaze_core` to fulfil a
//! user goal ("change one option for this study", "reset to defaults").  They
//! depend on the [`manage_config::ConfigRepository`] trait rather than on the
//! file system, so they can be tested against an in-memory repository.

pub mod manage_config;
