//! Domain entities for the MrGaze configuration.
//!
//! Pure data and rules with no file-system or process dependencies.  Code in
//! outer layers (the store, the command-line tool) depends on this module,
//! never the other way round.

/// Ordered, string-valued sections and options.
///
/// See [`configuration::Configuration`] for the main type.
pub mod configuration;
pub mod defaults;
pub mod typed;
