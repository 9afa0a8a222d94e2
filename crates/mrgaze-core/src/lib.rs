//! # mrgaze-core
//!
//! Shared library for the MrGaze eye-tracking pipeline containing the
//! configuration model, the built-in default settings, a typed accessor layer
//! and the INI text codec used for `mrgaze.cfg` files.
//!
//! This crate never touches the file system.  Resolving which file to read
//! and writing defaults to disk is the job of the `mrgaze-config` crate.
//!
//! # Architecture overview (for beginners)
//!
//! Every stage of the pipeline (video I/O, pupil segmentation, RANSAC ellipse
//! fitting, artifact rejection, calibration) reads its parameters from one
//! INI-style file.  The file holds nothing but text: a `[SECTION]` header
//! followed by `key = value` lines.  This crate provides:
//!
//! - **`domain`** – The [`Configuration`] type (ordered sections of ordered
//!   string options), the default table and the parse-on-read typed getters.
//!
//! - **`codec`** – Conversion between [`Configuration`] and the on-disk text
//!   format.

pub mod codec;
pub mod domain;

pub use codec::ini::{parse_config, serialize_config, MalformedLine, ParseError};
pub use domain::configuration::{
    ConfigError, ConfigOrigin, Configuration, ResolvedConfig, Section, DEFAULT_SECTION,
};
pub use domain::defaults::{default_config, init_defaults, DEFAULT_SECTIONS};
pub use domain::typed::{expected_kind, Value, ValueKind};
