//! Infrastructure layer for the configuration tool.
//!
//! Contains the file-system adapter that reads and writes `mrgaze.cfg`.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `mrgaze_core`, but MUST NOT be imported by the `application` layer.

pub mod storage;
