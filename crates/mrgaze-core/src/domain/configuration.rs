//! The configuration domain entity.
//!
//! A [`Configuration`] is an ordered mapping of section name → ordered mapping
//! of option name → string value.  No type coercion happens here: every value
//! is stored exactly as text, and callers parse booleans, numbers and lists
//! on read (see [`crate::domain::typed`]).
//!
//! # Naming rules
//!
//! - Section names are case-sensitive (`VIDEO` and `video` are different).
//! - Option names are folded to lower case on every insert and lookup, so
//!   `InputFPS` and `inputfps` address the same option.
//! - The reserved [`DEFAULT_SECTION`] holds fall-back values consulted by
//!   [`Configuration::get`] when a section lacks an option.  It never appears
//!   in [`Configuration::sections`] and cannot be created with
//!   [`Configuration::add_section`].
//!
//! Sections and options keep insertion order so that a written file lists
//! them in the order they were added.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::codec::ini::{parse_config, serialize_config, ParseError};
use crate::domain::typed::ValueKind;

/// Name of the reserved fall-back section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Errors raised by operations on a [`Configuration`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// `add_section` was called for a section that already exists.
    #[error("section already exists: {0}")]
    DuplicateSection(String),

    /// The name is reserved and cannot be used as a regular section.
    #[error("invalid section name: {0}")]
    InvalidSectionName(String),

    /// The section does not exist.
    #[error("no section: {0}")]
    NoSection(String),

    /// The option does not exist in the section (nor in `DEFAULT`).
    #[error("no option '{option}' in section '{section}'")]
    NoOption { section: String, option: String },

    /// The stored text could not be parsed as the requested type.
    #[error("invalid value for [{section}] {option}: expected {expected}, got {value:?}")]
    InvalidValue {
        section: String,
        option: String,
        value: String,
        expected: ValueKind,
    },
}

/// Folds an option name to its canonical (lower-case) form.
pub fn normalize_option(option: &str) -> String {
    option.to_lowercase()
}

// ── Section ───────────────────────────────────────────────────────────────────

/// One named block of `option = value` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    options: Vec<(String, String)>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Returns the section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of `option` in this section only (no `DEFAULT`
    /// fall-back).
    pub fn get(&self, option: &str) -> Option<&str> {
        let key = normalize_option(option);
        self.options
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(option, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of options in this section.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if the section holds no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Inserts or replaces an option.  Replacing keeps the original position.
    pub(crate) fn insert(&mut self, option: &str, value: String) {
        let key = normalize_option(option);
        match self.options.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.options.push((key, value)),
        }
    }

    pub(crate) fn get_mut(&mut self, option: &str) -> Option<&mut String> {
        let key = normalize_option(option);
        self.options
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    fn remove(&mut self, option: &str) -> bool {
        let key = normalize_option(option);
        let before = self.options.len();
        self.options.retain(|(k, _)| *k != key);
        self.options.len() != before
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.options.len()))?;
        for (option, value) in &self.options {
            map.serialize_entry(option, value)?;
        }
        map.end()
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// An in-memory snapshot of a `mrgaze.cfg` file.
///
/// Mutations never persist on their own; writing back to disk is a separate,
/// explicit step performed by the store.
///
/// # Example
///
/// ```rust
/// use mrgaze_core::Configuration;
///
/// let mut cfg = Configuration::new();
/// cfg.add_section("VIDEO").unwrap();
/// cfg.set("VIDEO", "Rotate", "90").unwrap();
/// assert_eq!(cfg.get("VIDEO", "rotate").unwrap(), "90");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    defaults: Section,
    sections: Vec<Section>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    /// Creates an empty configuration with no sections.
    pub fn new() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }

    /// Returns `true` if there are no sections and no `DEFAULT` options.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.defaults.is_empty()
    }

    /// Returns the `DEFAULT` fall-back section.
    pub fn defaults(&self) -> &Section {
        &self.defaults
    }

    /// Iterates over section names in insertion order (excluding `DEFAULT`).
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Iterates over the sections themselves (excluding `DEFAULT`).
    pub fn iter_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Returns the named section, if present.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Returns `true` if the named section exists.  Always `false` for
    /// `DEFAULT`.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Adds a new, empty section.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidSectionName`] for `DEFAULT`.
    /// - [`ConfigError::DuplicateSection`] if the section already exists.
    pub fn add_section(&mut self, name: &str) -> Result<(), ConfigError> {
        if name == DEFAULT_SECTION {
            return Err(ConfigError::InvalidSectionName(name.to_string()));
        }
        if self.has_section(name) {
            return Err(ConfigError::DuplicateSection(name.to_string()));
        }
        self.sections.push(Section::new(name));
        Ok(())
    }

    /// Removes a section and all its options.  Returns `true` if it existed.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        self.sections.len() != before
    }

    /// Sets `option` in `section` to `value`, replacing any previous value.
    ///
    /// `section` may be `DEFAULT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSection`] if the section does not exist.
    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let target = if section == DEFAULT_SECTION {
            &mut self.defaults
        } else {
            self.sections
                .iter_mut()
                .find(|s| s.name == section)
                .ok_or_else(|| ConfigError::NoSection(section.to_string()))?
        };
        target.insert(option, value.into());
        Ok(())
    }

    /// Returns the value of `option` in `section`, falling back to `DEFAULT`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoSection`] if the section does not exist.
    /// - [`ConfigError::NoOption`] if neither the section nor `DEFAULT`
    ///   defines the option.
    pub fn get(&self, section: &str, option: &str) -> Result<&str, ConfigError> {
        let found = if section == DEFAULT_SECTION {
            self.defaults.get(option)
        } else {
            let sect = self
                .section(section)
                .ok_or_else(|| ConfigError::NoSection(section.to_string()))?;
            sect.get(option).or_else(|| self.defaults.get(option))
        };
        found.ok_or_else(|| ConfigError::NoOption {
            section: section.to_string(),
            option: normalize_option(option),
        })
    }

    /// Returns `true` if `option` resolves in `section` (including through
    /// `DEFAULT`).  A missing section yields `false`.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.get(section, option).is_ok()
    }

    /// Lists the options visible in `section`: its own options followed by any
    /// `DEFAULT` options it does not override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSection`] if the section does not exist.
    pub fn options(&self, section: &str) -> Result<Vec<&str>, ConfigError> {
        Ok(self.items(section)?.into_iter().map(|(k, _)| k).collect())
    }

    /// Lists the `(option, value)` pairs visible in `section`, in the same
    /// order as [`Configuration::options`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSection`] if the section does not exist.
    pub fn items(&self, section: &str) -> Result<Vec<(&str, &str)>, ConfigError> {
        let sect = self
            .section(section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))?;
        let mut items: Vec<(&str, &str)> = sect.iter().collect();
        for (key, value) in self.defaults.iter() {
            if sect.get(key).is_none() {
                items.push((key, value));
            }
        }
        Ok(items)
    }

    /// Removes `option` from `section`.  Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSection`] if the section does not exist.
    pub fn remove_option(&mut self, section: &str, option: &str) -> Result<bool, ConfigError> {
        if section == DEFAULT_SECTION {
            return Ok(self.defaults.remove(option));
        }
        let sect = self
            .sections
            .iter_mut()
            .find(|s| s.name == section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))?;
        Ok(sect.remove(option))
    }

    /// Returns the named section for writing, creating it if necessary.
    /// Re-opening an existing section merges into it, as the parser requires.
    pub(crate) fn section_entry(&mut self, name: &str) -> &mut Section {
        if name == DEFAULT_SECTION {
            return &mut self.defaults;
        }
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_config(self))
    }
}

impl FromStr for Configuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_config(s)
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_defaults = !self.defaults.is_empty();
        let len = self.sections.len() + usize::from(has_defaults);
        let mut map = serializer.serialize_map(Some(len))?;
        if has_defaults {
            map.serialize_entry(DEFAULT_SECTION, &self.defaults)?;
        }
        for section in &self.sections {
            map.serialize_entry(&section.name, section)?;
        }
        map.end()
    }
}

// ── Origin ────────────────────────────────────────────────────────────────────

/// Where a resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from the subject/session directory's `mrgaze.cfg`.
    Session(PathBuf),
    /// Read from the data directory's `mrgaze.cfg`.
    Root(PathBuf),
    /// No file existed; defaults were written to the data directory.
    CreatedDefault(PathBuf),
}

impl ConfigOrigin {
    /// The file the configuration was read from or written to.
    pub fn path(&self) -> &Path {
        match self {
            ConfigOrigin::Session(p) | ConfigOrigin::Root(p) | ConfigOrigin::CreatedDefault(p) => {
                p.as_path()
            }
        }
    }
}

/// A configuration together with the file it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub config: Configuration,
    pub origin: ConfigOrigin,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Session(p) => write!(f, "session config {}", p.display()),
            ConfigOrigin::Root(p) => write!(f, "root config {}", p.display()),
            ConfigOrigin::CreatedDefault(p) => write!(f, "new default config {}", p.display()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn video_config() -> Configuration {
        let mut cfg = Configuration::new();
        cfg.add_section("VIDEO").unwrap();
        cfg.set("VIDEO", "inputextension", ".mpg").unwrap();
        cfg.set("VIDEO", "rotate", "0").unwrap();
        cfg
    }

    #[test]
    fn test_new_configuration_is_empty() {
        let cfg = Configuration::new();
        assert!(cfg.is_empty());
        assert_eq!(cfg.sections().count(), 0);
    }

    #[test]
    fn test_add_section_twice_returns_duplicate_section() {
        // Arrange
        let mut cfg = Configuration::new();
        cfg.add_section("VIDEO").unwrap();

        // Act
        let result = cfg.add_section("VIDEO");

        // Assert
        assert_eq!(result, Err(ConfigError::DuplicateSection("VIDEO".to_string())));
    }

    #[test]
    fn test_add_default_section_is_rejected() {
        let mut cfg = Configuration::new();
        assert_eq!(
            cfg.add_section(DEFAULT_SECTION),
            Err(ConfigError::InvalidSectionName("DEFAULT".to_string()))
        );
    }

    #[test]
    fn test_section_names_are_case_sensitive() {
        let mut cfg = Configuration::new();
        cfg.add_section("VIDEO").unwrap();
        assert!(cfg.add_section("video").is_ok());
        assert_eq!(cfg.sections().collect::<Vec<_>>(), vec!["VIDEO", "video"]);
    }

    #[test]
    fn test_set_on_missing_section_returns_no_section() {
        let mut cfg = Configuration::new();
        let result = cfg.set("VIDEO", "rotate", "0");
        assert_eq!(result, Err(ConfigError::NoSection("VIDEO".to_string())));
    }

    #[test]
    fn test_set_replaces_value_and_keeps_position() {
        // Arrange
        let mut cfg = video_config();

        // Act
        cfg.set("VIDEO", "inputextension", ".avi").unwrap();

        // Assert
        let items = cfg.items("VIDEO").unwrap();
        assert_eq!(items, vec![("inputextension", ".avi"), ("rotate", "0")]);
    }

    #[test]
    fn test_option_names_are_case_insensitive() {
        let mut cfg = video_config();
        cfg.set("VIDEO", "ROTATE", "90").unwrap();
        assert_eq!(cfg.get("VIDEO", "Rotate").unwrap(), "90");
        assert_eq!(cfg.section("VIDEO").unwrap().len(), 2);
    }

    #[test]
    fn test_get_missing_option_returns_no_option() {
        let cfg = video_config();
        assert_eq!(
            cfg.get("VIDEO", "border"),
            Err(ConfigError::NoOption {
                section: "VIDEO".to_string(),
                option: "border".to_string(),
            })
        );
    }

    #[test]
    fn test_get_missing_section_returns_no_section() {
        let cfg = video_config();
        assert!(matches!(cfg.get("RANSAC", "maxiterations"), Err(ConfigError::NoSection(_))));
    }

    #[test]
    fn test_get_falls_back_to_default_section() {
        // Arrange
        let mut cfg = video_config();
        cfg.set(DEFAULT_SECTION, "border", "16").unwrap();

        // Act / Assert
        assert_eq!(cfg.get("VIDEO", "border").unwrap(), "16");
        assert!(cfg.has_option("VIDEO", "border"));
        assert!(!cfg.has_section(DEFAULT_SECTION));
    }

    #[test]
    fn test_section_value_overrides_default_section() {
        let mut cfg = video_config();
        cfg.set(DEFAULT_SECTION, "rotate", "180").unwrap();
        assert_eq!(cfg.get("VIDEO", "rotate").unwrap(), "0");
        assert_eq!(cfg.options("VIDEO").unwrap(), vec!["inputextension", "rotate"]);
    }

    #[test]
    fn test_options_include_unshadowed_defaults_last() {
        let mut cfg = video_config();
        cfg.set(DEFAULT_SECTION, "verbose", "True").unwrap();
        assert_eq!(
            cfg.options("VIDEO").unwrap(),
            vec!["inputextension", "rotate", "verbose"]
        );
    }

    #[test]
    fn test_remove_option_and_section() {
        let mut cfg = video_config();
        assert!(cfg.remove_option("VIDEO", "rotate").unwrap());
        assert!(!cfg.remove_option("VIDEO", "rotate").unwrap());
        assert!(cfg.remove_section("VIDEO"));
        assert!(!cfg.remove_section("VIDEO"));
        assert!(cfg.is_empty());
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let mut a = Configuration::new();
        a.add_section("A").unwrap();
        a.add_section("B").unwrap();
        let mut b = Configuration::new();
        b.add_section("B").unwrap();
        b.add_section("A").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialize_to_json_nests_sections() {
        let cfg = video_config();
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["VIDEO"]["inputextension"], ".mpg");
        assert_eq!(json["VIDEO"]["rotate"], "0");
    }

    #[test]
    fn test_origin_path_and_display() {
        let origin = ConfigOrigin::Root(PathBuf::from("/tmp/study/mrgaze.cfg"));
        assert_eq!(origin.path(), Path::new("/tmp/study/mrgaze.cfg"));
        assert_eq!(origin.to_string(), "root config /tmp/study/mrgaze.cfg");
    }
}
