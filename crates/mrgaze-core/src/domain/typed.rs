//! Parse-on-read typed accessors.
//!
//! The file format stores every value as text.  Pipeline stages need numbers,
//! flags and lists, so this module parses the stored text on each read and
//! reports [`ConfigError::InvalidValue`] when it does not fit.  Nothing here
//! changes what is written to disk.
//!
//! [`expected_kind`] declares the type of every built-in option, which lets
//! [`Configuration::get_typed`] return a [`Value`] without the caller naming
//! the type.

use std::fmt;

use crate::domain::configuration::{ConfigError, Configuration};

/// The type a configuration value is expected to parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bool,
    Int,
    Float,
    FloatList,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::FloatList => "list of floats",
        };
        f.write_str(name)
    }
}

/// A configuration value parsed according to its [`ValueKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    FloatList(Vec<f64>),
}

/// Returns the declared type of a built-in option, or `None` for options the
/// pipeline does not define.  `option` is matched case-insensitively.
pub fn expected_kind(section: &str, option: &str) -> Option<ValueKind> {
    use ValueKind::*;

    let option = option.to_lowercase();
    let kind = match (section, option.as_str()) {
        ("VIDEO", "inputextension" | "outputextension") => Text,
        ("VIDEO", "inputfps" | "gauss_sd") => Float,
        ("VIDEO", "downsampling" | "border" | "rotate") => Int,

        ("PUPILSEG", "method") => Text,
        ("PUPILSEG", "pupil_percmax" | "glint_percmax" | "pupil_threshold") => Float,
        ("PUPILSEG", "k_inpaint" | "k_dil") => Int,
        ("PUPILSEG", "histogram_equalization") => Bool,

        ("RANSAC", "maxiterations" | "maxrefinements") => Int,
        ("RANSAC", "maxinlierperc") => Float,

        ("LBP", "enabled") => Bool,
        ("LBP", "minneighbors") => Int,
        ("LBP", "scalefactor") => Float,

        ("ARTIFACTS", "mrclean") => Bool,
        ("ARTIFACTS", "zthresh") => Float,
        ("ARTIFACTS", "motioncorr") => Text,
        ("ARTIFACTS", "mocokernel") => Int,

        ("CALIBRATION", "calibrate") => Bool,
        ("CALIBRATION", "targetx" | "targety") => FloatList,
        ("CALIBRATION", "heatpercmin" | "heatpercmax" | "heatsigma") => Float,

        ("OUTPUT", "verbose" | "graphics" | "overwrite") => Bool,

        _ => return None,
    };
    Some(kind)
}

/// Parses the boolean spellings accepted in configuration files.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `[a, b, c]` (brackets optional) into floats.  `[]` is an empty list.
pub fn parse_float_list(text: &str) -> Option<Vec<f64>> {
    let trimmed = text.trim();
    let inner = match (trimmed.strip_prefix('['), trimmed.ends_with(']')) {
        (Some(rest), true) => &rest[..rest.len() - 1],
        (None, false) => trimmed,
        _ => return None,
    };
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|item| item.trim().parse::<f64>().ok())
        .collect()
}

/// Formats floats the way the default lists are written (`[0.5, 1.0]`).
pub fn format_float_list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", items.join(", "))
}

impl Configuration {
    fn parse_with<T>(
        &self,
        section: &str,
        option: &str,
        expected: ValueKind,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, ConfigError> {
        let raw = self.get(section, option)?;
        parse(raw).ok_or_else(|| ConfigError::InvalidValue {
            section: section.to_string(),
            option: option.to_lowercase(),
            value: raw.to_string(),
            expected,
        })
    }

    /// Reads a boolean (`1/yes/true/on` or `0/no/false/off`, any case).
    pub fn get_bool(&self, section: &str, option: &str) -> Result<bool, ConfigError> {
        self.parse_with(section, option, ValueKind::Bool, parse_bool)
    }

    /// Reads a signed integer.
    pub fn get_int(&self, section: &str, option: &str) -> Result<i64, ConfigError> {
        self.parse_with(section, option, ValueKind::Int, |s| s.trim().parse().ok())
    }

    /// Reads a floating-point number.
    pub fn get_float(&self, section: &str, option: &str) -> Result<f64, ConfigError> {
        self.parse_with(section, option, ValueKind::Float, |s| s.trim().parse().ok())
    }

    /// Reads a bracketed, comma-separated list of floats.
    pub fn get_float_list(&self, section: &str, option: &str) -> Result<Vec<f64>, ConfigError> {
        self.parse_with(section, option, ValueKind::FloatList, parse_float_list)
    }

    /// Reads an option using its declared [`ValueKind`].  Options without a
    /// declared kind are returned as [`Value::Text`].
    pub fn get_typed(&self, section: &str, option: &str) -> Result<Value, ConfigError> {
        match expected_kind(section, option).unwrap_or(ValueKind::Text) {
            ValueKind::Text => Ok(Value::Text(self.get(section, option)?.to_string())),
            ValueKind::Bool => self.get_bool(section, option).map(Value::Bool),
            ValueKind::Int => self.get_int(section, option).map(Value::Int),
            ValueKind::Float => self.get_float(section, option).map(Value::Float),
            ValueKind::FloatList => self.get_float_list(section, option).map(Value::FloatList),
        }
    }

    /// Stores a boolean as `True` or `False`.
    pub fn set_bool(&mut self, section: &str, option: &str, value: bool) -> Result<(), ConfigError> {
        self.set(section, option, if value { "True" } else { "False" })
    }

    /// Stores a list of floats as `[a, b, ...]`.
    pub fn set_float_list(
        &mut self,
        section: &str,
        option: &str,
        values: &[f64],
    ) -> Result<(), ConfigError> {
        self.set(section, option, format_float_list(values))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::defaults::{default_config, DEFAULT_SECTIONS};

    #[test]
    fn test_every_default_option_has_a_declared_kind() {
        for (section, options) in DEFAULT_SECTIONS {
            for (option, _) in options.iter() {
                assert!(
                    expected_kind(section, option).is_some(),
                    "[{section}] {option} has no declared kind"
                );
            }
        }
    }

    #[test]
    fn test_every_default_value_parses_as_its_declared_kind() {
        let cfg = default_config();
        for (section, options) in DEFAULT_SECTIONS {
            for (option, _) in options.iter() {
                let result = cfg.get_typed(section, option);
                assert!(result.is_ok(), "[{section}] {option}: {result:?}");
            }
        }
    }

    #[test]
    fn test_get_typed_returns_expected_variants() {
        let cfg = default_config();
        assert_eq!(cfg.get_typed("VIDEO", "inputfps").unwrap(), Value::Float(29.97));
        assert_eq!(cfg.get_typed("VIDEO", "border").unwrap(), Value::Int(16));
        assert_eq!(cfg.get_typed("LBP", "enabled").unwrap(), Value::Bool(true));
        assert_eq!(
            cfg.get_typed("ARTIFACTS", "motioncorr").unwrap(),
            Value::Text("highpass".to_string())
        );
        assert_eq!(
            cfg.get_typed("CALIBRATION", "targetx").unwrap(),
            Value::FloatList(vec![0.5, 0.1, 0.9, 0.1, 0.1, 0.5, 0.1, 0.9, 0.5])
        );
    }

    #[test]
    fn test_get_typed_unknown_option_is_text() {
        let mut cfg = default_config();
        cfg.set("VIDEO", "note", "42").unwrap();
        assert_eq!(cfg.get_typed("VIDEO", "note").unwrap(), Value::Text("42".to_string()));
    }

    #[test]
    fn test_parse_bool_accepts_classic_spellings() {
        for text in ["1", "yes", "True", "ON", " true "] {
            assert_eq!(parse_bool(text), Some(true), "{text}");
        }
        for text in ["0", "No", "FALSE", "off"] {
            assert_eq!(parse_bool(text), Some(false), "{text}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_get_bool_invalid_value_reports_expected_kind() {
        // Arrange
        let mut cfg = default_config();
        cfg.set("OUTPUT", "verbose", "sometimes").unwrap();

        // Act
        let err = cfg.get_bool("OUTPUT", "verbose").unwrap_err();

        // Assert
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                section: "OUTPUT".to_string(),
                option: "verbose".to_string(),
                value: "sometimes".to_string(),
                expected: ValueKind::Bool,
            }
        );
        assert!(err.to_string().contains("expected boolean"));
    }

    #[test]
    fn test_get_int_rejects_float_text() {
        let mut cfg = default_config();
        cfg.set("VIDEO", "rotate", "90.5").unwrap();
        assert!(matches!(
            cfg.get_int("VIDEO", "rotate"),
            Err(ConfigError::InvalidValue { expected: ValueKind::Int, .. })
        ));
    }

    #[test]
    fn test_get_float_accepts_integer_text() {
        let cfg = default_config();
        assert_eq!(cfg.get_float("RANSAC", "maxinlierperc").unwrap(), 95.0);
    }

    #[test]
    fn test_typed_get_propagates_missing_option() {
        let cfg = default_config();
        assert!(matches!(cfg.get_int("VIDEO", "missing"), Err(ConfigError::NoOption { .. })));
    }

    #[test]
    fn test_parse_float_list_variants() {
        assert_eq!(parse_float_list("[]"), Some(vec![]));
        assert_eq!(parse_float_list("0.5, 1"), Some(vec![0.5, 1.0]));
        assert_eq!(parse_float_list("[0.5,0.25]"), Some(vec![0.5, 0.25]));
        assert_eq!(parse_float_list("[0.5, x]"), None);
        assert_eq!(parse_float_list("[0.5, 0.1"), None);
    }

    #[test]
    fn test_set_float_list_uses_canonical_format() {
        let mut cfg = default_config();
        cfg.set_float_list("CALIBRATION", "targetx", &[0.5, 1.0, 0.25]).unwrap();
        assert_eq!(cfg.get("CALIBRATION", "targetx").unwrap(), "[0.5, 1.0, 0.25]");
    }

    #[test]
    fn test_set_bool_writes_capitalised_words() {
        let mut cfg = default_config();
        cfg.set_bool("OUTPUT", "graphics", true).unwrap();
        assert_eq!(cfg.get("OUTPUT", "graphics").unwrap(), "True");
        assert!(cfg.get_bool("OUTPUT", "graphics").unwrap());
    }
}
