//! INI text codec for `mrgaze.cfg`.
//!
//! File format:
//! ```text
//! [VIDEO]
//! inputextension = .mpg
//! inputfps = 29.97
//!
//! [OUTPUT]
//! verbose = True
//! ```
//!
//! Reading rules:
//! - Blank lines and lines starting with `#` or `;` are skipped.
//! - `[name]` opens a section; opening the same name again merges into it.
//! - `key = value` or `key: value`, split at the first `=` or `:`.  Keys are
//!   lower-cased.  The first `;` in a value starts an inline comment if
//!   whitespace precedes it.
//! - An indented line directly after an option continues its value on a new
//!   line.
//!
//! Parsing is all-or-nothing: any error means no configuration is returned.

use std::fmt::Write;

use thiserror::Error;

use crate::domain::configuration::{Configuration, DEFAULT_SECTION};

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number.
    pub line: usize,
    /// The line as it appeared in the input.
    pub content: String,
}

/// Errors that can occur while parsing configuration text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An option (or any non-comment text) appeared before the first
    /// `[section]` header.
    #[error("line {line}: file contains no section headers before {content:?}")]
    MissingSectionHeader { line: usize, content: String },

    /// One or more lines are neither headers, options nor continuations.
    #[error("malformed configuration: {}", describe(.lines))]
    Malformed { lines: Vec<MalformedLine> },
}

fn describe(lines: &[MalformedLine]) -> String {
    lines
        .iter()
        .map(|l| format!("line {}: {:?}", l.line, l.content))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses configuration text.
///
/// # Errors
///
/// - [`ParseError::MissingSectionHeader`] as soon as content appears before
///   any section header.
/// - [`ParseError::Malformed`] listing every unparseable line, reported after
///   the whole text has been read.
///
/// # Examples
///
/// ```rust
/// use mrgaze_core::parse_config;
///
/// let cfg = parse_config("[VIDEO]\nrotate = 90\n").unwrap();
/// assert_eq!(cfg.get("VIDEO", "rotate").unwrap(), "90");
/// ```
pub fn parse_config(text: &str) -> Result<Configuration, ParseError> {
    let mut config = Configuration::new();
    let mut current_section: Option<String> = None;
    let mut current_option: Option<String> = None;
    let mut malformed = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if line.trim().is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        // Continuation of the previous option's value.
        if line.starts_with(char::is_whitespace) {
            if let (Some(section), Some(option)) = (&current_section, &current_option) {
                if let Some(value) = config.section_entry(section).get_mut(option) {
                    value.push('\n');
                    value.push_str(line.trim());
                }
                continue;
            }
        }

        if let Some(name) = section_header(line) {
            config.section_entry(name);
            current_section = Some(name.to_string());
            current_option = None;
            continue;
        }

        let Some(section) = &current_section else {
            return Err(ParseError::MissingSectionHeader {
                line: line_no,
                content: line.to_string(),
            });
        };

        match option_line(line) {
            Some((key, value)) => {
                let entry = config.section_entry(section);
                entry.insert(key, value);
                current_option = Some(key.to_lowercase());
            }
            None => {
                malformed.push(MalformedLine {
                    line: line_no,
                    content: line.to_string(),
                });
            }
        }
    }

    if malformed.is_empty() {
        Ok(config)
    } else {
        Err(ParseError::Malformed { lines: malformed })
    }
}

/// Serialises a configuration to text.
///
/// `DEFAULT` comes first when it holds any options, followed by every section
/// in insertion order.  Each section ends with a blank line.  Values spanning
/// several lines are written with tab-indented continuation lines.
pub fn serialize_config(config: &Configuration) -> String {
    let mut out = String::new();
    if !config.defaults().is_empty() {
        write_section(&mut out, DEFAULT_SECTION, config.defaults().iter());
    }
    for section in config.iter_sections() {
        write_section(&mut out, section.name(), section.iter());
    }
    out
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn write_section<'a>(
    out: &mut String,
    name: &str,
    options: impl Iterator<Item = (&'a str, &'a str)>,
) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "[{name}]");
    for (key, value) in options {
        let _ = writeln!(out, "{key} = {}", value.replace('\n', "\n\t"));
    }
    out.push('\n');
}

/// Returns the section name if `line` is a `[name]` header.  Text after the
/// closing bracket is ignored.
fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    let name = &rest[..end];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Splits an option line into `(key, value)` with inline comments removed.
fn option_line(line: &str) -> Option<(&str, String)> {
    let split = line.find(|c: char| c == '=' || c == ':')?;
    let key = line[..split].trim_end();
    if key.is_empty() || key.starts_with(char::is_whitespace) {
        return None;
    }

    let mut value = &line[split + 1..];
    if let Some(pos) = inline_comment_start(value) {
        value = &value[..pos];
    }
    let value = value.trim();
    let value = if value == "\"\"" { "" } else { value };
    Some((key, value.to_string()))
}

/// Position of the first `;` when it follows whitespace.  Later `;`s are
/// never comment markers.
fn inline_comment_start(value: &str) -> Option<usize> {
    let pos = value.find(';')?;
    value[..pos].ends_with(char::is_whitespace).then_some(pos)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
