//! Integration tests for the mrgaze-core public API.
//!
//! These exercise the codec, the default table and the typed accessors
//! together, the way the store and the pipeline stages use them.

use mrgaze_core::{
    default_config, init_defaults, parse_config, serialize_config, ConfigError, Configuration,
    ParseError, Value,
};

/// A hand-edited file as a user might leave it: comments, odd spacing,
/// mixed-case keys and a partial set of sections.
const HAND_EDITED: &str = "\
# Study-wide overrides
[VIDEO]
InputExtension=.avi
rotate   :   90   ; camera mounted sideways

[CALIBRATION]
calibrate = True
targetx = [0.2, 0.8]
targety = [0.2, 0.8]
";

#[test]
fn test_hand_edited_file_parses_to_expected_values() {
    let cfg = parse_config(HAND_EDITED).expect("hand-edited file must parse");

    assert_eq!(cfg.get("VIDEO", "inputextension").unwrap(), ".avi");
    assert_eq!(cfg.get_int("VIDEO", "rotate").unwrap(), 90);
    assert!(cfg.get_bool("CALIBRATION", "calibrate").unwrap());
    assert_eq!(cfg.get_float_list("CALIBRATION", "targetx").unwrap(), vec![0.2, 0.8]);
}

#[test]
fn test_hand_edited_file_has_no_implicit_defaults() {
    // A loaded file is taken as-is; sections it omits are simply absent.
    let cfg = parse_config(HAND_EDITED).unwrap();
    assert!(!cfg.has_section("OUTPUT"));
    assert!(matches!(cfg.get("OUTPUT", "verbose"), Err(ConfigError::NoSection(_))));
}

#[test]
fn test_rewritten_file_normalises_spacing_and_comments() {
    let cfg = parse_config(HAND_EDITED).unwrap();

    let text = serialize_config(&cfg);

    assert!(text.contains("[VIDEO]\ninputextension = .avi\nrotate = 90\n"));
    assert!(!text.contains('#'));
    assert_eq!(parse_config(&text).unwrap(), cfg);
}

#[test]
fn test_modified_defaults_survive_rewrite() {
    // Arrange
    let mut cfg = default_config();
    cfg.set("VIDEO", "rotate", "90").unwrap();
    cfg.set_bool("OUTPUT", "graphics", true).unwrap();

    // Act
    let reparsed = parse_config(&serialize_config(&cfg)).unwrap();

    // Assert
    assert_eq!(reparsed, cfg);
    assert_eq!(reparsed.get_typed("VIDEO", "rotate").unwrap(), Value::Int(90));
    assert_eq!(reparsed.get_typed("OUTPUT", "graphics").unwrap(), Value::Bool(true));
}

#[test]
fn test_reinitialising_parsed_defaults_fails() {
    let cfg = parse_config(&serialize_config(&default_config())).unwrap();
    assert!(matches!(init_defaults(cfg), Err(ConfigError::DuplicateSection(_))));
}

#[test]
fn test_init_defaults_on_empty_file_matches_default_config() {
    let empty = parse_config("# nothing yet\n").unwrap();
    assert_eq!(init_defaults(empty).unwrap(), default_config());
}

#[test]
fn test_truncated_file_is_rejected_whole() {
    let text = "[VIDEO]\nrotate = 90\ninputext";
    let err = parse_config(text).unwrap_err();
    assert!(matches!(err, ParseError::Malformed { ref lines } if lines.len() == 1));
}

#[test]
fn test_json_view_lists_sections_in_file_order() {
    let cfg: Configuration = HAND_EDITED.parse().unwrap();

    let json = serde_json::to_string(&cfg).unwrap();

    let video = json.find("\"VIDEO\"").unwrap();
    let calibration = json.find("\"CALIBRATION\"").unwrap();
    assert!(video < calibration);
}
