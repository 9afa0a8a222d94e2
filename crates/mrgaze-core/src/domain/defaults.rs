//! Built-in pipeline defaults.
//!
//! These are the values written to `mrgaze.cfg` the first time a data
//! directory is processed.  Every value is stored as text exactly as it
//! appears in the file; see [`crate::domain::typed`] for how the pipeline
//! stages read them back.
//!
//! | Section       | Consumer                                   |
//! |---------------|--------------------------------------------|
//! | `VIDEO`       | video I/O layer                            |
//! | `PUPILSEG`    | pupil segmentation                         |
//! | `RANSAC`      | ellipse fit and outlier rejection          |
//! | `LBP`         | face/eye detector                          |
//! | `ARTIFACTS`   | artifact rejection and motion correction   |
//! | `CALIBRATION` | gaze calibration                           |
//! | `OUTPUT`      | batch driver                               |

use crate::domain::configuration::{ConfigError, Configuration};

const VIDEO: &[(&str, &str)] = &[
    ("inputextension", ".mpg"),
    ("outputextension", ".mov"),
    ("inputfps", "29.97"),
    ("downsampling", "4"),
    ("border", "16"),
    ("rotate", "0"),
    ("gauss_sd", "0"),
];

const PUPILSEG: &[(&str, &str)] = &[
    ("method", "otsu"),
    ("pupil_percmax", "25"),
    ("glint_percmax", "1"),
    ("pupil_threshold", "20"),
    ("k_inpaint", "5"),
    ("k_dil", "5"),
    ("histogram_equalization", "False"),
];

const RANSAC: &[(&str, &str)] = &[
    ("maxiterations", "5"),
    ("maxrefinements", "3"),
    ("maxinlierperc", "95"),
];

const LBP: &[(&str, &str)] = &[
    ("enabled", "True"),
    ("minneighbors", "40"),
    ("scalefactor", "1.05"),
];

const ARTIFACTS: &[(&str, &str)] = &[
    ("mrclean", "True"),
    ("zthresh", "8.0"),
    ("motioncorr", "highpass"),
    ("mocokernel", "151"),
];

const CALIBRATION: &[(&str, &str)] = &[
    ("calibrate", "False"),
    ("targetx", "[0.5, 0.1, 0.9, 0.1, 0.1, 0.5, 0.1, 0.9, 0.5]"),
    ("targety", "[0.5, 0.9, 0.9, 0.1, 0.9, 0.9, 0.5, 0.5, 0.1]"),
    ("heatpercmin", "5"),
    ("heatpercmax", "95"),
    ("heatsigma", "2.0"),
];

const OUTPUT: &[(&str, &str)] = &[
    ("verbose", "True"),
    ("graphics", "False"),
    ("overwrite", "True"),
];

/// Default sections and their options, in file order.
pub const DEFAULT_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    ("VIDEO", VIDEO),
    ("PUPILSEG", PUPILSEG),
    ("RANSAC", RANSAC),
    ("LBP", LBP),
    ("ARTIFACTS", ARTIFACTS),
    ("CALIBRATION", CALIBRATION),
    ("OUTPUT", OUTPUT),
];

/// Adds every default section and option to `config` and returns it.
///
/// Intended for fresh configurations.  Taking and returning ownership lets
/// the result flow straight into a save.
///
/// # Errors
///
/// Returns [`ConfigError::DuplicateSection`] if `config` already contains any
/// of the default sections.  Re-initialisation is not idempotent.
///
/// # Examples
///
/// ```rust
/// use mrgaze_core::{init_defaults, Configuration};
///
/// let cfg = init_defaults(Configuration::new()).unwrap();
/// assert_eq!(cfg.get("VIDEO", "inputextension").unwrap(), ".mpg");
/// assert!(init_defaults(cfg).is_err());
/// ```
pub fn init_defaults(mut config: Configuration) -> Result<Configuration, ConfigError> {
    for (section, options) in DEFAULT_SECTIONS {
        config.add_section(section)?;
        for (option, value) in options.iter() {
            config.set(section, option, *value)?;
        }
    }
    Ok(config)
}

/// Returns a fresh configuration populated with the defaults.
pub fn default_config() -> Configuration {
    let mut config = Configuration::new();
    for (section, options) in DEFAULT_SECTIONS {
        let entry = config.section_entry(section);
        for (option, value) in options.iter() {
            entry.insert(option, (*value).to_string());
        }
    }
    config
}

// ── Tests ─────────────────────────────────────────────────────────────────────
