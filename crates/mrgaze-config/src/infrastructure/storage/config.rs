//! INI-file configuration persistence for MrGaze data directories.
//!
//! Every data directory holds at most one root configuration and each
//! subject/session subdirectory may hold an override:
//!
//! ```text
//! /data/study/mrgaze.cfg              <- root configuration
//! /data/study/sub01/sess1/mrgaze.cfg  <- subject/session override
//! ```
//!
//! # Resolution order
//!
//! 1. The subject/session file, if it exists, is loaded on its own.  Nothing
//!    from the root file is merged into it.
//! 2. Otherwise the root file is loaded.
//! 3. Otherwise the built-in defaults are written to the root file (never to
//!    the session directory) and returned.
//!
//! Saving always targets the root file, whichever file the configuration was
//! loaded from.
//!
//! # First-write race
//!
//! Two processes starting on the same fresh directory would both take branch
//! 3.  The default file is therefore staged in a uniquely named temporary file
//! and moved into place without clobbering: the loser of the race loads the
//! winner's complete copy instead of overwriting it.  Where the file system
//! cannot do that move, the root file is created in place with `create_new`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mrgaze_core::{
    init_defaults, parse_config, serialize_config, ConfigError, ConfigOrigin, Configuration,
    ParseError, ResolvedConfig,
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::manage_config::ConfigRepository;

/// Name of the configuration file in every directory.
pub const CONFIG_FILE_NAME: &str = "mrgaze.cfg";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An existing configuration file is malformed.
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Building the default configuration failed.
    #[error("failed to build default config: {0}")]
    Config(#[from] ConfigError),
}

// ── Paths ─────────────────────────────────────────────────────────────────────

/// Returns `data_dir/mrgaze.cfg`.
pub fn root_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Returns `data_dir/subj_sess/mrgaze.cfg`.  An empty `subj_sess` yields the
/// root path.
pub fn session_config_path(data_dir: &Path, subj_sess: &str) -> PathBuf {
    if subj_sess.is_empty() {
        root_config_path(data_dir)
    } else {
        data_dir.join(subj_sess).join(CONFIG_FILE_NAME)
    }
}

// ── Store operations ──────────────────────────────────────────────────────────

/// Loads the effective configuration for `data_dir` and `subj_sess`.
///
/// See the module documentation for the resolution order.  Pass an empty
/// `subj_sess` to use the root file only.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if a file cannot be read or the default file
/// cannot be written, and [`StoreError::Parse`] if an existing file is
/// malformed.
pub fn load_config(data_dir: &Path, subj_sess: &str) -> Result<Configuration, StoreError> {
    resolve_config(data_dir, subj_sess).map(|resolved| resolved.config)
}

/// Like [`load_config`], but also reports which file the configuration came
/// from.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn resolve_config(data_dir: &Path, subj_sess: &str) -> Result<ResolvedConfig, StoreError> {
    let root_path = root_config_path(data_dir);
    let session_path = session_config_path(data_dir, subj_sess);

    if session_path != root_path {
        debug!("checking session config {}", session_path.display());
        if session_path.is_file() {
            let config = read_config_file(&session_path)?;
            return Ok(ResolvedConfig {
                config,
                origin: ConfigOrigin::Session(session_path),
            });
        }
    }

    debug!("checking root config {}", root_path.display());
    if root_path.is_file() {
        let config = read_config_file(&root_path)?;
        return Ok(ResolvedConfig {
            config,
            origin: ConfigOrigin::Root(root_path),
        });
    }

    write_defaults(data_dir, root_path)
}

/// Writes `config` to `data_dir/mrgaze.cfg`, replacing any existing file.
///
/// Creates `data_dir` if it does not exist.  Never writes to a subject/session
/// directory.
///
/// # Errors
///
/// Returns [`StoreError::Io`] for file-system failures.
pub fn save_config(config: &Configuration, data_dir: &Path) -> Result<(), StoreError> {
    let path = root_config_path(data_dir);
    ensure_dir(data_dir)?;
    fs::write(&path, serialize_config(config)).map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;
    info!("saved config {}", path.display());
    Ok(())
}

// ── Repository adapter ────────────────────────────────────────────────────────

/// File-system [`ConfigRepository`] rooted at one data directory.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    data_dir: PathBuf,
}

impl FsConfigStore {
    /// Creates a store for `data_dir`.  The directory need not exist yet.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl ConfigRepository for FsConfigStore {
    fn resolve(&self, subj_sess: &str) -> Result<ResolvedConfig, String> {
        resolve_config(&self.data_dir, subj_sess).map_err(|e| e.to_string())
    }

    fn save(&self, config: &Configuration) -> Result<PathBuf, String> {
        save_config(config, &self.data_dir).map_err(|e| e.to_string())?;
        Ok(root_config_path(&self.data_dir))
    }

    fn root_exists(&self) -> bool {
        root_config_path(&self.data_dir).is_file()
    }

    fn locate(&self, subj_sess: &str) -> PathBuf {
        let session_path = session_config_path(&self.data_dir, subj_sess);
        if session_path.is_file() {
            session_path
        } else {
            root_config_path(&self.data_dir)
        }
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Outcome of exclusively creating the root file.
#[derive(Debug, PartialEq, Eq)]
enum Creation {
    Created,
    AlreadyPresent,
}

/// Writes the defaults to `root_path` unless some other writer got there
/// first, in which case that writer's file is loaded instead.
fn write_defaults(data_dir: &Path, root_path: PathBuf) -> Result<ResolvedConfig, StoreError> {
    let config = init_defaults(Configuration::new())?;
    ensure_dir(data_dir)?;
    let creation = create_config_file(&root_path, &config).map_err(|source| StoreError::Io {
        path: root_path.clone(),
        source,
    })?;

    match creation {
        Creation::Created => {
            info!("created default config {}", root_path.display());
            Ok(ResolvedConfig {
                config,
                origin: ConfigOrigin::CreatedDefault(root_path),
            })
        }
        Creation::AlreadyPresent => {
            warn!(
                "config {} appeared while writing defaults; loading it instead",
                root_path.display()
            );
            let config = read_config_file(&root_path)?;
            Ok(ResolvedConfig {
                config,
                origin: ConfigOrigin::Root(root_path),
            })
        }
    }
}

fn read_config_file(path: &Path) -> Result<Configuration, StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Files edited with legacy encodings still load; bad bytes become U+FFFD.
    let text = String::from_utf8_lossy(&bytes);
    parse_config(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Creates `path` holding the serialized `config` unless it already exists.
///
/// The text is staged in a temporary file in the same directory and then
/// moved into place without replacing an existing file, so a concurrent
/// reader never sees a half-written file.
fn create_config_file(path: &Path, config: &Configuration) -> io::Result<Creation> {
    let text = serialize_config(config);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(text.as_bytes())?;
    staged.as_file().sync_all()?;

    match staged.persist_noclobber(path) {
        Ok(_) => Ok(Creation::Created),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(Creation::AlreadyPresent),
        Err(e) => {
            debug!(
                "cannot move staged config to {} ({}); creating it in place",
                path.display(),
                e.error
            );
            // Dropping the handle removes the staged copy.
            drop(e.file);
            create_in_place(path, &text)
        }
    }
}

/// Creates `path` directly with `create_new`.  Used where the file system
/// has no no-clobber rename or hard links.
fn create_in_place(path: &Path, text: &str) -> io::Result<Creation> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(Creation::AlreadyPresent),
        Err(e) => return Err(e),
    };
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    Ok(Creation::Created)
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
