//! ManageConfigUseCase: inspect and edit a data directory's configuration.
//!
//! Every operation resolves the configuration the same way the pipeline does
//! (session file, then root file, then freshly written defaults) and every
//! write goes to the data directory's root file.  Editing a value while a
//! subject/session override exists therefore copies the override's contents
//! into the root file.
//!
//! # Architecture
//!
//! This use case depends only on the [`ConfigRepository`] trait and the
//! domain types from `mrgaze_core`.  The file-system implementation lives in
//! `infrastructure::storage::config`.

use std::path::PathBuf;

use mrgaze_core::{default_config, ConfigError, Configuration, ResolvedConfig, Value};
use thiserror::Error;
use tracing::info;

/// Error type for the manage-config use case.
#[derive(Debug, Error, PartialEq)]
pub enum ManageConfigError {
    #[error("repository error: {0}")]
    Repository(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("configuration already exists at {}; pass --force to overwrite", .0.display())]
    AlreadyInitialised(PathBuf),
}

/// Access to stored configurations for one data directory.
///
/// The infrastructure implementation reads and writes `mrgaze.cfg` files;
/// test implementations keep everything in memory.
pub trait ConfigRepository {
    /// Resolves the effective configuration for `subj_sess` (empty for the
    /// data directory itself), creating the default root file if no file
    /// exists yet.
    fn resolve(&self, subj_sess: &str) -> Result<ResolvedConfig, String>;

    /// Writes `config` to the root file and returns its path.
    fn save(&self, config: &Configuration) -> Result<PathBuf, String>;

    /// Returns `true` if the root file exists.
    fn root_exists(&self) -> bool;

    /// Returns the file `resolve` would read for `subj_sess`, or the root file
    /// it would create.
    fn locate(&self, subj_sess: &str) -> PathBuf;
}

/// Inspection and editing operations over a [`ConfigRepository`].
pub struct ManageConfigUseCase<R: ConfigRepository> {
    repository: R,
}

impl<R: ConfigRepository> ManageConfigUseCase<R> {
    /// Creates the use case around a repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Resolves and returns the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ManageConfigError::Repository`] if resolution fails.
    pub fn show(&self, subj_sess: &str) -> Result<ResolvedConfig, ManageConfigError> {
        self.repository
            .resolve(subj_sess)
            .map_err(ManageConfigError::Repository)
    }

    /// Returns the raw text of one option.
    ///
    /// # Errors
    ///
    /// Returns [`ManageConfigError::Config`] if the section or option does
    /// not exist.
    pub fn get_value(
        &self,
        subj_sess: &str,
        section: &str,
        option: &str,
    ) -> Result<String, ManageConfigError> {
        let resolved = self.show(subj_sess)?;
        Ok(resolved.config.get(section, option)?.to_string())
    }

    /// Returns one option parsed according to its declared type.
    ///
    /// # Errors
    ///
    /// Returns [`ManageConfigError::Config`] if the option is missing or its
    /// text does not parse as the declared type.
    pub fn get_typed_value(
        &self,
        subj_sess: &str,
        section: &str,
        option: &str,
    ) -> Result<Value, ManageConfigError> {
        let resolved = self.show(subj_sess)?;
        Ok(resolved.config.get_typed(section, option)?)
    }

    /// Sets one option and saves the result to the root file.
    ///
    /// A missing section is created.  Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`ManageConfigError::Repository`] if resolving or saving
    /// fails.
    pub fn set_value(
        &self,
        subj_sess: &str,
        section: &str,
        option: &str,
        value: &str,
    ) -> Result<PathBuf, ManageConfigError> {
        let mut config = self.show(subj_sess)?.config;
        if !config.has_section(section) && section != mrgaze_core::DEFAULT_SECTION {
            config.add_section(section)?;
        }
        config.set(section, option, value)?;

        let path = self
            .repository
            .save(&config)
            .map_err(ManageConfigError::Repository)?;
        info!("set [{section}] {option} = {value} in {}", path.display());
        Ok(path)
    }

    /// Writes the default configuration to the root file.
    ///
    /// # Errors
    ///
    /// Returns [`ManageConfigError::AlreadyInitialised`] if the root file
    /// exists and `force` is `false`.
    pub fn reset_defaults(&self, force: bool) -> Result<PathBuf, ManageConfigError> {
        if self.repository.root_exists() && !force {
            return Err(ManageConfigError::AlreadyInitialised(
                self.repository.locate(""),
            ));
        }
        let path = self
            .repository
            .save(&default_config())
            .map_err(ManageConfigError::Repository)?;
        info!("wrote default configuration to {}", path.display());
        Ok(path)
    }

    /// Returns the file the configuration would be read from.
    pub fn locate(&self, subj_sess: &str) -> PathBuf {
        self.repository.locate(subj_sess)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
