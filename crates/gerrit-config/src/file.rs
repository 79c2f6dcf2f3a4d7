//! On-disk location and I/O for the settings document.
//!
//! Reading is forgiving: a missing, oversized, unreadable or malformed file
//! produces default settings and a warning. Writing reports its errors.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::document;
use crate::error::{ConfigError, ConfigResult};
use crate::scope::Scope;
use crate::store::{Materialized, SettingsStore};

/// File name of the settings document inside the configuration directory.
pub const SETTINGS_FILE_NAME: &str = "gerrit_settings.toml";

/// Maximum accepted settings file size (1 MB).
const MAX_SETTINGS_FILE_SIZE: u64 = 1_048_576;

/// The settings document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Use an explicit path (tests, portable installs).
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The platform configuration directory, e.g.
    /// `~/.config/gerrit/gerrit_settings.toml` on Linux.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if no home directory is known.
    pub fn default_location() -> ConfigResult<Self> {
        let dirs =
            directories::ProjectDirs::from("", "", "gerrit").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::at(dirs.config_dir().join(SETTINGS_FILE_NAME)))
    }

    /// Path of the settings document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document, returning `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, is too large, or
    /// is not valid TOML.
    pub fn read_document(&self) -> ConfigResult<Option<toml::Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file not found");
                return Ok(None);
            },
            Err(e) => {
                return Err(ConfigError::ReadError {
                    path: self.path.display().to_string(),
                    source: e,
                });
            },
        };

        // Size is checked after the single read to avoid a stat/read race.
        if content.len() as u64 > MAX_SETTINGS_FILE_SIZE {
            return Err(ConfigError::ValidationError {
                field: self.path.display().to_string(),
                message: format!(
                    "settings file is {} bytes, exceeding the {} byte limit",
                    content.len(),
                    MAX_SETTINGS_FILE_SIZE
                ),
            });
        }

        document::from_text(&content, &self.path.display().to_string()).map(Some)
    }

    /// Load the store, falling back to defaults on any problem.
    #[must_use]
    pub fn load(&self) -> SettingsStore {
        match self.read_document() {
            Ok(Some(document)) => {
                info!(path = %self.path.display(), "loading settings");
                SettingsStore::load(&document)
            },
            Ok(None) => SettingsStore::default(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "error while loading settings; using defaults"
                );
                SettingsStore::default()
            },
        }
    }

    /// Write `document`, creating parent directories and replacing the file
    /// via a sibling temporary file and rename.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document cannot be rendered or written.
    pub fn write_document(&self, document: &toml::Value) -> ConfigResult<()> {
        let text = document::to_text(document)?;
        let write_err = |source| ConfigError::WriteError {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = self.path.with_extension("toml.tmp");
        let written = std::fs::write(&tmp, text).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp)
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                warn!(
                    path = %tmp.display(),
                    error = %cleanup,
                    "couldn't remove temporary settings file"
                );
            }
            return Err(write_err(e));
        }

        debug!(path = %self.path.display(), "settings written");
        Ok(())
    }

    /// Save `store`, materializing `current` first (see [`SettingsStore::save`]).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document cannot be rendered or written.
    pub fn save(&self, store: &mut SettingsStore, current: &Scope) -> ConfigResult<Materialized> {
        let saved = store.save(current)?;
        self.write_document(&saved.document)?;
        Ok(saved.materialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SettingsRecord;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::at(dir.path().join("absent.toml"));

        assert!(file.read_document().unwrap().is_none());
        assert_eq!(file.load(), SettingsStore::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::at(dir.path().join("nested").join(SETTINGS_FILE_NAME));

        let mut store = SettingsStore::new(SettingsRecord::with_host("https://review.example.com"));
        store.resolve_or_create(&Scope::named("team-a")).0.host =
            "https://team-a.example.com".to_owned();

        let materialized = file.save(&mut store, &Scope::named("team-b")).unwrap();
        assert!(materialized.is_created());
        assert!(!dir.path().join("nested").join("gerrit_settings.toml.tmp").exists());

        let loaded = file.load();
        assert_eq!(loaded, store);
        assert_eq!(loaded.scope_names().collect::<Vec<_>>(), ["team-a", "team-b"]);
    }

    #[test]
    fn test_garbage_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "<GerritSettings host=\"xml\"/>").unwrap();

        let file = SettingsFile::at(&path);
        assert!(matches!(file.read_document(), Err(ConfigError::ParseError { .. })));
        assert_eq!(file.load(), SettingsStore::default());
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // The target is a directory, so the final rename fails.
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let file = SettingsFile::at(&path);
        let document = SettingsStore::default().to_document().unwrap();
        assert!(matches!(
            file.write_document(&document),
            Err(ConfigError::WriteError { .. })
        ));
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let data = format!("host = \"{}\"", "a".repeat(1_100_000));
        std::fs::write(&path, data).unwrap();

        let file = SettingsFile::at(&path);
        assert!(matches!(
            file.read_document(),
            Err(ConfigError::ValidationError { .. })
        ));
        assert_eq!(file.load(), SettingsStore::default());
    }
}
