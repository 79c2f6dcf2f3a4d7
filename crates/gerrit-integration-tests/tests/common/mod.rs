//! Shared harness for integration tests.

use std::sync::Arc;

use gerrit_config::{ScopeResolver, SettingsFile};
use gerrit_credentials::SecretStore;
use gerrit_settings::GerritSettings;
use gerrit_test::MockSecretStore;
use tempfile::TempDir;

/// A settings file in a temp directory plus a secret store that outlives
/// individual sessions.
///
/// The tempdir is cleaned up when the harness is dropped.
#[allow(dead_code)]
pub struct SessionHarness {
    /// The settings file under test.
    pub file: SettingsFile,
    /// Secret store shared by every session opened from this harness.
    pub secrets: Arc<MockSecretStore>,
    _dir: TempDir,
}

#[allow(dead_code)]
impl SessionHarness {
    pub fn new() -> Self {
        gerrit_test::init_test_logging();
        let (dir, path) = gerrit_test::test_settings_path();
        Self {
            file: SettingsFile::at(path),
            secrets: Arc::new(MockSecretStore::new()),
            _dir: dir,
        }
    }

    /// Write raw text to the settings file, as an older release would have.
    pub fn write_raw(&self, text: &str) {
        std::fs::write(self.file.path(), text).unwrap();
    }

    pub fn read_raw(&self) -> String {
        std::fs::read_to_string(self.file.path()).unwrap()
    }

    /// Open a session against the shared file and secret store.
    pub fn open(&self, resolver: Arc<dyn ScopeResolver>) -> GerritSettings {
        GerritSettings::open(
            &self.file,
            resolver,
            Arc::clone(&self.secrets) as Arc<dyn SecretStore>,
        )
    }
}
