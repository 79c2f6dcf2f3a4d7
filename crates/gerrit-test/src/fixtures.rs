//! Test fixtures for common types.

use std::path::PathBuf;

use gerrit_config::{SettingsRecord, ShowProjectColumn};

/// Global host used by the fixtures.
pub const TEST_HOST: &str = "https://gerrit.example.com";

/// A global record with every field set away from its default.
#[must_use]
pub fn test_global_record() -> SettingsRecord {
    SettingsRecord {
        login: Some("jdoe".to_owned()),
        host: TEST_HOST.to_owned(),
        list_all_changes: true,
        automatic_refresh: true,
        refresh_timeout: 60,
        review_notifications: true,
        push_to_gerrit: true,
        show_change_number_column: true,
        show_change_id_column: true,
        show_topic_column: true,
        show_project_column: ShowProjectColumn::Always,
        clone_base_url: Some("ssh://gerrit.example.com:29418".to_owned()),
    }
}

/// A settings document written before per-workspace settings existed.
#[must_use]
pub fn test_legacy_document() -> &'static str {
    r#"
host = "https://gerrit.example.com"
refresh_timeout = 60
"#
}

/// A temporary directory plus the settings path inside it.
///
/// Keep the returned `TempDir` alive for as long as the path is used.
#[must_use]
pub fn test_settings_path() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
    let path = dir.path().join("gerrit_settings.toml");
    (dir, path)
}
