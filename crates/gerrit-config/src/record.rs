//! The settings record stored once per scope.
//!
//! A record is self-contained: it never references another scope's record.
//! Every field has a default so that a bare table in the settings file
//! produces a usable record.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ShowProjectColumn
// ---------------------------------------------------------------------------

/// When the change list shows the project column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowProjectColumn {
    /// Only when changes from more than one project are listed.
    #[default]
    Auto,
    /// Always shown.
    Always,
    /// Never shown.
    Never,
}

// ---------------------------------------------------------------------------
// SettingsRecord
// ---------------------------------------------------------------------------

/// Connection and presentation settings for one scope.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    /// Account name on the review server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// Review server base URL.
    pub host: String,
    /// List every change on the server, not only the user's own.
    pub list_all_changes: bool,
    /// Refresh the change list periodically.
    pub automatic_refresh: bool,
    /// Seconds between automatic refreshes.
    pub refresh_timeout: u32,
    /// Notify about new review activity.
    pub review_notifications: bool,
    /// Push to the review server instead of the plain remote.
    pub push_to_gerrit: bool,
    /// Show the numeric change number column.
    pub show_change_number_column: bool,
    /// Show the Change-Id column.
    pub show_change_id_column: bool,
    /// Show the topic column.
    pub show_topic_column: bool,
    /// Project column visibility.
    pub show_project_column: ShowProjectColumn,
    /// Base URL used for cloning, when it differs from `host`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_base_url: Option<String>,
}

impl SettingsRecord {
    /// Record pointing at `host` with every other field defaulted.
    #[must_use]
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// `clone_base_url` when set and non-empty, otherwise `host`.
    #[must_use]
    pub fn clone_base_url_or_host(&self) -> &str {
        match self.clone_base_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => &self.host,
        }
    }

    /// Whether a login name is configured.
    #[must_use]
    pub fn has_login(&self) -> bool {
        self.login.as_deref().is_some_and(|login| !login.is_empty())
    }
}
