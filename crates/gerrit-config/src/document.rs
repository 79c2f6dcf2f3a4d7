//! Conversion between settings records and the persisted TOML document.
//!
//! Document shape:
//!
//! ```toml
//! # global record fields at the root
//! host = "https://review.example.com"
//! refresh_timeout = 60
//!
//! # one table per workspace, each with a required `name`
//! [[projects]]
//! name = "team-a"
//! host = "https://team-a.example.com"
//! ```
//!
//! Documents written before per-workspace settings existed have no
//! `projects` array and load as global-only state.

use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::record::SettingsRecord;
use crate::scope::Scope;
pub use crate::scope::GLOBAL_TAG;
/// Key of the per-workspace array.
pub const PROJECTS_KEY: &str = "projects";
/// Key carrying a workspace entry's name.
pub const NAME_KEY: &str = "name";

/// Records extracted from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// The root record.
    pub global: SettingsRecord,
    /// Workspace records in document order.
    pub scopes: Vec<(String, SettingsRecord)>,
}

/// Extract the global record and every well-formed workspace entry.
///
/// # Errors
///
/// Returns an error if the root is not a table or its fields do not match
/// [`SettingsRecord`]. Malformed workspace entries are skipped with a warning
/// instead.
pub fn parse(document: &toml::Value) -> ConfigResult<ParsedDocument> {
    let toml::Value::Table(root) = document else {
        return Err(ConfigError::ValidationError {
            field: "<root>".to_owned(),
            message: format!("expected a table, found {}", document.type_str()),
        });
    };

    let mut global_table = root.clone();
    let projects = global_table.remove(PROJECTS_KEY);
    let global = decode_record(global_table, "<root>")?;

    let scopes = match projects {
        None => Vec::new(),
        Some(toml::Value::Array(entries)) => entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| parse_entry(index, entry))
            .collect(),
        Some(other) => {
            warn!(
                found = other.type_str(),
                "`{PROJECTS_KEY}` is not an array; ignoring workspace settings"
            );
            Vec::new()
        },
    };

    Ok(ParsedDocument { global, scopes })
}

fn parse_entry(index: usize, entry: toml::Value) -> Option<(String, SettingsRecord)> {
    let toml::Value::Table(mut table) = entry else {
        warn!(index, "workspace entry is not a table; skipping");
        return None;
    };

    let name = match table.remove(NAME_KEY) {
        Some(toml::Value::String(name)) => name,
        _ => {
            warn!(index, "workspace entry has no `{NAME_KEY}`; skipping");
            return None;
        },
    };
    if Scope::named(name.as_str()).is_global() {
        warn!(index, name = %name, "workspace entry uses an empty or reserved name; skipping");
        return None;
    }

    match decode_record(table, &format!("{PROJECTS_KEY}[{index}]")) {
        Ok(record) => Some((name, record)),
        Err(e) => {
            warn!(index, name = %name, error = %e, "malformed workspace entry; skipping");
            None
        },
    }
}

fn decode_record(table: toml::Table, location: &str) -> ConfigResult<SettingsRecord> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: location.to_owned(),
            source: e,
        })
}

fn encode_record(record: &SettingsRecord) -> ConfigResult<toml::Table> {
    match toml::Value::try_from(record)? {
        toml::Value::Table(table) => Ok(table),
        other => Err(ConfigError::ValidationError {
            field: "<record>".to_owned(),
            message: format!("record serialized to {}", other.type_str()),
        }),
    }
}

/// Build a document from the global record and the workspace records.
///
/// The `projects` array is omitted when there are no workspace records.
/// Entries named like the global record would not survive a reload and are
/// left out with a warning.
///
/// # Errors
///
/// Returns [`ConfigError::SerializeError`] if a record cannot be encoded.
pub fn emit<'a>(
    global: &SettingsRecord,
    scopes: impl IntoIterator<Item = (&'a str, &'a SettingsRecord)>,
) -> ConfigResult<toml::Value> {
    let mut root = encode_record(global)?;

    let mut projects = Vec::new();
    for (name, record) in scopes {
        if Scope::named(name).is_global() {
            warn!(name = %name, "not writing workspace entry with an empty or reserved name");
            continue;
        }
        let mut table = encode_record(record)?;
        table.insert(NAME_KEY.to_owned(), toml::Value::String(name.to_owned()));
        projects.push(toml::Value::Table(table));
    }
    if !projects.is_empty() {
        root.insert(PROJECTS_KEY.to_owned(), toml::Value::Array(projects));
    }

    Ok(toml::Value::Table(root))
}

/// Parse TOML text into a document. `origin` names the source in errors.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] if `text` is not valid TOML.
pub fn from_text(text: &str, origin: &str) -> ConfigResult<toml::Value> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })
}

/// Render a document as TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::SerializeError`] if the document cannot be rendered.
pub fn to_text(document: &toml::Value) -> ConfigResult<String> {
    Ok(toml::to_string(document)?)
}
