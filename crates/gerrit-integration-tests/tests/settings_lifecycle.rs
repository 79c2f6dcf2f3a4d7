//! Integration tests for loading, materializing and persisting settings.

mod common;

use std::sync::Arc;

use common::SessionHarness;
use gerrit_config::{
    GlobalOnly, Scope, ScopeResolver, SettingsStore, ShowProjectColumn, WorkspaceTracker,
};
use gerrit_test::{SwitchableScope, TEST_HOST, test_legacy_document};

#[test]
fn test_legacy_document_then_first_workspace_then_save() {
    let h = SessionHarness::new();
    h.write_raw(test_legacy_document());

    let resolver = Arc::new(SwitchableScope::global());
    let settings = h.open(Arc::clone(&resolver) as Arc<dyn ScopeResolver>);

    let global = settings.global_settings();
    assert_eq!(global.host, TEST_HOST);
    assert_eq!(global.refresh_timeout, 60);
    assert!(settings.save_document().unwrap().get("projects").is_none());

    resolver.switch_to(Scope::named("team-a"));
    assert_eq!(settings.current_settings(), global);

    settings.set_host("https://team-a.example.com");
    settings.persist(&h.file).unwrap();

    let written: toml::Value = toml::from_str(&h.read_raw()).unwrap();
    assert_eq!(written["host"].as_str(), Some(TEST_HOST));
    let projects = written["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"].as_str(), Some("team-a"));
    assert_eq!(
        projects[0]["host"].as_str(),
        Some("https://team-a.example.com")
    );
    assert_eq!(projects[0]["refresh_timeout"].as_integer(), Some(60));
}

#[test]
fn test_settings_survive_reopen() {
    let h = SessionHarness::new();
    let resolver = Arc::new(SwitchableScope::global());

    {
        let settings = h.open(Arc::clone(&resolver) as Arc<dyn ScopeResolver>);
        settings.set_host(TEST_HOST);
        settings.set_login("jdoe");

        resolver.switch_to(Scope::named("team-a"));
        settings.set_show_project_column(ShowProjectColumn::Never);
        settings.set_clone_base_url("ssh://team-a.example.com:29418");

        resolver.switch_to(Scope::named("team-b"));
        settings.set_automatic_refresh(true);
        settings.persist(&h.file).unwrap();
    }

    let reopened = h.open(Arc::clone(&resolver) as Arc<dyn ScopeResolver>);
    assert!(reopened.automatic_refresh());
    assert_eq!(reopened.login().as_deref(), Some("jdoe"));

    resolver.switch_to(Scope::named("team-a"));
    assert_eq!(reopened.show_project_column(), ShowProjectColumn::Never);
    assert_eq!(
        reopened.clone_base_url_or_host(),
        "ssh://team-a.example.com:29418"
    );
    assert!(!reopened.automatic_refresh());

    resolver.switch_to(Scope::Global);
    assert_eq!(reopened.host(), TEST_HOST);
    assert!(reopened.clone_base_url().is_none());
}

#[test]
fn test_workspace_only_looked_at_is_persisted() {
    let h = SessionHarness::new();
    let tracker = Arc::new(WorkspaceTracker::new());
    tracker.open_workspace("viewer");

    let settings = h.open(Arc::clone(&tracker) as Arc<dyn ScopeResolver>);
    settings.persist(&h.file).unwrap();

    let store = h.file.load();
    assert!(store.contains(&Scope::named("viewer")));
}

#[test]
fn test_workspace_tracker_drives_the_current_record() {
    let h = SessionHarness::new();
    let tracker = Arc::new(WorkspaceTracker::new());
    let settings = h.open(Arc::clone(&tracker) as Arc<dyn ScopeResolver>);
    settings.set_refresh_timeout(30);

    tracker.open_workspace("alpha");
    settings.set_refresh_timeout(10);

    // Two open workspaces and no focus: nothing to resolve.
    tracker.open_workspace("beta");
    assert_eq!(settings.current_scope(), Scope::Global);
    assert_eq!(settings.refresh_timeout(), 30);

    tracker.focus(Some("alpha"));
    assert_eq!(settings.refresh_timeout(), 10);

    tracker.focus(Some("beta"));
    assert_eq!(settings.refresh_timeout(), 30);
    settings.set_refresh_timeout(20);

    tracker.close_workspace("beta");
    assert_eq!(settings.current_scope(), Scope::named("alpha"));
    assert_eq!(settings.refresh_timeout(), 10);
    assert_eq!(settings.global_settings().refresh_timeout, 30);
}

#[test]
fn test_malformed_file_opens_with_defaults_and_is_replaced() {
    let h = SessionHarness::new();
    h.write_raw("host = [unterminated");

    let settings = h.open(Arc::new(GlobalOnly));
    assert_eq!(settings.host(), "");

    settings.set_host(TEST_HOST);
    settings.persist(&h.file).unwrap();
    assert_eq!(h.file.load().global().host, TEST_HOST);
}

#[test]
fn test_reserved_and_empty_entries_are_dropped_on_resave() {
    let h = SessionHarness::new();
    h.write_raw(
        r#"
host = "https://gerrit.example.com"

[[projects]]
name = "GerritSettings"
host = "https://hijack.example.com"

[[projects]]
name = ""
host = "https://nobody.example.com"

[[projects]]
name = "team-a"
host = "https://team-a.example.com"
"#,
    );

    let settings = h.open(Arc::new(GlobalOnly));
    assert_eq!(settings.host(), TEST_HOST);
    settings.persist(&h.file).unwrap();

    let store = SettingsStore::load_str(&h.read_raw(), "<test>");
    let names: Vec<_> = store.scope_names().collect();
    assert_eq!(names, ["team-a"]);
    assert_eq!(store.global().host, TEST_HOST);
}

#[test]
fn test_missing_file_is_created_with_parent_directory() {
    let h = SessionHarness::new();
    let nested = gerrit_config::SettingsFile::at(
        h.file
            .path()
            .parent()
            .unwrap()
            .join("nested")
            .join("gerrit_settings.toml"),
    );

    let settings = h.open(Arc::new(GlobalOnly));
    settings.set_host(TEST_HOST);
    settings.persist(&nested).unwrap();

    assert!(nested.path().exists());
    assert_eq!(nested.load().global().host, TEST_HOST);
}

#[test]
fn test_workspace_named_like_global_tag_is_the_global_record() {
    let h = SessionHarness::new();
    let resolver = Arc::new(SwitchableScope::named("GerritSettings"));
    {
        let settings = h.open(Arc::clone(&resolver) as Arc<dyn ScopeResolver>);
        assert_eq!(settings.current_scope(), Scope::Global);
        settings.set_host("https://ws.example.com");
        settings.persist(&h.file).unwrap();
    }

    let store = h.file.load();
    assert_eq!(store.scope_names().count(), 0);
    assert_eq!(store.global().host, "https://ws.example.com");

    let reopened = h.open(resolver);
    assert_eq!(reopened.host(), "https://ws.example.com");
}
