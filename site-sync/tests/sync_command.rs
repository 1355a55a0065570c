use std::fs;

use site_sync::cli::{list_with, sync_with};
use site_sync::report::ConsoleReporter;
use site_sync_core::config::SyncConfig;
use site_sync_core::contract::{MockObjectStore, StoreError};
use tempfile::tempdir;

fn site_with(files: &[&str]) -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }
    dir
}

fn store_failing_put_for(name: &'static str) -> MockObjectStore {
    let mut store = MockObjectStore::new();
    store.expect_list().returning(|_| Ok(vec![]));
    store
        .expect_put()
        .withf(move |_, n, _, _| n == name)
        .returning(|_, _, _, _| Err(StoreError::service("ServerBusy", "busy")));
    store.expect_put().returning(|_, _, _, _| Ok(()));
    store
}

#[tokio::test]
async fn test_partial_failure_keeps_success_by_default() {
    let site = site_with(&["index.html", "about.html"]);
    let reporter = ConsoleReporter::new(Vec::new());

    let report = sync_with(
        store_failing_put_for("about.html"),
        SyncConfig::new(site.path()).with_concurrency(1),
        &reporter,
    )
    .await
    .expect("per-file failures are not fatal by default");
    assert!(report.has_failures());

    let output = String::from_utf8(reporter.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Error uploading about.html: Service Error ServerBusy: busy",
            "Uploaded index.html",
            "Synchronise complete: 1 uploaded, 1 upload failures, 0 deleted, 0 delete failures.",
        ]
    );
}

#[tokio::test]
async fn test_strict_mode_turns_partial_failure_into_error() {
    let site = site_with(&["index.html", "about.html"]);
    let mut config = SyncConfig::new(site.path());
    config.strict = true;

    let err = sync_with(
        store_failing_put_for("about.html"),
        config,
        &ConsoleReporter::new(Vec::new()),
    )
    .await
    .expect_err("strict mode must fail the run");
    assert!(err.to_string().contains("1 of 2 operations failed"));
}

#[tokio::test]
async fn test_strict_mode_passes_clean_runs() {
    let site = site_with(&["index.html"]);
    let mut store = MockObjectStore::new();
    store.expect_list().returning(|_| Ok(vec!["index.html".into()]));
    store.expect_put().times(1).returning(|_, _, _, _| Ok(()));
    store.expect_delete().times(0);

    let mut config = SyncConfig::new(site.path());
    config.strict = true;
    let report = sync_with(store, config, &ConsoleReporter::new(Vec::new()))
        .await
        .expect("clean run succeeds in strict mode");
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_missing_source_dir_fails_the_command() {
    let dir = tempdir().unwrap();
    let mut store = MockObjectStore::new();
    store.expect_list().times(0);

    let reporter = ConsoleReporter::new(Vec::new());
    let err = sync_with(store, SyncConfig::new(dir.path().join("html")), &reporter)
        .await
        .expect_err("missing source dir is fatal");
    assert!(err.to_string().contains("does not exist"));

    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("[ERROR]"));
}

#[tokio::test]
async fn test_list_prints_one_name_per_line_sorted() {
    let mut store = MockObjectStore::new();
    store
        .expect_list()
        .withf(|container| container == "$web")
        .returning(|_| Ok(vec!["b.html".into(), "a.html".into()]));
    store.expect_put().times(0);
    store.expect_delete().times(0);

    let mut out = Vec::new();
    list_with(store, SyncConfig::default(), &mut out).await.unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a.html\nb.html\n");
}

#[tokio::test]
async fn test_list_failure_is_an_error() {
    let mut store = MockObjectStore::new();
    store
        .expect_list()
        .returning(|_| Err(StoreError::service("AuthorizationFailure", "denied")));

    let mut out = Vec::new();
    let err = list_with(store, SyncConfig::default(), &mut out)
        .await
        .expect_err("listing failure must surface");
    assert!(err.to_string().contains("listing objects in collection '$web' failed"));
    assert!(out.is_empty());
}
