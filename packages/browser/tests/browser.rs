//! End-to-end tests of the browser entry points against an in-memory server

mod common;

use std::sync::Arc;

use ayon_browser::{
    BrowserError, BrowserState, BrowserStore, NotificationLog, ProductBrowser, VersionSelection,
};
use ayon_cache::QueryCache;
use common::{failed_operations, product, strings, version, FakeApi};
use pretty_assertions::assert_eq;

fn setup(selection: VersionSelection) -> (Arc<FakeApi>, Arc<NotificationLog>, ProductBrowser) {
    let v1 = version("v1", "p1", "f1", "Pending");
    let v2 = version("v2", "p1", "f1", "Approved");
    let v3 = version("v3", "p2", "f1", "Pending");
    let v4 = version("v4", "p3", "f2", "Pending");
    let api = FakeApi::new(
        vec![
            product("p1", "f1", &v1),
            product("p2", "f1", &v3),
            product("p3", "f2", &v4),
        ],
        vec![v1, v2, v3, v4],
    );
    let log = Arc::new(NotificationLog::new());
    let store = Arc::new(BrowserStore::with_state(BrowserState {
        selection,
        ..Default::default()
    }));
    let browser = ProductBrowser::new(api.clone(), QueryCache::default(), store, log.clone());
    (api, log, browser)
}

fn shown(browser: &ProductBrowser) -> Vec<(String, Option<String>)> {
    browser
        .rows()
        .into_iter()
        .map(|row| {
            let version_id = row.version_id().map(str::to_string);
            (row.id, version_id)
        })
        .collect()
}

#[tokio::test]
async fn test_focus_folders_merges_selected_versions() {
    let mut selection = VersionSelection::new();
    selection.select("v2", "p1", "f1");
    selection.select("v4", "p3", "f2");
    let (api, _log, browser) = setup(selection);

    let rows = browser.focus_folders(strings(&["f1"])).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        shown(&browser),
        vec![
            ("p1".to_string(), Some("v2".to_string())),
            ("p2".to_string(), Some("v3".to_string())),
        ]
    );
    assert_eq!(rows[0].status(), Some("Approved"));
    // Only the focused folder's selection is fetched
    assert_eq!(
        api.folder_calls.lock().unwrap().clone(),
        vec![("f1".to_string(), strings(&["v2"]))]
    );
}

#[tokio::test]
async fn test_select_version_updates_row_and_selection() {
    let (_api, _log, browser) = setup(VersionSelection::new());
    browser.focus_folders(strings(&["f1"])).await.unwrap();

    browser.on_select_version("p1", "v2").await.unwrap();

    assert_eq!(
        shown(&browser)[0],
        ("p1".to_string(), Some("v2".to_string()))
    );
    assert_eq!(
        browser.store().selection().version_for_product("p1"),
        Some("v2")
    );
    assert!(browser.loading_products().is_empty());
}

#[tokio::test]
async fn test_select_version_for_unknown_product_fails() {
    let (_api, _log, browser) = setup(VersionSelection::new());
    browser.focus_folders(strings(&["f1"])).await.unwrap();

    let result = browser.on_select_version("p3", "v4").await;

    assert!(matches!(result, Err(BrowserError::UnknownProduct(id)) if id == "p3"));
    assert!(browser.store().selection().is_empty());
}

#[tokio::test]
async fn test_row_clicks_drive_focus() {
    let (_api, _log, browser) = setup(VersionSelection::new());
    browser.focus_folders(strings(&["f1"])).await.unwrap();

    browser.on_row_click("p1", false);
    assert_eq!(browser.store().snapshot().focused_versions, strings(&["v1"]));

    browser.on_row_click("p2", true);
    let state = browser.store().snapshot();
    assert_eq!(state.focused_products, strings(&["p1", "p2"]));
    assert_eq!(state.focused_versions, strings(&["v1", "v3"]));

    browser.on_row_click("p1", true);
    assert_eq!(browser.store().focused_products(), strings(&["p2"]));

    browser.on_selection_change(strings(&["p1"]));
    assert_eq!(browser.store().snapshot().focused_versions, strings(&["v1"]));
}

#[tokio::test]
async fn test_status_change_refreshes_locally_held_versions() {
    let (api, log, browser) = setup(VersionSelection::new());
    browser.focus_folders(strings(&["f1"])).await.unwrap();
    browser.on_select_version("p1", "v2").await.unwrap();

    let outcome = browser.on_status_change("Retake", "p1").await.unwrap();

    assert_eq!(outcome.version_ids, strings(&["v2"]));
    assert_eq!(browser.rows()[0].status(), Some("Retake"));
    assert_eq!(browser.rows()[1].status(), Some("Pending"));
    // Initial pick plus the reload after the update
    assert_eq!(
        api.version_calls.lock().unwrap().clone(),
        vec![strings(&["v2"]), strings(&["v2"])]
    );
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_held_version_shows_pending_status_until_rejected() {
    let (api, log, browser) = setup(VersionSelection::new());
    browser.focus_folders(strings(&["f1"])).await.unwrap();
    browser.on_select_version("p1", "v2").await.unwrap();
    api.set_update_response(Ok(failed_operations(&["Status not allowed"])));
    let gate = api.gate("update:Retake");
    let started = api.started();

    let change = browser.on_status_change("Retake", "p1");
    let observer = async {
        api.wait_for_fetches(started + 1).await;
        assert_eq!(browser.rows()[0].status(), Some("Retake"));
        gate.notify_one();
    };
    let (result, ()) = tokio::join!(change, observer);

    assert!(matches!(result, Err(BrowserError::OperationFailed(_))));
    assert_eq!(browser.rows()[0].version_id(), Some("v2"));
    assert_eq!(browser.rows()[0].status(), Some("Approved"));
    assert_eq!(log.errors(), vec!["Status not allowed".to_string()]);
}

#[tokio::test]
async fn test_version_details_render_registry_fields() {
    let (_api, _log, browser) = setup(VersionSelection::new());

    let fields = browser.version_details("v3").await.unwrap();

    assert!(fields.contains(&("Status", "Pending".to_string())));
    assert!(fields.contains(&("Tags", "hero".to_string())));
    assert!(fields.contains(&("Comment", "first pass".to_string())));
}

#[tokio::test]
async fn test_shutdown_keeps_product_rows() {
    let mut selection = VersionSelection::new();
    selection.select("v2", "p1", "f1");
    let (_api, log, browser) = setup(selection);
    browser.shutdown();

    let rows = browser.focus_folders(strings(&["f1"])).await.unwrap();

    // Version refresh was cancelled, rows fall back to the list's versions
    assert_eq!(rows[0].version_id(), Some("v1"));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_fetch_versions_is_cached() {
    let (api, _log, browser) = setup(VersionSelection::new());

    let first = browser.fetch_versions(strings(&["v3", "v4"])).await.unwrap();
    let second = browser.fetch_versions(strings(&["v3", "v4"])).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(api.version_calls.lock().unwrap().len(), 1);
}
