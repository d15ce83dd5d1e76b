//! Shared fixtures for tests that talk to a mock Omeka installation.

#![allow(dead_code)]

use std::net::TcpListener;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Set to `1` to fail instead of skipping when no local mock server can bind.
const REQUIRE_SOCKETS_ENV: &str = "OMEKA_ARCHIVE_REQUIRE_SOCKET_TESTS";

/// Starts the mock Omeka server, or returns `None` (the test is skipped) when
/// the sandbox forbids binding a localhost socket.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl Future<Output = Option<MockServer>> {
    let caller = std::panic::Location::caller();
    let bindable = TcpListener::bind("127.0.0.1:0").is_ok();
    async move {
        if bindable {
            return Some(MockServer::start().await);
        }
        let required = std::env::var(REQUIRE_SOCKETS_ENV)
            .is_ok_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        assert!(
            !required,
            "mock Omeka server cannot bind localhost ({caller}); {REQUIRE_SOCKETS_ENV} is set"
        );
        eprintln!("skipping {caller}: mock Omeka server cannot bind localhost");
        None
    }
}

/// Descriptor listing only resource types the sweep excludes by default.
pub fn core_descriptor() -> Value {
    json!({
        "collections": {"controller": "collections", "actions": ["index", "get"], "url": "/api/collections"},
        "items": {"controller": "items", "actions": ["index", "get"], "url": "/api/items"},
        "files": {"controller": "files", "actions": ["index", "get"], "url": "/api/files"},
        "site": {"controller": "site", "actions": ["get"], "url": "/api/site"},
        "resources": {"controller": "resources", "actions": ["index"], "url": "/api/resources"},
        "users": {"controller": "users", "actions": ["index", "get"], "url": "/api/users"}
    })
}

/// Mounts `/api/resources` (bootstrap check and sweep) and `/api/site`.
pub async fn mount_bootstrap(server: &MockServer, descriptor: &Value) {
    Mock::given(method("GET"))
        .and(path("/api/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(descriptor))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/site"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "omeka_url": server.uri(),
            "title": "Test Archive",
            "omeka_version": "2.8"
        })))
        .mount(server)
        .await;
}

/// Mounts page `page` of `endpoint`, optionally narrowed by one filter parameter.
///
/// Requests for pages that are not mounted get wiremock's empty 404, which
/// the client reads as the end of the listing, as Omeka does.
pub async fn mount_page(
    server: &MockServer,
    endpoint: &str,
    filter: Option<(&str, &str)>,
    page: u32,
    records: Value,
) {
    let mut mock = Mock::given(method("GET"))
        .and(path(format!("/api/{endpoint}")))
        .and(query_param("page", page.to_string()));
    if let Some((name, value)) = filter {
        mock = mock.and(query_param(name, value));
    }
    mock.respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(server)
        .await;
}

/// Mounts a binary asset at `asset_path`.
pub async fn mount_asset(server: &MockServer, asset_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(asset_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

pub fn collection(id: u64, item_count: u64) -> Value {
    json!({"id": id, "items": {"count": item_count}, "public": true})
}

pub fn item(id: u64) -> Value {
    json!({"id": id, "public": true, "files": {"count": 1}})
}

/// A file record with an `original` rendition served by `server`.
pub fn file(server: &MockServer, id: u64, original_path: &str) -> Value {
    json!({
        "id": id,
        "filename": format!("{id}.jpg"),
        "file_urls": {
            "original": format!("{}{original_path}", server.uri()),
            "fullsize": null,
            "thumbnail": null,
            "square_thumbnail": null
        }
    })
}

/// Mounts a site with collection 1 holding items 10 and 11; item 10 has
/// file 100 whose original is served at `/files/original/a.jpg`.
pub async fn mount_single_collection_site(server: &MockServer, asset: &[u8]) {
    mount_bootstrap(server, &core_descriptor()).await;
    mount_page(server, "collections", None, 1, json!([collection(1, 2)])).await;
    mount_page(
        server,
        "items",
        Some(("collection", "1")),
        1,
        json!([item(10), item(11)]),
    )
    .await;
    mount_page(
        server,
        "files",
        Some(("item", "10")),
        1,
        json!([file(server, 100, "/files/original/a.jpg")]),
    )
    .await;
    mount_asset(server, "/files/original/a.jpg", asset).await;
}

/// Reads and parses a JSON file written by the archiver.
pub fn read_json(path: &Path) -> Value {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("parse {}: {e}", path.display()))
}

/// Every regular file under `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, root, out);
            } else if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_path_buf());
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
