use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::api::{ApiClient, ApiError, QueryHit};
use crate::commands::editor::check_draft;
use crate::commands::Ctx;
use crate::render::{self, Theme};
use crate::store::{StateStore, SESSION_KEY, THEME_KEY};

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn content_length(head: &[u8]) -> Option<usize> {
    let head = String::from_utf8_lossy(head);
    for line in head.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if key.eq_ignore_ascii_case("content-length") {
                return value.trim().parse().ok();
            }
        }
    }
    None
}

/// Serves exactly one canned HTTP/1.1 response on a loopback port and
/// returns the base URL to point an `ApiClient` at.
async fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(_) => return,
        };
        let mut buf = vec![0u8; 8192];
        let mut seen: Vec<u8> = Vec::new();
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            seen.extend_from_slice(&buf[..n]);
            if let Some(pos) = find_headers_end(&seen) {
                let expected = content_length(&seen[..pos]).unwrap_or(0);
                if seen.len() >= pos + expected {
                    break;
                }
            }
        }
        let resp = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(resp.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}")
}

fn test_ctx(server: &str, store: StateStore) -> Ctx {
    Ctx {
        api: ApiClient::new(server, 5).unwrap(),
        store,
        theme: Theme::Dark,
        editor: None,
        export_file: None,
    }
}

// API client against canned responses

#[tokio::test]
async fn login_returns_the_session_token() {
    let server = serve_once("200 OK", r#"{"session":"tok-123"}"#.to_string()).await;
    let api = ApiClient::new(&server, 5).unwrap();
    assert_eq!(api.login("alice", "hunter2").await.unwrap(), "tok-123");
}

#[tokio::test]
async fn fetch_particle_decodes_the_full_shape() {
    let body = serde_json::json!({
        "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
        "user_id": 1,
        "user_facing_id": 4,
        "title": "Groceries",
        "body": "<p>milk &amp; eggs</p>",
        "author": "alice",
        "tags": ["food"],
        "created_at": "2024-05-01T12:30:00.000000",
        "updated_at": "2024-05-02T08:00:00.000000"
    })
    .to_string();
    let server = serve_once("200 OK", body).await;
    let api = ApiClient::new(&server, 5).unwrap();

    let particle = api
        .particle("tok", "1b4e28ba-2fa1-11d2-883f-0016d3cca427")
        .await
        .unwrap();
    assert_eq!(particle.user_facing_id, 4);
    assert_eq!(particle.title, "Groceries");
    assert_eq!(particle.author, "alice");
    assert_eq!(particle.tags, vec!["food".to_string()]);
}

#[tokio::test]
async fn body_only_update_targets_the_sub_resource() {
    let body = serde_json::json!({
        "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
        "user_facing_id": 4,
        "title": "Groceries",
        "body": "<p>bread</p>",
        "created_at": "2024-05-01T12:30:00.000000"
    })
    .to_string();
    let server = serve_once("200 OK", body).await;
    let api = ApiClient::new(&server, 5).unwrap();

    let particle = api
        .update_particle_body("tok", "1b4e28ba-2fa1-11d2-883f-0016d3cca427", "<p>bread</p>")
        .await
        .unwrap();
    assert_eq!(particle.body, "<p>bread</p>");
    assert!(particle.tags.is_empty());
}

#[tokio::test]
async fn register_surfaces_the_server_detail() {
    let server = serve_once(
        "400 Bad Request",
        r#"{"detail":"Username already exists"}"#.to_string(),
    )
    .await;
    let api = ApiClient::new(&server, 5).unwrap();

    match api.register("alice", "hunter2").await {
        Err(ApiError::Status {
            status: 400,
            detail: Some(detail),
        }) => assert_eq!(detail, "Username already exists"),
        other => panic!("expected a 400 with detail, got {other:?}"),
    }
}

#[tokio::test]
async fn search_with_a_stale_session_reports_the_status() {
    let server = serve_once("401 Unauthorized", r#"{"detail":"Invalid session"}"#.to_string()).await;
    let api = ApiClient::new(&server, 5).unwrap();

    match api.search("stale", "").await {
        Err(ApiError::Status { status: 401, .. }) => {}
        other => panic!("expected a 401, got {other:?}"),
    }
}

// Controllers over a temp state store

#[tokio::test]
async fn login_stores_the_session_token() {
    let server = serve_once("200 OK", r#"{"session":"tok-9"}"#.to_string()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::at(dir.path().to_path_buf());
    let ctx = test_ctx(&server, store.clone());

    crate::commands::auth::login(&ctx, "alice", Some("hunter2"))
        .await
        .unwrap();
    assert_eq!(store.session().as_deref(), Some("tok-9"));
}

#[tokio::test]
async fn search_expiry_clears_the_stored_session() {
    let server = serve_once("401 Unauthorized", r#"{"detail":"Invalid session"}"#.to_string()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::at(dir.path().to_path_buf());
    store.set_session("stale").unwrap();
    let ctx = test_ctx(&server, store.clone());

    let err = crate::commands::search::search(&ctx, None).await.unwrap_err();
    assert!(err.contains("session expired"), "unexpected error: {err}");
    assert!(store.session().is_none());
}

// State store

#[test]
fn store_round_trips_session_and_theme() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::at(dir.path().to_path_buf());

    assert!(store.session().is_none());
    store.set_session("tok").unwrap();
    assert_eq!(store.session().as_deref(), Some("tok"));
    store.clear_session().unwrap();
    assert!(store.session().is_none());

    assert_eq!(store.theme(), Theme::Dark);
    store.set_theme(Theme::Light).unwrap();
    assert_eq!(store.theme(), Theme::Light);
}

#[test]
fn guard_blocks_missing_and_blank_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::at(dir.path().to_path_buf());

    assert!(store.guard().is_err());
    store.set(SESSION_KEY, "  \n").unwrap();
    assert!(store.guard().is_err());
    store.set_session("tok").unwrap();
    assert_eq!(store.guard().unwrap(), "tok");
}

#[test]
fn unknown_theme_value_falls_back_to_dark() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::at(dir.path().to_path_buf());
    store.set(THEME_KEY, "sepia").unwrap();
    assert_eq!(store.theme(), Theme::Dark);
}

#[test]
fn clearing_an_absent_key_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::at(dir.path().to_path_buf());
    store.clear_session().unwrap();
}

// Editor preconditions

#[test]
fn draft_rejects_blank_title_and_empty_rendered_body() {
    assert!(check_draft("", "<p>x</p>").is_err());
    assert!(check_draft("   ", "<p>x</p>").is_err());
    assert!(check_draft("Hello", "<p><br></p>").is_err());
    assert!(check_draft("Hello", "&nbsp; \n").is_err());
    assert!(check_draft("Hello", "").is_err());
    assert!(check_draft("Hello", "<p>world</p>").is_ok());
}

// Rendering

fn sample_hits() -> Vec<QueryHit> {
    vec![
        QueryHit {
            id: "1b4e28ba-2fa1-11d2-883f-0016d3cca427".to_string(),
            user_facing_id: 1,
            created_at: "2024-05-01T12:30:00.000000".to_string(),
            title: "Groceries".to_string(),
            score: 1.5,
            snippet: "milk and eggs".to_string(),
        },
        QueryHit {
            id: "9f8b1c1e-0000-4c6e-9a6e-3d2f1a2b3c4d".to_string(),
            user_facing_id: 2,
            created_at: "2024-05-02T09:00:00.000000".to_string(),
            title: "Reading list".to_string(),
            score: 0.4,
            snippet: String::new(),
        },
    ]
}

#[test]
fn search_table_render_is_idempotent() {
    colored::control::set_override(false);
    let hits = sample_hits();
    let first = render::search_table(&hits, Theme::Dark);
    let second = render::search_table(&hits, Theme::Dark);
    assert_eq!(first, second);
    // header, two rows, one snippet line
    assert_eq!(first.lines().count(), 4);
}

#[test]
fn search_table_lists_ids_dates_and_titles() {
    colored::control::set_override(false);
    let table = render::search_table(&sample_hits(), Theme::Dark);
    assert!(table.contains("#1"));
    assert!(table.contains("2024-05-01"));
    assert!(table.contains("Groceries"));
    assert!(table.contains("1b4e28ba-2fa1-11d2-883f-0016d3cca427"));
    assert!(table.contains("milk and eggs"));
}

// Config

#[test]
fn config_file_fills_values_the_cli_left_unset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, "server: http://cfg:9000\ntimeout: 3\n").unwrap();

    let cfg = crate::config::load_config(&path, false).unwrap();
    assert_eq!(cfg.server.as_deref(), Some("http://cfg:9000"));
    assert_eq!(cfg.timeout, Some(3));
    assert!(cfg.workers.is_none());
}

#[test]
fn missing_config_is_fine_when_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yml");
    assert!(crate::config::load_config(&path, true).is_ok());
    assert!(crate::config::load_config(&path, false).is_err());
}
