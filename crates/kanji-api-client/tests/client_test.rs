//! End-to-end tests: the client against a real API server on a local port.

use kanji_api::setup::{build_state, routes};
use kanji_api_client::lookup_flow::LookupPhase;
use kanji_api_client::{
    ApiClient, ClientError, KanjiBackend, SelectedFile, UploadPhase, UploadSession,
};
use kanji_core::Config;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

struct RunningApi {
    client: ApiClient,
    base_url: String,
    _upload_dir: TempDir,
}

async fn start_api() -> RunningApi {
    let upload_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = Config::default();
    config.upload.upload_dir = upload_dir.path().to_path_buf();

    let state = build_state(config.clone()).await.expect("Failed to build state");
    let router = routes::setup_routes(&config, state)
        .await
        .expect("Failed to build router");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    let base_url = format!("http://{}", addr);
    RunningApi {
        client: ApiClient::new(base_url.as_str()).expect("Failed to create client"),
        base_url,
        _upload_dir: upload_dir,
    }
}

fn png_file() -> SelectedFile {
    SelectedFile::new("page.png", Some("image/png"), PNG)
}

#[tokio::test]
async fn test_health() {
    let api = start_api().await;
    let health = api.client.health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_upload_then_lookup() {
    let api = start_api().await;

    let upload = api.client.upload(&png_file()).await.unwrap();
    assert!(upload.success);
    assert_eq!(upload.ocr_results.detected_text, "日本語");

    let lookup = api.client.lookup("日").await.unwrap();
    assert_eq!(lookup.kanji, "日");
    assert!(lookup.data.meanings.iter().any(|m| m == "sun"));
}

#[tokio::test]
async fn test_server_error_envelope_is_decoded() {
    let api = start_api().await;

    let text = SelectedFile::new("notes.txt", Some("text/plain"), &b"hello"[..]);
    match api.client.upload(&text).await.unwrap_err() {
        ClientError::Server { status, code, .. } => {
            assert_eq!(status, 400);
            assert_eq!(code, "INVALID_FILE");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let missing = api.client.lookup("猫").await.unwrap_err();
    assert!(missing.is_not_found());
    assert!(missing.is_missing_entry());

    let multi = api.client.lookup("日本").await.unwrap_err();
    assert_eq!(multi.status(), Some(400));
}

#[tokio::test]
async fn test_wrong_base_path_is_an_error_not_a_missing_entry() {
    let api = start_api().await;
    let client = ApiClient::new(format!("{}/wrong", api.base_url)).unwrap();

    let err = KanjiBackend::lookup(&client, "日".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_missing_entry());

    let absent = KanjiBackend::lookup(&api.client, "猫".to_string()).await.unwrap();
    assert!(absent.is_none());
}

#[tokio::test]
async fn test_chat() {
    let api = start_api().await;
    let reply = api.client.chat("こんにちは").await.unwrap();
    assert!(reply.success);
    assert!(reply.response.contains("こんにちは"));

    let empty = api.client.chat("   ").await.unwrap_err();
    assert_eq!(empty.status(), Some(400));
}

#[tokio::test]
async fn test_network_error_when_server_is_down() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(format!("http://{}", addr)).unwrap();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn test_sessions_against_server() {
    let api = start_api().await;
    let session = UploadSession::new(Arc::new(api.client.clone()));
    let lookups = session.lookup_session();

    session.select(png_file()).unwrap();
    session.process().unwrap().await.unwrap();
    assert_eq!(
        session.with_state(|s| s.upload.phase()),
        UploadPhase::ResultsDisplayed
    );

    lookups.lookup("本").unwrap().await.unwrap();
    lookups.with_state(|s| {
        assert_eq!(s.lookup.phase(), LookupPhase::Displayed);
        assert!(s.lookup.entry().unwrap().meanings.iter().any(|m| m == "book"));
    });

    lookups.lookup("猫").unwrap().await.unwrap();
    lookups.with_state(|s| {
        assert_eq!(s.lookup.phase(), LookupPhase::NotFound);
        assert!(s.banner(Instant::now()).is_none());
    });
}
