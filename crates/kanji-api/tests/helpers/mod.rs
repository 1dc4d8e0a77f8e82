//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p kanji-api`.

pub mod fixtures;

use axum_test::TestServer;
use kanji_api::setup::routes;
use kanji_api::state::AppState;
use kanji_core::Config;
use kanji_processing::UploadScratch;
use kanji_providers::ProviderRegistry;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server plus the scratch directory it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files currently staged in the upload directory
    pub fn staged_files(&self) -> usize {
        count_files(self.upload_dir.path())
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

/// Default configuration with stand-in providers.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}, |providers| providers).await
}

/// Tweak the configuration and swap providers before the router is built.
pub async fn setup_test_app_with(
    configure: impl FnOnce(&mut Config),
    providers: impl FnOnce(ProviderRegistry) -> ProviderRegistry,
) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut config = Config::default();
    config.upload.upload_dir = upload_dir.path().to_path_buf();
    configure(&mut config);

    let scratch = UploadScratch::new(&config.upload.upload_dir)
        .await
        .expect("Failed to create scratch directory");
    let registry = providers(ProviderRegistry::from_config(&config));
    let state = Arc::new(AppState::new(config.clone(), scratch, registry));

    let router = routes::setup_routes(&config, state)
        .await
        .expect("Failed to build router");

    TestApp {
        server: TestServer::new(router).expect("Failed to start test server"),
        upload_dir,
    }
}
