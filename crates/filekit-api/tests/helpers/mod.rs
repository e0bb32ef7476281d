//! Test helpers: build the real router over a scratch temp directory.
//!
//! Run from workspace root: `cargo test -p filekit-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use filekit_api::state::AppState;
use filekit_core::Config;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server, shared state and the owned temp directory.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of the files currently in the temp directory.
    pub fn stored_files(&self) -> Vec<String> {
        list_files(self.temp_dir.path())
    }
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        temp_dir: temp_dir.path().to_path_buf(),
        max_concurrent_jobs: 2,
        job_queue_size: 4,
        ..Config::default()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Like [`setup_test_app`] with a chance to adjust the configuration.
pub async fn setup_test_app_with(adjust: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config(&temp_dir);
    adjust(&mut config);

    let (state, router) = filekit_api::setup::build_app(config)
        .await
        .expect("Failed to build app");
    let server = TestServer::new(router.into_make_service()).expect("Failed to start test server");

    TestApp {
        server,
        state,
        temp_dir,
    }
}

/// A multipart form with one file under `field`.
pub fn file_form(field: &str, name: &str, mime: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(field, file_part(name, mime, bytes))
}

pub fn file_part(name: &str, mime: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes).file_name(name).mime_type(mime)
}
