// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers: mock API payloads, recording collaborators, app wiring.

#![allow(dead_code)]

use parking_lot::Mutex;
use photofeed::config::Config;
use photofeed::error::AppError;
use photofeed::models::Profile;
use photofeed::services::{
    HttpExecutor, MemorySecretStore, SessionObserver, SiteDataCleaner, UnsplashClient,
};
use photofeed::App;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-access-token";

/// Config with both API and OAuth hosts pointing at the mock server.
pub fn test_config(server: &MockServer) -> Config {
    Config::test_default(&server.uri())
}

pub fn test_client(server: &MockServer) -> UnsplashClient {
    UnsplashClient::new(HttpExecutor::new(), &test_config(server))
}

/// One photo record as the API returns it.
pub fn photo_json(id: &str, liked: bool) -> Value {
    json!({
        "id": id,
        "created_at": "2024-03-01T10:15:00-05:00",
        "updated_at": "2024-03-02T10:15:00-05:00",
        "width": 4000,
        "height": 3000,
        "color": "#a0a0a0",
        "blur_hash": null,
        "likes": 7,
        "liked_by_user": liked,
        "description": format!("Photo {}", id),
        "urls": {
            "raw": format!("https://images.example.com/{}/raw", id),
            "full": format!("https://images.example.com/{}/full", id),
            "regular": format!("https://images.example.com/{}/regular", id),
            "small": format!("https://images.example.com/{}/small", id),
            "thumb": format!("https://images.example.com/{}/thumb", id)
        }
    })
}

pub fn page_json(ids: &[&str]) -> Value {
    Value::Array(ids.iter().map(|id| photo_json(id, false)).collect())
}

/// Serve `GET /photos?page={page}` with the given ids.
pub async fn mount_page(server: &MockServer, page: u32, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/photos"))
        .and(query_param("page", page.to_string()))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(ids)))
        .mount(server)
        .await;
}

pub fn token_json(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "Bearer",
        "scope": "public read_user write_likes",
        "created_at": 1_700_000_000
    })
}

pub fn me_json(username: &str) -> Value {
    json!({
        "id": "u-1",
        "username": username,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "bio": "Counting engines"
    })
}

pub fn user_json(avatar: Option<&str>) -> Value {
    json!({
        "id": "u-1",
        "username": "ada",
        "profile_image": { "small": avatar, "medium": "https://images.example.com/m" }
    })
}

/// Records every callback the session makes.
#[derive(Default)]
pub struct RecordingObserver {
    pub logins: AtomicUsize,
    pub errors: Mutex<Vec<String>>,
    pub ready: Mutex<Vec<Option<Profile>>>,
}

impl RecordingObserver {
    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn ready_count(&self) -> usize {
        self.ready.lock().len()
    }
}

impl SessionObserver for RecordingObserver {
    fn show_login(&self) {
        self.logins.fetch_add(1, Ordering::SeqCst);
    }

    fn show_login_error(&self, error: &AppError) {
        self.errors.lock().push(error.to_string());
    }

    fn ready(&self, profile: Option<&Profile>) {
        self.ready.lock().push(profile.cloned());
    }
}

#[derive(Default)]
pub struct RecordingSiteData {
    pub clears: AtomicUsize,
}

impl SiteDataCleaner for RecordingSiteData {
    fn clear_site_data(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// App wired to the mock server with recording collaborators.
pub struct TestApp {
    pub app: App,
    pub tokens: Arc<MemorySecretStore>,
    pub observer: Arc<RecordingObserver>,
    pub site_data: Arc<RecordingSiteData>,
}

pub fn test_app(server: &MockServer, token: Option<&str>) -> TestApp {
    let tokens = Arc::new(match token {
        Some(token) => MemorySecretStore::with_token(token),
        None => MemorySecretStore::new(),
    });
    let observer = Arc::new(RecordingObserver::default());
    let site_data = Arc::new(RecordingSiteData::default());

    let app = App::new(
        test_config(server),
        tokens.clone(),
        site_data.clone(),
        observer.clone(),
    )
    .expect("Failed to build test app");

    TestApp {
        app,
        tokens,
        observer,
        site_data,
    }
}

/// Number of requests the mock server saw for `request_path`.
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// Short delay used to keep a mocked request in flight.
pub fn slow() -> Duration {
    Duration::from_millis(300)
}
