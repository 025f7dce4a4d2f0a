// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests for the profile and avatar stores.

use photofeed::error::AppError;
use photofeed::services::{AvatarStore, ProfileStore};
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{me_json, slow, test_client, user_json, TOKEN};

#[tokio::test]
async fn test_profile_fetch_maps_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_json("ada")))
        .expect(1)
        .mount(&server)
        .await;

    let profiles = ProfileStore::new(test_client(&server));
    assert!(profiles.profile().is_none());

    let profile = profiles.fetch(TOKEN).await.unwrap();

    assert_eq!(profile.username, "ada");
    assert_eq!(profile.display_name, "Ada Lovelace");
    assert_eq!(profile.login_handle, "@ada");
    assert_eq!(profile.bio.as_deref(), Some("Counting engines"));
    assert_eq!(profiles.profile(), Some(profile));
    assert!(!profiles.is_loading());
}

#[tokio::test]
async fn test_profile_without_names_or_bio() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "anon",
            "first_name": null,
            "last_name": null,
            "bio": null
        })))
        .mount(&server)
        .await;

    let profile = ProfileStore::new(test_client(&server)).fetch(TOKEN).await.unwrap();

    assert_eq!(profile.display_name, "");
    assert_eq!(profile.login_handle, "@anon");
    assert_eq!(profile.bio, None);
}

#[tokio::test]
async fn test_profile_unauthorized_keeps_cache_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let profiles = ProfileStore::new(test_client(&server));
    let err = profiles.fetch("expired").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(profiles.profile().is_none());
}

#[tokio::test]
async fn test_newer_profile_fetch_supersedes_older() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer old"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(me_json("old"))
                .set_delay(slow()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_json("new")))
        .mount(&server)
        .await;

    let profiles = ProfileStore::new(test_client(&server));
    let (first, second) = tokio::join!(profiles.fetch("old"), profiles.fetch("new"));

    assert!(first.unwrap_err().is_cancelled());
    assert_eq!(second.unwrap().username, "new");
    assert_eq!(profiles.profile().unwrap().username, "new");
}

#[tokio::test]
async fn test_profile_clear() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_json("ada")))
        .mount(&server)
        .await;

    let profiles = ProfileStore::new(test_client(&server));
    profiles.fetch(TOKEN).await.unwrap();
    profiles.clear();

    assert!(profiles.profile().is_none());
}

#[tokio::test]
async fn test_avatar_fetch_stores_url_and_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ada"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json(Some("https://images.example.com/s"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let avatars = AvatarStore::new(test_client(&server));
    let mut changes = avatars.subscribe();

    let url = avatars.fetch(TOKEN, "ada").await.unwrap();

    assert_eq!(url, "https://images.example.com/s");
    assert_eq!(avatars.avatar_url().as_deref(), Some("https://images.example.com/s"));
    assert!(changes.try_recv().is_ok());
    assert!(!avatars.is_loading());
}

#[tokio::test]
async fn test_avatar_without_small_image_is_invalid_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(None)))
        .mount(&server)
        .await;

    let avatars = AvatarStore::new(test_client(&server));
    let mut changes = avatars.subscribe();

    let err = avatars.fetch(TOKEN, "ada").await.unwrap_err();

    assert!(matches!(err, AppError::InvalidData(_)));
    assert!(avatars.avatar_url().is_none());
    assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_avatar_clear_cancels_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ada"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json(Some("https://images.example.com/s")))
                .set_delay(slow()),
        )
        .mount(&server)
        .await;

    let avatars = AvatarStore::new(test_client(&server));
    let (result, _) = tokio::join!(avatars.fetch(TOKEN, "ada"), async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        avatars.clear();
    });

    assert!(result.unwrap_err().is_cancelled());
    assert!(avatars.avatar_url().is_none());
}
