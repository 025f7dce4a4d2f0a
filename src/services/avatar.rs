// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Avatar URL for the current user.

use crate::error::{AppError, Result};
use crate::services::single_flight::{cancelled, SingleFlight};
use crate::services::unsplash::UnsplashClient;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Fetches and caches the avatar URL; notifies subscribers when it changes.
#[derive(Clone)]
pub struct AvatarStore {
    inner: Arc<Inner>,
}

struct Inner {
    client: UnsplashClient,
    state: Mutex<AvatarState>,
    changes: broadcast::Sender<()>,
}

#[derive(Default)]
struct AvatarState {
    avatar_url: Option<String>,
    flight: SingleFlight,
}

impl AvatarStore {
    pub fn new(client: UnsplashClient) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                client,
                state: Mutex::new(AvatarState::default()),
                changes,
            }),
        }
    }

    /// Notified after each successful fetch; re-read [`AvatarStore::avatar_url`].
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.inner.changes.subscribe()
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.inner.state.lock().avatar_url.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().flight.is_active()
    }

    /// Fetch `GET /users/{username}` and keep its small profile image URL.
    ///
    /// A record without a small image is [`AppError::InvalidData`].
    pub async fn fetch(&self, access_token: &str, username: &str) -> Result<String> {
        let (id, cancel) = self.inner.state.lock().flight.begin();

        let result = self
            .inner
            .client
            .get_user(access_token, username, &cancel)
            .await;

        let url = {
            let mut state = self.inner.state.lock();
            if !state.flight.finish(id) {
                tracing::debug!(username, "Avatar fetch superseded, dropping result");
                return Err(result.err().unwrap_or_else(cancelled));
            }

            let user = result.map_err(|e| {
                tracing::warn!(username, error = %e, "Avatar fetch failed");
                e
            })?;

            let url = user.profile_image.small.ok_or_else(|| {
                tracing::warn!(username, "User record has no small profile image");
                AppError::InvalidData(format!("No avatar URL for user {}", username))
            })?;

            state.avatar_url = Some(url.clone());
            url
        };

        tracing::info!(username, "Avatar URL updated");
        let _ = self.inner.changes.send(());
        Ok(url)
    }

    /// Forget the avatar URL and cancel an outstanding fetch.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        state.flight.cancel();
        state.avatar_url = None;
    }
}
