// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current user's profile.

use crate::error::Result;
use crate::models::Profile;
use crate::services::single_flight::{cancelled, SingleFlight};
use crate::services::unsplash::UnsplashClient;
use parking_lot::Mutex;
use std::sync::Arc;

/// Fetches and caches the authenticated user's profile.
#[derive(Clone)]
pub struct ProfileStore {
    inner: Arc<Inner>,
}

struct Inner {
    client: UnsplashClient,
    state: Mutex<ProfileState>,
}

#[derive(Default)]
struct ProfileState {
    profile: Option<Profile>,
    flight: SingleFlight,
}

impl ProfileStore {
    pub fn new(client: UnsplashClient) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                state: Mutex::new(ProfileState::default()),
            }),
        }
    }

    /// The last successfully fetched profile.
    pub fn profile(&self) -> Option<Profile> {
        self.inner.state.lock().profile.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().flight.is_active()
    }

    /// Fetch `GET /me`, replacing the cached profile.
    ///
    /// Cancels a fetch that is still outstanding; that call then resolves with
    /// a cancellation error.
    pub async fn fetch(&self, access_token: &str) -> Result<Profile> {
        let (id, cancel) = self.inner.state.lock().flight.begin();

        let result = self.inner.client.get_me(access_token, &cancel).await;

        let mut state = self.inner.state.lock();
        if !state.flight.finish(id) {
            tracing::debug!("Profile fetch superseded, dropping result");
            return Err(result.err().unwrap_or_else(cancelled));
        }

        match result {
            Ok(raw) => {
                let profile = Profile::from(raw);
                tracing::info!(username = %profile.username, "Profile loaded");
                state.profile = Some(profile.clone());
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile fetch failed");
                Err(e)
            }
        }
    }

    /// Forget the cached profile and cancel an outstanding fetch.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        state.flight.cancel();
        state.profile = None;
    }
}
