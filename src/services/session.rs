// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: startup, login completion and logout.
//!
//! ```text
//! Unauthenticated -> Authenticating -> Authenticated -> LoadingProfile -> Ready
//! Unauthenticated -(stored token)------------------> LoadingProfile -> Ready
//! ```

use crate::error::{AppError, Result};
use crate::models::Profile;
use crate::services::avatar::AvatarStore;
use crate::services::feed::FeedStore;
use crate::services::oauth::TokenExchangeCoordinator;
use crate::services::profile::ProfileStore;
use crate::services::secret_store::SecretStore;
use crate::services::site_data::SiteDataCleaner;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// UI capabilities the session drives. Implemented by the front end.
pub trait SessionObserver: Send + Sync {
    /// No usable token: present the login flow.
    fn show_login(&self);

    /// Login failed; the session stays unauthenticated.
    fn show_login_error(&self, error: &AppError);

    /// Profile loading settled. `profile` is `None` when that fetch failed.
    fn ready(&self, profile: Option<&Profile>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    LoadingProfile,
    Ready,
}

/// The stores a session populates and tears down.
#[derive(Clone)]
pub struct SessionStores {
    pub profiles: ProfileStore,
    pub avatars: AvatarStore,
    pub feed: FeedStore,
}

/// Orchestrates startup sequencing and logout.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    tokens: Arc<dyn SecretStore>,
    exchange: TokenExchangeCoordinator,
    stores: SessionStores,
    site_data: Arc<dyn SiteDataCleaner>,
    observer: Arc<dyn SessionObserver>,
    state: Mutex<SessionState>,
    avatar_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(
        tokens: Arc<dyn SecretStore>,
        exchange: TokenExchangeCoordinator,
        stores: SessionStores,
        site_data: Arc<dyn SiteDataCleaner>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                tokens,
                exchange,
                stores,
                site_data,
                observer,
                state: Mutex::new(SessionState::Unauthenticated),
                avatar_task: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.lock()
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.inner.state.lock();
        if *state != next {
            tracing::debug!(from = ?*state, to = ?next, "Session state change");
            *state = next;
        }
    }

    /// Launch: load the profile when a token is stored, else ask for login.
    pub async fn start(&self) -> SessionState {
        let token = match self.inner.tokens.get() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Stored token unreadable, starting unauthenticated");
                None
            }
        };

        match token {
            Some(token) => {
                tracing::info!("Stored token found, loading profile");
                self.load_profile(&token).await;
            }
            None => {
                tracing::info!("No stored token, showing login");
                self.set_state(SessionState::Unauthenticated);
                self.inner.observer.show_login();
            }
        }

        self.state()
    }

    /// Finish login with the authorization code from the redirect.
    ///
    /// Cancelled and duplicate exchanges are returned as errors but not shown
    /// to the user and do not change the session state, since another login
    /// attempt owns it.
    pub async fn complete_login(&self, code: &str) -> Result<()> {
        self.set_state(SessionState::Authenticating);

        match self.inner.exchange.exchange(code).await {
            Ok(token) => {
                self.set_state(SessionState::Authenticated);
                self.load_profile(&token).await;
                Ok(())
            }
            Err(e) if e.is_user_facing() => {
                tracing::warn!(error = %e, "Login failed");
                self.set_state(SessionState::Unauthenticated);
                self.inner.observer.show_login_error(&e);
                Err(e)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Login attempt superseded");
                Err(e)
            }
        }
    }

    /// Fetch the profile, start the avatar fetch without waiting for it, then
    /// signal ready once the profile fetch settles.
    async fn load_profile(&self, token: &str) {
        self.set_state(SessionState::LoadingProfile);

        let profile = match self.inner.stores.profiles.fetch(token).await {
            Ok(profile) => {
                self.spawn_avatar_fetch(token, &profile.username);
                Some(profile)
            }
            Err(e) if e.is_cancelled() => {
                // Logout (or a newer load) tore this one down.
                tracing::debug!("Profile load cancelled, not signalling ready");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile fetch failed, continuing without it");
                None
            }
        };

        self.set_state(SessionState::Ready);
        self.inner.observer.ready(profile.as_ref());
    }

    fn spawn_avatar_fetch(&self, token: &str, username: &str) {
        let avatars = self.inner.stores.avatars.clone();
        let token = token.to_string();
        let username = username.to_string();

        let handle = tokio::spawn(async move {
            match avatars.fetch(&token, &username).await {
                Ok(_) => {}
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(username = %username, "Avatar fetch cancelled");
                }
                Err(e) => {
                    tracing::warn!(username = %username, error = %e, "Avatar fetch failed");
                }
            }
        });

        // A previous task is superseded through the avatar store's own
        // cancellation; dropping its handle just detaches it.
        *self.inner.avatar_task.lock() = Some(handle);
    }

    /// Wait for the background avatar fetch started by the last profile load.
    pub async fn avatar_settled(&self) {
        let handle = self.inner.avatar_task.lock().take();
        if let Some(handle) = handle {
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => tracing::debug!("Avatar task aborted"),
                Err(e) => tracing::warn!(error = %e, "Avatar task did not complete"),
            }
        }
    }

    /// Forget the user: token, cached profile, avatar, feed and site data.
    ///
    /// Every step runs even if deleting the token fails; that failure is
    /// returned afterwards.
    pub fn logout(&self) -> Result<()> {
        tracing::info!("Logging out");
        self.inner.exchange.cancel();

        let token_result = self.inner.tokens.clear();
        if let Err(e) = &token_result {
            tracing::error!(error = %e, "Failed to delete stored token");
        }

        // Abort before clearing: a task not yet polled has no request for
        // the store to cancel.
        if let Some(handle) = self.inner.avatar_task.lock().take() {
            handle.abort();
        }
        self.inner.stores.profiles.clear();
        self.inner.stores.avatars.clear();
        self.inner.stores.feed.clear();
        self.inner.site_data.clear_site_data();

        self.set_state(SessionState::Unauthenticated);
        token_result
    }
}
