// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Photofeed: session and request coordination for a photo feed client
//!
//! This crate provides the OAuth login flow, the paginated photo feed with
//! likes, and the profile/avatar stores that a front end observes.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use error::AppError;
use services::{
    AvatarStore, FeedStore, HttpExecutor, ProfileStore, SecretStore, SessionController,
    SessionObserver, SessionStores, SiteDataCleaner, TokenExchangeCoordinator, UnsplashClient,
};
use std::sync::Arc;

/// Every core component, constructed once at startup and shared by handle.
pub struct App {
    pub config: Config,
    pub tokens: Arc<dyn SecretStore>,
    pub client: UnsplashClient,
    pub exchange: TokenExchangeCoordinator,
    pub feed: FeedStore,
    pub profiles: ProfileStore,
    pub avatars: AvatarStore,
    pub session: SessionController,
}

impl App {
    /// Wire the components together. The secret store, site data cleaner and
    /// observer are supplied by the front end.
    pub fn new(
        config: Config,
        tokens: Arc<dyn SecretStore>,
        site_data: Arc<dyn SiteDataCleaner>,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self, AppError> {
        let http = match config.http_timeout {
            Some(timeout) => HttpExecutor::with_timeout(timeout)?,
            None => HttpExecutor::new(),
        };
        let client = UnsplashClient::new(http, &config);

        let exchange = TokenExchangeCoordinator::new(client.clone(), tokens.clone());
        let feed = FeedStore::new(client.clone(), tokens.clone());
        let profiles = ProfileStore::new(client.clone());
        let avatars = AvatarStore::new(client.clone());

        let session = SessionController::new(
            tokens.clone(),
            exchange.clone(),
            SessionStores {
                profiles: profiles.clone(),
                avatars: avatars.clone(),
                feed: feed.clone(),
            },
            site_data,
            observer,
        );

        Ok(Self {
            config,
            tokens,
            client,
            exchange,
            feed,
            profiles,
            avatars,
            session,
        })
    }
}
