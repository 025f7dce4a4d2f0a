// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - request coordination and stores.

pub mod avatar;
pub mod feed;
pub mod http;
pub mod oauth;
pub mod profile;
pub mod secret_store;
pub mod session;
pub mod site_data;
mod single_flight;
pub mod unsplash;

pub use avatar::AvatarStore;
pub use feed::{FeedChange, FeedStore, PAGE_SIZE};
pub use http::{ApiRequest, HttpError, HttpExecutor, TransportError};
pub use oauth::TokenExchangeCoordinator;
pub use profile::ProfileStore;
pub use secret_store::{EncryptedFileStore, MemorySecretStore, SecretStore};
pub use session::{SessionController, SessionObserver, SessionState, SessionStores};
pub use site_data::{NoSiteData, SiteDataCleaner};
pub use unsplash::UnsplashClient;
