// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated photo feed with like toggling.
//!
//! The store owns the photo list and is the only writer to it. Observers
//! subscribe to [`FeedChange`] notifications and re-read snapshots.
//!
//! Single-flight rules:
//! - a page fetch while another is in flight is a no-op
//! - a like toggle cancels the previous outstanding toggle
//! - `clear()` cancels both and discards their late results

use crate::error::{AppError, Result};
use crate::models::Photo;
use crate::services::secret_store::SecretStore;
use crate::services::single_flight::SingleFlight;
use crate::services::unsplash::UnsplashClient;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Photos requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Buffered notifications per subscriber before the slowest one lags.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Published after every page fetch attempt and on clear.
///
/// Equal counts mean nothing was appended (failed fetch or empty page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedChange {
    pub old_count: usize,
    pub new_count: usize,
}

impl FeedChange {
    /// Indices of the appended photos.
    pub fn inserted(&self) -> std::ops::Range<usize> {
        self.old_count..self.new_count.max(self.old_count)
    }
}

/// Paginated, deduplicated photo feed.
#[derive(Clone)]
pub struct FeedStore {
    inner: Arc<Inner>,
}

struct Inner {
    client: UnsplashClient,
    tokens: Arc<dyn SecretStore>,
    state: Mutex<FeedState>,
    changes: broadcast::Sender<FeedChange>,
}

#[derive(Default)]
struct FeedState {
    photos: Vec<Photo>,
    last_loaded_page: Option<u32>,
    is_loading: bool,
    fetch_cancel: Option<CancellationToken>,
    like: SingleFlight,
    /// Bumped by `clear()` so late results from before it are dropped
    epoch: u64,
}

impl FeedStore {
    pub fn new(client: UnsplashClient, tokens: Arc<dyn SecretStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                client,
                tokens,
                state: Mutex::new(FeedState::default()),
                changes,
            }),
        }
    }

    /// Register for change notifications. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedChange> {
        self.inner.changes.subscribe()
    }

    // ─── Snapshots ───────────────────────────────────────────────────────────

    pub fn photos(&self) -> Vec<Photo> {
        self.inner.state.lock().photos.clone()
    }

    pub fn photo(&self, id: &str) -> Option<Photo> {
        self.inner.state.lock().photos.iter().find(|p| p.id == id).cloned()
    }

    pub fn photo_at(&self, index: usize) -> Option<Photo> {
        self.inner.state.lock().photos.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().photos.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().is_loading
    }

    pub fn last_loaded_page(&self) -> Option<u32> {
        self.inner.state.lock().last_loaded_page
    }

    // ─── Pagination ──────────────────────────────────────────────────────────

    /// Fetch and append the next page.
    ///
    /// Returns `Ok(None)` without touching the network when a fetch is already
    /// in flight, and also when `clear()` ran while this fetch was waiting.
    /// Every other attempt publishes a [`FeedChange`], including failed ones,
    /// after the loading flag is cleared.
    pub async fn fetch_next_page(&self) -> Result<Option<FeedChange>> {
        let (page, epoch, cancel) = {
            let mut state = self.inner.state.lock();
            if state.is_loading {
                tracing::debug!("Page fetch already in flight, skipping");
                return Ok(None);
            }
            state.is_loading = true;

            let page = state.last_loaded_page.unwrap_or(0) + 1;
            let cancel = CancellationToken::new();
            state.fetch_cancel = Some(cancel.clone());
            (page, state.epoch, cancel)
        };

        let token = match self.inner.tokens.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!(page, "No access token, cannot fetch photos");
                self.finish_fetch(epoch, None);
                return Err(AppError::NotAuthorized);
            }
            Err(e) => {
                tracing::error!(page, error = %e, "Failed to read access token");
                self.finish_fetch(epoch, None);
                return Err(e);
            }
        };

        tracing::debug!(page, per_page = PAGE_SIZE, "Fetching photos page");
        let result = self
            .inner
            .client
            .list_photos(&token, page, PAGE_SIZE, &cancel)
            .await;

        match result {
            Ok(records) => {
                let photos: Vec<Photo> = records.into_iter().map(Photo::from).collect();
                let change = self.finish_fetch(epoch, Some((page, photos)));
                Ok(change)
            }
            Err(e) => {
                if e.is_cancelled() {
                    tracing::debug!(page, "Page fetch cancelled");
                } else {
                    tracing::warn!(page, error = %e, "Page fetch failed, page will be retried");
                }
                self.finish_fetch(epoch, None);
                Err(e)
            }
        }
    }

    /// Commit a fetch outcome, clear the loading flag, then notify.
    ///
    /// Returns `None` when `clear()` ran since the fetch started; the result is
    /// dropped and no notification is sent (clear already sent one).
    fn finish_fetch(&self, epoch: u64, loaded: Option<(u32, Vec<Photo>)>) -> Option<FeedChange> {
        let change = {
            let mut state = self.inner.state.lock();
            if state.epoch != epoch {
                tracing::debug!("Feed cleared during fetch, discarding result");
                return None;
            }

            let old_count = state.photos.len();
            if let Some((page, photos)) = loaded {
                let mut seen: HashSet<String> =
                    state.photos.iter().map(|p| p.id.clone()).collect();
                let received = photos.len();
                for photo in photos {
                    if seen.insert(photo.id.clone()) {
                        state.photos.push(photo);
                    }
                }
                let appended = state.photos.len() - old_count;
                if appended < received {
                    tracing::debug!(
                        page,
                        skipped = received - appended,
                        "Dropped photos already in the feed"
                    );
                }
                state.last_loaded_page = Some(page);
                tracing::info!(page, appended, total = state.photos.len(), "Photos page loaded");
            }

            state.is_loading = false;
            state.fetch_cancel = None;
            FeedChange {
                old_count,
                new_count: state.photos.len(),
            }
        };

        // No subscribers is fine.
        let _ = self.inner.changes.send(change);
        Some(change)
    }

    // ─── Likes ───────────────────────────────────────────────────────────────

    /// Like (`like = true`) or unlike a photo on the server, then flip the
    /// stored flag.
    ///
    /// The stored photo is negated on confirmation; `like` only picks the
    /// HTTP method. A photo no longer in the feed is a successful no-op. On
    /// failure nothing changes.
    pub async fn toggle_like(&self, photo_id: &str, like: bool) -> Result<()> {
        let token = self
            .inner
            .tokens
            .get()?
            .ok_or(AppError::NotAuthorized)?;

        let (like_id, cancel) = self.inner.state.lock().like.begin();

        tracing::debug!(photo_id, like, "Toggling like");
        let result = self
            .inner
            .client
            .set_like(&token, photo_id, like, &cancel)
            .await;

        let mut state = self.inner.state.lock();
        let is_current = state.like.finish(like_id);

        if let Err(e) = result {
            if e.is_cancelled() {
                tracing::debug!(photo_id, "Like toggle cancelled");
            } else {
                tracing::warn!(photo_id, error = %e, "Like toggle failed");
            }
            return Err(e);
        }
        if !is_current {
            tracing::debug!(photo_id, "Superseded toggle was confirmed before cancellation");
        }

        match state.photos.iter_mut().find(|p| p.id == photo_id) {
            Some(photo) => {
                photo.is_liked = !photo.is_liked;
                tracing::info!(photo_id, is_liked = photo.is_liked, "Like confirmed");
            }
            None => {
                // Confirmed remotely, but the photo left the feed meanwhile.
                tracing::debug!(photo_id, "Like confirmed for photo no longer in feed");
            }
        }

        Ok(())
    }

    // ─── Reset ───────────────────────────────────────────────────────────────

    /// Drop all photos and reset pagination; in-flight requests are cancelled.
    pub fn clear(&self) {
        let change = {
            let mut state = self.inner.state.lock();
            if let Some(cancel) = state.fetch_cancel.take() {
                cancel.cancel();
            }
            state.like.cancel();

            let old_count = state.photos.len();
            state.photos.clear();
            state.last_loaded_page = None;
            state.is_loading = false;
            state.epoch += 1;
            FeedChange {
                old_count,
                new_count: 0,
            }
        };

        tracing::info!(removed = change.old_count, "Feed cleared");
        let _ = self.inner.changes.send(change);
    }
}
