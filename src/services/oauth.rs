// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization code exchange.
//!
//! At most one exchange is in flight per coordinator:
//! - the same code while it is in flight is rejected as a duplicate
//! - a different code cancels the in-flight exchange and replaces it
//! - a superseded exchange never writes its token

use crate::error::{AppError, Result};
use crate::services::secret_store::SecretStore;
use crate::services::single_flight::cancelled;
use crate::services::unsplash::UnsplashClient;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Converts authorization codes into stored access tokens.
#[derive(Clone)]
pub struct TokenExchangeCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    client: UnsplashClient,
    tokens: Arc<dyn SecretStore>,
    state: Mutex<ExchangeState>,
}

#[derive(Default)]
struct ExchangeState {
    /// `Some` while `Exchanging(code)`, `None` while idle
    in_flight: Option<InFlightExchange>,
    next_id: u64,
}

struct InFlightExchange {
    id: u64,
    code: String,
    cancel: CancellationToken,
}

impl TokenExchangeCoordinator {
    pub fn new(client: UnsplashClient, tokens: Arc<dyn SecretStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                tokens,
                state: Mutex::new(ExchangeState::default()),
            }),
        }
    }

    /// Exchange `code` for an access token and persist it.
    ///
    /// A call superseded by an exchange for a different code resolves with a
    /// cancellation error (see [`AppError::is_cancelled`]) even if the server
    /// answered; its token is discarded.
    pub async fn exchange(&self, code: &str) -> Result<String> {
        let (id, cancel, request) = {
            let mut state = self.inner.state.lock();

            if let Some(current) = &state.in_flight {
                if current.code == code {
                    tracing::warn!("Exchange for this code already in flight, rejecting duplicate");
                    return Err(AppError::DuplicateRequest);
                }
                tracing::info!(
                    superseded = current.id,
                    "Cancelling stale exchange for a different code"
                );
                current.cancel.cancel();
            }
            state.in_flight = None;

            let request = self.inner.client.token_request(code).map_err(|e| {
                tracing::error!(error = %e, "Could not build token request");
                e
            })?;

            state.next_id += 1;
            let id = state.next_id;
            let cancel = CancellationToken::new();
            state.in_flight = Some(InFlightExchange {
                id,
                code: code.to_string(),
                cancel: cancel.clone(),
            });
            (id, cancel, request)
        };

        tracing::info!(exchange = id, "Exchanging authorization code for token");
        let result = self.inner.client.send_token_request(request, &cancel).await;

        let mut state = self.inner.state.lock();
        let is_current = state.in_flight.as_ref().is_some_and(|f| f.id == id);
        if !is_current {
            tracing::info!(exchange = id, "Exchange was superseded, ignoring its result");
            return match result {
                Ok(_) => Err(cancelled()),
                Err(e) => Err(e),
            };
        }

        // Terminal outcome for the current exchange: back to idle.
        state.in_flight = None;

        match result {
            Ok(response) => {
                // Written under the state lock: once `cancel()` returns, no
                // exchange can still store a token, so a following logout
                // always deletes the last one written.
                self.inner.tokens.set(Some(&response.access_token))?;
                tracing::info!(
                    exchange = id,
                    token_type = %response.token_type,
                    scope = %response.scope,
                    "Access token obtained and stored"
                );
                Ok(response.access_token)
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!(exchange = id, "Exchange cancelled");
                Err(e)
            }
            Err(e) => {
                tracing::error!(exchange = id, error = %e, "Token exchange failed");
                Err(e)
            }
        }
    }

    /// True while an exchange is in flight.
    pub fn is_exchanging(&self) -> bool {
        self.inner.state.lock().in_flight.is_some()
    }

    /// Abort the in-flight exchange, if any. Its result is discarded.
    pub fn cancel(&self) {
        if let Some(in_flight) = self.inner.state.lock().in_flight.take() {
            tracing::info!(exchange = in_flight.id, "Exchange cancelled by caller");
            in_flight.cancel.cancel();
        }
    }
}
