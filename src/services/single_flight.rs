// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Latest-wins tracking for one kind of request.

use crate::error::AppError;
use crate::services::http::TransportError;
use tokio_util::sync::CancellationToken;

/// Tracks the single outstanding request of one kind.
///
/// Starting a request cancels the previous one. Lives inside the owning
/// store's state mutex.
#[derive(Default)]
pub(crate) struct SingleFlight {
    current: Option<(u64, CancellationToken)>,
    next_id: u64,
}

impl SingleFlight {
    /// Start a new request, cancelling the outstanding one.
    pub(crate) fn begin(&mut self) -> (u64, CancellationToken) {
        self.next_id += 1;
        let cancel = CancellationToken::new();
        if let Some((_, previous)) = self.current.replace((self.next_id, cancel.clone())) {
            previous.cancel();
        }
        (self.next_id, cancel)
    }

    /// Mark request `id` finished. Returns false if it was superseded or
    /// cancelled in the meantime, in which case its result must be dropped.
    pub(crate) fn finish(&mut self, id: u64) -> bool {
        match &self.current {
            Some((current, _)) if *current == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the outstanding request, if any.
    pub(crate) fn cancel(&mut self) {
        if let Some((_, cancel)) = self.current.take() {
            cancel.cancel();
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current.is_some()
    }
}

/// Error returned by a call whose result was dropped because it was superseded.
pub(crate) fn cancelled() -> AppError {
    AppError::Http(TransportError::Cancelled.into())
}
