// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP request executor.
//!
//! Handles:
//! - Request descriptors independent of the transport
//! - Normalizing transport, status and decoding failures into [`HttpError`]
//! - Cooperative cancellation through a [`CancellationToken`]

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Longest body excerpt included in decode-failure logs.
const BODY_PREVIEW_LEN: usize = 256;

/// Transport-level failure: the request never produced an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failure taxonomy for a single HTTP call.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Decoding failure: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("Response body was empty")]
    NoBody,
}

impl HttpError {
    /// True when the request was cancelled rather than failing on the wire.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Transport(TransportError::Cancelled))
    }
}

/// A fully formed request: method, URL, headers and optional body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Attach `Authorization: Bearer <token>`.
    ///
    /// A token that is not a valid header value is dropped; the API then
    /// answers 401, which surfaces as an ordinary status failure.
    pub fn bearer(mut self, token: &str) -> Self {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Access token is not a valid header value, sending without it"),
        }
        self
    }

    /// Set a url-encoded form body.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, serde_urlencoded::ser::Error> {
        let body = serde_urlencoded::to_string(fields)?;
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.body = Some(body.into_bytes());
        Ok(self)
    }
}

/// Executes [`ApiRequest`]s over a shared `reqwest` client.
///
/// Results are returned to whichever task awaited the call, so a store that
/// is driven from one task never sees its state touched from another.
#[derive(Clone)]
pub struct HttpExecutor {
    http: reqwest::Client,
}

impl Default for HttpExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpExecutor {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Executor whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Network)?;
        Ok(Self { http })
    }

    /// Run a request and return the raw body of a 2xx response.
    pub async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<Bytes, HttpError> {
        let method = request.method.clone();
        let url = request.url.clone();

        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled.into()),
            result = builder.send() => result.map_err(|e| {
                tracing::warn!(%method, path = url.path(), error = %e, "Request failed");
                TransportError::Network(e)
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%method, path = url.path(), status = status.as_u16(), "Unexpected HTTP status");
            return Err(HttpError::Status(status.as_u16()));
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled.into()),
            result = response.bytes() => result.map_err(TransportError::Network)?,
        };

        tracing::debug!(%method, path = url.path(), bytes = body.len(), "Request completed");
        Ok(body)
    }

    /// Run a request and decode the JSON body of a 2xx response.
    pub async fn execute_decoding<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<T, HttpError> {
        let body = self.execute(request, cancel).await?;
        decode_body(&body)
    }
}

/// Decode a JSON body, treating an empty body as [`HttpError::NoBody`].
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, HttpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(HttpError::NoBody);
    }

    serde_json::from_slice(body).map_err(|e| {
        let preview = String::from_utf8_lossy(&body[..body.len().min(BODY_PREVIEW_LEN)]);
        tracing::warn!(error = %e, body = %preview, "Failed to decode response body");
        HttpError::Decoding(e)
    })
}
