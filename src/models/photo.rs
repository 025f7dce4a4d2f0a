// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Photo model for the API and the feed store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photo record as returned by `GET /photos`.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoResult {
    pub id: String,
    /// Creation time (ISO 8601 with offset)
    pub created_at: Option<String>,
    pub width: u32,
    pub height: u32,
    pub liked_by_user: bool,
    pub description: Option<String>,
    pub urls: PhotoUrls,
}

/// Image URL variants for one photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUrls {
    pub raw: String,
    pub full: String,
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

/// Photo held by the feed store. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    /// Small preview for list cells
    pub thumbnail_url: String,
    /// Full-size image for the detail view
    pub full_url: String,
    pub is_liked: bool,
}

impl Photo {
    /// Width over height, or 1.0 for a degenerate zero height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 1.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }
}

impl From<PhotoResult> for Photo {
    fn from(result: PhotoResult) -> Self {
        let created_at = result.created_at.as_deref().and_then(parse_timestamp);

        Self {
            id: result.id,
            width: result.width,
            height: result.height,
            created_at,
            description: result.description,
            thumbnail_url: result.urls.thumb,
            full_url: result.urls.full,
            is_liked: result.liked_by_user,
        }
    }
}

/// Parse an RFC 3339 timestamp. Unparsable input yields `None` so one bad
/// record does not fail the whole page.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(raw, error = %e, "Unparsable photo timestamp");
            None
        }
    }
}
