// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted cookies and web site data left behind by the login page.

/// Removes cookies and site data the login web view persisted.
///
/// Implemented by the UI layer; invoked only on logout.
pub trait SiteDataCleaner: Send + Sync {
    fn clear_site_data(&self);
}

/// Cleaner for front ends without a web view (nothing is persisted).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSiteData;

impl SiteDataCleaner for NoSiteData {
    fn clear_site_data(&self) {
        tracing::debug!("No persisted site data to clear");
    }
}
