// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the photo API and the in-memory stores.

pub mod photo;
pub mod profile;
pub mod token;

pub use photo::{Photo, PhotoResult, PhotoUrls};
pub use profile::{Profile, ProfileImage, ProfileResult, UserResult};
pub use token::OAuthTokenResponse;
