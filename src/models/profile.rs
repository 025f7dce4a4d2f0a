// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and avatar models.

use serde::{Deserialize, Serialize};

/// Response body of `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResult {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

/// Profile as shown by the UI, derived once per fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub username: String,
    /// First and last name joined by a space, empty parts dropped
    pub display_name: String,
    /// "@" followed by the username
    pub login_handle: String,
    pub bio: Option<String>,
}

impl From<ProfileResult> for Profile {
    fn from(result: ProfileResult) -> Self {
        let display_name = [result.first_name.as_deref(), result.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            login_handle: format!("@{}", result.username),
            username: result.username,
            display_name,
            bio: result.bio,
        }
    }
}

/// Response body of `GET /users/{username}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResult {
    pub profile_image: ProfileImage,
}

/// Avatar URL variants.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileImage {
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}
