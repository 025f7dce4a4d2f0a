// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo API client.
//!
//! Handles:
//! - Authorization URL construction and redirect code extraction
//! - Authorization code exchange
//! - Profile and avatar lookups
//! - Paginated photo listing and like/unlike

use crate::config::Config;
use crate::error::AppError;
use crate::models::{OAuthTokenResponse, PhotoResult, ProfileResult, UserResult};
use crate::services::http::{ApiRequest, HttpExecutor};
use reqwest::Url;
use tokio_util::sync::CancellationToken;

/// Path the authorize page redirects to when using the out-of-band URI.
const NATIVE_REDIRECT_PATH: &str = "/oauth/authorize/native";

/// Photo API client.
#[derive(Clone)]
pub struct UnsplashClient {
    http: HttpExecutor,
    api_base_url: String,
    auth_base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
}

impl UnsplashClient {
    /// Create a client for the endpoints and OAuth credentials in `config`.
    pub fn new(http: HttpExecutor, config: &Config) -> Self {
        Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_base_url: config.auth_base_url.trim_end_matches('/').to_string(),
            client_id: config.access_key.clone(),
            client_secret: config.secret_key.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.access_scope.clone(),
        }
    }

    /// URL of the browser page where the user grants access.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/oauth/authorize?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}",
            self.auth_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            self.scope
        )
    }

    /// Pull the authorization code out of a redirect the login page navigated
    /// to. Returns `None` for any other navigation.
    pub fn extract_code(&self, redirect_url: &str) -> Option<String> {
        let url = Url::parse(redirect_url).ok()?;

        let is_native = url.path() == NATIVE_REDIRECT_PATH;
        let is_registered = Url::parse(&self.redirect_uri)
            .map(|registered| {
                registered.scheme() == url.scheme()
                    && registered.host_str() == url.host_str()
                    && registered.port() == url.port()
                    && registered.path() == url.path()
            })
            .unwrap_or(false);

        if !is_native && !is_registered {
            return None;
        }

        url.query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
            .filter(|code| !code.is_empty())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// POST {auth_base}/oauth/token with a url-encoded body.
    pub async fn exchange_code(
        &self,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<OAuthTokenResponse, AppError> {
        let request = self.token_request(code)?;
        self.send_token_request(request, cancel).await
    }

    /// Send a request built by [`UnsplashClient::token_request`].
    pub async fn send_token_request(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<OAuthTokenResponse, AppError> {
        Ok(self.http.execute_decoding(request, cancel).await?)
    }

    /// Build the token exchange request without sending it.
    pub fn token_request(&self, code: &str) -> Result<ApiRequest, AppError> {
        let url = endpoint(&self.auth_base_url, &["oauth", "token"])?;
        ApiRequest::post(url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .map_err(|e| AppError::InvalidRequest(format!("Token request body: {}", e)))
    }

    /// Get the authenticated user's profile.
    pub async fn get_me(
        &self,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<ProfileResult, AppError> {
        let url = endpoint(&self.api_base_url, &["me"])?;
        let request = ApiRequest::get(url).bearer(access_token);
        Ok(self.http.execute_decoding(request, cancel).await?)
    }

    /// Get a public user record (used for the avatar URL).
    pub async fn get_user(
        &self,
        access_token: &str,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<UserResult, AppError> {
        let url = endpoint(&self.api_base_url, &["users", username])?;
        let request = ApiRequest::get(url).bearer(access_token);
        Ok(self.http.execute_decoding(request, cancel).await?)
    }

    /// List one page of the photo feed.
    pub async fn list_photos(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<PhotoResult>, AppError> {
        let mut url = endpoint(&self.api_base_url, &["photos"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());

        let request = ApiRequest::get(url).bearer(access_token);
        Ok(self.http.execute_decoding(request, cancel).await?)
    }

    /// Like (POST) or unlike (DELETE) a photo. The response body is ignored.
    pub async fn set_like(
        &self,
        access_token: &str,
        photo_id: &str,
        like: bool,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let url = endpoint(&self.api_base_url, &["photos", photo_id, "like"])?;
        let request = if like {
            ApiRequest::post(url)
        } else {
            ApiRequest::delete(url)
        }
        .bearer(access_token);

        self.http.execute(request, cancel).await?;
        Ok(())
    }
}

/// Join path segments onto a base URL, percent-encoding each segment.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = Url::parse(base)
        .map_err(|e| AppError::InvalidRequest(format!("Bad base URL {:?}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::InvalidRequest(format!("Base URL cannot carry a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
