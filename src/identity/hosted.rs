//! Hosted authentication backend client.
//!
//! Speaks the token/signup/user/logout REST endpoints exposed under
//! `{url}/auth/v1/`. Every request carries the project API key in the
//! `apikey` header; user-scoped requests add the access token as a bearer.

use super::{AuthSession, IdentityError, IdentityProvider};
use crate::actor::Actor;
use crate::app_config::AuthConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Hosted authentication backend client.
pub struct HostedIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: UserResponse,
}

/// Sign-up answers with a full session when no confirmation is required,
/// and with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HostedIdentity {
    pub fn new(config: &AuthConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if config.api_key.is_empty() {
            log::warn!("auth.api_key is empty; the identity provider will likely reject requests");
        }

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

fn actor_from_user(user: UserResponse) -> Result<Actor, IdentityError> {
    match user.email {
        Some(email) if !email.is_empty() => Ok(Actor::authenticated(user.id, email)),
        _ => Err(IdentityError::InvalidResponse(format!(
            "user {} has no email address",
            user.id
        ))),
    }
}

fn session_from_token(token: TokenResponse) -> Result<AuthSession, IdentityError> {
    Ok(AuthSession {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        actor: actor_from_user(token.user)?,
    })
}

fn network_error(e: reqwest::Error) -> IdentityError {
    log::error!("Identity provider request failed: {}", e);
    IdentityError::Unavailable(e.to_string())
}

/// Turn a non-success response into an error, keeping the provider's message.
async fn rejection(response: reqwest::Response) -> IdentityError {
    let status = response.status();
    let body: ErrorResponse = response.json().await.unwrap_or_default();
    let msg = body
        .error_description
        .or(body.msg)
        .or(body.message)
        .unwrap_or_else(|| format!("request failed with status {}", status));

    if status.is_server_error() {
        IdentityError::Unavailable(msg)
    } else {
        IdentityError::Rejected(msg)
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentity {
    async fn current_actor(&self, access_token: &str) -> Result<Actor, IdentityError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(Actor::Anonymous),
            status if status.is_success() => {
                let user: UserResponse = response
                    .json()
                    .await
                    .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
                actor_from_user(user)
            }
            _ => Err(rejection(response).await),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
        session_from_token(token)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Option<AuthSession>, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("signup"))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "display_name": display_name },
            }))
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        match body {
            SignUpResponse::Session(token) => session_from_token(token).map(Some),
            SignUpResponse::User(user) => {
                log::info!("Sign-up for user {} awaits email confirmation", user.id);
                Ok(None)
            }
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            // Already expired counts as signed out.
            StatusCode::UNAUTHORIZED => Ok(()),
            status if status.is_success() => Ok(()),
            _ => Err(rejection(response).await),
        }
    }
}
