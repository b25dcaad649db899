//! Identity provider abstraction.
//!
//! Credentials and sessions live in an external service. This crate only ever
//! asks it who a token belongs to, and relays sign-in, sign-up and sign-out.

pub mod hosted;

pub use hosted::HostedIdentity;

use crate::actor::Actor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A signed-in session handed back by the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub actor: Actor,
}

/// Identity operation errors.
#[derive(Debug)]
pub enum IdentityError {
    /// The provider refused the credentials or request
    Rejected(String),
    /// Network error talking to the provider
    Unavailable(String),
    /// The provider answered with something we could not read
    InvalidResponse(String),
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityError::Rejected(msg) => write!(f, "{}", msg),
            IdentityError::Unavailable(msg) => {
                write!(f, "Identity provider unavailable: {}", msg)
            }
            IdentityError::InvalidResponse(msg) => {
                write!(f, "Unexpected identity provider response: {}", msg)
            }
        }
    }
}

impl std::error::Error for IdentityError {}

/// Trait for identity providers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the actor behind an access token. Unknown or expired tokens
    /// resolve to [`Actor::Anonymous`].
    async fn current_actor(&self, access_token: &str) -> Result<Actor, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    /// Register a new identity. Returns no session when the provider requires
    /// the address to be confirmed first.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Option<AuthSession>, IdentityError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}
