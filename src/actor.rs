//! The identity on whose behalf an operation runs.

use serde::{Deserialize, Serialize};

/// Resolved by the request boundary from a trusted session lookup and passed
/// into every core operation explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Authenticated { id: String, email: String },
    Anonymous,
}

impl Actor {
    pub fn authenticated(id: impl Into<String>, email: impl Into<String>) -> Self {
        Actor::Authenticated {
            id: id.into(),
            email: email.into(),
        }
    }

    /// Returns either the actor's id or None.
    pub fn id(&self) -> Option<&str> {
        match self {
            Actor::Authenticated { id, .. } => Some(id),
            Actor::Anonymous => None,
        }
    }

    /// Returns either the actor's verified email or None.
    pub fn email(&self) -> Option<&str> {
        match self {
            Actor::Authenticated { email, .. } => Some(email),
            Actor::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Authenticated { .. })
    }
}

impl Default for Actor {
    fn default() -> Self {
        Actor::Anonymous
    }
}
