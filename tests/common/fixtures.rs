//! Test fixtures for creating test data
#![allow(dead_code)]

use pollbox::actor::Actor;
use pollbox::lifecycle::create_poll;
use pollbox::policy::Policy;
use pollbox::storage::{Poll, PollStore};
use serde_json::json;

pub const ADMIN_EMAIL: &str = "admin@example.com";

pub fn alice() -> Actor {
    Actor::authenticated("user-alice", "alice@example.com")
}

pub fn bob() -> Actor {
    Actor::authenticated("user-bob", "bob@example.com")
}

pub fn admin() -> Actor {
    Actor::authenticated("user-admin", ADMIN_EMAIL)
}

/// Policy whose only administrator is [`admin`].
pub fn test_policy() -> Policy {
    Policy::new([ADMIN_EMAIL])
}

/// Create a poll owned by `owner` through the regular create path.
pub async fn create_test_poll(
    store: &dyn PollStore,
    owner: &Actor,
    question: &str,
    options: &[&str],
) -> Poll {
    create_poll(store, owner, &json!(question), &json!(options))
        .await
        .expect("Failed to create test poll")
}
