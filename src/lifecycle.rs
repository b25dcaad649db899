//! Poll creation, modification, removal and listing
//!
//! Update and delete are scoped to the actor's own polls inside the store
//! query itself. Touching a poll that does not exist, or that belongs to
//! someone else, changes nothing and still reports success, so these calls
//! never reveal which polls exist or who owns them.

use crate::actor::Actor;
use crate::error::PollError;
use crate::policy::Policy;
use crate::sanitize::sanitize_value;
use crate::storage::{Poll, PollStore};
use crate::validation::{validate_options, validate_poll_id, validate_question};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A list of polls, or an empty list with the reason the caller can't see any.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PollListing {
    pub polls: Vec<Poll>,
    pub notice: Option<String>,
}

impl PollListing {
    fn visible(polls: Vec<Poll>) -> Self {
        Self {
            polls,
            notice: None,
        }
    }

    fn hidden(notice: &str) -> Self {
        Self {
            polls: Vec::new(),
            notice: Some(notice.to_string()),
        }
    }
}

/// Shown to visitors asking for their own polls without signing in.
pub const LIST_OWN_UNAUTHENTICATED_NOTICE: &str = "You must be logged in to view your polls.";
/// Shown to non-administrators asking for every poll.
pub const LIST_ALL_DENIED_NOTICE: &str = "Access denied.";

fn require_id(actor: &Actor) -> Result<&str, PollError> {
    actor.id().ok_or(PollError::Unauthenticated)
}

/// Create a poll owned by `actor`.
pub async fn create_poll(
    store: &dyn PollStore,
    actor: &Actor,
    question: &Value,
    options: &Value,
) -> Result<Poll, PollError> {
    let owner_id = require_id(actor)?;

    validate_question(question)?;
    let options = validate_options(options)?;

    let now = Utc::now().naive_utc();
    let poll = Poll {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        question: sanitize_value(question),
        options,
        created_at: now,
        updated_at: now,
    };

    let poll = store.insert_poll(poll).await?;
    log::info!("Poll {} created by {}", poll.id, poll.owner_id);
    Ok(poll)
}

/// Replace the question and options of one of the actor's own polls.
pub async fn update_poll(
    store: &dyn PollStore,
    actor: &Actor,
    poll_id: &Value,
    question: &Value,
    options: &Value,
) -> Result<(), PollError> {
    let poll_id = validate_poll_id(poll_id)?;
    validate_question(question)?;
    let options = validate_options(options)?;

    let owner_id = require_id(actor)?;

    let affected = store
        .update_poll_owned(
            poll_id,
            owner_id,
            &sanitize_value(question),
            &options,
            Utc::now().naive_utc(),
        )
        .await?;

    if affected > 0 {
        log::info!("Poll {} updated by {}", poll_id, owner_id);
    } else {
        log::debug!("Update of poll {} by {} matched nothing", poll_id, owner_id);
    }
    Ok(())
}

/// Delete one of the actor's own polls. Its votes go with it.
pub async fn delete_poll(
    store: &dyn PollStore,
    actor: &Actor,
    poll_id: &Value,
) -> Result<(), PollError> {
    let owner_id = require_id(actor)?;
    let poll_id = validate_poll_id(poll_id)?;

    let affected = store.delete_poll_owned(poll_id, owner_id).await?;

    if affected > 0 {
        log::info!("Poll {} deleted by {}", poll_id, owner_id);
    } else {
        log::debug!("Delete of poll {} by {} matched nothing", poll_id, owner_id);
    }
    Ok(())
}

/// Delete any poll, regardless of owner. Administrators only.
pub async fn delete_poll_as_administrator(
    store: &dyn PollStore,
    policy: &Policy,
    actor: &Actor,
    poll_id: &Value,
) -> Result<(), PollError> {
    if !policy.is_administrator(actor) {
        log::warn!(
            "Administrative delete refused for {}",
            actor.id().unwrap_or("anonymous")
        );
        return Err(PollError::AccessDenied);
    }

    let poll_id = validate_poll_id(poll_id)?;
    let affected = store.delete_poll(poll_id).await?;

    log::info!(
        "Poll {} deleted by administrator {} ({} row(s))",
        poll_id,
        actor.id().unwrap_or_default(),
        affected
    );
    Ok(())
}

/// The actor's own polls, newest first.
pub async fn list_own_polls(store: &dyn PollStore, actor: &Actor) -> Result<PollListing, PollError> {
    match actor.id() {
        Some(owner_id) => Ok(PollListing::visible(
            store.list_polls_by_owner(owner_id).await?,
        )),
        None => Ok(PollListing::hidden(LIST_OWN_UNAUTHENTICATED_NOTICE)),
    }
}

/// Every poll, newest first. Administrators only.
pub async fn list_all_polls(
    store: &dyn PollStore,
    policy: &Policy,
    actor: &Actor,
) -> Result<PollListing, PollError> {
    if !policy.is_administrator(actor) {
        return Ok(PollListing::hidden(LIST_ALL_DENIED_NOTICE));
    }

    Ok(PollListing::visible(store.list_all_polls().await?))
}

/// Fetch a single poll. Anyone may read.
pub async fn fetch_poll(store: &dyn PollStore, poll_id: &Value) -> Result<Poll, PollError> {
    let poll_id = validate_poll_id(poll_id)?;
    store.find_poll(poll_id).await?.ok_or(PollError::NotFound)
}
