//! Storage backend abstraction for polls and votes.
//!
//! Supports multiple backends:
//! - `memory`: in-process tables, for tests and local development
//! - `database`: SeaORM over Postgres
//!
//! Backends only filter by equality and order by creation time. Every rule
//! about who may do what lives above this layer.

pub mod database;
pub mod memory;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// A stored poll.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub owner_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A stored vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i32,
    pub poll_id: String,
    /// None for anonymous votes
    pub voter_id: Option<String>,
    pub option_index: i32,
    pub created_at: NaiveDateTime,
}

/// A vote about to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewVote {
    pub poll_id: String,
    pub voter_id: Option<String>,
    pub option_index: i32,
}

/// The only vote columns result aggregation reads.
#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct VoteRow {
    pub option_index: i32,
    pub voter_id: Option<String>,
}

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write
    UniqueViolation(String),
    /// The backend could not be reached
    Unavailable(String),
    /// Any other backend failure
    Backend(String),
    /// A stored row could not be decoded
    Corrupt(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::UniqueViolation(msg) => write!(f, "Unique constraint violated: {}", msg),
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StorageError::Backend(msg) => write!(f, "Storage error: {}", msg),
            StorageError::Corrupt(msg) => write!(f, "Corrupt record: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Trait for poll storage backends.
///
/// Both tables are keyed the same way in every backend: polls by their UUID
/// string, votes by `poll_id`. Deleting a poll removes its votes.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Fetch a poll by id.
    async fn find_poll(&self, poll_id: &str) -> Result<Option<Poll>, StorageError>;

    /// Fetch only a poll's option list.
    async fn find_poll_options(&self, poll_id: &str) -> Result<Option<Vec<String>>, StorageError>;

    /// Insert a fully formed poll and return it as stored.
    async fn insert_poll(&self, poll: Poll) -> Result<Poll, StorageError>;

    /// Replace question and options where both `id` and `owner_id` match.
    /// Returns the number of rows affected.
    async fn update_poll_owned(
        &self,
        poll_id: &str,
        owner_id: &str,
        question: &str,
        options: &[String],
        updated_at: NaiveDateTime,
    ) -> Result<u64, StorageError>;

    /// Delete where both `id` and `owner_id` match. Returns the number of rows affected.
    async fn delete_poll_owned(&self, poll_id: &str, owner_id: &str) -> Result<u64, StorageError>;

    /// Delete by id alone. Returns the number of rows affected.
    async fn delete_poll(&self, poll_id: &str) -> Result<u64, StorageError>;

    /// Polls owned by `owner_id`, newest first.
    async fn list_polls_by_owner(&self, owner_id: &str) -> Result<Vec<Poll>, StorageError>;

    /// Every poll, newest first.
    async fn list_all_polls(&self) -> Result<Vec<Poll>, StorageError>;

    /// The vote `voter_id` cast on `poll_id`, if any.
    async fn find_vote_by_voter(
        &self,
        poll_id: &str,
        voter_id: &str,
    ) -> Result<Option<Vote>, StorageError>;

    /// Record a vote. A second vote by the same non-null voter on the same
    /// poll fails with [`StorageError::UniqueViolation`].
    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StorageError>;

    /// All votes on a poll, projected to [`VoteRow`].
    async fn list_votes(&self, poll_id: &str) -> Result<Vec<VoteRow>, StorageError>;
}
