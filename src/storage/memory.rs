//! In-memory storage backend.

use super::{NewVote, Poll, PollStore, StorageError, Vote, VoteRow};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    polls: Vec<Poll>,
    votes: Vec<Vote>,
    last_vote_id: i32,
}

/// In-memory storage backend.
///
/// Mirrors the database schema's guarantees: votes cascade with their poll
/// and a voter can hold one vote per poll. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables
            .write()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
    }
}

/// Newest first. Ties keep the most recently inserted first.
fn newest_first<'a>(polls: impl DoubleEndedIterator<Item = &'a Poll>) -> Vec<Poll> {
    let mut sorted: Vec<Poll> = polls.rev().cloned().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn find_poll(&self, poll_id: &str) -> Result<Option<Poll>, StorageError> {
        let tables = self.read()?;
        Ok(tables.polls.iter().find(|p| p.id == poll_id).cloned())
    }

    async fn find_poll_options(&self, poll_id: &str) -> Result<Option<Vec<String>>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .polls
            .iter()
            .find(|p| p.id == poll_id)
            .map(|p| p.options.clone()))
    }

    async fn insert_poll(&self, poll: Poll) -> Result<Poll, StorageError> {
        let mut tables = self.write()?;
        if tables.polls.iter().any(|p| p.id == poll.id) {
            return Err(StorageError::UniqueViolation(format!(
                "poll {} already exists",
                poll.id
            )));
        }
        tables.polls.push(poll.clone());
        Ok(poll)
    }

    async fn update_poll_owned(
        &self,
        poll_id: &str,
        owner_id: &str,
        question: &str,
        options: &[String],
        updated_at: NaiveDateTime,
    ) -> Result<u64, StorageError> {
        let mut tables = self.write()?;
        let mut affected = 0;
        for poll in tables
            .polls
            .iter_mut()
            .filter(|p| p.id == poll_id && p.owner_id == owner_id)
        {
            poll.question = question.to_string();
            poll.options = options.to_vec();
            poll.updated_at = updated_at;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_poll_owned(&self, poll_id: &str, owner_id: &str) -> Result<u64, StorageError> {
        let mut tables = self.write()?;
        let before = tables.polls.len();
        tables
            .polls
            .retain(|p| !(p.id == poll_id && p.owner_id == owner_id));
        let affected = (before - tables.polls.len()) as u64;
        if affected > 0 {
            tables.votes.retain(|v| v.poll_id != poll_id);
        }
        Ok(affected)
    }

    async fn delete_poll(&self, poll_id: &str) -> Result<u64, StorageError> {
        let mut tables = self.write()?;
        let before = tables.polls.len();
        tables.polls.retain(|p| p.id != poll_id);
        let affected = (before - tables.polls.len()) as u64;
        tables.votes.retain(|v| v.poll_id != poll_id);
        Ok(affected)
    }

    async fn list_polls_by_owner(&self, owner_id: &str) -> Result<Vec<Poll>, StorageError> {
        let tables = self.read()?;
        Ok(newest_first(
            tables.polls.iter().filter(|p| p.owner_id == owner_id),
        ))
    }

    async fn list_all_polls(&self) -> Result<Vec<Poll>, StorageError> {
        let tables = self.read()?;
        Ok(newest_first(tables.polls.iter()))
    }

    async fn find_vote_by_voter(
        &self,
        poll_id: &str,
        voter_id: &str,
    ) -> Result<Option<Vote>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .votes
            .iter()
            .find(|v| v.poll_id == poll_id && v.voter_id.as_deref() == Some(voter_id))
            .cloned())
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StorageError> {
        let mut tables = self.write()?;

        if !tables.polls.iter().any(|p| p.id == vote.poll_id) {
            return Err(StorageError::Backend(format!(
                "poll {} does not exist",
                vote.poll_id
            )));
        }

        if let Some(voter_id) = vote.voter_id.as_deref() {
            let duplicate = tables
                .votes
                .iter()
                .any(|v| v.poll_id == vote.poll_id && v.voter_id.as_deref() == Some(voter_id));
            if duplicate {
                return Err(StorageError::UniqueViolation(format!(
                    "voter already has a vote on poll {}",
                    vote.poll_id
                )));
            }
        }

        tables.last_vote_id += 1;
        let stored = Vote {
            id: tables.last_vote_id,
            poll_id: vote.poll_id,
            voter_id: vote.voter_id,
            option_index: vote.option_index,
            created_at: Utc::now().naive_utc(),
        };
        tables.votes.push(stored.clone());
        Ok(stored)
    }

    async fn list_votes(&self, poll_id: &str) -> Result<Vec<VoteRow>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .votes
            .iter()
            .filter(|v| v.poll_id == poll_id)
            .map(|v| VoteRow {
                option_index: v.option_index,
                voter_id: v.voter_id.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn poll(id: &str, owner: &str, created_at: NaiveDateTime) -> Poll {
        Poll {
            id: id.to_string(),
            owner_id: owner.to_string(),
            question: "Which one?".to_string(),
            options: vec!["A".to_string(), "B".to_string()],
            created_at,
            updated_at: created_at,
        }
    }

    fn vote(poll_id: &str, voter: Option<&str>) -> NewVote {
        NewVote {
            poll_id: poll_id.to_string(),
            voter_id: voter.map(str::to_string),
            option_index: 0,
        }
    }

    #[actix_rt::test]
    async fn test_listing_is_newest_first() {
        let store = MemoryStore::new();
        let now = Utc::now().naive_utc();
        store.insert_poll(poll("p1", "alice", now - Duration::minutes(2))).await.unwrap();
        store.insert_poll(poll("p2", "bob", now)).await.unwrap();
        store.insert_poll(poll("p3", "alice", now - Duration::minutes(1))).await.unwrap();

        let all: Vec<String> = store.list_all_polls().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(all, vec!["p2", "p3", "p1"]);

        let mine: Vec<String> = store
            .list_polls_by_owner("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(mine, vec!["p3", "p1"]);
    }

    #[actix_rt::test]
    async fn test_voter_unique_per_poll() {
        let store = MemoryStore::new();
        store.insert_poll(poll("p1", "alice", Utc::now().naive_utc())).await.unwrap();

        store.insert_vote(vote("p1", Some("bob"))).await.unwrap();
        let second = store.insert_vote(vote("p1", Some("bob"))).await;
        assert!(matches!(second, Err(StorageError::UniqueViolation(_))));

        // Anonymous votes are never unique.
        store.insert_vote(vote("p1", None)).await.unwrap();
        store.insert_vote(vote("p1", None)).await.unwrap();
        assert_eq!(store.list_votes("p1").await.unwrap().len(), 3);
    }

    #[actix_rt::test]
    async fn test_delete_cascades_to_votes() {
        let store = MemoryStore::new();
        store.insert_poll(poll("p1", "alice", Utc::now().naive_utc())).await.unwrap();
        store.insert_vote(vote("p1", Some("bob"))).await.unwrap();

        assert_eq!(store.delete_poll_owned("p1", "bob").await.unwrap(), 0);
        assert_eq!(store.list_votes("p1").await.unwrap().len(), 1);

        assert_eq!(store.delete_poll_owned("p1", "alice").await.unwrap(), 1);
        assert!(store.list_votes("p1").await.unwrap().is_empty());
        assert!(store.find_poll("p1").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_update_requires_owner_match() {
        let store = MemoryStore::new();
        let now = Utc::now().naive_utc();
        store.insert_poll(poll("p1", "alice", now)).await.unwrap();

        let options = vec!["X".to_string(), "Y".to_string()];
        assert_eq!(
            store.update_poll_owned("p1", "bob", "Changed?", &options, now).await.unwrap(),
            0
        );
        assert_eq!(store.find_poll("p1").await.unwrap().unwrap().question, "Which one?");

        assert_eq!(
            store.update_poll_owned("p1", "alice", "Changed?", &options, now).await.unwrap(),
            1
        );
        let updated = store.find_poll("p1").await.unwrap().unwrap();
        assert_eq!(updated.question, "Changed?");
        assert_eq!(updated.options, options);
    }

    #[actix_rt::test]
    async fn test_vote_on_missing_poll_rejected() {
        let store = MemoryStore::new();
        assert!(store.insert_vote(vote("missing", None)).await.is_err());
    }
}
