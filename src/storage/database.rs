//! Relational storage backend built on SeaORM.
//!
//! Expects the schema in `migrations/`, in particular the partial unique
//! index on `votes (poll_id, voter_id)` which is what makes duplicate votes
//! impossible under concurrent submissions.

use super::{NewVote, Poll, PollStore, StorageError, Vote, VoteRow};
use crate::app_config::DatabaseConfig;
use crate::orm::{polls, votes};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::entity::prelude::Json;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectOptions, Database, DatabaseConnection, DbErr,
    FromQueryResult,
};

/// Relational storage backend.
#[derive(Clone, Debug)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct OptionsRow {
    options: Json,
}

impl DatabaseStore {
    /// Open a connection pool.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let url = config.resolved_url().ok_or_else(|| {
            StorageError::Unavailable("no database URL (set database.url or DATABASE_URL)".into())
        })?;

        let mut options = ConnectOptions::new(url);
        options.max_connections(config.max_connections);

        let db = Database::connect(options).await?;
        log::info!(
            "DatabaseStore connected (max_connections = {})",
            config.max_connections
        );
        Ok(Self { db })
    }
}

impl From<DbErr> for StorageError {
    fn from(e: DbErr) -> Self {
        match e {
            DbErr::Conn(msg) => StorageError::Unavailable(msg),
            other => {
                let msg = other.to_string();
                if is_unique_violation(&msg) {
                    StorageError::UniqueViolation(msg)
                } else {
                    StorageError::Backend(msg)
                }
            }
        }
    }
}

/// Postgres reports `unique_violation` (23505) as "duplicate key value violates unique constraint".
fn is_unique_violation(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("duplicate key") || msg.contains("unique constraint")
}

fn decode_options(poll_id: &str, options: Json) -> Result<Vec<String>, StorageError> {
    serde_json::from_value(options)
        .map_err(|e| StorageError::Corrupt(format!("options of poll {}: {}", poll_id, e)))
}

fn poll_from_model(model: polls::Model) -> Result<Poll, StorageError> {
    let options = decode_options(&model.id, model.options)?;
    Ok(Poll {
        id: model.id,
        owner_id: model.owner_id,
        question: model.question,
        options,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn polls_from_models(models: Vec<polls::Model>) -> Result<Vec<Poll>, StorageError> {
    models.into_iter().map(poll_from_model).collect()
}

fn vote_from_model(model: votes::Model) -> Vote {
    Vote {
        id: model.id,
        poll_id: model.poll_id,
        voter_id: model.voter_id,
        option_index: model.option_index,
        created_at: model.created_at,
    }
}

#[async_trait]
impl PollStore for DatabaseStore {
    async fn find_poll(&self, poll_id: &str) -> Result<Option<Poll>, StorageError> {
        polls::Entity::find_by_id(poll_id.to_string())
            .one(&self.db)
            .await?
            .map(poll_from_model)
            .transpose()
    }

    async fn find_poll_options(&self, poll_id: &str) -> Result<Option<Vec<String>>, StorageError> {
        polls::Entity::find()
            .select_only()
            .column(polls::Column::Options)
            .filter(polls::Column::Id.eq(poll_id))
            .into_model::<OptionsRow>()
            .one(&self.db)
            .await?
            .map(|row| decode_options(poll_id, row.options))
            .transpose()
    }

    async fn insert_poll(&self, poll: Poll) -> Result<Poll, StorageError> {
        let model = polls::ActiveModel {
            id: Set(poll.id),
            owner_id: Set(poll.owner_id),
            question: Set(poll.question),
            options: Set(serde_json::json!(poll.options)),
            created_at: Set(poll.created_at),
            updated_at: Set(poll.updated_at),
        }
        .insert(&self.db)
        .await?;

        poll_from_model(model)
    }

    async fn update_poll_owned(
        &self,
        poll_id: &str,
        owner_id: &str,
        question: &str,
        options: &[String],
        updated_at: NaiveDateTime,
    ) -> Result<u64, StorageError> {
        let result = polls::Entity::update_many()
            .col_expr(polls::Column::Question, Expr::value(question.to_string()))
            .col_expr(polls::Column::Options, Expr::value(serde_json::json!(options)))
            .col_expr(polls::Column::UpdatedAt, Expr::value(updated_at))
            .filter(polls::Column::Id.eq(poll_id))
            .filter(polls::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn delete_poll_owned(&self, poll_id: &str, owner_id: &str) -> Result<u64, StorageError> {
        let result = polls::Entity::delete_many()
            .filter(polls::Column::Id.eq(poll_id))
            .filter(polls::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn delete_poll(&self, poll_id: &str) -> Result<u64, StorageError> {
        let result = polls::Entity::delete_many()
            .filter(polls::Column::Id.eq(poll_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn list_polls_by_owner(&self, owner_id: &str) -> Result<Vec<Poll>, StorageError> {
        let models = polls::Entity::find()
            .filter(polls::Column::OwnerId.eq(owner_id))
            .order_by_desc(polls::Column::CreatedAt)
            .all(&self.db)
            .await?;

        polls_from_models(models)
    }

    async fn list_all_polls(&self) -> Result<Vec<Poll>, StorageError> {
        let models = polls::Entity::find()
            .order_by_desc(polls::Column::CreatedAt)
            .all(&self.db)
            .await?;

        polls_from_models(models)
    }

    async fn find_vote_by_voter(
        &self,
        poll_id: &str,
        voter_id: &str,
    ) -> Result<Option<Vote>, StorageError> {
        let model = votes::Entity::find()
            .filter(votes::Column::PollId.eq(poll_id))
            .filter(votes::Column::VoterId.eq(voter_id))
            .one(&self.db)
            .await?;

        Ok(model.map(vote_from_model))
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StorageError> {
        let model = votes::ActiveModel {
            poll_id: Set(vote.poll_id),
            voter_id: Set(vote.voter_id),
            option_index: Set(vote.option_index),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(vote_from_model(model))
    }

    async fn list_votes(&self, poll_id: &str) -> Result<Vec<VoteRow>, StorageError> {
        let rows = votes::Entity::find()
            .select_only()
            .column(votes::Column::OptionIndex)
            .column(votes::Column::VoterId)
            .filter(votes::Column::PollId.eq(poll_id))
            .into_model::<VoteRow>()
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        assert!(is_unique_violation(
            "Execution Error: error returned from database: duplicate key value violates unique constraint \"votes_poll_voter_unique\""
        ));
        assert!(!is_unique_violation("connection refused"));
    }

    #[test]
    fn test_db_err_mapping() {
        assert!(matches!(
            StorageError::from(DbErr::Conn("refused".into())),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            StorageError::from(DbErr::Exec("duplicate key value".into())),
            StorageError::UniqueViolation(_)
        ));
        assert!(matches!(
            StorageError::from(DbErr::Query("syntax error".into())),
            StorageError::Backend(_)
        ));
    }

    #[test]
    fn test_corrupt_options_reported() {
        let result = decode_options("p1", serde_json::json!({"not": "a list"}));
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }
}
