//! Vote submission and result aggregation

use crate::actor::Actor;
use crate::error::PollError;
use crate::storage::{NewVote, PollStore, StorageError};
use crate::validation::{validate_option_index, validate_poll_id, ValidationError};
use serde::Serialize;
use serde_json::Value;

/// Tally for a single option.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionTally {
    pub option: String,
    pub count: u64,
    /// 0.0 to 100.0; 0.0 for every option while nobody has voted
    pub percentage: f64,
}

/// Aggregated results of a poll.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PollResults {
    pub poll_id: String,
    pub question: String,
    pub options: Vec<OptionTally>,
    pub total_votes: u64,
    /// The requesting actor's own choice, if they are signed in and voted
    pub current_actor_vote: Option<i32>,
}

/// Record a vote for `option_index` on `poll_id`.
///
/// Authenticated actors get one vote per poll. Anonymous votes carry no
/// identity and are never deduplicated.
pub async fn submit_vote(
    store: &dyn PollStore,
    poll_id: &Value,
    option_index: &Value,
    actor: &Actor,
) -> Result<(), PollError> {
    let poll_id = validate_poll_id(poll_id)?;

    let options = store
        .find_poll_options(poll_id)
        .await?
        .ok_or(PollError::NotFound)?;

    let option_index = validate_option_index(option_index, options.len())?;
    let option_index = i32::try_from(option_index)
        .map_err(|_| ValidationError::OptionIndexOutOfRange)?;

    if let Some(voter_id) = actor.id() {
        if store.find_vote_by_voter(poll_id, voter_id).await?.is_some() {
            log::debug!("Rejected repeat vote on poll {} by {}", poll_id, voter_id);
            return Err(PollError::AlreadyVoted);
        }
    }

    let vote = NewVote {
        poll_id: poll_id.to_string(),
        voter_id: actor.id().map(str::to_string),
        option_index,
    };

    match store.insert_vote(vote).await {
        Ok(vote) => {
            log::info!(
                "Vote {} recorded on poll {} (anonymous: {})",
                vote.id,
                poll_id,
                vote.voter_id.is_none()
            );
            Ok(())
        }
        // Lost the race against a concurrent submission by the same voter.
        Err(StorageError::UniqueViolation(_)) => Err(PollError::AlreadyVoted),
        Err(e) => Err(e.into()),
    }
}

/// Count the votes on `poll_id`.
///
/// Votes whose index no longer fits the option list are ignored.
pub async fn compute_results(
    store: &dyn PollStore,
    poll_id: &Value,
    actor: &Actor,
) -> Result<PollResults, PollError> {
    let poll_id = validate_poll_id(poll_id)?;

    let poll = store.find_poll(poll_id).await?.ok_or(PollError::NotFound)?;
    let votes = store.list_votes(poll_id).await?;

    let mut counts = vec![0u64; poll.options.len()];
    for vote in &votes {
        match usize::try_from(vote.option_index)
            .ok()
            .and_then(|index| counts.get_mut(index))
        {
            Some(count) => *count += 1,
            None => log::debug!(
                "Skipping stale vote index {} on poll {}",
                vote.option_index,
                poll_id
            ),
        }
    }

    let total_votes: u64 = counts.iter().sum();

    let current_actor_vote = actor.id().and_then(|actor_id| {
        votes
            .iter()
            .find(|vote| vote.voter_id.as_deref() == Some(actor_id))
            .map(|vote| vote.option_index)
    });

    let options = poll
        .options
        .into_iter()
        .zip(counts)
        .map(|(option, count)| OptionTally {
            option,
            count,
            percentage: percentage(count, total_votes),
        })
        .collect();

    Ok(PollResults {
        poll_id: poll.id,
        question: poll.question,
        options,
        total_votes,
        current_actor_vote,
    })
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}
