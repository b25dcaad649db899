//! Input validation for poll content and votes
//!
//! Every check takes the raw value exactly as it arrived (a missing field is
//! `Value::Null`) and either accepts it or explains what is wrong with it.
//! These are pure functions; they run before anything touches storage.

use crate::constants::{
    MAX_OPTIONS, MAX_OPTION_LENGTH, MAX_QUESTION_LENGTH, MIN_OPTIONS, MIN_QUESTION_LENGTH,
};
use crate::sanitize::{sanitize, sanitize_value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

/// Canonical 8-4-4-4-12 hexadecimal UUID shape
static POLL_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("Invalid poll id regex")
});

/// Reasons input is rejected. The `Display` text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    QuestionRequired,
    QuestionTooShort,
    QuestionTooLong,
    OptionsRequired,
    TooFewOptions,
    TooManyOptions,
    TooFewNonEmptyOptions,
    DuplicateOptions,
    OptionTooLong,
    InvalidPollId,
    OptionIndexNotInteger,
    OptionIndexOutOfRange,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::QuestionRequired => write!(f, "Question is required."),
            ValidationError::QuestionTooShort => write!(
                f,
                "Question must be at least {} characters long.",
                MIN_QUESTION_LENGTH
            ),
            ValidationError::QuestionTooLong => write!(
                f,
                "Question must be {} characters or fewer.",
                MAX_QUESTION_LENGTH
            ),
            ValidationError::OptionsRequired => write!(f, "Options must be provided as a list."),
            ValidationError::TooFewOptions => {
                write!(f, "A poll needs at least {} options.", MIN_OPTIONS)
            }
            ValidationError::TooManyOptions => {
                write!(f, "A poll can have at most {} options.", MAX_OPTIONS)
            }
            ValidationError::TooFewNonEmptyOptions => write!(
                f,
                "A poll needs at least {} non-empty options.",
                MIN_OPTIONS
            ),
            ValidationError::DuplicateOptions => write!(f, "Options must be unique."),
            ValidationError::OptionTooLong => write!(
                f,
                "Each option must be {} characters or fewer.",
                MAX_OPTION_LENGTH
            ),
            ValidationError::InvalidPollId => write!(f, "Invalid poll id."),
            ValidationError::OptionIndexNotInteger => {
                write!(f, "Selected option must be a whole number.")
            }
            ValidationError::OptionIndexOutOfRange => {
                write!(f, "Selected option does not exist on this poll.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a poll question.
///
/// Acceptance does not hand back the cleaned text; callers that persist the
/// question must run it through [`sanitize`] themselves.
pub fn validate_question(raw: &Value) -> Result<(), ValidationError> {
    let text = raw.as_str().ok_or(ValidationError::QuestionRequired)?;
    let length = sanitize(text).chars().count();

    if length < MIN_QUESTION_LENGTH {
        return Err(ValidationError::QuestionTooShort);
    }
    if length > MAX_QUESTION_LENGTH {
        return Err(ValidationError::QuestionTooLong);
    }

    Ok(())
}

/// Check a poll's option list and return the sanitized options on success.
///
/// Entries that sanitize to nothing are dropped before the duplicate and
/// length checks run.
pub fn validate_options(raw: &Value) -> Result<Vec<String>, ValidationError> {
    let entries = raw.as_array().ok_or(ValidationError::OptionsRequired)?;

    if entries.len() < MIN_OPTIONS {
        return Err(ValidationError::TooFewOptions);
    }
    if entries.len() > MAX_OPTIONS {
        return Err(ValidationError::TooManyOptions);
    }

    let options: Vec<String> = entries
        .iter()
        .map(sanitize_value)
        .filter(|option| !option.is_empty())
        .collect();

    if options.len() < MIN_OPTIONS {
        return Err(ValidationError::TooFewNonEmptyOptions);
    }

    let mut seen = HashSet::with_capacity(options.len());
    if !options.iter().all(|option| seen.insert(option.as_str())) {
        return Err(ValidationError::DuplicateOptions);
    }

    if options
        .iter()
        .any(|option| option.chars().count() > MAX_OPTION_LENGTH)
    {
        return Err(ValidationError::OptionTooLong);
    }

    Ok(options)
}

/// Check that a poll id has the canonical UUID shape and return it.
pub fn validate_poll_id(raw: &Value) -> Result<&str, ValidationError> {
    match raw.as_str() {
        Some(id) if POLL_ID_REGEX.is_match(id) => Ok(id),
        _ => Err(ValidationError::InvalidPollId),
    }
}

/// Check a zero-based option index against the number of options on the poll.
pub fn validate_option_index(raw: &Value, option_count: usize) -> Result<usize, ValidationError> {
    let index = match raw.as_i64() {
        Some(index) => index,
        // Integers beyond i64 are still integers, just never in range.
        None if raw.is_u64() => return Err(ValidationError::OptionIndexOutOfRange),
        None => return Err(ValidationError::OptionIndexNotInteger),
    };

    match usize::try_from(index) {
        Ok(index) if index < option_count => Ok(index),
        _ => Err(ValidationError::OptionIndexOutOfRange),
    }
}
