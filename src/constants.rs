//! Application-wide constants
//!
//! This module contains the bounds applied to poll content and votes.

/// Minimum length for a poll question in characters, measured after sanitization.
pub const MIN_QUESTION_LENGTH: usize = 3;

/// Maximum length for a poll question in characters, measured after sanitization.
pub const MAX_QUESTION_LENGTH: usize = 500;

/// Fewest options a poll may carry, both before and after empty entries are dropped.
pub const MIN_OPTIONS: usize = 2;

/// Most options a poll may carry.
pub const MAX_OPTIONS: usize = 10;

/// Maximum length for a single option in characters.
pub const MAX_OPTION_LENGTH: usize = 200;

/// Session key holding the identity provider's access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
