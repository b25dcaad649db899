//! Authorization rules for poll mutation and administration
//!
//! Ownership is the only way to change a poll. The one escalation path is the
//! administrator allow-list, which is read from configuration once at startup
//! and handed to whoever needs it.

use crate::actor::Actor;
use crate::app_config::AdminConfig;
use std::collections::HashSet;

/// Whether `actor` may update or delete a poll owned by `owner_id`.
pub fn can_mutate_poll(actor: &Actor, owner_id: &str) -> bool {
    matches!(actor.id(), Some(id) if id == owner_id)
}

/// Administrator allow-list.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    /// Normalized (trimmed, lowercased) administrator emails
    administrators: HashSet<String>,
}

impl Policy {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let administrators = emails
            .into_iter()
            .map(|email| normalize_email(email.as_ref()))
            .filter(|email| !email.is_empty())
            .collect();

        Self { administrators }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        let policy = Self::new(&config.emails);
        log::info!(
            "Authorization policy loaded with {} administrator(s)",
            policy.administrators.len()
        );
        policy
    }

    /// Whether the actor's verified email is on the allow-list. Anonymous actors never are.
    pub fn is_administrator(&self, actor: &Actor) -> bool {
        actor
            .email()
            .map(|email| self.is_administrator_email(email))
            .unwrap_or(false)
    }

    pub fn is_administrator_email(&self, email: &str) -> bool {
        self.administrators.contains(&normalize_email(email))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Actor {
        Actor::authenticated("user-alice", "alice@example.com")
    }

    #[test]
    fn test_owner_can_mutate() {
        assert!(can_mutate_poll(&alice(), "user-alice"));
    }

    #[test]
    fn test_other_user_cannot_mutate() {
        assert!(!can_mutate_poll(&alice(), "user-bob"));
    }

    #[test]
    fn test_anonymous_cannot_mutate() {
        assert!(!can_mutate_poll(&Actor::Anonymous, "user-alice"));
        assert!(!can_mutate_poll(&Actor::Anonymous, ""));
    }

    #[test]
    fn test_administrator_allow_list() {
        let policy = Policy::new(["admin@example.com"]);
        assert!(policy.is_administrator(&Actor::authenticated("u1", "admin@example.com")));
        assert!(!policy.is_administrator(&alice()));
        assert!(!policy.is_administrator(&Actor::Anonymous));
    }

    #[test]
    fn test_administrator_email_normalized() {
        let policy = Policy::new(["  Admin@Example.com "]);
        assert!(policy.is_administrator_email("admin@example.com"));
        assert!(policy.is_administrator_email("ADMIN@EXAMPLE.COM"));
    }

    #[test]
    fn test_empty_entries_ignored() {
        let policy = Policy::new(["", "   "]);
        assert!(!policy.is_administrator_email(""));
    }

    #[test]
    fn test_default_policy_has_no_administrators() {
        let policy = Policy::default();
        assert!(!policy.is_administrator_email("admin@example.com"));
    }

    #[test]
    fn test_from_config() {
        let config = AdminConfig {
            emails: vec!["root@example.com".to_string()],
        };
        let policy = Policy::from_config(&config);
        assert!(policy.is_administrator_email("root@example.com"));
    }
}
