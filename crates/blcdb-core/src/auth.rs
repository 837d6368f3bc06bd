//! Explicit authentication session values.
//!
//! The session is a plain value threaded through whatever context needs it
//! (request extensions, CLI state) — there is no ambient global. Role checks
//! are pure predicates over the session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// An authenticated principal: who they are and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Stable identifier for the principal (email or token label).
    pub subject: String,
    /// Display name.
    pub name: String,
    pub role: Role,
}

/// Whether this session may use the moderation dashboard and its mutating
/// actions.
#[must_use]
pub fn can_access_admin(session: &AuthSession) -> bool {
    session.role == Role::Admin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_access_admin() {
        let admin = AuthSession {
            subject: "admin@example.com".to_owned(),
            name: "Administrator".to_owned(),
            role: Role::Admin,
        };
        let user = AuthSession {
            subject: "user@example.com".to_owned(),
            name: "user".to_owned(),
            role: Role::User,
        };
        assert!(can_access_admin(&admin));
        assert!(!can_access_admin(&user));
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).expect("serialize"), "\"admin\"");
    }
}
