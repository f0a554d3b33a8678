//! Mock credential check against a fixed user list. Any password of the
//! configured minimum length is accepted for a known email.

use crate::models::{Role, User};
use tracing::{debug, info};

const USERS: [(&str, &str, &str, Role); 4] = [
    ("user1", "Jan Novák", "jan.novak@example.com", Role::Admin),
    ("user2", "Petra Svobodová", "petra.svobodova@example.com", Role::Manager),
    ("user3", "Martin Dvořák", "martin.dvorak@example.com", Role::Manager),
    ("user4", "Lucie Černá", "lucie.cerna@example.com", Role::Manager),
];

fn to_user(&(id, name, email, role): &(&str, &str, &str, Role)) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
    }
}

pub fn users() -> Vec<User> {
    USERS.iter().map(to_user).collect()
}

pub fn user_by_id(id: &str) -> Option<User> {
    USERS.iter().find(|u| u.0 == id).map(to_user)
}

/// `None` for missing credentials, a short password, or an unknown email.
pub fn authenticate(email: &str, password: &str, min_password_len: usize) -> Option<User> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        debug!("Login rejected: missing email or password");
        return None;
    }
    if password.chars().count() < min_password_len {
        debug!("Login rejected for {}: password too short", email);
        return None;
    }

    let user = USERS
        .iter()
        .find(|u| u.2.eq_ignore_ascii_case(email))
        .map(to_user);
    match &user {
        Some(u) => info!("User {} ({}) signed in", u.id, u.email),
        None => debug!("Login rejected: unknown email {}", email),
    }
    user
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_user_with_long_enough_password() {
        let user = authenticate("Jan.Novak@Example.com", "abcd", 4).unwrap();
        assert_eq!(user.id, "user1");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_rejections() {
        assert!(authenticate("jan.novak@example.com", "abc", 4).is_none());
        assert!(authenticate("jan.novak@example.com", "", 4).is_none());
        assert!(authenticate("", "password", 4).is_none());
        assert!(authenticate("nobody@example.com", "password", 4).is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(user_by_id("user3").map(|u| u.name), Some("Martin Dvořák".to_string()));
        assert!(user_by_id("user9").is_none());
        assert_eq!(users().len(), 4);
    }
}
