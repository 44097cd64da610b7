//! Resolve report participants to local users.
//!
//! Email first (case-insensitive). Otherwise a normalized display name
//! ("first last" or "last, first"), accepted only when exactly one enrolled
//! user fits. Everything else stays unmatched.

use crate::models::participant::ParticipationRecord;
use crate::models::user::LocalUser;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Email,
    Name,
}

pub fn normalize_name(name: &str) -> String {
    WHITESPACE
        .replace_all(name.trim(), " ")
        .to_lowercase()
}

pub struct UserMatcher<'a> {
    by_email: HashMap<String, &'a LocalUser>,
    by_name: HashMap<String, Vec<&'a LocalUser>>,
}

impl<'a> UserMatcher<'a> {
    pub fn new(users: &'a [LocalUser]) -> Self {
        let mut by_email = HashMap::new();
        let mut by_name: HashMap<String, Vec<&LocalUser>> = HashMap::new();

        for u in users {
            by_email.insert(u.email.trim().to_lowercase(), u);

            let forward = normalize_name(&u.full_name());
            let reverse = normalize_name(&format!("{}, {}", u.lastname, u.firstname));
            for key in [forward, reverse] {
                let entry = by_name.entry(key).or_default();
                if !entry.iter().any(|other| other.id == u.id) {
                    entry.push(u);
                }
            }
        }

        Self { by_email, by_name }
    }

    pub fn resolve(&self, rec: &ParticipationRecord) -> Option<(&'a LocalUser, MatchKind)> {
        if let Some(email) = rec.email.as_deref()
            && let Some(user) = self.by_email.get(&email.trim().to_lowercase())
        {
            return Some((*user, MatchKind::Email));
        }

        match self.by_name.get(&normalize_name(&rec.name)) {
            Some(candidates) if candidates.len() == 1 => Some((candidates[0], MatchKind::Name)),
            _ => None,
        }
    }
}
