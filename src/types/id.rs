//! Opaque component identifiers.
//!
//! A [`ComponentId`] is the only key the store, batch operations and
//! drag-and-drop reordering use to address a node. Ids are minted once at
//! creation time and never reused: duplication and paste always mint a new
//! one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Process-wide sequence mixed into every minted id.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// An opaque, process-unique component identifier.
///
/// Serialized as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh id of the form `<prefix>-<epoch-ms>-<seq>-<random>`.
    ///
    /// The sequence number makes ids unique within the process even when two
    /// are minted in the same millisecond; the random suffix covers ids
    /// minted by other processes (e.g. a document restored from storage).
    pub fn generate(prefix: &str) -> Self {
        Self(format!(
            "{}-{}-{}-{}",
            prefix,
            chrono::Utc::now().timestamp_millis(),
            next_sequence(),
            random_suffix(7)
        ))
    }

    /// Mint the id for a duplicate of `self`: `<id>_copy_<epoch-ms>_<seq>`.
    pub fn copy_of(&self) -> Self {
        Self(format!(
            "{}_copy_{}_{}",
            self.0,
            chrono::Utc::now().timestamp_millis(),
            next_sequence()
        ))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ComponentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Short lowercase base36 string, used for ids and generated custom ids.
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_carry_prefix() {
        let id = ComponentId::generate("button");
        assert!(id.as_str().starts_with("button-"));
        assert_eq!(id.as_str().split('-').count(), 4);
    }

    #[test]
    fn generated_ids_are_unique_within_a_millisecond() {
        let ids: HashSet<ComponentId> = (0..1000).map(|_| ComponentId::generate("c")).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn copies_never_collide() {
        let original = ComponentId::new("btn1");
        let a = original.copy_of();
        let b = original.copy_of();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("btn1_copy_"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ComponentId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: ComponentId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn random_suffix_is_base36() {
        let s = random_suffix(12);
        assert_eq!(s.len(), 12);
        assert!(s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
