//! Short id generation.
//!
//! Ids are drawn uniformly from `[A-Za-z0-9]`. Uniqueness is not guaranteed
//! here; the allocation service retries on collision.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Default length of generated short ids.
pub const DEFAULT_ID_LENGTH: usize = 6;

/// Ids that would be shadowed by fixed routes (`GET /ping`, `/api/...`).
pub const RESERVED_IDS: &[&str] = &["ping", "api"];

/// Returns true if `id` is taken by a fixed route.
pub fn is_reserved_id(id: &str) -> bool {
    RESERVED_IDS.contains(&id)
}

/// Returns true if `id` can be served back through `GET /{id}`.
///
/// Allowed characters are `[A-Za-z0-9_-]`; reserved ids are refused.
pub fn is_routable_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !is_reserved_id(id)
}

/// Source of candidate short ids.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// Produces a candidate id.
    fn generate(&self) -> String;
}

/// Generates a random alphanumeric string of `length` characters.
///
/// A length of zero yields an empty string.
///
/// # Examples
///
/// ```ignore
/// let id = generate_id(6);
/// assert_eq!(id.len(), 6);
/// assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_id(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Thread-safe random generator of fixed-length ids.
#[derive(Debug, Clone, Copy)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        loop {
            let id = generate_id(self.length);
            if !is_reserved_id(&id) {
                return id;
            }
        }
    }
}
