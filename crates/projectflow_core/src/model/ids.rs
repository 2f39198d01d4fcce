//! Identifier generation for new projects and tasks.
//!
//! The board only requires ids to be practically unique; their format is
//! opaque to every caller.

use uuid::Uuid;

/// Source of fresh opaque identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Default generator backed by random v4 UUIDs in simple (hyphen-less) form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic generator yielding `<prefix>1`, `<prefix>2`, ...
///
/// Useful for test fixtures that assert on ids.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
