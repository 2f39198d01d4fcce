//! Board domain model.
//!
//! # Responsibility
//! - Define the project/task records that make up one user's board.
//! - Keep state transitions pure so they can be tested without storage.
//!
//! # Invariants
//! - Every project and task is identified by an opaque, immutable id.
//! - Deleting a project discards its tasks; there are no tombstones.

pub mod board;
pub mod ids;
