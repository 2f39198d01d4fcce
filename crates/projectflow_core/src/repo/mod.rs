//! Persistence contracts for the board snapshot.
//!
//! # Responsibility
//! - Define the load/save contract the store depends on.
//! - Keep SQLite and JSON codec details out of the store.
//!
//! # Invariants
//! - Saves overwrite the full snapshot; there are no incremental writes.
//! - Read paths reject invalid persisted state instead of masking it; the
//!   store decides how to recover.

pub mod board_repo;
