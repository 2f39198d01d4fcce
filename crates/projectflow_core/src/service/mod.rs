//! Use-case services over the board model.
//!
//! # Responsibility
//! - Turn user intents into board mutations plus a persist step.
//! - Keep CLI/rendering callers decoupled from storage details.

pub mod board_store;
