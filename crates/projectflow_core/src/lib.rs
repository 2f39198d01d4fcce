//! Core domain logic for ProjectFlow, a single-user kanban board.
//! This crate is the single source of truth for board invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    Board, BoardValidationError, ColumnCounts, Project, ProjectId, Task, TaskId, TaskStatus,
};
pub use model::ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use repo::board_repo::{
    decode_board, encode_board, BoardRepository, RepoError, RepoResult, SqliteBoardRepository,
    BOARD_STORAGE_KEY,
};
pub use service::board_store::{BoardStore, ProjectOverview, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
