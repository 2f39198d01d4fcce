//! Board snapshot repository and its SQLite key-value implementation.
//!
//! The whole board is stored as one JSON array under [`BOARD_STORAGE_KEY`].

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::board::{Board, BoardValidationError};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key of the board snapshot inside `kv_entries`.
pub const BOARD_STORAGE_KEY: &str = "projectflow_data";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from board snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Snapshot could not be serialized.
    Encode(serde_json::Error),
    /// Persisted snapshot is malformed or violates board invariants.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode board snapshot: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted board data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<BoardValidationError> for RepoError {
    fn from(value: BoardValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Load/save contract for the full board snapshot.
pub trait BoardRepository {
    /// Returns `None` when nothing has been persisted yet.
    fn load_board(&self) -> RepoResult<Option<Board>>;
    /// Overwrites the persisted snapshot with `board`.
    fn save_board(&self, board: &Board) -> RepoResult<()>;
}

impl<R: BoardRepository + ?Sized> BoardRepository for &R {
    fn load_board(&self) -> RepoResult<Option<Board>> {
        (**self).load_board()
    }

    fn save_board(&self, board: &Board) -> RepoResult<()> {
        (**self).save_board(board)
    }
}

/// Serializes a board into its persisted JSON form.
pub fn encode_board(board: &Board) -> RepoResult<String> {
    serde_json::to_string(board).map_err(RepoError::Encode)
}

/// Parses and validates a persisted JSON snapshot.
///
/// Blank descriptions written by older builds as `""` are normalized to
/// absent so they compare equal to freshly created tasks.
pub fn decode_board(raw: &str) -> RepoResult<Board> {
    let mut board: Board = serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("malformed snapshot json: {err}")))?;

    for task in board
        .projects
        .iter_mut()
        .flat_map(|project| project.tasks.iter_mut())
    {
        if task.desc.as_deref().is_some_and(|desc| desc.trim().is_empty()) {
            task.desc = None;
        }
    }

    board.validate()?;
    Ok(board)
}

/// SQLite-backed board repository over the `kv_entries` table.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Wraps a connection after checking it has been fully migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn load_board(&self) -> RepoResult<Option<Board>> {
        // Read the raw cell: a non-text or non-UTF-8 value is corrupt data,
        // not a transport failure.
        let raw: Option<Result<String, String>> = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [BOARD_STORAGE_KEY],
                |row| Ok(snapshot_text(row.get_ref(0)?)),
            )
            .optional()?;

        match raw {
            None => Ok(None),
            Some(Ok(text)) => decode_board(&text).map(Some),
            Some(Err(message)) => Err(RepoError::InvalidData(message)),
        }
    }

    fn save_board(&self, board: &Board) -> RepoResult<()> {
        let raw = encode_board(board)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![BOARD_STORAGE_KEY, raw],
        )?;
        Ok(())
    }
}

fn snapshot_text(value: ValueRef<'_>) -> Result<String, String> {
    match value {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|err| format!("snapshot text is not valid UTF-8: {err}")),
        other => Err(format!(
            "snapshot stored as {} instead of text",
            other.data_type()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_board, encode_board, RepoError};
    use crate::model::board::{Board, Project, Task, TaskStatus};

    #[test]
    fn encode_writes_bare_array_with_wire_status_names() {
        let mut project = Project::new("p1", "Site").unwrap();
        let mut task = Task::new("t1", "Deploy", Some("prod")).unwrap();
        task.status = TaskStatus::InProgress;
        project.push_task(task);

        let raw = encode_board(&Board::new(vec![project])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert!(value.is_array());
        assert_eq!(value[0]["id"], "p1");
        assert_eq!(value[0]["name"], "Site");
        assert_eq!(value[0]["tasks"][0]["status"], "inprogress");
        assert_eq!(value[0]["tasks"][0]["desc"], "prod");
    }

    #[test]
    fn decode_accepts_legacy_blank_desc() {
        let raw = r#"[{"id":"k3j9x","name":"Home","tasks":[
            {"id":"a1","title":"Paint","desc":"","status":"todo"},
            {"id":"a2","title":"Fix sink","status":"done"}
        ]}]"#;

        let board = decode_board(raw).unwrap();
        let tasks = &board.projects[0].tasks;
        assert_eq!(tasks[0].desc, None);
        assert_eq!(tasks[1].status, TaskStatus::Done);
    }

    #[test]
    fn decode_rejects_unknown_status_and_duplicates() {
        let bad_status = r#"[{"id":"p","name":"P","tasks":[{"id":"t","title":"T","status":"blocked"}]}]"#;
        assert!(matches!(
            decode_board(bad_status),
            Err(RepoError::InvalidData(_))
        ));

        let duplicate = r#"[{"id":"p","name":"A","tasks":[]},{"id":"p","name":"B","tasks":[]}]"#;
        assert!(matches!(
            decode_board(duplicate),
            Err(RepoError::InvalidData(_))
        ));
    }
}
