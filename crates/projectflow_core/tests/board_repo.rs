use projectflow_core::db::{open_db, open_db_in_memory};
use projectflow_core::{
    decode_board, encode_board, Board, BoardRepository, Project, RepoError, SqliteBoardRepository,
    Task, TaskStatus, BOARD_STORAGE_KEY,
};
use rusqlite::Connection;

fn sample_board() -> Board {
    let mut launch = Project::new("p-launch", "Launch").unwrap();
    launch.push_task(Task::new("t1", "Write copy", Some("landing page")).unwrap());
    let mut shipped = Task::new("t2", "Book venue", None).unwrap();
    shipped.status = TaskStatus::Done;
    launch.push_task(shipped);
    let mut doing = Task::new("t3", "Design logo", None).unwrap();
    doing.status = TaskStatus::InProgress;
    launch.push_task(doing);

    let chores = Project::new("p-chores", "Chores").unwrap();
    Board::new(vec![launch, chores])
}

#[test]
fn load_returns_none_before_first_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();

    assert_eq!(repo.load_board().unwrap(), None);
}

#[test]
fn save_then_load_preserves_ids_order_and_statuses() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let board = sample_board();

    repo.save_board(&board).unwrap();
    let loaded = repo.load_board().unwrap().unwrap();

    assert_eq!(loaded, board);
}

#[test]
fn save_overwrites_previous_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();

    repo.save_board(&sample_board()).unwrap();
    repo.save_board(&Board::default()).unwrap();

    assert_eq!(repo.load_board().unwrap(), Some(Board::default()));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn codec_round_trip_is_structurally_equal() {
    let board = sample_board();
    let decoded = decode_board(&encode_board(&board).unwrap()).unwrap();
    assert_eq!(decoded, board);
}

#[test]
fn load_reports_corrupt_snapshot_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, ?2);",
        [BOARD_STORAGE_KEY, "{not json"],
    )
    .unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();

    let err = repo.load_board().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteBoardRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn snapshot_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projectflow.sqlite3");
    let board = sample_board();

    {
        let conn = open_db(&path).unwrap();
        SqliteBoardRepository::try_new(&conn)
            .unwrap()
            .save_board(&board)
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let loaded = SqliteBoardRepository::try_new(&conn)
        .unwrap()
        .load_board()
        .unwrap();
    assert_eq!(loaded, Some(board));
}

#[test]
fn load_reports_non_text_snapshot_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, X'FFFE00');",
        [BOARD_STORAGE_KEY],
    )
    .unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();

    let err = repo.load_board().unwrap_err();
    assert!(
        matches!(err, RepoError::InvalidData(ref message) if message.contains("instead of text"))
    );
}

#[test]
fn load_reports_invalid_utf8_text_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, CAST(X'FFFE00' AS TEXT));",
        [BOARD_STORAGE_KEY],
    )
    .unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.load_board().unwrap_err(),
        RepoError::InvalidData(_)
    ));
}
