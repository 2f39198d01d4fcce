use projectflow_core::db::migrations::{apply_migrations, current_user_version, latest_version};
use projectflow_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn kv_columns(conn: &Connection) -> Vec<(String, String, bool, bool)> {
    let mut stmt = conn.prepare("PRAGMA table_info(kv_entries);").unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let name: String = row.get(1).unwrap();
        let declared_type: String = row.get(2).unwrap();
        let not_null: i64 = row.get(3).unwrap();
        let primary_key: i64 = row.get(5).unwrap();
        columns.push((name, declared_type, not_null == 1, primary_key > 0));
    }
    columns
}

#[test]
fn kv_entries_has_exactly_the_snapshot_columns() {
    let conn = open_db_in_memory().unwrap();

    let columns = kv_columns(&conn);
    assert_eq!(
        columns,
        vec![
            ("key".to_string(), "TEXT".to_string(), true, true),
            ("value".to_string(), "TEXT".to_string(), true, false),
            ("updated_at".to_string(), "INTEGER".to_string(), true, false),
        ]
    );
}

#[test]
fn key_is_unique_so_snapshots_cannot_fork() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('projectflow_data', '[]');",
        [],
    )
    .unwrap();

    let err = conn
        .execute(
            "INSERT INTO kv_entries (key, value) VALUES ('projectflow_data', '[]');",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );
}

#[test]
fn updated_at_defaults_to_epoch_millis_and_value_is_required() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('k', 'v');",
        [],
    )
    .unwrap();

    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM kv_entries WHERE key = 'k';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    // Any timestamp after 2020-01-01 in milliseconds.
    assert!(updated_at > 1_577_836_800_000);

    assert!(conn
        .execute("INSERT INTO kv_entries (key) VALUES ('no-value');", [])
        .is_err());
}

#[test]
fn migrating_an_up_to_date_connection_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('projectflow_data', '[]');",
        [],
    )
    .unwrap();

    apply_migrations(&mut conn).unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn board_file_written_by_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projectflow.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}
