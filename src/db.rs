use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL DEFAULT '',
    role TEXT NOT NULL DEFAULT 'operator',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS parts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    trashed INTEGER NOT NULL DEFAULT 0,
    trashed_at TEXT,
    trashed_by INTEGER,
    FOREIGN KEY (trashed_by) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS operator_names (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    trashed INTEGER NOT NULL DEFAULT 0,
    trashed_at TEXT,
    trashed_by INTEGER,
    FOREIGN KEY (trashed_by) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS sheets (
    id INTEGER PRIMARY KEY,
    operator_id INTEGER NOT NULL,
    work_date TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    trashed INTEGER NOT NULL DEFAULT 0,
    trashed_at TEXT,
    trashed_by INTEGER,
    FOREIGN KEY (operator_id) REFERENCES users(id),
    FOREIGN KEY (trashed_by) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY,
    sheet_id INTEGER NOT NULL,
    part_id INTEGER NOT NULL,
    quantities TEXT NOT NULL DEFAULT '[]',
    UNIQUE (sheet_id, part_id),
    FOREIGN KEY (sheet_id) REFERENCES sheets(id) ON DELETE CASCADE,
    FOREIGN KEY (part_id) REFERENCES parts(id)
);

CREATE INDEX IF NOT EXISTS idx_sheets_work_date ON sheets(work_date);
CREATE INDEX IF NOT EXISTS idx_entries_sheet ON entries(sheet_id);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["users", "parts", "operator_names", "sheets", "entries"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_entry_pairing_is_unique() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO users (username) VALUES ('ana')", []).unwrap();
        conn.execute(
            "INSERT INTO sheets (operator_id, work_date, name) VALUES (1, '2026-03-02', 'Batch-1')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO parts (name) VALUES ('Sole')", []).unwrap();
        conn.execute("INSERT INTO entries (sheet_id, part_id) VALUES (1, 1)", []).unwrap();
        let dup = conn.execute("INSERT INTO entries (sheet_id, part_id) VALUES (1, 1)", []);
        assert!(dup.is_err(), "duplicate (sheet, part) pairing must be rejected");
    }

    #[test]
    fn test_hard_delete_sheet_cascades_entries() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO users (username) VALUES ('ana')", []).unwrap();
        conn.execute(
            "INSERT INTO sheets (operator_id, work_date, name) VALUES (1, '2026-03-02', 'Batch-1')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO parts (name) VALUES ('Sole')", []).unwrap();
        conn.execute(
            "INSERT INTO entries (sheet_id, part_id, quantities) VALUES (1, 1, '[5]')",
            [],
        )
        .unwrap();
        conn.execute("DELETE FROM sheets WHERE id = 1", []).unwrap();
        let left: i64 = conn.query_row("SELECT count(*) FROM entries", [], |r| r.get(0)).unwrap();
        assert_eq!(left, 0);
    }
}
