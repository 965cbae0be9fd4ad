use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{FichaError, Result};
use crate::models::{display_name, Sheet, Trash, User};

/// Dates are strictly YYYY-MM-DD at every boundary.
pub fn parse_work_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FichaError::InvalidInput(format!("date must be YYYY-MM-DD, got \"{raw}\"")))
}

pub fn find_user(conn: &Connection, username: &str) -> Result<User> {
    let user: Option<User> = conn
        .query_row(
            "SELECT id, username, full_name, role FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    full_name: row.get(2)?,
                    role: row.get(3)?,
                })
            },
        )
        .optional()?;
    user.ok_or_else(|| FichaError::NotFound(format!("user \"{username}\"")))
}

fn map_sheet(row: &Row) -> rusqlite::Result<Sheet> {
    Ok(Sheet {
        id: row.get(0)?,
        operator_id: row.get(1)?,
        work_date: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        trash: Trash::from_row(row.get(6)?, row.get(7)?, row.get(8)?),
    })
}

const COLS: &str =
    "id, operator_id, work_date, name, created_at, updated_at, trashed, trashed_at, trashed_by";

pub fn create_sheet(conn: &Connection, operator_id: i64, date: &str, name: &str) -> Result<i64> {
    let date = parse_work_date(date)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(FichaError::InvalidInput("sheet name must not be empty".to_string()));
    }
    conn.execute(
        "INSERT INTO sheets (operator_id, work_date, name) VALUES (?1, ?2, ?3)",
        params![operator_id, date.format("%Y-%m-%d").to_string(), name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch an untrashed sheet; a trashed one reads as missing.
pub fn get_sheet(conn: &Connection, id: i64) -> Result<Sheet> {
    let sheet: Option<Sheet> = conn
        .query_row(
            &format!("SELECT {COLS} FROM sheets WHERE id = ?1 AND trashed = 0"),
            [id],
            map_sheet,
        )
        .optional()?;
    sheet.ok_or_else(|| FichaError::NotFound(format!("sheet {id}")))
}

/// A listing row: the sheet plus its operator's report label.
pub struct SheetListing {
    pub sheet: Sheet,
    pub operator: String,
}

pub fn list_sheets(
    conn: &Connection,
    date: Option<&str>,
    operator_id: Option<i64>,
) -> Result<Vec<SheetListing>> {
    let mut clauses = vec!["s.trashed = 0".to_string()];
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(date) = date {
        let date = parse_work_date(date)?;
        params_vec.push(date.format("%Y-%m-%d").to_string());
        clauses.push(format!("s.work_date = ?{}", params_vec.len()));
    }
    if let Some(op) = operator_id {
        params_vec.push(op.to_string());
        clauses.push(format!("s.operator_id = ?{}", params_vec.len()));
    }
    let sql = format!(
        "SELECT s.id, s.operator_id, s.work_date, s.name, s.created_at, s.updated_at, \
                s.trashed, s.trashed_at, s.trashed_by, u.full_name, u.username \
         FROM sheets s JOIN users u ON s.operator_id = u.id \
         WHERE {} ORDER BY s.work_date DESC, s.id DESC",
        clauses.join(" AND ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let param_values: Vec<&dyn rusqlite::types::ToSql> = params_vec
        .iter()
        .map(|p| p as &dyn rusqlite::types::ToSql)
        .collect();
    let rows = stmt.query_map(param_values.as_slice(), |row| {
        let sheet = map_sheet(row)?;
        let full_name: String = row.get(9)?;
        let username: String = row.get(10)?;
        Ok(SheetListing {
            sheet,
            operator: display_name(&full_name, &username).to_string(),
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn list_trashed(conn: &Connection) -> Result<Vec<Sheet>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM sheets WHERE trashed = 1 ORDER BY trashed_at DESC"
    ))?;
    let rows = stmt.query_map([], map_sheet)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn move_to_trash(conn: &Connection, id: i64, by: Option<i64>) -> Result<String> {
    let sheet = get_sheet(conn, id)?;
    conn.execute(
        "UPDATE sheets SET trashed = 1, trashed_at = datetime('now'), trashed_by = ?2 \
         WHERE id = ?1",
        params![id, by],
    )?;
    Ok(sheet.name)
}

fn get_trashed_name(conn: &Connection, id: i64) -> Result<String> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM sheets WHERE id = ?1 AND trashed = 1",
            [id],
            |r| r.get(0),
        )
        .optional()?;
    name.ok_or_else(|| FichaError::NotFound(format!("sheet {id} in the trash")))
}

pub fn restore(conn: &Connection, id: i64) -> Result<String> {
    let name = get_trashed_name(conn, id)?;
    conn.execute(
        "UPDATE sheets SET trashed = 0, trashed_at = NULL, trashed_by = NULL WHERE id = ?1",
        [id],
    )?;
    Ok(name)
}

/// Hard delete from the trash; the sheet's entries go with it.
pub fn purge(conn: &Connection, id: i64) -> Result<String> {
    let name = get_trashed_name(conn, id)?;
    conn.execute("DELETE FROM sheets WHERE id = ?1", [id])?;
    Ok(name)
}

/// Distinct untrashed sheet names, for the period-report filter choices.
pub fn distinct_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT name FROM sheets WHERE trashed = 0 ORDER BY name",
    )?;
    let rows = stmt.query_map([], |r| r.get(0))?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn seed_user(conn: &Connection, username: &str, full_name: &str) -> i64 {
        conn.execute(
            "INSERT INTO users (username, full_name) VALUES (?1, ?2)",
            params![username, full_name],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_parse_work_date_strict() {
        assert!(parse_work_date("2026-03-02").is_ok());
        for bad in ["02/03/2026", "2026-3-2x", "yesterday", ""] {
            let err = parse_work_date(bad).unwrap_err();
            assert!(matches!(err, FichaError::InvalidInput(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_create_and_get_sheet() {
        let (_dir, conn) = test_db();
        let ana = seed_user(&conn, "ana", "Ana Souza");
        let id = create_sheet(&conn, ana, "2026-03-02", "Batch-1").unwrap();
        let sheet = get_sheet(&conn, id).unwrap();
        assert_eq!(sheet.name, "Batch-1");
        assert_eq!(sheet.work_date, "2026-03-02");
        assert_eq!(sheet.operator_id, ana);
    }

    #[test]
    fn test_create_sheet_rejects_bad_input() {
        let (_dir, conn) = test_db();
        let ana = seed_user(&conn, "ana", "");
        assert!(matches!(
            create_sheet(&conn, ana, "03-02-2026", "Batch-1").unwrap_err(),
            FichaError::InvalidInput(_)
        ));
        assert!(matches!(
            create_sheet(&conn, ana, "2026-03-02", "  ").unwrap_err(),
            FichaError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_list_sheets_orders_and_filters() {
        let (_dir, conn) = test_db();
        let ana = seed_user(&conn, "ana", "Ana Souza");
        let rui = seed_user(&conn, "rui", "");
        create_sheet(&conn, ana, "2026-03-01", "Batch-1").unwrap();
        create_sheet(&conn, rui, "2026-03-02", "Batch-2").unwrap();
        create_sheet(&conn, ana, "2026-03-02", "Batch-3").unwrap();

        let all = list_sheets(&conn, None, None).unwrap();
        assert_eq!(
            all.iter().map(|l| l.sheet.name.as_str()).collect::<Vec<_>>(),
            vec!["Batch-3", "Batch-2", "Batch-1"]
        );
        assert_eq!(all[0].operator, "Ana Souza");
        assert_eq!(all[1].operator, "rui");

        let day = list_sheets(&conn, Some("2026-03-02"), None).unwrap();
        assert_eq!(day.len(), 2);
        let anas = list_sheets(&conn, None, Some(ana)).unwrap();
        assert_eq!(anas.len(), 2);
    }

    #[test]
    fn test_trash_hides_sheet_until_restore() {
        let (_dir, conn) = test_db();
        let ana = seed_user(&conn, "ana", "");
        let qc = seed_user(&conn, "qc", "");
        let id = create_sheet(&conn, ana, "2026-03-02", "Batch-1").unwrap();

        move_to_trash(&conn, id, Some(qc)).unwrap();
        assert!(matches!(get_sheet(&conn, id).unwrap_err(), FichaError::NotFound(_)));
        assert!(list_sheets(&conn, None, None).unwrap().is_empty());
        let trashed = list_trashed(&conn).unwrap();
        assert_eq!(trashed.len(), 1);
        assert!(trashed[0].trash.is_trashed());

        restore(&conn, id).unwrap();
        assert_eq!(get_sheet(&conn, id).unwrap().name, "Batch-1");
    }

    #[test]
    fn test_trash_twice_is_not_found() {
        let (_dir, conn) = test_db();
        let ana = seed_user(&conn, "ana", "");
        let id = create_sheet(&conn, ana, "2026-03-02", "Batch-1").unwrap();
        move_to_trash(&conn, id, None).unwrap();
        let err = move_to_trash(&conn, id, None).unwrap_err();
        assert!(matches!(err, FichaError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn test_purge_cascades_entries() {
        let (_dir, conn) = test_db();
        let ana = seed_user(&conn, "ana", "");
        let id = create_sheet(&conn, ana, "2026-03-02", "Batch-1").unwrap();
        conn.execute("INSERT INTO parts (name) VALUES ('Sole')", []).unwrap();
        conn.execute(
            "INSERT INTO entries (sheet_id, part_id, quantities) VALUES (?1, 1, '[5]')",
            [id],
        )
        .unwrap();

        assert!(matches!(purge(&conn, id).unwrap_err(), FichaError::NotFound(_)));
        move_to_trash(&conn, id, None).unwrap();
        purge(&conn, id).unwrap();
        let entries: i64 =
            conn.query_row("SELECT count(*) FROM entries", [], |r| r.get(0)).unwrap();
        assert_eq!(entries, 0);
    }

    #[test]
    fn test_distinct_names_skips_trashed() {
        let (_dir, conn) = test_db();
        let ana = seed_user(&conn, "ana", "");
        create_sheet(&conn, ana, "2026-03-01", "Batch-1").unwrap();
        create_sheet(&conn, ana, "2026-03-02", "Batch-1").unwrap();
        let id = create_sheet(&conn, ana, "2026-03-02", "Batch-2").unwrap();
        move_to_trash(&conn, id, None).unwrap();
        assert_eq!(distinct_names(&conn).unwrap(), vec!["Batch-1".to_string()]);
    }
}
