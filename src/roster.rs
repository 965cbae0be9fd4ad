//! Shared CRUD and trash lifecycle for the two factory catalogs: footwear
//! parts and the operator-name roster. Both tables have the same shape.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{FichaError, Result};
use crate::models::{RosterEntry, Trash};

#[derive(Clone, Copy, PartialEq)]
pub enum Catalog {
    Parts,
    OperatorNames,
}

impl Catalog {
    fn table(self) -> &'static str {
        match self {
            Catalog::Parts => "parts",
            Catalog::OperatorNames => "operator_names",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Catalog::Parts => "part",
            Catalog::OperatorNames => "operator name",
        }
    }
}

fn map_row(row: &Row) -> rusqlite::Result<RosterEntry> {
    Ok(RosterEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        sort_order: row.get(2)?,
        is_active: row.get(3)?,
        trash: Trash::from_row(row.get(4)?, row.get(5)?, row.get(6)?),
    })
}

const COLS: &str = "id, name, sort_order, is_active, trashed, trashed_at, trashed_by";

/// Create a catalog entry. Names are unique case-insensitively across the
/// whole table, trashed rows included, so a restore can never collide.
/// New entries go to the end of the display order.
pub fn create(conn: &Connection, catalog: Catalog, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FichaError::InvalidInput(format!(
            "{} name must not be empty",
            catalog.label()
        )));
    }
    let table = catalog.table();
    let exists: bool = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE name = ?1 COLLATE NOCASE)"),
        [name],
        |r| r.get(0),
    )?;
    if exists {
        return Err(FichaError::DuplicateEntry(format!(
            "{} \"{name}\"",
            catalog.label()
        )));
    }
    let next_order: i64 = conn.query_row(
        &format!("SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {table}"),
        [],
        |r| r.get(0),
    )?;
    conn.execute(
        &format!("INSERT INTO {table} (name, sort_order) VALUES (?1, ?2)"),
        params![name, next_order],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list(conn: &Connection, catalog: Catalog) -> Result<Vec<RosterEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM {} WHERE trashed = 0 ORDER BY sort_order, name",
        catalog.table()
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Active, untrashed entries for selection lists (sheet editing, sheet-name
/// suggestions).
pub fn list_selectable(conn: &Connection, catalog: Catalog) -> Result<Vec<RosterEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM {} WHERE trashed = 0 AND is_active = 1 ORDER BY sort_order, name",
        catalog.table()
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn list_trashed(conn: &Connection, catalog: Catalog) -> Result<Vec<RosterEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM {} WHERE trashed = 1 ORDER BY trashed_at DESC",
        catalog.table()
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn get_name(conn: &Connection, catalog: Catalog, id: i64, trashed: bool) -> Result<String> {
    let name: Option<String> = conn
        .query_row(
            &format!(
                "SELECT name FROM {} WHERE id = ?1 AND trashed = ?2",
                catalog.table()
            ),
            params![id, trashed],
            |r| r.get(0),
        )
        .optional()?;
    name.ok_or_else(|| {
        let place = if trashed { " in the trash" } else { "" };
        FichaError::NotFound(format!("{} {id}{place}", catalog.label()))
    })
}

/// Flip the active flag; returns the name and the new state.
pub fn toggle_active(conn: &Connection, catalog: Catalog, id: i64) -> Result<(String, bool)> {
    let name = get_name(conn, catalog, id, false)?;
    conn.execute(
        &format!(
            "UPDATE {} SET is_active = NOT is_active WHERE id = ?1",
            catalog.table()
        ),
        [id],
    )?;
    let active: bool = conn.query_row(
        &format!("SELECT is_active FROM {} WHERE id = ?1", catalog.table()),
        [id],
        |r| r.get(0),
    )?;
    Ok((name, active))
}

pub fn move_to_trash(
    conn: &Connection,
    catalog: Catalog,
    id: i64,
    by: Option<i64>,
) -> Result<String> {
    let name = get_name(conn, catalog, id, false)?;
    conn.execute(
        &format!(
            "UPDATE {} SET trashed = 1, trashed_at = datetime('now'), trashed_by = ?2 \
             WHERE id = ?1",
            catalog.table()
        ),
        params![id, by],
    )?;
    Ok(name)
}

pub fn restore(conn: &Connection, catalog: Catalog, id: i64) -> Result<String> {
    let name = get_name(conn, catalog, id, true)?;
    conn.execute(
        &format!(
            "UPDATE {} SET trashed = 0, trashed_at = NULL, trashed_by = NULL WHERE id = ?1",
            catalog.table()
        ),
        [id],
    )?;
    Ok(name)
}

/// Hard delete, permitted only from the trash.
pub fn purge(conn: &Connection, catalog: Catalog, id: i64) -> Result<String> {
    let name = get_name(conn, catalog, id, true)?;
    conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", catalog.table()),
        [id],
    )?;
    Ok(name)
}

/// Case-insensitive lookup among untrashed entries; used where the CLI takes
/// a part by name instead of id.
pub fn find_by_name(conn: &Connection, catalog: Catalog, name: &str) -> Result<RosterEntry> {
    let found: Option<RosterEntry> = conn
        .query_row(
            &format!(
                "SELECT {COLS} FROM {} WHERE name = ?1 COLLATE NOCASE AND trashed = 0",
                catalog.table()
            ),
            [name],
            map_row,
        )
        .optional()?;
    found.ok_or_else(|| FichaError::NotFound(format!("{} \"{name}\"", catalog.label())))
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

    #[test]
    fn test_create_assigns_increasing_sort_order() {
        let (_dir, conn) = test_db();
        create(&conn, Catalog::Parts, "Tongue").unwrap();
        create(&conn, Catalog::Parts, "Sole").unwrap();
        let parts = list(&conn, Catalog::Parts).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "Tongue");
        assert_eq!(parts[0].sort_order, 1);
        assert_eq!(parts[1].name, "Sole");
        assert_eq!(parts[1].sort_order, 2);
    }

    #[test]
    fn test_create_rejects_case_insensitive_duplicate() {
        let (_dir, conn) = test_db();
        create(&conn, Catalog::Parts, "Sole").unwrap();
        let err = create(&conn, Catalog::Parts, "SOLE").unwrap_err();
        assert!(matches!(err, FichaError::DuplicateEntry(_)), "got {err:?}");
    }

    #[test]
    fn test_create_rejects_duplicate_even_when_trashed() {
        let (_dir, conn) = test_db();
        let id = create(&conn, Catalog::Parts, "Sole").unwrap();
        move_to_trash(&conn, Catalog::Parts, id, None).unwrap();
        let err = create(&conn, Catalog::Parts, "sole").unwrap_err();
        assert!(matches!(err, FichaError::DuplicateEntry(_)), "got {err:?}");
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let (_dir, conn) = test_db();
        let err = create(&conn, Catalog::OperatorNames, "  ").unwrap_err();
        assert!(matches!(err, FichaError::InvalidInput(_)), "got {err:?}");
    }

    #[test]
    fn test_toggle_active() {
        let (_dir, conn) = test_db();
        let id = create(&conn, Catalog::OperatorNames, "Ana").unwrap();
        let (name, active) = toggle_active(&conn, Catalog::OperatorNames, id).unwrap();
        assert_eq!(name, "Ana");
        assert!(!active);
        let (_, active) = toggle_active(&conn, Catalog::OperatorNames, id).unwrap();
        assert!(active);
    }

    #[test]
    fn test_deactivated_entry_hidden_from_selectable() {
        let (_dir, conn) = test_db();
        let id = create(&conn, Catalog::Parts, "Heel").unwrap();
        toggle_active(&conn, Catalog::Parts, id).unwrap();
        assert!(list_selectable(&conn, Catalog::Parts).unwrap().is_empty());
        assert_eq!(list(&conn, Catalog::Parts).unwrap().len(), 1);
    }

    #[test]
    fn test_trash_restore_lifecycle() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO users (username, role) VALUES ('qc', 'quality')", []).unwrap();
        let qc = conn.last_insert_rowid();
        let id = create(&conn, Catalog::Parts, "Sole").unwrap();

        move_to_trash(&conn, Catalog::Parts, id, Some(qc)).unwrap();
        assert!(list(&conn, Catalog::Parts).unwrap().is_empty());
        let trashed = list_trashed(&conn, Catalog::Parts).unwrap();
        assert_eq!(trashed.len(), 1);
        match &trashed[0].trash {
            Trash::Trashed { at, by } => {
                assert!(!at.is_empty());
                assert_eq!(*by, Some(qc));
            }
            Trash::Active => panic!("entry should be trashed"),
        }

        restore(&conn, Catalog::Parts, id).unwrap();
        let parts = list(&conn, Catalog::Parts).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].trash, Trash::Active);
    }

    #[test]
    fn test_restore_requires_trashed_row() {
        let (_dir, conn) = test_db();
        let id = create(&conn, Catalog::Parts, "Sole").unwrap();
        let err = restore(&conn, Catalog::Parts, id).unwrap_err();
        assert!(matches!(err, FichaError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn test_purge_only_from_trash() {
        let (_dir, conn) = test_db();
        let id = create(&conn, Catalog::Parts, "Sole").unwrap();
        let err = purge(&conn, Catalog::Parts, id).unwrap_err();
        assert!(matches!(err, FichaError::NotFound(_)), "got {err:?}");

        move_to_trash(&conn, Catalog::Parts, id, None).unwrap();
        purge(&conn, Catalog::Parts, id).unwrap();
        let count: i64 =
            conn.query_row("SELECT count(*) FROM parts", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let (_dir, conn) = test_db();
        create(&conn, Catalog::Parts, "Tongue").unwrap();
        let part = find_by_name(&conn, Catalog::Parts, "tongue").unwrap();
        assert_eq!(part.name, "Tongue");
        let err = find_by_name(&conn, Catalog::Parts, "Heel").unwrap_err();
        assert!(matches!(err, FichaError::NotFound(_)), "got {err:?}");
    }
}
