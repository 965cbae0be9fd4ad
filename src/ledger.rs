use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{FichaError, Result};

/// The quantity sequence of one (sheet, part) pairing, oldest batch first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub quantities: Vec<i64>,
}

impl Ledger {
    pub fn total(&self) -> i64 {
        self.quantities.iter().sum()
    }
}

pub fn decode_quantities(raw: &str) -> Result<Vec<i64>> {
    serde_json::from_str(raw)
        .map_err(|e| FichaError::Other(format!("corrupt quantity sequence: {e}")))
}

fn encode_quantities(quantities: &[i64]) -> Result<String> {
    serde_json::to_string(quantities)
        .map_err(|e| FichaError::Other(format!("encoding quantity sequence: {e}")))
}

/// Sum of a stored sequence; 0 when empty.
pub fn sum_quantities(raw: &str) -> Result<i64> {
    Ok(decode_quantities(raw)?.iter().sum())
}

fn require_sheet(conn: &Connection, sheet_id: i64) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM sheets WHERE id = ?1 AND trashed = 0",
            [sheet_id],
            |r| r.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(FichaError::NotFound(format!("sheet {sheet_id}"))),
    }
}

fn require_part(conn: &Connection, part_id: i64) -> Result<String> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM parts WHERE id = ?1 AND trashed = 0",
            [part_id],
            |r| r.get(0),
        )
        .optional()?;
    found.ok_or_else(|| FichaError::NotFound(format!("part {part_id}")))
}

/// Attach a part to a sheet with an empty ledger. The pairing is unique per
/// sheet; a second attach fails and leaves the existing ledger untouched.
pub fn attach_part(conn: &Connection, sheet_id: i64, part_id: i64) -> Result<String> {
    require_sheet(conn, sheet_id)?;
    let name = require_part(conn, part_id)?;
    let active: bool = conn.query_row(
        "SELECT is_active FROM parts WHERE id = ?1",
        [part_id],
        |r| r.get(0),
    )?;
    if !active {
        return Err(FichaError::NotFound(format!("part {part_id} is deactivated")));
    }
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM entries WHERE sheet_id = ?1 AND part_id = ?2)",
        params![sheet_id, part_id],
        |r| r.get(0),
    )?;
    if exists {
        return Err(FichaError::DuplicateEntry(format!(
            "part \"{name}\" is already on sheet {sheet_id}"
        )));
    }
    conn.execute(
        "INSERT INTO entries (sheet_id, part_id, quantities) VALUES (?1, ?2, '[]')",
        params![sheet_id, part_id],
    )?;
    Ok(name)
}

/// Remove a part (and its whole quantity sequence) from a sheet.
pub fn detach_part(conn: &Connection, sheet_id: i64, part_id: i64) -> Result<String> {
    require_sheet(conn, sheet_id)?;
    let name: Option<String> = conn
        .query_row(
            "SELECT p.name FROM entries e JOIN parts p ON e.part_id = p.id \
             WHERE e.sheet_id = ?1 AND e.part_id = ?2",
            params![sheet_id, part_id],
            |r| r.get(0),
        )
        .optional()?;
    let name = name.ok_or_else(|| {
        FichaError::NotFound(format!("part {part_id} is not on sheet {sheet_id}"))
    })?;
    conn.execute(
        "DELETE FROM entries WHERE sheet_id = ?1 AND part_id = ?2",
        params![sheet_id, part_id],
    )?;
    Ok(name)
}

/// Append one batch count to the ledger, creating the entry on first use.
/// Runs as an IMMEDIATE transaction so two concurrent appends both land.
pub fn append_quantity(
    conn: &mut Connection,
    sheet_id: i64,
    part_id: i64,
    quantity: i64,
) -> Result<Ledger> {
    if quantity <= 0 {
        return Err(FichaError::InvalidInput(
            "quantity must be greater than zero".to_string(),
        ));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    require_sheet(&tx, sheet_id)?;
    require_part(&tx, part_id)?;

    let raw: Option<String> = tx
        .query_row(
            "SELECT quantities FROM entries WHERE sheet_id = ?1 AND part_id = ?2",
            params![sheet_id, part_id],
            |r| r.get(0),
        )
        .optional()?;
    let mut quantities = match raw {
        Some(raw) => decode_quantities(&raw)?,
        None => {
            tx.execute(
                "INSERT INTO entries (sheet_id, part_id, quantities) VALUES (?1, ?2, '[]')",
                params![sheet_id, part_id],
            )?;
            Vec::new()
        }
    };
    quantities.push(quantity);
    tx.execute(
        "UPDATE entries SET quantities = ?1 WHERE sheet_id = ?2 AND part_id = ?3",
        params![encode_quantities(&quantities)?, sheet_id, part_id],
    )?;
    tx.execute(
        "UPDATE sheets SET updated_at = datetime('now') WHERE id = ?1",
        [sheet_id],
    )?;
    tx.commit()?;

    Ok(Ledger { quantities })
}

/// Drop the most recent batch count. Last-in-first-out only: an empty ledger
/// is left as-is, but a missing ledger is an error.
pub fn remove_last_quantity(
    conn: &mut Connection,
    sheet_id: i64,
    part_id: i64,
) -> Result<Ledger> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    require_sheet(&tx, sheet_id)?;

    let raw: Option<String> = tx
        .query_row(
            "SELECT quantities FROM entries WHERE sheet_id = ?1 AND part_id = ?2",
            params![sheet_id, part_id],
            |r| r.get(0),
        )
        .optional()?;
    let raw = raw.ok_or_else(|| {
        FichaError::NotFound(format!("part {part_id} is not on sheet {sheet_id}"))
    })?;

    let mut quantities = decode_quantities(&raw)?;
    if quantities.pop().is_some() {
        tx.execute(
            "UPDATE entries SET quantities = ?1 WHERE sheet_id = ?2 AND part_id = ?3",
            params![encode_quantities(&quantities)?, sheet_id, part_id],
        )?;
        tx.execute(
            "UPDATE sheets SET updated_at = datetime('now') WHERE id = ?1",
            [sheet_id],
        )?;
    }
    tx.commit()?;

    Ok(Ledger { quantities })
}
