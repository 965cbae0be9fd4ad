use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::seq;
use crate::ledger::{append_quantity, remove_last_quantity};
use crate::roster::{self, Catalog};
use crate::settings::db_path;

pub fn log(sheet_id: i64, part: &str, quantity: i64) -> Result<()> {
    let mut conn = get_connection(&db_path())?;
    let part = roster::find_by_name(&conn, Catalog::Parts, part)?;
    let ledger = append_quantity(&mut conn, sheet_id, part.id, quantity)?;
    println!(
        "{}: [{}]  total {}",
        part.name,
        seq(&ledger.quantities),
        ledger.total()
    );
    Ok(())
}

pub fn undo(sheet_id: i64, part: &str) -> Result<()> {
    let mut conn = get_connection(&db_path())?;
    let part = roster::find_by_name(&conn, Catalog::Parts, part)?;
    let ledger = remove_last_quantity(&mut conn, sheet_id, part.id)?;
    println!(
        "{}: [{}]  total {}",
        part.name,
        seq(&ledger.quantities),
        ledger.total()
    );
    Ok(())
}
