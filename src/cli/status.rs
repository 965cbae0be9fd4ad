use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::ledger::sum_quantities;
use crate::settings::{db_path, get_data_dir, load_settings};

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [], |r| r.get(0))?)
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let path = db_path();
    if !path.exists() {
        println!("No database at {}. Run `ficha init` first.", path.display());
        return Ok(());
    }
    let conn = get_connection(&path)?;

    let users = count(&conn, "SELECT count(*) FROM users")?;
    let parts = count(&conn, "SELECT count(*) FROM parts WHERE trashed = 0")?;
    let roster = count(&conn, "SELECT count(*) FROM operator_names WHERE trashed = 0")?;
    let sheets = count(&conn, "SELECT count(*) FROM sheets WHERE trashed = 0")?;
    let trashed = count(
        &conn,
        "SELECT (SELECT count(*) FROM parts WHERE trashed = 1) \
              + (SELECT count(*) FROM operator_names WHERE trashed = 1) \
              + (SELECT count(*) FROM sheets WHERE trashed = 1)",
    )?;

    let mut stmt = conn.prepare(
        "SELECT e.quantities FROM entries e \
         JOIN sheets s ON e.sheet_id = s.id WHERE s.trashed = 0",
    )?;
    let raws: Vec<String> = stmt
        .query_map([], |r| r.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut pairs = 0;
    for raw in &raws {
        pairs += sum_quantities(raw)?;
    }

    println!("Data directory: {}", get_data_dir().display());
    if !settings.default_operator.is_empty() {
        println!("Default operator: {}", settings.default_operator);
    }
    println!();
    println!("  Accounts:        {users}");
    println!("  Parts:           {parts}");
    println!("  Operator names:  {roster}");
    println!("  Sheets:          {sheets}");
    println!("  Pairs logged:    {pairs}");
    println!("  In trash:        {trashed}");
    Ok(())
}
