use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{FichaError, Result};
use crate::models::display_name;
use crate::settings::db_path;

pub fn add(username: &str, full_name: Option<&str>, role: &str) -> Result<()> {
    if !matches!(role, "operator" | "quality") {
        return Err(FichaError::InvalidInput(format!(
            "role must be operator or quality, got \"{role}\""
        )));
    }
    let conn = get_connection(&db_path())?;
    conn.execute(
        "INSERT INTO users (username, full_name, role) VALUES (?1, ?2, ?3)",
        rusqlite::params![username, full_name.unwrap_or(""), role],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            FichaError::DuplicateEntry(format!("user \"{username}\""))
        }
        other => other.into(),
    })?;
    println!("Added {role} account: {username}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt =
        conn.prepare("SELECT id, username, full_name, role FROM users ORDER BY username")?;
    let rows: Vec<(i64, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Username", "Shown on reports as", "Role"]);
    for (id, username, full_name, role) in &rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(username),
            Cell::new(display_name(full_name, username)),
            Cell::new(role),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
