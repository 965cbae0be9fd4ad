use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{resolve_actor, resolve_username};
use crate::db::get_connection;
use crate::error::{FichaError, Result};
use crate::ledger;
use crate::models::Trash;
use crate::roster::{self, Catalog};
use crate::settings::db_path;
use crate::sheets;

pub fn create(name: Option<&str>, date: Option<&str>, operator: Option<&str>) -> Result<()> {
    let username = resolve_username(operator).ok_or_else(|| {
        FichaError::InvalidInput(
            "no operator given; pass --operator or set one with `ficha init --operator`"
                .to_string(),
        )
    })?;
    let conn = get_connection(&db_path())?;
    let Some(name) = name else {
        let suggestions = roster::list_selectable(&conn, Catalog::OperatorNames)?;
        if !suggestions.is_empty() {
            let names: Vec<&str> = suggestions.iter().map(|e| e.name.as_str()).collect();
            println!("Roster suggestions: {}", names.join(", "));
        }
        return Err(FichaError::InvalidInput("sheet name required (--name)".to_string()));
    };
    let user = sheets::find_user(&conn, &username)?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let date = date.unwrap_or(&today);
    let id = sheets::create_sheet(&conn, user.id, date, name)?;
    println!("Created sheet {id}: \"{}\" on {date} for {}", name.trim(), user.display_name());
    Ok(())
}

pub fn list(date: Option<&str>, operator: Option<&str>, trashed: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    if trashed {
        return list_trashed(&conn);
    }

    let operator_id = match operator {
        Some(username) => Some(sheets::find_user(&conn, username)?.id),
        None => None,
    };
    let listing = sheets::list_sheets(&conn, date, operator_id)?;
    if listing.is_empty() {
        println!("No sheets found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Name", "Operator", "Total"]);
    for item in &listing {
        let total = crate::reports::get_sheet_total(&conn, item.sheet.id)?;
        table.add_row(vec![
            Cell::new(item.sheet.id),
            Cell::new(&item.sheet.work_date),
            Cell::new(&item.sheet.name),
            Cell::new(&item.operator),
            Cell::new(total),
        ]);
    }
    println!("Sheets\n{table}");
    Ok(())
}

fn list_trashed(conn: &rusqlite::Connection) -> Result<()> {
    let trashed = sheets::list_trashed(conn)?;
    if trashed.is_empty() {
        println!("Trash is empty.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Name", "Trashed at"]);
    for sheet in &trashed {
        let at = match &sheet.trash {
            Trash::Trashed { at, .. } => at.clone(),
            Trash::Active => String::new(),
        };
        table.add_row(vec![
            Cell::new(sheet.id),
            Cell::new(&sheet.work_date),
            Cell::new(&sheet.name),
            Cell::new(at),
        ]);
    }
    println!("Sheet trash\n{table}");
    Ok(())
}

pub fn view(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let sheet = sheets::get_sheet(&conn, id)?;
    println!(
        "Sheet {id}: \"{}\"  date {}  created {}  updated {}",
        sheet.name, sheet.work_date, sheet.created_at, sheet.updated_at
    );
    crate::cli::report::print_sheet_report(&conn, id)
}

pub fn add_part(id: i64, part: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let part = roster::find_by_name(&conn, Catalog::Parts, part)?;
    let name = ledger::attach_part(&conn, id, part.id)?;
    println!("Added part \"{name}\" to sheet {id}");
    Ok(())
}

pub fn remove_part(id: i64, part: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let part = roster::find_by_name(&conn, Catalog::Parts, part)?;
    let name = ledger::detach_part(&conn, id, part.id)?;
    println!("Removed part \"{name}\" from sheet {id}");
    Ok(())
}

pub fn trash(id: i64, by: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let actor = resolve_actor(&conn, by)?;
    let name = sheets::move_to_trash(&conn, id, actor)?;
    println!("Sheet \"{name}\" moved to the trash");
    Ok(())
}

pub fn restore(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let name = sheets::restore(&conn, id)?;
    println!("Sheet \"{name}\" restored");
    Ok(())
}

pub fn purge(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let name = sheets::purge(&conn, id)?;
    println!("{}", format!("Sheet \"{name}\" permanently deleted").red());
    Ok(())
}
