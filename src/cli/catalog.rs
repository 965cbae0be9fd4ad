use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{resolve_actor, CatalogCommands};
use crate::db::get_connection;
use crate::error::Result;
use crate::models::Trash;
use crate::roster::{self, Catalog};
use crate::settings::db_path;

/// Both catalogs (parts, operator-name roster) share the same verbs.
pub fn run(catalog: Catalog, command: CatalogCommands) -> Result<()> {
    match command {
        CatalogCommands::Add { name } => add(catalog, &name),
        CatalogCommands::List { trashed } => {
            if trashed {
                list_trashed(catalog)
            } else {
                list(catalog)
            }
        }
        CatalogCommands::Toggle { id } => toggle(catalog, id),
        CatalogCommands::Trash { id, by } => trash(catalog, id, by.as_deref()),
        CatalogCommands::Restore { id } => restore(catalog, id),
        CatalogCommands::Purge { id } => purge(catalog, id),
    }
}

fn add(catalog: Catalog, name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    roster::create(&conn, catalog, name)?;
    println!("Added {}: {}", catalog.label(), name.trim());
    Ok(())
}

fn list(catalog: Catalog) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let entries = roster::list(&conn, catalog)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Order", "Active"]);
    for e in &entries {
        let active = if e.is_active { "yes" } else { "no" };
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(&e.name),
            Cell::new(e.sort_order),
            Cell::new(active),
        ]);
    }
    println!("{}s\n{table}", heading(catalog));
    Ok(())
}

fn list_trashed(catalog: Catalog) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let entries = roster::list_trashed(&conn, catalog)?;
    if entries.is_empty() {
        println!("Trash is empty.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Trashed at"]);
    for e in &entries {
        let at = match &e.trash {
            Trash::Trashed { at, .. } => at.clone(),
            Trash::Active => String::new(),
        };
        table.add_row(vec![Cell::new(e.id), Cell::new(&e.name), Cell::new(at)]);
    }
    println!("{} trash\n{table}", heading(catalog));
    Ok(())
}

fn toggle(catalog: Catalog, id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let (name, active) = roster::toggle_active(&conn, catalog, id)?;
    let state = if active { "activated" } else { "deactivated" };
    println!("{} \"{name}\" {state}", heading(catalog));
    Ok(())
}

fn trash(catalog: Catalog, id: i64, by: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let actor = resolve_actor(&conn, by)?;
    let name = roster::move_to_trash(&conn, catalog, id, actor)?;
    println!("{} \"{name}\" moved to the trash", heading(catalog));
    Ok(())
}

fn restore(catalog: Catalog, id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let name = roster::restore(&conn, catalog, id)?;
    println!("{} \"{name}\" restored", heading(catalog));
    Ok(())
}

fn purge(catalog: Catalog, id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let name = roster::purge(&conn, catalog, id)?;
    println!("{}", format!("{} \"{name}\" permanently deleted", heading(catalog)).red());
    Ok(())
}

fn heading(catalog: Catalog) -> &'static str {
    match catalog {
        Catalog::Parts => "Part",
        Catalog::OperatorNames => "Operator name",
    }
}
