use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::seq;
use crate::reports::{self, DateRange, RollupFilters};
use crate::roster::{self, Catalog};
use crate::settings::db_path;
use crate::sheets;

pub fn sheet(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    print_sheet_report(&conn, id)
}

pub(crate) fn print_sheet_report(conn: &Connection, id: i64) -> Result<()> {
    let report = reports::get_sheet_report(conn, id)?;

    let mut table = Table::new();
    table.set_header(vec!["Part", "Quantities", "Total"]);
    for row in &report.rows {
        table.add_row(vec![
            Cell::new(&row.part_name),
            Cell::new(seq(&row.quantities)),
            Cell::new(row.total),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL".bold()),
        Cell::new(""),
        Cell::new(report.grand_total),
    ]);

    println!(
        "Production Sheet — {} ({})\nOperator: {}\n{table}",
        report.sheet_name, report.work_date, report.operator
    );
    Ok(())
}

/// Resolve name-based filters to ids, and describe the applied filters the
/// way the printed report does.
pub(crate) fn build_filters(
    conn: &Connection,
    part: Option<&str>,
    operator: Option<&str>,
    sheet_name: Option<&str>,
) -> Result<(RollupFilters, Vec<String>)> {
    let mut filters = RollupFilters::default();
    let mut lines = Vec::new();
    if let Some(username) = operator {
        let user = sheets::find_user(conn, username)?;
        lines.push(format!("Filter: Operator {}", user.display_name()));
        filters.operator_id = Some(user.id);
    }
    if let Some(name) = part {
        let part = roster::find_by_name(conn, Catalog::Parts, name)?;
        lines.push(format!("Filter: Part {}", part.name));
        filters.part_id = Some(part.id);
    }
    if let Some(name) = sheet_name {
        lines.push(format!("Filter: Sheet {name}"));
        filters.sheet_name = Some(name.to_string());
    }
    Ok((filters, lines))
}

pub fn period(
    from_date: Option<&str>,
    to_date: Option<&str>,
    part: Option<&str>,
    operator: Option<&str>,
    sheet_name: Option<&str>,
) -> Result<()> {
    let Some(range) = DateRange::parse(from_date, to_date)? else {
        // Aggregating the whole history is never what anyone wants.
        println!("Select a period: --from YYYY-MM-DD --to YYYY-MM-DD");
        return Ok(());
    };

    let conn = get_connection(&db_path())?;
    let (filters, filter_lines) = build_filters(&conn, part, operator, sheet_name)?;
    let rollup = reports::get_period_rollup(&conn, Some(&range), &filters)?;

    println!("Period Production Report — {}", range.label());
    for line in &filter_lines {
        println!("{line}");
    }
    if rollup.operators.is_empty() {
        println!("No production in this period.");
        return Ok(());
    }

    for (operator, data) in &rollup.operators {
        println!("\n{}", operator.bold());
        for (sheet_name, parts) in &data.sheets {
            let mut table = Table::new();
            table.set_header(vec!["Part", "Pairs"]);
            for (part_name, quantity) in parts {
                table.add_row(vec![Cell::new(part_name), Cell::new(quantity)]);
            }
            println!("  Sheet: {sheet_name}\n{table}");
        }

        let mut totals = Table::new();
        totals.set_header(vec!["Part", "Total"]);
        for (part_name, total) in &data.part_totals {
            totals.add_row(vec![Cell::new(part_name), Cell::new(total)]);
        }
        println!("  Operator totals\n{totals}");
    }

    println!(
        "\n{} {} pairs produced in the period",
        "GRAND TOTAL:".green().bold(),
        rollup.grand_total
    );
    Ok(())
}

pub fn dashboard(date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(raw) => sheets::parse_work_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };
    let conn = get_connection(&db_path())?;
    let dash = reports::get_dashboard(&conn, date)?;

    println!("Production wall — {}", date.format("%d/%m/%Y"));
    if dash.cards.is_empty() {
        println!("No sheets for this date.");
        return Ok(());
    }

    for (name, card) in &dash.cards {
        let mut table = Table::new();
        table.set_header(vec!["Part", "Pairs"]);
        for (part_name, quantity) in &card.parts {
            table.add_row(vec![Cell::new(part_name), Cell::new(quantity)]);
        }
        table.add_row(vec![Cell::new("Total".bold()), Cell::new(card.total)]);
        println!("\n{} — {}\n{table}", name.bold(), card.operator);
    }

    println!("\nDay total: {}", dash.day_total.to_string().green().bold());
    Ok(())
}
