use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::{FichaError, Result};
use crate::ledger::{decode_quantities, sum_quantities};
use crate::models::display_name;
use crate::sheets::{self, parse_work_date};

// ---------------------------------------------------------------------------
// Period bounds
// ---------------------------------------------------------------------------

/// Inclusive reporting window. Aggregation never runs without one: an
/// unbounded scan over the whole sheet history is exactly the query this
/// type exists to make unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Both bounds or nothing: a missing bound yields `None`, which callers
    /// must turn into the neutral empty rollup.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>> {
        let (Some(from), Some(to)) = (from, to) else {
            return Ok(None);
        };
        let start = parse_work_date(from)?;
        let end = parse_work_date(to)?;
        if start > end {
            return Err(FichaError::InvalidInput(format!(
                "period start {from} is after end {to}"
            )));
        }
        Ok(Some(DateRange { start, end }))
    }

    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

// ---------------------------------------------------------------------------
// Period rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RollupFilters {
    pub part_id: Option<i64>,
    pub operator_id: Option<i64>,
    pub sheet_name: Option<String>,
}

/// One operator's slice of the rollup: per-sheet-name part totals, and the
/// operator's cross-sheet totals per part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorRollup {
    pub sheets: BTreeMap<String, BTreeMap<String, i64>>,
    pub part_totals: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodRollup {
    pub operators: BTreeMap<String, OperatorRollup>,
    pub grand_total: i64,
}

fn bump(map: &mut BTreeMap<String, i64>, key: &str, by: i64) {
    *map.entry(key.to_string()).or_insert(0) += by;
}

/// Roll ledger totals up by operator, sheet name, and part over a period.
///
/// Keys are created only when a matching ledger accumulates into them, so
/// the output is sparse: an operator whose sheets all fall outside the
/// filters never appears, and a sheet with no entries contributes nothing.
/// BTreeMap keys give reports the same lexical order on every run.
pub fn get_period_rollup(
    conn: &Connection,
    range: Option<&DateRange>,
    filters: &RollupFilters,
) -> Result<PeriodRollup> {
    let Some(range) = range else {
        return Ok(PeriodRollup::default());
    };

    let mut params_vec: Vec<String> = vec![
        range.start.format("%Y-%m-%d").to_string(),
        range.end.format("%Y-%m-%d").to_string(),
    ];
    let mut clauses = vec!["s.trashed = 0".to_string(), "s.work_date BETWEEN ?1 AND ?2".to_string()];
    if let Some(name) = &filters.sheet_name {
        params_vec.push(name.clone());
        clauses.push(format!("s.name = ?{}", params_vec.len()));
    }
    if let Some(op) = filters.operator_id {
        params_vec.push(op.to_string());
        clauses.push(format!("s.operator_id = ?{}", params_vec.len()));
    }
    let sql = format!(
        "SELECT s.id, s.name, u.full_name, u.username \
         FROM sheets s JOIN users u ON s.operator_id = u.id \
         WHERE {}",
        clauses.join(" AND ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let param_values: Vec<&dyn rusqlite::types::ToSql> = params_vec
        .iter()
        .map(|p| p as &dyn rusqlite::types::ToSql)
        .collect();
    let candidates: Vec<(i64, String, String, String)> = stmt
        .query_map(param_values.as_slice(), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let entry_sql = match filters.part_id {
        Some(_) => {
            "SELECT p.name, e.quantities FROM entries e JOIN parts p ON e.part_id = p.id \
             WHERE e.sheet_id = ?1 AND e.part_id = ?2"
        }
        None => {
            "SELECT p.name, e.quantities FROM entries e JOIN parts p ON e.part_id = p.id \
             WHERE e.sheet_id = ?1"
        }
    };
    let mut entry_stmt = conn.prepare(entry_sql)?;

    let mut rollup = PeriodRollup::default();
    for (sheet_id, sheet_name, full_name, username) in candidates {
        let label = display_name(&full_name, &username).to_string();
        let entries: Vec<(String, String)> = match filters.part_id {
            Some(part_id) => entry_stmt
                .query_map(rusqlite::params![sheet_id, part_id], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => entry_stmt
                .query_map([sheet_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        for (part_name, raw) in entries {
            let value = sum_quantities(&raw)?;
            let operator = rollup.operators.entry(label.clone()).or_default();
            bump(
                operator.sheets.entry(sheet_name.clone()).or_default(),
                &part_name,
                value,
            );
            bump(&mut operator.part_totals, &part_name, value);
            rollup.grand_total += value;
        }
    }

    Ok(rollup)
}

// ---------------------------------------------------------------------------
// Sheet aggregation
// ---------------------------------------------------------------------------

/// Sum of every ledger total on a sheet; 0 when it has none. Always
/// re-queries storage, so concurrent attach/detach is picked up on the
/// next call.
pub fn get_sheet_total(conn: &Connection, sheet_id: i64) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT quantities FROM entries WHERE sheet_id = ?1")?;
    let raws: Vec<String> = stmt
        .query_map([sheet_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut total = 0;
    for raw in raws {
        total += sum_quantities(&raw)?;
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// Single-sheet report
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SheetReportRow {
    pub part_name: String,
    pub quantities: Vec<i64>,
    pub total: i64,
}

#[derive(Debug)]
pub struct SheetReport {
    pub sheet_id: i64,
    pub sheet_name: String,
    pub work_date: String,
    pub operator: String,
    pub rows: Vec<SheetReportRow>,
    pub grand_total: i64,
}

/// Per-part quantity sequences and totals for one sheet, in the part
/// catalog's display order.
pub fn get_sheet_report(conn: &Connection, sheet_id: i64) -> Result<SheetReport> {
    let sheet = sheets::get_sheet(conn, sheet_id)?;
    let (full_name, username): (String, String) = conn.query_row(
        "SELECT full_name, username FROM users WHERE id = ?1",
        [sheet.operator_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let mut stmt = conn.prepare(
        "SELECT p.name, e.quantities FROM entries e JOIN parts p ON e.part_id = p.id \
         WHERE e.sheet_id = ?1 ORDER BY p.sort_order, p.name",
    )?;
    let raw_rows: Vec<(String, String)> = stmt
        .query_map([sheet_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut grand_total = 0;
    for (part_name, raw) in raw_rows {
        let quantities = decode_quantities(&raw)?;
        let total: i64 = quantities.iter().sum();
        grand_total += total;
        rows.push(SheetReportRow { part_name, quantities, total });
    }

    Ok(SheetReport {
        sheet_id: sheet.id,
        sheet_name: sheet.name,
        work_date: sheet.work_date,
        operator: display_name(&full_name, &username).to_string(),
        rows,
        grand_total,
    })
}

// ---------------------------------------------------------------------------
// Production wall (single-day dashboard)
// ---------------------------------------------------------------------------

pub struct DashboardCard {
    pub operator: String,
    pub parts: BTreeMap<String, i64>,
    pub total: i64,
}

pub struct Dashboard {
    pub date: NaiveDate,
    pub cards: BTreeMap<String, DashboardCard>,
    pub day_total: i64,
}

/// One day's production grouped by sheet name, for the factory wall screen.
/// Unlike the period rollup, a sheet with no entries still gets a card: the
/// wall is a listing of the day's sheets, and an empty one reads as zero.
pub fn get_dashboard(conn: &Connection, date: NaiveDate) -> Result<Dashboard> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, u.full_name, u.username \
         FROM sheets s JOIN users u ON s.operator_id = u.id \
         WHERE s.trashed = 0 AND s.work_date = ?1 ORDER BY s.id",
    )?;
    let day_sheets: Vec<(i64, String, String, String)> = stmt
        .query_map([date.format("%Y-%m-%d").to_string()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut entry_stmt = conn.prepare(
        "SELECT p.name, e.quantities FROM entries e JOIN parts p ON e.part_id = p.id \
         WHERE e.sheet_id = ?1",
    )?;

    let mut cards: BTreeMap<String, DashboardCard> = BTreeMap::new();
    for (sheet_id, sheet_name, full_name, username) in day_sheets {
        let label = display_name(&full_name, &username).to_string();
        let card = cards.entry(sheet_name).or_insert_with(|| DashboardCard {
            operator: label,
            parts: BTreeMap::new(),
            total: 0,
        });
        let entries: Vec<(String, String)> = entry_stmt
            .query_map([sheet_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for (part_name, raw) in entries {
            let value = sum_quantities(&raw)?;
            bump(&mut card.parts, &part_name, value);
            card.total += value;
        }
    }

    let day_total = cards.values().map(|c| c.total).sum();
    Ok(Dashboard { date, cards, day_total })
}
