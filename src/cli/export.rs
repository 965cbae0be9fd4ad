use std::path::PathBuf;

use crate::cli::report::build_filters;
use crate::db::get_connection;
use crate::error::{FichaError, Result};
use crate::fmt::filename_fragment;
use crate::reports::{self, DateRange, RollupFilters};
use crate::settings::{db_path, get_data_dir};

fn write_pdf(bytes: &[u8], path: &PathBuf) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    let display = format!("{}", path.display());
    println!("Wrote {display}");
    Ok(display)
}

/// Download name for a period export, encoding the query:
/// producao_<start>_<end>[_op<id>][_<sheet name fragment>].pdf
fn period_filename(range: &DateRange, filters: &RollupFilters) -> String {
    let mut name = format!(
        "producao_{}_{}",
        range.start.format("%Y%m%d"),
        range.end.format("%Y%m%d")
    );
    if let Some(op) = filters.operator_id {
        name.push_str(&format!("_op{op}"));
    }
    if let Some(sheet_name) = &filters.sheet_name {
        name.push('_');
        name.push_str(&filename_fragment(sheet_name));
    }
    name.push_str(".pdf");
    name
}

pub fn sheet(id: i64, output: Option<String>) -> Result<String> {
    let conn = get_connection(&db_path())?;
    let report = reports::get_sheet_report(&conn, id)?;
    let bytes = crate::pdf::render_sheet_report(&report)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| get_data_dir().join("exports").join(format!("ficha_{id}.pdf")));
    write_pdf(&bytes, &path)
}

pub fn period(
    from_date: Option<&str>,
    to_date: Option<&str>,
    part: Option<&str>,
    operator: Option<&str>,
    sheet_name: Option<&str>,
    output: Option<String>,
) -> Result<String> {
    let range = DateRange::parse(from_date, to_date)?.ok_or_else(|| {
        FichaError::InvalidInput(
            "select a period: --from YYYY-MM-DD --to YYYY-MM-DD".to_string(),
        )
    })?;

    let conn = get_connection(&db_path())?;
    let (filters, filter_lines) = build_filters(&conn, part, operator, sheet_name)?;
    let rollup = reports::get_period_rollup(&conn, Some(&range), &filters)?;
    let bytes = crate::pdf::render_period_report(&rollup, &range, &filter_lines)?;

    let path = output.map(PathBuf::from).unwrap_or_else(|| {
        get_data_dir()
            .join("exports")
            .join(period_filename(&range, &filters))
    });
    write_pdf(&bytes, &path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> DateRange {
        DateRange::parse(Some("2026-03-01"), Some("2026-03-05"))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_period_filename_plain() {
        let name = period_filename(&range(), &RollupFilters::default());
        assert_eq!(name, "producao_20260301_20260305.pdf");
    }

    #[test]
    fn test_period_filename_encodes_filters() {
        let filters = RollupFilters {
            operator_id: Some(7),
            sheet_name: Some("Batch 1 Monday extra".to_string()),
            ..Default::default()
        };
        let name = period_filename(&range(), &filters);
        assert_eq!(name, "producao_20260301_20260305_op7_Batch_1_Monday_e.pdf");
    }
}
