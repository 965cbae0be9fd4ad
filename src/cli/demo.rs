use chrono::{Days, Local, NaiveDate};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::ledger::append_quantity;
use crate::roster::{self, Catalog};
use crate::settings::db_path;
use crate::sheets::{create_sheet, find_user};

// (username, full name, role); rui has no full name on purpose so the
// username fallback shows up on reports.
const USERS: &[(&str, &str, &str)] = &[
    ("ana", "Ana Souza", "operator"),
    ("rui", "", "operator"),
    ("marta", "Marta Lima", "quality"),
];

const PARTS: &[&str] = &["Tongue", "Sole", "Heel", "Insole", "Eyelet Stay"];

const ROSTER: &[&str] = &["Ana", "Rui", "Carla"];

struct DemoSheet {
    days_ago: u64,
    operator: &'static str,
    name: &'static str,
    loads: &'static [(&'static str, &'static [i64])],
}

const SHEETS: &[DemoSheet] = &[
    DemoSheet {
        days_ago: 2,
        operator: "ana",
        name: "Batch-A",
        loads: &[("Tongue", &[12, 8, 15]), ("Sole", &[20, 5])],
    },
    DemoSheet {
        days_ago: 2,
        operator: "rui",
        name: "Batch-B",
        loads: &[("Sole", &[18]), ("Heel", &[9, 9])],
    },
    DemoSheet {
        days_ago: 1,
        operator: "ana",
        name: "Batch-A",
        loads: &[("Tongue", &[10, 10]), ("Insole", &[25])],
    },
    DemoSheet {
        days_ago: 1,
        operator: "rui",
        name: "Batch-B",
        loads: &[("Sole", &[22, 4]), ("Heel", &[7])],
    },
    DemoSheet {
        days_ago: 0,
        operator: "ana",
        name: "Batch-C",
        loads: &[("Tongue", &[14]), ("Sole", &[11, 6])],
    },
    DemoSheet {
        days_ago: 0,
        operator: "rui",
        name: "Batch-C",
        loads: &[("Insole", &[30])],
    },
];

fn demo_date(today: NaiveDate, days_ago: u64) -> String {
    today
        .checked_sub_days(Days::new(days_ago))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

fn insert_demo_data(conn: &mut Connection) -> Result<(usize, i64)> {
    for (username, full_name, role) in USERS {
        conn.execute(
            "INSERT INTO users (username, full_name, role) VALUES (?1, ?2, ?3)",
            rusqlite::params![username, full_name, role],
        )?;
    }
    for part in PARTS {
        roster::create(conn, Catalog::Parts, part)?;
    }
    for name in ROSTER {
        roster::create(conn, Catalog::OperatorNames, name)?;
    }

    let today = Local::now().date_naive();
    let mut pairs = 0;
    for demo in SHEETS {
        let operator = find_user(conn, demo.operator)?;
        let date = demo_date(today, demo.days_ago);
        let sheet = create_sheet(conn, operator.id, &date, demo.name)?;
        for (part_name, quantities) in demo.loads {
            let part = roster::find_by_name(conn, Catalog::Parts, part_name)?;
            for quantity in *quantities {
                append_quantity(conn, sheet, part.id, *quantity)?;
                pairs += quantity;
            }
        }
    }

    Ok((SHEETS.len(), pairs))
}

pub fn run() -> Result<()> {
    let path = db_path();
    if !path.exists() {
        eprintln!("No database found. Run `ficha init` first.");
        std::process::exit(1);
    }

    let mut conn = get_connection(&path)?;
    init_db(&conn)?;

    // Idempotency guard
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = 'ana')",
        [],
        |r| r.get(0),
    )?;
    if exists {
        println!("Demo data already loaded (account 'ana' exists).");
        return Ok(());
    }

    let (sheet_count, pairs) = insert_demo_data(&mut conn)?;

    let today = Local::now().date_naive();
    let from = demo_date(today, 2);
    let to = demo_date(today, 0);

    println!("Demo factory loaded!");
    println!("  Accounts:  {}", USERS.len());
    println!("  Parts:     {}", PARTS.len());
    println!("  Sheets:    {sheet_count}");
    println!("  Pairs:     {pairs}");
    println!();
    println!("Try these next:");
    println!("  ficha sheets list");
    println!("  ficha report dashboard");
    println!("  ficha report period --from {from} --to {to}");
    println!("  ficha export period --from {from} --to {to}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{get_period_rollup, get_sheet_total, DateRange, RollupFilters};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_demo_creates_data() {
        let (_dir, mut conn) = test_db();
        let (sheet_count, pairs) = insert_demo_data(&mut conn).unwrap();
        assert_eq!(sheet_count, SHEETS.len());
        assert_eq!(pairs, 235);

        let db_sheets: i64 =
            conn.query_row("SELECT count(*) FROM sheets", [], |r| r.get(0)).unwrap();
        assert_eq!(db_sheets, SHEETS.len() as i64);
        let entries: i64 =
            conn.query_row("SELECT count(*) FROM entries", [], |r| r.get(0)).unwrap();
        assert!(entries > 0);
    }

    #[test]
    fn test_demo_rollup_grand_total_matches_seed() {
        let (_dir, mut conn) = test_db();
        insert_demo_data(&mut conn).unwrap();

        let today = Local::now().date_naive();
        let range = DateRange::parse(
            Some(&demo_date(today, 2)),
            Some(&demo_date(today, 0)),
        )
        .unwrap()
        .unwrap();
        let rollup =
            get_period_rollup(&conn, Some(&range), &RollupFilters::default()).unwrap();
        assert_eq!(rollup.grand_total, 235);
        // rui has no full name, so his username is the label
        assert!(rollup.operators.contains_key("Ana Souza"));
        assert!(rollup.operators.contains_key("rui"));
    }

    #[test]
    fn test_demo_sheet_totals_sum_to_seed_total() {
        let (_dir, mut conn) = test_db();
        insert_demo_data(&mut conn).unwrap();
        let mut stmt = conn.prepare("SELECT id FROM sheets").unwrap();
        let ids: Vec<i64> = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        let total: i64 = ids.iter().map(|id| get_sheet_total(&conn, *id).unwrap()).sum();
        assert_eq!(total, 235);
    }

    #[test]
    fn test_demo_dates_are_valid() {
        let today = Local::now().date_naive();
        for demo in SHEETS {
            let date = demo_date(today, demo.days_ago);
            assert!(NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok(), "bad date {date}");
        }
    }
}
