pub mod backup;
pub mod catalog;
pub mod demo;
#[cfg(feature = "pdf")]
pub mod export;
pub mod init;
pub mod ledger;
pub mod report;
pub mod sheets;
pub mod status;
pub mod users;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::error::Result;
use crate::settings::load_settings;

/// Resolve the acting/owning account: an explicit username wins, else the
/// default operator from settings.
pub(crate) fn resolve_username(explicit: Option<&str>) -> Option<String> {
    if let Some(name) = explicit {
        return Some(name.to_string());
    }
    let default = load_settings().default_operator;
    if default.is_empty() {
        None
    } else {
        Some(default)
    }
}

/// Trash attribution: resolve --by (or the default operator) to an account
/// id; anonymous when neither is set.
pub(crate) fn resolve_actor(conn: &Connection, by: Option<&str>) -> Result<Option<i64>> {
    match resolve_username(by) {
        Some(username) => Ok(Some(crate::sheets::find_user(conn, &username)?.id)),
        None => Ok(None),
    }
}

#[derive(Parser)]
#[command(name = "ficha", about = "Production-tracking CLI for footwear factories.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up ficha: choose a data directory and initialize the database.
    Init {
        /// Path for ficha data (default: ~/Documents/ficha)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Username assumed when --operator / --by are omitted
        #[arg(long)]
        operator: Option<String>,
    },
    /// Manage operator and quality accounts.
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Manage the footwear part catalog.
    Parts {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Manage the operator-name roster shown when creating sheets.
    Roster {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Manage production sheets.
    Sheets {
        #[command(subcommand)]
        command: SheetsCommands,
    },
    /// Append a batch count to a part's ledger on a sheet.
    Log {
        /// Sheet id
        sheet_id: i64,
        /// Part name (case-insensitive)
        part: String,
        /// Pairs in this batch (positive integer)
        quantity: i64,
    },
    /// Remove the most recent batch count from a part's ledger.
    Undo {
        /// Sheet id
        sheet_id: i64,
        /// Part name (case-insensitive)
        part: String,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export reports to PDF.
    #[cfg(feature = "pdf")]
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Load a sample factory (accounts, parts, sheets) to explore ficha.
    Demo,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/ficha-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum UsersCommands {
    /// Add an account.
    Add {
        /// Login identifier, e.g. 'ana'
        username: String,
        /// Display name for reports; falls back to the username when empty
        #[arg(long = "full-name")]
        full_name: Option<String>,
        /// Account role: operator or quality
        #[arg(long, default_value = "operator")]
        role: String,
    },
    /// List all accounts.
    List,
}

/// Shared verbs for the part catalog and the operator-name roster.
#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Add an entry at the end of the display order.
    Add {
        name: String,
    },
    /// List entries in display order.
    List {
        /// Show the trash instead
        #[arg(long)]
        trashed: bool,
    },
    /// Toggle the active flag (hidden from selection lists when inactive).
    Toggle {
        id: i64,
    },
    /// Move an entry to the trash.
    Trash {
        id: i64,
        /// Username recorded as the deleting account
        #[arg(long)]
        by: Option<String>,
    },
    /// Restore an entry from the trash.
    Restore {
        id: i64,
    },
    /// Permanently delete an entry; only allowed from the trash.
    Purge {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum SheetsCommands {
    /// Create a sheet for an operator.
    Create {
        /// Sheet name (batch/order); omit to see roster suggestions
        #[arg(long)]
        name: Option<String>,
        /// Work date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Operator username (default: the configured operator)
        #[arg(long)]
        operator: Option<String>,
    },
    /// List sheets, newest first.
    List {
        /// Filter by work date: YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Filter by operator username
        #[arg(long)]
        operator: Option<String>,
        /// Show the trash instead
        #[arg(long)]
        trashed: bool,
    },
    /// Show a sheet with its ledgers and totals.
    View {
        id: i64,
    },
    /// Attach a part to a sheet with an empty ledger.
    AddPart {
        id: i64,
        /// Part name (case-insensitive)
        part: String,
    },
    /// Remove a part and its whole quantity sequence from a sheet.
    RemovePart {
        id: i64,
        /// Part name (case-insensitive)
        part: String,
    },
    /// Move a sheet to the trash.
    Trash {
        id: i64,
        /// Username recorded as the deleting account
        #[arg(long)]
        by: Option<String>,
    },
    /// Restore a sheet from the trash.
    Restore {
        id: i64,
    },
    /// Permanently delete a sheet and its ledgers; only allowed from the trash.
    Purge {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// One sheet's quantity sequences and totals.
    Sheet {
        id: i64,
    },
    /// Period rollup by operator, sheet name, and part.
    Period {
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Filter by part name
        #[arg(long)]
        part: Option<String>,
        /// Filter by operator username
        #[arg(long)]
        operator: Option<String>,
        /// Filter by sheet name
        #[arg(long = "sheet-name")]
        sheet_name: Option<String>,
    },
    /// Single-day production wall grouped by sheet name.
    Dashboard {
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[cfg(feature = "pdf")]
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export one sheet's report to PDF.
    Sheet {
        id: i64,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
    /// Export the period report to PDF.
    Period {
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Filter by part name
        #[arg(long)]
        part: Option<String>,
        /// Filter by operator username
        #[arg(long)]
        operator: Option<String>,
        /// Filter by sheet name
        #[arg(long = "sheet-name")]
        sheet_name: Option<String>,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
}
