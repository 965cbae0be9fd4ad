mod cli;
mod db;
mod error;
mod fmt;
mod ledger;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod roster;
mod settings;
mod sheets;

use clap::Parser;

#[cfg(feature = "pdf")]
use cli::ExportCommands;
use cli::{Cli, Commands, ReportCommands, SheetsCommands, UsersCommands};
use roster::Catalog;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, operator } => cli::init::run(data_dir, operator),
        Commands::Users { command } => match command {
            UsersCommands::Add {
                username,
                full_name,
                role,
            } => cli::users::add(&username, full_name.as_deref(), &role),
            UsersCommands::List => cli::users::list(),
        },
        Commands::Parts { command } => cli::catalog::run(Catalog::Parts, command),
        Commands::Roster { command } => cli::catalog::run(Catalog::OperatorNames, command),
        Commands::Sheets { command } => match command {
            SheetsCommands::Create {
                name,
                date,
                operator,
            } => cli::sheets::create(name.as_deref(), date.as_deref(), operator.as_deref()),
            SheetsCommands::List {
                date,
                operator,
                trashed,
            } => cli::sheets::list(date.as_deref(), operator.as_deref(), trashed),
            SheetsCommands::View { id } => cli::sheets::view(id),
            SheetsCommands::AddPart { id, part } => cli::sheets::add_part(id, &part),
            SheetsCommands::RemovePart { id, part } => cli::sheets::remove_part(id, &part),
            SheetsCommands::Trash { id, by } => cli::sheets::trash(id, by.as_deref()),
            SheetsCommands::Restore { id } => cli::sheets::restore(id),
            SheetsCommands::Purge { id } => cli::sheets::purge(id),
        },
        Commands::Log {
            sheet_id,
            part,
            quantity,
        } => cli::ledger::log(sheet_id, &part, quantity),
        Commands::Undo { sheet_id, part } => cli::ledger::undo(sheet_id, &part),
        Commands::Report { command } => match command {
            ReportCommands::Sheet { id } => cli::report::sheet(id),
            ReportCommands::Period {
                from_date,
                to_date,
                part,
                operator,
                sheet_name,
            } => cli::report::period(
                from_date.as_deref(),
                to_date.as_deref(),
                part.as_deref(),
                operator.as_deref(),
                sheet_name.as_deref(),
            ),
            ReportCommands::Dashboard { date } => cli::report::dashboard(date.as_deref()),
        },
        #[cfg(feature = "pdf")]
        Commands::Export { command } => match command {
            ExportCommands::Sheet { id, output } => cli::export::sheet(id, output).map(|_| ()),
            ExportCommands::Period {
                from_date,
                to_date,
                part,
                operator,
                sheet_name,
                output,
            } => cli::export::period(
                from_date.as_deref(),
                to_date.as_deref(),
                part.as_deref(),
                operator.as_deref(),
                sheet_name.as_deref(),
                output,
            )
            .map(|_| ()),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
