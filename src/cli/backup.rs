use std::path::PathBuf;
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{db_path, get_data_dir};

pub fn run(output: Option<String>) -> Result<()> {
    let src = get_connection(&db_path())?;

    let dest = output.map(PathBuf::from).unwrap_or_else(|| {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        get_data_dir()
            .join("backups")
            .join(format!("ficha-{stamp}.db"))
    });
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut dst = Connection::open(&dest)?;
    let backup = Backup::new(&src, &mut dst)?;
    backup.run_to_completion(100, Duration::from_millis(250), None)?;

    println!("Backed up database to {}", dest.display());
    Ok(())
}
