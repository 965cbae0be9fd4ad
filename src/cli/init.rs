use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, operator: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(operator) = operator {
        settings.default_operator = operator;
    }

    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("exports"))?;

    let conn = get_connection(&dir.join("ficha.db"))?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized ficha in {}", dir.display());
    println!();
    println!("Try these next:");
    println!("  ficha users add ana --full-name 'Ana Souza'");
    println!("  ficha parts add Sole");
    println!("  ficha sheets create --name Batch-1 --operator ana");
    println!("  ficha demo        (or load a ready-made sample factory)");
    Ok(())
}
