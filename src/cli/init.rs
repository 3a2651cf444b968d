use anyhow::Result;

use nexafs::store::{Repository, Table};

use super::{heading, Session};

/// Create the database file and apply the schema
pub fn run(session: &Session) -> Result<()> {
    let store = session.open_store()?;
    println!(
        "Initialized {} (schema version {})",
        session.db.display(),
        store.schema_version()?
    );
    Ok(())
}

/// Print row counts for every table
pub fn info(session: &Session) -> Result<()> {
    if !session.db.exists() {
        anyhow::bail!("Database does not exist: {}", session.db.display());
    }
    let store = session.open_store()?;
    let repo = store.repository();

    println!("{}", heading("NEXAFS Database Information"));
    println!("{}", heading("==========================="));
    println!("File: {}", session.db.display());
    println!("Schema version: {}", store.schema_version()?);
    println!();

    println!("Tables:");
    for table in Table::ALL {
        println!("  {:<22} {}", table.name(), repo.count(table)?);
    }
    Ok(())
}
