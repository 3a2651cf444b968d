use anyhow::Result;
use uuid::Uuid;

use nexafs::catalog;

use super::Session;

/// Show an experiment
pub fn show(session: &Session, id: Uuid, json: bool) -> Result<()> {
    let store = session.open_store()?;
    let detail = catalog::experiment(&store, id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        println!("{detail}");
    }
    Ok(())
}

/// Delete an experiment created by the acting user
pub fn delete(session: &Session, id: Uuid) -> Result<()> {
    let mut store = session.open_store()?;
    catalog::delete_experiment(&mut store, &session.caller, id)?;
    println!("Deleted experiment {id}");
    Ok(())
}
