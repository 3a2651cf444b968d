use anyhow::Result;

use nexafs::catalog;

use super::Session;

/// Register an instrument
pub fn add_instrument(session: &Session, name: &str, facility: Option<&str>) -> Result<()> {
    let mut store = session.open_store()?;
    let instrument = catalog::ensure_instrument(&mut store, &session.caller, name, facility)?;
    println!("Instrument {} ({})", instrument.name, instrument.id);
    Ok(())
}

/// Register an edge
pub fn add_edge(session: &Session, atom: &str, core: &str) -> Result<()> {
    let mut store = session.open_store()?;
    let edge = catalog::ensure_edge(&mut store, &session.caller, atom, core)?;
    println!("Edge {} ({})", edge, edge.id);
    Ok(())
}

/// Register a calibration method
pub fn add_calibration(session: &Session, name: &str, description: Option<&str>) -> Result<()> {
    let mut store = session.open_store()?;
    let method =
        catalog::create_calibration_method(&mut store, &session.caller, name, description)?;
    println!("Calibration method {} ({})", method.name, method.id);
    Ok(())
}
