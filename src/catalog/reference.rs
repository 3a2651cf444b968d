use log::info;
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::NexafsError;
use crate::model::{CalibrationMethod, Edge, Instrument};
use crate::store::{Repository, Store};

/// Find an instrument by name, creating it if missing
pub fn ensure_instrument(
    store: &mut Store,
    caller: &Caller,
    name: &str,
    facility: Option<&str>,
) -> Result<Instrument, NexafsError> {
    caller.require_user()?;
    let name = required(name, "instrument name")?;

    store.run_in_transaction(|repo| {
        if let Some(existing) = repo.instrument_by_name(name)? {
            return Ok(existing);
        }
        let instrument = Instrument {
            id: Uuid::new_v4(),
            name: name.to_string(),
            facility: facility
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        };
        repo.insert_instrument(&instrument)?;
        info!("created instrument {}", instrument.name);
        Ok(instrument)
    })
}

/// Find an edge by (atom, core level), creating it if missing
pub fn ensure_edge(
    store: &mut Store,
    caller: &Caller,
    target_atom: &str,
    core_state: &str,
) -> Result<Edge, NexafsError> {
    caller.require_user()?;
    let target_atom = required(target_atom, "target atom")?;
    let core_state = required(core_state, "core state")?;

    store.run_in_transaction(|repo| {
        if let Some(existing) = repo.edge_by_key(target_atom, core_state)? {
            return Ok(existing);
        }
        let edge = Edge {
            id: Uuid::new_v4(),
            target_atom: target_atom.to_string(),
            core_state: core_state.to_string(),
        };
        repo.insert_edge(&edge)?;
        info!("created edge {edge}");
        Ok(edge)
    })
}

/// Create a calibration method; a taken name is a `Conflict`
pub fn create_calibration_method(
    store: &mut Store,
    caller: &Caller,
    name: &str,
    description: Option<&str>,
) -> Result<CalibrationMethod, NexafsError> {
    caller.require_user()?;
    let name = required(name, "calibration method name")?;

    store.run_in_transaction(|repo| {
        if repo.calibration_method_by_name(name)?.is_some() {
            return Err(NexafsError::conflict(format!(
                "calibration method {name} already exists"
            )));
        }
        let method = CalibrationMethod {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };
        repo.insert_calibration_method(&method)?;
        info!("created calibration method {}", method.name);
        Ok(method)
    })
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, NexafsError> {
    let value = value.trim();
    if value.is_empty() {
        Err(NexafsError::validation(format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}
