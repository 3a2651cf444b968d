use log::info;
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::NexafsError;
use crate::store::{Repository, Store};

use super::ExperimentDetail;

/// Load an experiment with its references, spectrum, and peaks
pub fn experiment(store: &Store, id: Uuid) -> Result<ExperimentDetail, NexafsError> {
    let repo = store.repository();
    let experiment = repo
        .experiment(id)?
        .ok_or_else(|| NexafsError::not_found("experiment", id))?;

    let sample = repo
        .sample(experiment.sample_id)?
        .ok_or_else(|| NexafsError::not_found("sample", experiment.sample_id))?;
    let instrument = repo
        .instrument(experiment.instrument_id)?
        .ok_or_else(|| NexafsError::not_found("instrument", experiment.instrument_id))?;
    let edge = repo
        .edge(experiment.edge_id)?
        .ok_or_else(|| NexafsError::not_found("edge", experiment.edge_id))?;
    let polarization = repo
        .polarization(experiment.polarization_id)?
        .ok_or_else(|| NexafsError::not_found("polarization", experiment.polarization_id))?;
    let points = repo.spectrum_points(id)?;
    let peaks = repo.peaks(id)?;

    Ok(ExperimentDetail {
        experiment,
        sample,
        instrument,
        edge,
        polarization,
        points,
        peaks,
    })
}

/// Delete an experiment and its spectrum and peaks.
///
/// Only the user who created the experiment may delete it.
pub fn delete_experiment(store: &mut Store, caller: &Caller, id: Uuid) -> Result<(), NexafsError> {
    let user_id = caller.require_user()?;

    store.run_in_transaction(|repo| {
        let experiment = repo
            .experiment(id)?
            .ok_or_else(|| NexafsError::not_found("experiment", id))?;
        if experiment.created_by != user_id {
            return Err(NexafsError::Forbidden(format!(
                "experiment {id} belongs to another user"
            )));
        }
        repo.delete_experiment(id)?;
        Ok(())
    })?;

    info!("deleted experiment {id}");
    Ok(())
}
