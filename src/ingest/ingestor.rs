use chrono::Utc;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::NexafsError;
use crate::model::{Experiment, Polarization, Sample, Vendor};
use crate::store::{Repository, Store};

use super::{
    CreatedExperiment, Geometry, IngestConfig, IngestOutcome, IngestRequest, SampleIdGenerator,
    TimestampIdGenerator, ValidatedIngest, VendorRef,
};

/// Creates experiments and their spectra in one transaction
pub struct ExperimentIngestor {
    config: IngestConfig,
    ids: Box<dyn SampleIdGenerator>,
}

impl Default for ExperimentIngestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl std::fmt::Debug for ExperimentIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentIngestor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExperimentIngestor {
    /// Create an ingestor with timestamp-based sample identifiers
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            ids: Box::new(TimestampIdGenerator),
        }
    }

    /// Replace the sample identifier generator
    pub fn with_id_generator(mut self, ids: impl SampleIdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Validate and persist an upload.
    ///
    /// The caller must be authenticated. Either every row from this call
    /// commits or none does.
    pub fn ingest(
        &self,
        store: &mut Store,
        caller: &Caller,
        request: IngestRequest,
    ) -> Result<IngestOutcome, NexafsError> {
        caller.require_user()?;
        let validated = request.validate()?;
        self.ingest_validated(store, caller, validated)
    }

    /// Persist an already validated upload
    pub fn ingest_validated(
        &self,
        store: &mut Store,
        caller: &Caller,
        request: ValidatedIngest,
    ) -> Result<IngestOutcome, NexafsError> {
        let user_id = caller.require_user()?.to_string();
        let identifier = match &request.identifier {
            Some(identifier) => identifier.clone(),
            None => self.generate_identifier(&store.repository())?,
        };

        let outcome = store.run_in_transaction(|repo| {
            write_upload(repo, &request, &identifier, &user_id)
        })?;

        info!(
            "ingested {} experiment(s), {} point(s) for sample {}",
            outcome.experiments.len(),
            outcome.total_points(),
            outcome.sample.identifier
        );
        Ok(outcome)
    }

    /// Draw identifiers until one is free; persistent collision keeps the last
    fn generate_identifier<R: Repository + ?Sized>(&self, repo: &R) -> Result<String, NexafsError> {
        let attempts = self.config.identifier_attempts.max(1);
        let mut candidate = self.ids.next_identifier();
        for attempt in 1..=attempts {
            if repo.sample_by_identifier(&candidate)?.is_none() {
                return Ok(candidate);
            }
            debug!("sample identifier {candidate} taken (attempt {attempt}/{attempts})");
            if attempt < attempts {
                candidate = self.ids.next_identifier();
            }
        }

        warn!("no free sample identifier after {attempts} attempts, using {candidate}");
        Ok(candidate)
    }
}

fn write_upload<R: Repository + ?Sized>(
    repo: &R,
    request: &ValidatedIngest,
    identifier: &str,
    user_id: &str,
) -> Result<IngestOutcome, NexafsError> {
    check_references(repo, request)?;
    let resolved = resolve_vendor(repo, &request.vendor)?;
    let sample = resolve_sample(repo, request, identifier, resolved.id)?;
    let vendor = sample_vendor(repo, &sample, resolved)?;

    let mut experiments = Vec::with_capacity(request.groups.len());
    for group in &request.groups {
        let polarization = resolve_polarization(repo, group.geometry)?;
        let experiment = Experiment {
            id: Uuid::new_v4(),
            sample_id: sample.id,
            instrument_id: request.instrument_id,
            edge_id: request.edge_id,
            polarization_id: polarization.id,
            calibration_id: request.calibration_id,
            experiment_type: request.experiment_type,
            measured_at: request.measured_at,
            created_by: user_id.to_string(),
            created_at: Utc::now(),
        };
        repo.insert_experiment(&experiment)?;
        let points_written = repo.insert_spectrum_points(experiment.id, &group.points)?;
        debug!(
            "experiment {} at theta={} phi={}: {} points",
            experiment.id, group.geometry.theta, group.geometry.phi, points_written
        );

        experiments.push(CreatedExperiment {
            experiment,
            polarization,
            points_written,
            peaks_written: 0,
        });
    }

    if !request.peaks.is_empty() {
        for created in &mut experiments {
            created.peaks_written = repo.insert_peaks(created.experiment.id, &request.peaks)?;
        }
    }

    Ok(IngestOutcome {
        sample,
        vendor,
        experiments,
    })
}

fn check_references<R: Repository + ?Sized>(
    repo: &R,
    request: &ValidatedIngest,
) -> Result<(), NexafsError> {
    if repo.molecule(request.molecule_id)?.is_none() {
        return Err(NexafsError::not_found("molecule", request.molecule_id));
    }
    if repo.instrument(request.instrument_id)?.is_none() {
        return Err(NexafsError::not_found("instrument", request.instrument_id));
    }
    if repo.edge(request.edge_id)?.is_none() {
        return Err(NexafsError::not_found("edge", request.edge_id));
    }
    if let Some(calibration_id) = request.calibration_id {
        if repo.calibration_method(calibration_id)?.is_none() {
            return Err(NexafsError::not_found("calibration method", calibration_id));
        }
    }
    Ok(())
}

fn resolve_vendor<R: Repository + ?Sized>(
    repo: &R,
    vendor: &VendorRef,
) -> Result<Vendor, NexafsError> {
    match vendor {
        VendorRef::Existing(id) => repo
            .vendor(*id)?
            .ok_or_else(|| NexafsError::not_found("vendor", id)),
        VendorRef::New { name, url } => {
            if let Some(existing) = repo.vendor_by_name(name)? {
                debug!("reusing vendor {name}");
                return Ok(existing);
            }
            let created = Vendor {
                id: Uuid::new_v4(),
                name: name.clone(),
                url: url.clone(),
            };
            repo.insert_vendor(&created)?;
            Ok(created)
        }
    }
}

fn resolve_sample<R: Repository + ?Sized>(
    repo: &R,
    request: &ValidatedIngest,
    identifier: &str,
    vendor_id: Uuid,
) -> Result<Sample, NexafsError> {
    if let Some(existing) = repo.sample_by_identifier(identifier)? {
        if existing.molecule_id != request.molecule_id {
            return Err(NexafsError::conflict(format!(
                "sample {identifier} belongs to a different molecule"
            )));
        }
        debug!("reusing sample {identifier}");
        return Ok(existing);
    }

    let sample = Sample {
        id: Uuid::new_v4(),
        identifier: identifier.to_string(),
        molecule_id: request.molecule_id,
        vendor_id: Some(vendor_id),
        preparation: request.preparation.clone(),
        created_at: Utc::now(),
    };
    repo.insert_sample(&sample)?;
    Ok(sample)
}

/// The vendor a (possibly reused) sample references; `resolved` when it has none
fn sample_vendor<R: Repository + ?Sized>(
    repo: &R,
    sample: &Sample,
    resolved: Vendor,
) -> Result<Vendor, NexafsError> {
    match sample.vendor_id {
        Some(id) if id != resolved.id => {
            debug!("sample {} keeps vendor {id}", sample.identifier);
            repo.vendor(id)?
                .ok_or_else(|| NexafsError::not_found("vendor", id))
        }
        _ => Ok(resolved),
    }
}

fn resolve_polarization<R: Repository + ?Sized>(
    repo: &R,
    geometry: Geometry,
) -> Result<Polarization, NexafsError> {
    if let Some(existing) = repo.polarization_by_angles(geometry.theta, geometry.phi)? {
        return Ok(existing);
    }
    let polarization = Polarization {
        id: Uuid::new_v4(),
        polar_angle: geometry.theta,
        azimuthal_angle: geometry.phi,
    };
    repo.insert_polarization(&polarization)?;
    Ok(polarization)
}
