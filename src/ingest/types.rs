use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NexafsError;
use crate::model::{Experiment, ExperimentType, Peak, Polarization, Preparation, Sample, Vendor};

use super::geometry::{group_rows, Geometry, GeometryGroup};

/// Which vendor supplied the sample material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorRef {
    /// A vendor that already exists
    Existing(Uuid),
    /// A vendor looked up by exact name, created if missing
    New {
        /// Vendor name
        name: String,
        /// Vendor website
        url: Option<String>,
    },
}

impl VendorRef {
    /// Build a reference from loosely supplied fields; the id wins over the name
    pub fn from_parts(
        id: Option<Uuid>,
        name: Option<&str>,
        url: Option<&str>,
    ) -> Result<Self, NexafsError> {
        if let Some(id) = id {
            return Ok(VendorRef::Existing(id));
        }
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Ok(VendorRef::New {
                name: name.to_string(),
                url: url.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string),
            }),
            None => Err(NexafsError::validation(
                "a vendor id or a vendor name is required",
            )),
        }
    }
}

/// Identity and preparation of the measured sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDescriptor {
    /// Molecule the sample is made of
    pub molecule_id: Uuid,

    /// Human identifier; generated when absent
    #[serde(default)]
    pub identifier: Option<String>,

    /// Preparation metadata
    #[serde(default)]
    pub preparation: Preparation,

    /// Vendor of the material
    pub vendor: VendorRef,
}

/// Instrument, edge, and detection details of the measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDescriptor {
    /// Instrument used
    pub instrument_id: Uuid,

    /// Probed edge
    pub edge_id: Uuid,

    /// Detection mode
    #[serde(default)]
    pub experiment_type: ExperimentType,

    /// Energy calibration applied
    #[serde(default)]
    pub calibration_id: Option<Uuid>,

    /// RFC 3339 timestamp or `YYYY-MM-DD`; defaults to now
    #[serde(default)]
    pub measured_at: Option<String>,
}

/// How measurement geometry is assigned to spectrum rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySpec {
    /// Every row was measured at this geometry
    Fixed(Geometry),
    /// Every row carries its own theta and phi
    #[serde(rename = "csv")]
    PerRow,
}

/// One uploaded spectrum row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRow {
    /// Photon energy in eV
    pub energy: f64,

    /// Absorption signal
    pub absorption: f64,

    /// Polar angle, required in per-row mode
    #[serde(default)]
    pub theta: Option<f64>,

    /// Azimuthal angle, required in per-row mode
    #[serde(default)]
    pub phi: Option<f64>,
}

impl SpectrumRow {
    /// A row without geometry
    pub fn new(energy: f64, absorption: f64) -> Self {
        Self {
            energy,
            absorption,
            theta: None,
            phi: None,
        }
    }

    /// A row with its own geometry
    pub fn with_geometry(energy: f64, absorption: f64, theta: f64, phi: f64) -> Self {
        Self {
            energy,
            absorption,
            theta: Some(theta),
            phi: Some(phi),
        }
    }
}

/// Raw input to [`super::ExperimentIngestor::ingest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    /// The sample
    pub sample: SampleDescriptor,

    /// The measurement
    pub experiment: ExperimentDescriptor,

    /// Geometry assignment
    pub geometry: GeometrySpec,

    /// Spectrum rows; at least one
    pub rows: Vec<SpectrumRow>,

    /// Peak annotations attached to every created experiment
    #[serde(default)]
    pub peaks: Vec<Peak>,
}

impl IngestRequest {
    /// Check the request and form its geometry groups.
    ///
    /// Nothing here touches the store.
    pub fn validate(self) -> Result<ValidatedIngest, NexafsError> {
        for (i, row) in self.rows.iter().enumerate() {
            if !row.energy.is_finite() || !row.absorption.is_finite() {
                return Err(NexafsError::validation(format!(
                    "row {}: energy and absorption must be finite",
                    i + 1
                )));
            }
        }
        for peak in &self.peaks {
            if !peak.energy.is_finite() || peak.intensity.is_some_and(|v| !v.is_finite()) {
                return Err(NexafsError::validation(format!(
                    "peak at {}: values must be finite",
                    peak.energy
                )));
            }
        }
        if let VendorRef::New { name, .. } = &self.sample.vendor {
            if name.trim().is_empty() {
                return Err(NexafsError::validation("vendor name must not be empty"));
            }
        }
        if let Some(thickness) = self.sample.preparation.thickness_nm {
            if !thickness.is_finite() || thickness < 0.0 {
                return Err(NexafsError::validation(
                    "thickness must be a non-negative number",
                ));
            }
        }

        let groups = group_rows(&self.geometry, &self.rows)?;
        let measured_at = match self.experiment.measured_at.as_deref() {
            Some(text) => parse_measurement_date(text)?,
            None => Utc::now(),
        };
        let identifier = self
            .sample
            .identifier
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(ValidatedIngest {
            molecule_id: self.sample.molecule_id,
            identifier,
            preparation: self.sample.preparation,
            vendor: self.sample.vendor,
            instrument_id: self.experiment.instrument_id,
            edge_id: self.experiment.edge_id,
            experiment_type: self.experiment.experiment_type,
            calibration_id: self.experiment.calibration_id,
            measured_at,
            groups,
            peaks: self.peaks,
        })
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (UTC midnight)
pub fn parse_measurement_date(text: &str) -> Result<DateTime<Utc>, NexafsError> {
    let text = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| NexafsError::validation(format!("invalid measurement date: {text:?}")))
}

/// An ingest request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIngest {
    /// Molecule the sample is made of
    pub molecule_id: Uuid,
    /// Trimmed, non-empty identifier if one was supplied
    pub identifier: Option<String>,
    /// Preparation metadata
    pub preparation: Preparation,
    /// Vendor reference
    pub vendor: VendorRef,
    /// Instrument used
    pub instrument_id: Uuid,
    /// Probed edge
    pub edge_id: Uuid,
    /// Detection mode
    pub experiment_type: ExperimentType,
    /// Energy calibration applied
    pub calibration_id: Option<Uuid>,
    /// Resolved measurement time
    pub measured_at: DateTime<Utc>,
    /// One group per distinct geometry, in first-seen order
    pub groups: Vec<GeometryGroup>,
    /// Peak annotations
    pub peaks: Vec<Peak>,
}

/// One experiment created by an ingest call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedExperiment {
    /// The experiment row
    pub experiment: Experiment,
    /// Its resolved polarization
    pub polarization: Polarization,
    /// Spectrum points written
    pub points_written: usize,
    /// Peaks written
    pub peaks_written: usize,
}

/// Result of a committed ingest call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    /// The resolved or created sample
    pub sample: Sample,
    /// The vendor the sample references.
    ///
    /// A reused sample keeps its original vendor even when this call named
    /// a different one.
    pub vendor: Vendor,
    /// One entry per geometry group
    pub experiments: Vec<CreatedExperiment>,
}

impl IngestOutcome {
    /// Spectrum points written across all experiments
    pub fn total_points(&self) -> usize {
        self.experiments.iter().map(|e| e.points_written).sum()
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample: {} ({})", self.sample.identifier, self.sample.id)?;
        writeln!(f, "Vendor: {}", self.vendor.name)?;
        writeln!(f, "Experiments: {}", self.experiments.len())?;
        for created in &self.experiments {
            writeln!(
                f,
                "  {} theta={} phi={} points={} peaks={}",
                created.experiment.id,
                created.polarization.polar_angle,
                created.polarization.azimuthal_angle,
                created.points_written,
                created.peaks_written
            )?;
        }
        write!(f, "Total points: {}", self.total_points())
    }
}
