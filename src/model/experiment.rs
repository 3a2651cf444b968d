use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Measurement geometry, deduplicated by exact angle match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polarization {
    /// Opaque identifier
    pub id: Uuid,

    /// Polar angle (theta) in degrees
    pub polar_angle: f64,

    /// Azimuthal angle (phi) in degrees
    pub azimuthal_angle: f64,
}

/// Detection mode of a NEXAFS measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentType {
    /// Total electron yield
    #[default]
    TotalElectronYield,
    /// Partial electron yield
    PartialElectronYield,
    /// Fluorescence yield
    FluorescenceYield,
    /// Transmission
    Transmission,
}

impl ExperimentType {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentType::TotalElectronYield => "TOTAL_ELECTRON_YIELD",
            ExperimentType::PartialElectronYield => "PARTIAL_ELECTRON_YIELD",
            ExperimentType::FluorescenceYield => "FLUORESCENCE_YIELD",
            ExperimentType::Transmission => "TRANSMISSION",
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tey" | "total_electron_yield" => Ok(ExperimentType::TotalElectronYield),
            "pey" | "partial_electron_yield" => Ok(ExperimentType::PartialElectronYield),
            "fy" | "fluorescence_yield" => Ok(ExperimentType::FluorescenceYield),
            "trans" | "transmission" => Ok(ExperimentType::Transmission),
            other => Err(format!("unknown experiment type: {other}")),
        }
    }
}

/// One measurement run at a single geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Opaque identifier
    pub id: Uuid,

    /// Measured sample
    pub sample_id: Uuid,

    /// Instrument used
    pub instrument_id: Uuid,

    /// Probed edge
    pub edge_id: Uuid,

    /// Measurement geometry
    pub polarization_id: Uuid,

    /// Energy calibration applied, if any
    pub calibration_id: Option<Uuid>,

    /// Detection mode
    pub experiment_type: ExperimentType,

    /// When the measurement was taken
    pub measured_at: DateTime<Utc>,

    /// User id of the contributor
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A single (energy, absorption) sample of a spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    /// Photon energy in eV
    pub energy: f64,

    /// Raw absorption signal
    pub raw_abs: f64,
}

impl SpectrumPoint {
    /// Create a spectrum point
    pub fn new(energy: f64, raw_abs: f64) -> Self {
        Self { energy, raw_abs }
    }
}

/// An annotated resonance in a spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Peak position in eV
    pub energy: f64,

    /// Peak height, if fitted
    pub intensity: Option<f64>,

    /// Transition label (e.g., "C 1s -> pi*")
    pub label: Option<String>,
}
