use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A beamline or spectrometer, deduplicated by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Opaque identifier
    pub id: Uuid,

    /// Instrument name (e.g., "NSLS-II SST-1")
    pub name: String,

    /// Hosting facility
    pub facility: Option<String>,
}

/// An absorbing atom and core level, deduplicated by the pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Opaque identifier
    pub id: Uuid,

    /// Absorbing atom symbol (e.g., "C")
    pub target_atom: String,

    /// Core level (e.g., "K", "L3")
    pub core_state: String,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.target_atom, self.core_state)
    }
}

/// An energy calibration procedure, unique by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationMethod {
    /// Opaque identifier
    pub id: Uuid,

    /// Method name
    pub name: String,

    /// Free-form description
    pub description: Option<String>,
}
