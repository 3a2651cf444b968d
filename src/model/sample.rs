use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical preparation of one molecule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Opaque identifier
    pub id: Uuid,

    /// Human-readable identifier, unique across samples
    pub identifier: String,

    /// The molecule this sample is made of
    pub molecule_id: Uuid,

    /// Supplier of the material
    pub vendor_id: Option<Uuid>,

    /// Preparation metadata
    pub preparation: Preparation,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Optional sample preparation metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preparation {
    /// Substrate the film was deposited on
    pub substrate: Option<String>,

    /// Solvent used during preparation
    pub solvent: Option<String>,

    /// Film thickness in nanometers
    pub thickness_nm: Option<f64>,

    /// Processing method (e.g., "spin coating")
    pub processing_method: Option<String>,
}

/// A material supplier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    /// Opaque identifier
    pub id: Uuid,

    /// Vendor name, unique across vendors
    pub name: String,

    /// Vendor website
    pub url: Option<String>,
}
