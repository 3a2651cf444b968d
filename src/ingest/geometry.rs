use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::NexafsError;
use crate::model::SpectrumPoint;

use super::{GeometrySpec, SpectrumRow};

/// Beam orientation relative to the sample, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Polar angle
    pub theta: f64,
    /// Azimuthal angle
    pub phi: f64,
}

impl Geometry {
    /// Create a geometry
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Hashable key; `-0.0` and `0.0` map to the same key
    fn key(&self) -> (u64, u64) {
        ((self.theta + 0.0).to_bits(), (self.phi + 0.0).to_bits())
    }
}

/// Spectrum points sharing one geometry
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryGroup {
    /// The shared geometry
    pub geometry: Geometry,
    /// Points in upload order
    pub points: Vec<SpectrumPoint>,
}

/// Split rows into geometry groups, in first-seen order
pub fn group_rows(
    spec: &GeometrySpec,
    rows: &[SpectrumRow],
) -> Result<Vec<GeometryGroup>, NexafsError> {
    if rows.is_empty() {
        return Err(NexafsError::validation("at least one spectrum row is required"));
    }

    let groups = match spec {
        GeometrySpec::Fixed(geometry) => {
            check_angles(geometry, "fixed geometry")?;
            vec![GeometryGroup {
                geometry: *geometry,
                points: rows
                    .iter()
                    .map(|r| SpectrumPoint::new(r.energy, r.absorption))
                    .collect(),
            }]
        }
        GeometrySpec::PerRow => {
            let mut groups: Vec<GeometryGroup> = Vec::new();
            let mut index: HashMap<(u64, u64), usize> = HashMap::new();
            for (i, row) in rows.iter().enumerate() {
                let (Some(theta), Some(phi)) = (row.theta, row.phi) else {
                    return Err(NexafsError::validation(format!(
                        "row {} is missing theta or phi",
                        i + 1
                    )));
                };
                let geometry = Geometry::new(theta, phi);
                check_angles(&geometry, &format!("row {}", i + 1))?;

                let slot = *index.entry(geometry.key()).or_insert_with(|| {
                    groups.push(GeometryGroup {
                        geometry,
                        points: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[slot]
                    .points
                    .push(SpectrumPoint::new(row.energy, row.absorption));
            }
            groups
        }
    };

    if groups.is_empty() {
        return Err(NexafsError::validation("no geometry groups in upload"));
    }
    Ok(groups)
}

fn check_angles(geometry: &Geometry, context: &str) -> Result<(), NexafsError> {
    if geometry.theta.is_finite() && geometry.phi.is_finite() {
        Ok(())
    } else {
        Err(NexafsError::validation(format!(
            "{context}: theta and phi must be finite"
        )))
    }
}
