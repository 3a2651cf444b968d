//! # Data Model
//!
//! Entity types shared by the store, the search ranker, and the ingestor.
//!
//! ## Ownership
//!
//! An [`Experiment`] exclusively owns its [`SpectrumPoint`] and [`Peak`] rows;
//! deleting the experiment deletes them. [`Sample`], [`Vendor`], [`Instrument`],
//! [`Edge`], [`CalibrationMethod`], and [`Polarization`] are shared reference
//! entities that are looked up or created on demand and never owned by a single
//! experiment.

mod experiment;
mod molecule;
mod reference;
mod sample;

#[cfg(test)]
mod tests;

pub use experiment::{Experiment, ExperimentType, Peak, Polarization, SpectrumPoint};
pub use molecule::{display_name, Molecule, Synonym};
pub use reference::{CalibrationMethod, Edge, Instrument};
pub use sample::{Preparation, Sample, Vendor};
