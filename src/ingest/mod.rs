//! # Ingest Module
//!
//! Transactional creation of experiments from uploaded spectra.
//!
//! ## Flow
//!
//! 1. [`IngestRequest::validate`] checks the raw input and splits the rows
//!    into geometry groups (one for [`GeometrySpec::Fixed`], one per distinct
//!    `(theta, phi)` for [`GeometrySpec::PerRow`]).
//! 2. A sample identifier is drawn from the [`SampleIdGenerator`] when none
//!    was supplied, retrying on collision.
//! 3. One transaction resolves the vendor and sample, then per group
//!    resolves the polarization, creates the experiment, and writes its
//!    spectrum points and the shared peaks.
//!
//! Any failure in step 3 rolls back every row written by the call.
//!
//! ## Files
//!
//! [`read_spectrum_file`] reads `.csv`/`.tsv` files with a header row and
//! `.txt`/`.dat` column files; [`discover_bulk_files`] and [`load_bulk`]
//! load a whole directory tree of angle-resolved spectra.

mod bulk;
mod config;
mod geometry;
mod ids;
mod ingestor;
mod spectrum_file;
mod types;

#[cfg(test)]
mod tests;

pub use bulk::{
    angle_from_stem, discover_bulk_files, load_bulk, BulkEntry, BulkLoadOptions, BulkLoadSummary,
};
pub use config::IngestConfig;
pub use geometry::{group_rows, Geometry, GeometryGroup};
pub use ids::{SampleIdGenerator, TimestampIdGenerator};
pub use ingestor::ExperimentIngestor;
pub use spectrum_file::{
    parse_columns, parse_delimited, read_spectrum_file, SpectrumFileError, SpectrumFormat,
};
pub use types::{
    parse_measurement_date, CreatedExperiment, ExperimentDescriptor, GeometrySpec,
    IngestOutcome, IngestRequest, SampleDescriptor, SpectrumRow, ValidatedIngest, VendorRef,
};
