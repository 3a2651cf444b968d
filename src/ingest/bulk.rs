//! Loading a directory tree of angle-resolved spectra.
//!
//! Layout: `<root>/<molecule>/<edge>/<name>NNdeg<rest>.txt`, where the edge
//! directory's first letter is the absorbing atom (K edge) and `NN` is the
//! polar angle. `<root>/Energy Calibration` is not a molecule.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use uuid::Uuid;

use crate::caller::Caller;
use crate::catalog;
use crate::error::{ErrorKind, NexafsError};
use crate::model::ExperimentType;
use crate::store::Store;

use super::{
    read_spectrum_file, ExperimentDescriptor, ExperimentIngestor, Geometry, GeometrySpec,
    IngestRequest, SampleDescriptor, VendorRef,
};

const CALIBRATION_DIR: &str = "Energy Calibration";

/// One spectrum file found under a bulk root
#[derive(Debug, Clone, PartialEq)]
pub struct BulkEntry {
    /// Canonical molecule name (the molecule directory)
    pub molecule: String,
    /// Absorbing atom symbol
    pub target_atom: String,
    /// Core level
    pub core_state: String,
    /// Polar angle from the file name
    pub theta: f64,
    /// The spectrum file
    pub path: PathBuf,
}

/// Fixed inputs applied to every bulk entry
#[derive(Debug, Clone)]
pub struct BulkLoadOptions {
    /// Instrument used for every spectrum
    pub instrument_id: Uuid,
    /// Vendor of every sample
    pub vendor: VendorRef,
    /// Detection mode
    pub experiment_type: ExperimentType,
    /// Energy calibration applied
    pub calibration_id: Option<Uuid>,
    /// Measurement date for every spectrum
    pub measured_at: Option<String>,
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkLoadSummary {
    /// Entries attempted
    pub files_seen: usize,
    /// Entries ingested
    pub files_loaded: usize,
    /// Experiments created
    pub experiments_created: usize,
    /// Spectrum points written
    pub points_written: usize,
    /// Entries skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

impl fmt::Display for BulkLoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bulk load: {}/{} files, {} experiments, {} points, {} skipped",
            self.files_loaded,
            self.files_seen,
            self.experiments_created,
            self.points_written,
            self.skipped.len()
        )
    }
}

/// Polar angle encoded as the two characters before `deg` in a file stem
pub fn angle_from_stem(stem: &str) -> Option<f64> {
    let (head, _) = stem.split_once("deg")?;
    let start = head.char_indices().rev().take(2).last().map(|(i, _)| i)?;
    head[start..].trim_start_matches(|c: char| !c.is_ascii_digit()).parse().ok()
}

/// List spectrum files under a bulk root, sorted by path
pub fn discover_bulk_files(root: &Path) -> std::io::Result<Vec<BulkEntry>> {
    let mut entries = Vec::new();
    for molecule_dir in sorted_dirs(root)? {
        let Some(molecule) = file_name(&molecule_dir) else {
            continue;
        };
        if molecule == CALIBRATION_DIR {
            continue;
        }

        for edge_dir in sorted_dirs(&molecule_dir)? {
            let Some(atom) = file_name(&edge_dir)
                .and_then(|name| name.chars().next())
                .map(|c| c.to_uppercase().to_string())
            else {
                continue;
            };

            let mut files: Vec<PathBuf> = fs::read_dir(&edge_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "txt"))
                .collect();
            files.sort();

            for path in files {
                let angle = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(angle_from_stem);
                match angle {
                    Some(theta) => entries.push(BulkEntry {
                        molecule: molecule.clone(),
                        target_atom: atom.clone(),
                        core_state: "K".to_string(),
                        theta,
                        path,
                    }),
                    None => warn!("no angle in file name {}", path.display()),
                }
            }
        }
    }
    Ok(entries)
}

/// Ingest discovered entries as fixed-geometry experiments (phi = 0).
///
/// Entries whose molecule is not registered, whose file does not parse, or
/// whose ingest is rejected are skipped and reported. Store failures abort.
pub fn load_bulk(
    store: &mut Store,
    ingestor: &ExperimentIngestor,
    caller: &Caller,
    entries: &[BulkEntry],
    options: &BulkLoadOptions,
) -> Result<BulkLoadSummary, NexafsError> {
    caller.require_user()?;

    let mut summary = BulkLoadSummary::default();
    // one sample per molecule per load
    let mut samples: Vec<(String, String)> = Vec::new();

    for entry in entries {
        summary.files_seen += 1;
        match load_entry(store, ingestor, caller, entry, options, &samples) {
            Ok((identifier, experiments, points)) => {
                if !samples.iter().any(|(m, _)| m == &entry.molecule) {
                    samples.push((entry.molecule.clone(), identifier));
                }
                summary.files_loaded += 1;
                summary.experiments_created += experiments;
                summary.points_written += points;
            }
            Err(error) if error.kind() == ErrorKind::Internal => return Err(error),
            Err(error) => {
                warn!("skipping {}: {error}", entry.path.display());
                summary.skipped.push((entry.path.clone(), error.to_string()));
            }
        }
    }

    info!("{summary}");
    Ok(summary)
}

fn load_entry(
    store: &mut Store,
    ingestor: &ExperimentIngestor,
    caller: &Caller,
    entry: &BulkEntry,
    options: &BulkLoadOptions,
    samples: &[(String, String)],
) -> Result<(String, usize, usize), NexafsError> {
    let molecule = catalog::molecule_by_name(store, &entry.molecule)?;
    let edge = catalog::ensure_edge(store, caller, &entry.target_atom, &entry.core_state)?;
    let rows = read_spectrum_file(&entry.path)
        .map_err(|e| NexafsError::validation(format!("{}: {e}", entry.path.display())))?;

    let identifier = samples
        .iter()
        .find(|(m, _)| m == &entry.molecule)
        .map(|(_, id)| id.clone());
    let request = IngestRequest {
        sample: SampleDescriptor {
            molecule_id: molecule.molecule.id,
            identifier,
            preparation: Default::default(),
            vendor: options.vendor.clone(),
        },
        experiment: ExperimentDescriptor {
            instrument_id: options.instrument_id,
            edge_id: edge.id,
            experiment_type: options.experiment_type,
            calibration_id: options.calibration_id,
            measured_at: options.measured_at.clone(),
        },
        geometry: GeometrySpec::Fixed(Geometry::new(entry.theta, 0.0)),
        rows,
        peaks: Vec::new(),
    };

    let outcome = ingestor.ingest(store, caller, request)?;
    Ok((
        outcome.sample.identifier.clone(),
        outcome.experiments.len(),
        outcome.total_points(),
    ))
}

fn sorted_dirs(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}
