use uuid::Uuid;

use crate::model::{
    CalibrationMethod, Edge, Experiment, Instrument, Molecule, Peak, Polarization, Sample,
    SpectrumPoint, Synonym, Vendor,
};

use super::{StoreError, Table};

/// Candidate-generation parameters for molecule search
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    /// Trimmed query text
    pub text: String,

    /// Match the CAS registry number exactly
    pub match_registry: bool,

    /// Match the external compound id exactly
    pub match_external_id: bool,

    /// Sanitized full-text expression; `None` disables full-text search
    pub full_text: Option<String>,
}

/// A molecule matched by at least one candidate strategy
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeCandidate {
    /// The molecule
    pub molecule: Molecule,

    /// Its synonyms ordered by display order
    pub synonyms: Vec<Synonym>,

    /// Full-text statistic for the name + formula text (higher is better)
    pub name_text_rank: Option<f64>,

    /// Best full-text statistic among the synonyms (higher is better)
    pub synonym_text_rank: Option<f64>,
}

/// Persistence operations used by the search, ingest, and catalog services.
///
/// Implementations are bound either to a plain connection or to an open
/// transaction; callers cannot tell the difference.
pub trait Repository {
    /// Insert a molecule, its synonyms, and its full-text index rows
    fn insert_molecule(&self, molecule: &Molecule, synonyms: &[Synonym]) -> Result<(), StoreError>;

    /// Look up a molecule by id
    fn molecule(&self, id: Uuid) -> Result<Option<Molecule>, StoreError>;

    /// Look up a molecule by exact canonical name
    fn molecule_by_name(&self, iupac_name: &str) -> Result<Option<Molecule>, StoreError>;

    /// Synonyms of a molecule ordered by display order
    fn synonyms(&self, molecule_id: Uuid) -> Result<Vec<Synonym>, StoreError>;

    /// Every molecule matched by an exact, prefix, or full-text strategy
    fn molecule_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<MoleculeCandidate>, StoreError>;

    /// Look up a vendor by id
    fn vendor(&self, id: Uuid) -> Result<Option<Vendor>, StoreError>;

    /// Look up a vendor by exact name
    fn vendor_by_name(&self, name: &str) -> Result<Option<Vendor>, StoreError>;

    /// Insert a vendor
    fn insert_vendor(&self, vendor: &Vendor) -> Result<(), StoreError>;

    /// Look up a sample by id
    fn sample(&self, id: Uuid) -> Result<Option<Sample>, StoreError>;

    /// Look up a sample by its human identifier
    fn sample_by_identifier(&self, identifier: &str) -> Result<Option<Sample>, StoreError>;

    /// Insert a sample
    fn insert_sample(&self, sample: &Sample) -> Result<(), StoreError>;

    /// Look up an instrument by id
    fn instrument(&self, id: Uuid) -> Result<Option<Instrument>, StoreError>;

    /// Look up an instrument by exact name
    fn instrument_by_name(&self, name: &str) -> Result<Option<Instrument>, StoreError>;

    /// Insert an instrument
    fn insert_instrument(&self, instrument: &Instrument) -> Result<(), StoreError>;

    /// Look up an edge by id
    fn edge(&self, id: Uuid) -> Result<Option<Edge>, StoreError>;

    /// Look up an edge by (atom, core level)
    fn edge_by_key(&self, target_atom: &str, core_state: &str) -> Result<Option<Edge>, StoreError>;

    /// Insert an edge
    fn insert_edge(&self, edge: &Edge) -> Result<(), StoreError>;

    /// Look up a calibration method by id
    fn calibration_method(&self, id: Uuid) -> Result<Option<CalibrationMethod>, StoreError>;

    /// Look up a calibration method by exact name
    fn calibration_method_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CalibrationMethod>, StoreError>;

    /// Insert a calibration method
    fn insert_calibration_method(&self, method: &CalibrationMethod) -> Result<(), StoreError>;

    /// Look up a polarization by id
    fn polarization(&self, id: Uuid) -> Result<Option<Polarization>, StoreError>;

    /// Look up a polarization by exact angle match
    fn polarization_by_angles(
        &self,
        polar_angle: f64,
        azimuthal_angle: f64,
    ) -> Result<Option<Polarization>, StoreError>;

    /// Insert a polarization
    fn insert_polarization(&self, polarization: &Polarization) -> Result<(), StoreError>;

    /// Insert an experiment
    fn insert_experiment(&self, experiment: &Experiment) -> Result<(), StoreError>;

    /// Look up an experiment by id
    fn experiment(&self, id: Uuid) -> Result<Option<Experiment>, StoreError>;

    /// Experiments measured on a sample, oldest first
    fn experiments_for_sample(&self, sample_id: Uuid) -> Result<Vec<Experiment>, StoreError>;

    /// Bulk-insert spectrum points owned by an experiment
    fn insert_spectrum_points(
        &self,
        experiment_id: Uuid,
        points: &[SpectrumPoint],
    ) -> Result<usize, StoreError>;

    /// Spectrum points of an experiment ordered by energy ascending
    fn spectrum_points(&self, experiment_id: Uuid) -> Result<Vec<SpectrumPoint>, StoreError>;

    /// Bulk-insert peaks owned by an experiment
    fn insert_peaks(&self, experiment_id: Uuid, peaks: &[Peak]) -> Result<usize, StoreError>;

    /// Peaks of an experiment ordered by energy ascending
    fn peaks(&self, experiment_id: Uuid) -> Result<Vec<Peak>, StoreError>;

    /// Delete an experiment and everything it owns; `false` if it did not exist
    fn delete_experiment(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Number of rows in a table
    fn count(&self, table: Table) -> Result<u64, StoreError>;
}
