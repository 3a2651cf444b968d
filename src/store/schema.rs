//! Relational schema for the NEXAFS store.
//!
//! Applied idempotently on every open. The schema version is recorded in
//! `PRAGMA user_version`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// DDL for every table, index, and full-text index
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS molecules (
    id               TEXT PRIMARY KEY,
    iupac_name       TEXT NOT NULL UNIQUE,
    chemical_formula TEXT NOT NULL,
    smiles           TEXT NOT NULL,
    inchi            TEXT NOT NULL,
    cas_number       TEXT,
    pubchem_cid      TEXT,
    image_url        TEXT,
    created_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_molecules_cas ON molecules (lower(cas_number));
CREATE INDEX IF NOT EXISTS idx_molecules_pubchem ON molecules (lower(pubchem_cid));

CREATE TABLE IF NOT EXISTS molecule_synonyms (
    molecule_id   TEXT NOT NULL REFERENCES molecules (id) ON DELETE CASCADE,
    synonym       TEXT NOT NULL,
    display_order INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (molecule_id, synonym)
);

CREATE VIRTUAL TABLE IF NOT EXISTS molecule_text USING fts5 (
    molecule_id UNINDEXED,
    iupac_name,
    chemical_formula
);
CREATE VIRTUAL TABLE IF NOT EXISTS synonym_text USING fts5 (
    molecule_id UNINDEXED,
    synonym
);

CREATE TABLE IF NOT EXISTS vendors (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    url  TEXT
);

CREATE TABLE IF NOT EXISTS samples (
    id                TEXT PRIMARY KEY,
    identifier        TEXT NOT NULL UNIQUE,
    molecule_id       TEXT NOT NULL REFERENCES molecules (id),
    vendor_id         TEXT REFERENCES vendors (id),
    substrate         TEXT,
    solvent           TEXT,
    thickness_nm      REAL,
    processing_method TEXT,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS instruments (
    id       TEXT PRIMARY KEY,
    name     TEXT NOT NULL UNIQUE,
    facility TEXT
);

CREATE TABLE IF NOT EXISTS edges (
    id          TEXT PRIMARY KEY,
    target_atom TEXT NOT NULL,
    core_state  TEXT NOT NULL,
    UNIQUE (target_atom, core_state)
);

CREATE TABLE IF NOT EXISTS calibration_methods (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS polarizations (
    id              TEXT PRIMARY KEY,
    polar_angle     REAL NOT NULL,
    azimuthal_angle REAL NOT NULL,
    UNIQUE (polar_angle, azimuthal_angle)
);

CREATE TABLE IF NOT EXISTS experiments (
    id              TEXT PRIMARY KEY,
    sample_id       TEXT NOT NULL REFERENCES samples (id),
    instrument_id   TEXT NOT NULL REFERENCES instruments (id),
    edge_id         TEXT NOT NULL REFERENCES edges (id),
    polarization_id TEXT NOT NULL REFERENCES polarizations (id),
    calibration_id  TEXT REFERENCES calibration_methods (id),
    experiment_type TEXT NOT NULL,
    measured_at     TEXT NOT NULL,
    created_by      TEXT NOT NULL,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_experiments_sample ON experiments (sample_id);

CREATE TABLE IF NOT EXISTS spectrum_points (
    experiment_id TEXT NOT NULL REFERENCES experiments (id) ON DELETE CASCADE,
    energy        REAL NOT NULL,
    raw_abs       REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_spectrum_points_experiment ON spectrum_points (experiment_id, energy);

CREATE TABLE IF NOT EXISTS peaks (
    experiment_id TEXT NOT NULL REFERENCES experiments (id) ON DELETE CASCADE,
    energy        REAL NOT NULL,
    intensity     REAL,
    label         TEXT
);
CREATE INDEX IF NOT EXISTS idx_peaks_experiment ON peaks (experiment_id);
"#;

/// Tables that can be counted through [`super::Repository::count`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Molecules
    Molecules,
    /// Molecule synonyms
    Synonyms,
    /// Vendors
    Vendors,
    /// Samples
    Samples,
    /// Instruments
    Instruments,
    /// Edges
    Edges,
    /// Calibration methods
    CalibrationMethods,
    /// Polarizations
    Polarizations,
    /// Experiments
    Experiments,
    /// Spectrum points
    SpectrumPoints,
    /// Peaks
    Peaks,
}

impl Table {
    /// Every countable table, in display order
    pub const ALL: [Table; 11] = [
        Table::Molecules,
        Table::Synonyms,
        Table::Vendors,
        Table::Samples,
        Table::Instruments,
        Table::Edges,
        Table::CalibrationMethods,
        Table::Polarizations,
        Table::Experiments,
        Table::SpectrumPoints,
        Table::Peaks,
    ];

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Molecules => "molecules",
            Table::Synonyms => "molecule_synonyms",
            Table::Vendors => "vendors",
            Table::Samples => "samples",
            Table::Instruments => "instruments",
            Table::Edges => "edges",
            Table::CalibrationMethods => "calibration_methods",
            Table::Polarizations => "polarizations",
            Table::Experiments => "experiments",
            Table::SpectrumPoints => "spectrum_points",
            Table::Peaks => "peaks",
        }
    }
}
