//! # nexafs - Storage, Search, and Ingestion for NEXAFS Spectra
//!
//! `nexafs` is the data core of a database of near-edge X-ray absorption
//! fine structure (NEXAFS) spectra: molecules with their synonyms, the
//! samples made from them, and angle-resolved absorption experiments.
//!
//! ## Key Features
//!
//! - **Ranked Molecule Search**: Exact registry and external-id lookups,
//!   exact and prefix name matches, and BM25 full-text matches over names,
//!   formulas, and synonyms, merged into one deterministic ordering.
//!
//! - **Transactional Ingest**: One upload becomes one experiment per
//!   distinct measurement geometry. Vendor, sample, polarization,
//!   experiment, points, and peaks are written atomically.
//!
//! - **SQLite Storage**: A single-file store with an FTS5 index kept in
//!   step with the molecule tables.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nexafs::catalog::{self, NewMolecule};
//! use nexafs::search::{SearchConfig, SearchRanker, SearchRequest};
//! use nexafs::{caller::Caller, store::Store};
//!
//! let mut store = Store::open("nexafs.db")?;
//! let caller = Caller::user("alice");
//!
//! catalog::register_molecule(
//!     &mut store,
//!     &caller,
//!     NewMolecule {
//!         iupac_name: "benzene".into(),
//!         chemical_formula: "C6H6".into(),
//!         smiles: "c1ccccc1".into(),
//!         inchi: "InChI=1S/C6H6/c1-2-4-6-5-3-1/h1-6H".into(),
//!         ..Default::default()
//!     },
//! )?;
//!
//! let ranker = SearchRanker::new(SearchConfig::default());
//! let page = ranker.search(&store.repository(), &SearchRequest::new("benz")?)?;
//! for hit in &page.results {
//!     println!("{} ({})", hit.display_name, hit.match_type);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`model`]: Domain records
//! - [`store`]: SQLite persistence and the [`store::Repository`] seam
//! - [`search`]: Candidate ranking and pagination
//! - [`ingest`]: Upload validation, geometry grouping, and atomic writes
//! - [`catalog`]: Registration and lookup of molecules and reference data
//! - [`caller`]: The acting identity
//! - [`error`]: Error taxonomy shared by every operation

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod caller;
pub mod catalog;
pub mod error;
pub mod ingest;
pub mod model;
pub mod search;
pub mod store;

pub use error::{ErrorKind, NexafsError};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::caller::Caller;
    pub use crate::catalog::{ExperimentDetail, MoleculeDetail, NewMolecule};
    pub use crate::error::{ErrorKind, NexafsError};
    pub use crate::ingest::{
        ExperimentDescriptor, ExperimentIngestor, Geometry, GeometrySpec, IngestConfig,
        IngestOutcome, IngestRequest, SampleDescriptor, SpectrumRow, VendorRef,
    };
    pub use crate::model::{
        Edge, Experiment, ExperimentType, Instrument, Molecule, Peak, Polarization, Preparation,
        Sample, SpectrumPoint, Synonym, Vendor,
    };
    pub use crate::search::{
        MatchType, RankedMolecule, SearchConfig, SearchPage, SearchRanker, SearchRequest,
    };
    pub use crate::store::{Repository, Store, StoreError};
}
