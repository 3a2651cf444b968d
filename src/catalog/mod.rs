//! # Catalog Module
//!
//! Molecule registration, reference entities (instruments, edges,
//! calibration methods), and experiment retrieval and deletion.
//!
//! Reads take `&Store`; writes take `&mut Store` and a [`Caller`], which is
//! checked before anything is written.
//!
//! [`Caller`]: crate::caller::Caller

mod experiments;
mod molecules;
mod reference;
mod types;


pub use experiments::{delete_experiment, experiment};
pub use molecules::{molecule, molecule_by_name, register_molecule};
pub use reference::{create_calibration_method, ensure_edge, ensure_instrument};
pub use types::{ExperimentDetail, MoleculeDetail, NewMolecule};
