use log::info;

use crate::caller::Caller;
use crate::error::NexafsError;
use crate::model::{Molecule, Synonym};
use crate::store::{Repository, Store};

use super::{MoleculeDetail, NewMolecule};

/// Register a molecule with its synonyms.
///
/// Synonyms are trimmed and de-duplicated (case-insensitively) keeping the
/// first occurrence; list position becomes display order, so the first
/// synonym is primary. A taken canonical name is a `Conflict`.
pub fn register_molecule(
    store: &mut Store,
    caller: &Caller,
    input: NewMolecule,
) -> Result<MoleculeDetail, NexafsError> {
    caller.require_user()?;

    let required = [
        ("iupac_name", &input.iupac_name),
        ("chemical_formula", &input.chemical_formula),
        ("smiles", &input.smiles),
        ("inchi", &input.inchi),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(NexafsError::validation(format!("{field} must not be empty")));
        }
    }

    let mut molecule = Molecule::new(input.iupac_name.trim(), input.chemical_formula.trim())
        .with_structure(input.smiles.trim(), input.inchi.trim());
    molecule.cas_number = non_blank(input.cas_number);
    molecule.pubchem_cid = non_blank(input.pubchem_cid);
    molecule.image_url = non_blank(input.image_url);
    let synonyms = ordered_synonyms(&input.synonyms);

    let detail = store.run_in_transaction(|repo| {
        if repo.molecule_by_name(&molecule.iupac_name)?.is_some() {
            return Err(NexafsError::conflict(format!(
                "molecule {} already exists",
                molecule.iupac_name
            )));
        }
        repo.insert_molecule(&molecule, &synonyms)?;
        Ok(MoleculeDetail::new(molecule.clone(), synonyms.clone()))
    })?;

    info!("registered molecule {}", detail.molecule.iupac_name);
    Ok(detail)
}

/// Look up a molecule by id
pub fn molecule(store: &Store, id: uuid::Uuid) -> Result<MoleculeDetail, NexafsError> {
    let repo = store.repository();
    let molecule = repo
        .molecule(id)?
        .ok_or_else(|| NexafsError::not_found("molecule", id))?;
    let synonyms = repo.synonyms(molecule.id)?;
    Ok(MoleculeDetail::new(molecule, synonyms))
}

/// Look up a molecule by exact canonical name
pub fn molecule_by_name(store: &Store, name: &str) -> Result<MoleculeDetail, NexafsError> {
    let repo = store.repository();
    let molecule = repo
        .molecule_by_name(name.trim())?
        .ok_or_else(|| NexafsError::not_found("molecule", name))?;
    let synonyms = repo.synonyms(molecule.id)?;
    Ok(MoleculeDetail::new(molecule, synonyms))
}

fn ordered_synonyms(raw: &[String]) -> Vec<Synonym> {
    let mut seen = std::collections::HashSet::new();
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .enumerate()
        .map(|(order, s)| Synonym::new(s, order as i32))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
