use anyhow::Result;
use clap::Args;

use nexafs::catalog::{self, NewMolecule};

use super::{resolve_molecule, Session};

/// Arguments for `molecule add`
#[derive(Args)]
pub struct AddArgs {
    /// Canonical IUPAC name
    #[arg(long)]
    name: String,

    /// Chemical formula
    #[arg(long)]
    formula: String,

    /// SMILES string
    #[arg(long)]
    smiles: String,

    /// InChI string
    #[arg(long)]
    inchi: String,

    /// CAS registry number
    #[arg(long)]
    cas: Option<String>,

    /// PubChem compound id
    #[arg(long)]
    pubchem: Option<String>,

    /// Structure image reference
    #[arg(long)]
    image_url: Option<String>,

    /// Synonym (repeatable; the first is the primary name)
    #[arg(long = "synonym", value_name = "NAME")]
    synonyms: Vec<String>,
}

/// Register a molecule
pub fn add(session: &Session, args: AddArgs) -> Result<()> {
    let mut store = session.open_store()?;
    let detail = catalog::register_molecule(
        &mut store,
        &session.caller,
        NewMolecule {
            iupac_name: args.name,
            chemical_formula: args.formula,
            smiles: args.smiles,
            inchi: args.inchi,
            cas_number: args.cas,
            pubchem_cid: args.pubchem,
            image_url: args.image_url,
            synonyms: args.synonyms,
        },
    )?;
    println!("{detail}");
    Ok(())
}

/// Show a molecule by id or canonical name
pub fn show(session: &Session, key: &str, json: bool) -> Result<()> {
    let store = session.open_store()?;
    let detail = resolve_molecule(&store, key)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        println!("{detail}");
    }
    Ok(())
}
