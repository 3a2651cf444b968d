use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A molecule and its registry identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    /// Opaque identifier
    pub id: Uuid,

    /// Canonical IUPAC-style name, unique across all molecules
    pub iupac_name: String,

    /// Chemical formula (e.g., "C6H6")
    pub chemical_formula: String,

    /// SMILES string
    pub smiles: String,

    /// InChI string
    pub inchi: String,

    /// CAS registry number
    pub cas_number: Option<String>,

    /// PubChem compound id
    pub pubchem_cid: Option<String>,

    /// Reference to a structure image
    pub image_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Molecule {
    /// Create a molecule with a fresh id and no registry identifiers
    pub fn new(iupac_name: impl Into<String>, chemical_formula: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            iupac_name: iupac_name.into(),
            chemical_formula: chemical_formula.into(),
            smiles: String::new(),
            inchi: String::new(),
            cas_number: None,
            pubchem_cid: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    /// Set the SMILES and InChI strings
    pub fn with_structure(mut self, smiles: impl Into<String>, inchi: impl Into<String>) -> Self {
        self.smiles = smiles.into();
        self.inchi = inchi.into();
        self
    }

    /// Set the CAS registry number
    pub fn with_cas_number(mut self, cas_number: impl Into<String>) -> Self {
        self.cas_number = Some(cas_number.into());
        self
    }

    /// Set the PubChem compound id
    pub fn with_pubchem_cid(mut self, pubchem_cid: impl Into<String>) -> Self {
        self.pubchem_cid = Some(pubchem_cid.into());
        self
    }

    /// Set the structure image reference
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// An alternate name for a molecule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    /// The alternate name
    pub synonym: String,

    /// Display order; 0 marks the primary name
    pub order: i32,
}

impl Synonym {
    /// Create a synonym with the given display order
    pub fn new(synonym: impl Into<String>, order: i32) -> Self {
        Self {
            synonym: synonym.into(),
            order,
        }
    }

    /// Whether this is the display-preferred name
    pub fn is_primary(&self) -> bool {
        self.order == 0
    }
}

/// Resolve the name shown for a molecule.
///
/// The primary synonym (order 0) wins; otherwise the shortest synonym, the
/// first one in order on ties; otherwise the canonical name.
pub fn display_name<'a>(canonical: &'a str, synonyms: &'a [Synonym]) -> &'a str {
    if let Some(primary) = synonyms.iter().find(|s| s.is_primary()) {
        return &primary.synonym;
    }

    let mut ordered: Vec<&Synonym> = synonyms.iter().collect();
    ordered.sort_by_key(|s| s.order);

    ordered
        .into_iter()
        .min_by_key(|s| s.synonym.chars().count())
        .map(|s| s.synonym.as_str())
        .unwrap_or(canonical)
}
