use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{
    display_name, Edge, Experiment, Instrument, Molecule, Peak, Polarization, Sample,
    SpectrumPoint, Synonym,
};

/// Input for registering a molecule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMolecule {
    /// Canonical name
    pub iupac_name: String,
    /// Chemical formula
    pub chemical_formula: String,
    /// SMILES string
    pub smiles: String,
    /// InChI string
    pub inchi: String,
    /// CAS registry number
    #[serde(default)]
    pub cas_number: Option<String>,
    /// PubChem compound id
    #[serde(default)]
    pub pubchem_cid: Option<String>,
    /// Structure image reference
    #[serde(default)]
    pub image_url: Option<String>,
    /// Synonyms; the first becomes the primary name
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// A molecule with its synonyms and resolved display name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoleculeDetail {
    /// The molecule
    pub molecule: Molecule,
    /// Name shown to users
    pub display_name: String,
    /// Synonyms in display order
    pub synonyms: Vec<Synonym>,
}

impl MoleculeDetail {
    pub(crate) fn new(molecule: Molecule, synonyms: Vec<Synonym>) -> Self {
        let display_name = display_name(&molecule.iupac_name, &synonyms).to_string();
        Self {
            molecule,
            display_name,
            synonyms,
        }
    }
}

impl fmt::Display for MoleculeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.molecule;
        writeln!(f, "{} ({})", self.display_name, m.id)?;
        writeln!(f, "  IUPAC name: {}", m.iupac_name)?;
        writeln!(f, "  Formula:    {}", m.chemical_formula)?;
        writeln!(f, "  SMILES:     {}", m.smiles)?;
        writeln!(f, "  InChI:      {}", m.inchi)?;
        if let Some(cas) = &m.cas_number {
            writeln!(f, "  CAS:        {cas}")?;
        }
        if let Some(cid) = &m.pubchem_cid {
            writeln!(f, "  PubChem:    {cid}")?;
        }
        let names: Vec<&str> = self.synonyms.iter().map(|s| s.synonym.as_str()).collect();
        write!(f, "  Synonyms:   {}", names.join(", "))
    }
}

/// An experiment with everything needed to display it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentDetail {
    /// The experiment
    pub experiment: Experiment,
    /// Measured sample
    pub sample: Sample,
    /// Instrument used
    pub instrument: Instrument,
    /// Probed edge
    pub edge: Edge,
    /// Measurement geometry
    pub polarization: Polarization,
    /// Spectrum ordered by energy ascending
    pub points: Vec<SpectrumPoint>,
    /// Peak annotations ordered by energy ascending
    pub peaks: Vec<Peak>,
}

impl fmt::Display for ExperimentDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.experiment;
        writeln!(f, "Experiment {}", e.id)?;
        writeln!(f, "  Sample:      {}", self.sample.identifier)?;
        writeln!(f, "  Instrument:  {}", self.instrument.name)?;
        writeln!(f, "  Edge:        {}", self.edge)?;
        writeln!(
            f,
            "  Geometry:    theta={} phi={}",
            self.polarization.polar_angle, self.polarization.azimuthal_angle
        )?;
        writeln!(f, "  Type:        {}", e.experiment_type)?;
        writeln!(f, "  Measured at: {}", e.measured_at.to_rfc3339())?;
        writeln!(f, "  Created by:  {}", e.created_by)?;
        if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
            writeln!(
                f,
                "  Points:      {} ({} - {} eV)",
                self.points.len(),
                first.energy,
                last.energy
            )?;
        } else {
            writeln!(f, "  Points:      0")?;
        }
        write!(f, "  Peaks:       {}", self.peaks.len())
    }
}
