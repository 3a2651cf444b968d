use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use uuid::Uuid;

use nexafs::catalog;
use nexafs::ingest::{
    read_spectrum_file, ExperimentDescriptor, ExperimentIngestor, Geometry, GeometrySpec,
    IngestRequest, SampleDescriptor, VendorRef,
};
use nexafs::model::{Peak, Preparation};

use super::{resolve_molecule, ExperimentTypeArg, Session};

/// Arguments for `ingest`
#[derive(Args)]
pub struct IngestArgs {
    /// Spectrum file (.csv, .tsv, .txt, .dat)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Molecule id or canonical name
    #[arg(short, long)]
    molecule: String,

    /// Instrument name (created if missing)
    #[arg(short, long)]
    instrument: String,

    /// Edge as ATOM-CORE, e.g. C-K
    #[arg(short, long, value_name = "EDGE", default_value = "C-K")]
    edge: String,

    /// Detection mode
    #[arg(long = "type", value_enum, default_value_t = ExperimentTypeArg::Tey)]
    experiment_type: ExperimentTypeArg,

    /// Calibration method id
    #[arg(long)]
    calibration: Option<Uuid>,

    /// Measurement date (RFC 3339 or YYYY-MM-DD; default: now)
    #[arg(long)]
    date: Option<String>,

    /// Polar angle for every row
    #[arg(long, conflicts_with = "per_row", required_unless_present = "per_row")]
    theta: Option<f64>,

    /// Azimuthal angle for every row
    #[arg(long, conflicts_with = "per_row", required_unless_present = "per_row")]
    phi: Option<f64>,

    /// Read theta and phi from each row of the file
    #[arg(long)]
    per_row: bool,

    #[command(flatten)]
    vendor: VendorArgs,

    /// Sample identifier (generated when omitted)
    #[arg(long)]
    sample_id: Option<String>,

    /// Substrate
    #[arg(long)]
    substrate: Option<String>,

    /// Solvent
    #[arg(long)]
    solvent: Option<String>,

    /// Film thickness in nm
    #[arg(long)]
    thickness: Option<f64>,

    /// Processing method
    #[arg(long)]
    processing: Option<String>,

    /// Peak as ENERGY or ENERGY:LABEL (repeatable)
    #[arg(long = "peak", value_name = "PEAK", value_parser = super::parse_peak)]
    peaks: Vec<Peak>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

/// Vendor selection shared by `ingest` and `bulk-load`
#[derive(Args)]
pub struct VendorArgs {
    /// Existing vendor id
    #[arg(long)]
    vendor_id: Option<Uuid>,

    /// Vendor name (created if missing)
    #[arg(long)]
    vendor_name: Option<String>,

    /// Vendor website for a new vendor
    #[arg(long)]
    vendor_url: Option<String>,
}

impl VendorArgs {
    /// Resolve into a vendor reference
    pub fn to_ref(&self) -> Result<VendorRef> {
        Ok(VendorRef::from_parts(
            self.vendor_id,
            self.vendor_name.as_deref(),
            self.vendor_url.as_deref(),
        )?)
    }
}

/// Split `C-K` into atom and core level
fn parse_edge(edge: &str) -> Result<(&str, &str)> {
    edge.split_once('-')
        .map(|(atom, core)| (atom.trim(), core.trim()))
        .filter(|(atom, core)| !atom.is_empty() && !core.is_empty())
        .with_context(|| format!("Invalid edge {edge:?}, expected ATOM-CORE (e.g. C-K)"))
}

/// Ingest one spectrum file.
///
/// The upload is validated before the instrument and edge are resolved, so
/// a rejected file leaves no rows behind.
pub fn run(session: &Session, args: IngestArgs) -> Result<()> {
    let geometry = match (args.per_row, args.theta, args.phi) {
        (true, _, _) => GeometrySpec::PerRow,
        (false, Some(theta), Some(phi)) => GeometrySpec::Fixed(Geometry::new(theta, phi)),
        _ => anyhow::bail!("--theta and --phi are required unless --per-row is given"),
    };
    let vendor = args.vendor.to_ref()?;
    let (atom, core) = parse_edge(&args.edge)?;

    let rows = read_spectrum_file(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    log::info!("read {} rows from {}", rows.len(), args.file.display());

    let mut store = session.open_store()?;
    session.caller.require_user()?;
    let molecule = resolve_molecule(&store, &args.molecule)?;

    // instrument and edge ids are filled in once validation has passed
    let request = IngestRequest {
        sample: SampleDescriptor {
            molecule_id: molecule.molecule.id,
            identifier: args.sample_id,
            preparation: Preparation {
                substrate: args.substrate,
                solvent: args.solvent,
                thickness_nm: args.thickness,
                processing_method: args.processing,
            },
            vendor,
        },
        experiment: ExperimentDescriptor {
            instrument_id: Uuid::nil(),
            edge_id: Uuid::nil(),
            experiment_type: args.experiment_type.into(),
            calibration_id: args.calibration,
            measured_at: args.date,
        },
        geometry,
        rows,
        peaks: args.peaks,
    };
    let mut validated = request.validate()?;

    validated.instrument_id =
        catalog::ensure_instrument(&mut store, &session.caller, &args.instrument, None)?.id;
    validated.edge_id = catalog::ensure_edge(&mut store, &session.caller, atom, core)?.id;

    let ingestor = ExperimentIngestor::new(session.config.ingest_config());
    let outcome = ingestor.ingest_validated(&mut store, &session.caller, validated)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{outcome}");
    }
    Ok(())
}
