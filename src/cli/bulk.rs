use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use uuid::Uuid;

use nexafs::catalog;
use nexafs::ingest::{discover_bulk_files, load_bulk, BulkLoadOptions, ExperimentIngestor};

use super::ingest::VendorArgs;
use super::{heading, ExperimentTypeArg, Session};

/// Arguments for `bulk-load`
#[derive(Args)]
pub struct BulkLoadArgs {
    /// Root directory laid out as MOLECULE/EDGE/<angle>deg.txt
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Instrument name (created if missing)
    #[arg(short, long)]
    instrument: String,

    /// Facility for a newly created instrument
    #[arg(long)]
    facility: Option<String>,

    #[command(flatten)]
    vendor: VendorArgs,

    /// Detection mode
    #[arg(long = "type", value_enum, default_value_t = ExperimentTypeArg::Tey)]
    experiment_type: ExperimentTypeArg,

    /// Calibration method id
    #[arg(long)]
    calibration: Option<Uuid>,

    /// Measurement date for every spectrum
    #[arg(long)]
    date: Option<String>,

    /// List the files that would be loaded without writing
    #[arg(long)]
    dry_run: bool,
}

/// Load every spectrum under a directory tree
pub fn run(session: &Session, args: BulkLoadArgs) -> Result<()> {
    let entries = discover_bulk_files(&args.dir)?;
    log::info!("found {} spectrum files under {}", entries.len(), args.dir.display());

    if args.dry_run {
        println!("{}", heading(&format!("{} files", entries.len())));
        for entry in &entries {
            println!(
                "  {:<30} {}-{} {:>5.1} deg  {}",
                entry.molecule,
                entry.target_atom,
                entry.core_state,
                entry.theta,
                entry.path.display()
            );
        }
        return Ok(());
    }

    let vendor = args.vendor.to_ref()?;
    let mut store = session.open_store()?;
    let instrument = catalog::ensure_instrument(
        &mut store,
        &session.caller,
        &args.instrument,
        args.facility.as_deref(),
    )?;
    let options = BulkLoadOptions {
        instrument_id: instrument.id,
        vendor,
        experiment_type: args.experiment_type.into(),
        calibration_id: args.calibration,
        measured_at: args.date,
    };

    let ingestor = ExperimentIngestor::new(session.config.ingest_config());
    let summary = load_bulk(&mut store, &ingestor, &session.caller, &entries, &options)?;

    println!("{summary}");
    for (path, reason) in &summary.skipped {
        println!("  skipped {}: {reason}", path.display());
    }
    Ok(())
}
