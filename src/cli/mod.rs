use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

use nexafs::caller::Caller;
use nexafs::model::{ExperimentType, Peak};
use nexafs::store::Store;

mod bulk;
mod experiment;
mod ingest;
mod init;
mod molecule;
mod reference;
mod search;

mod config;

pub use config::Config;

const DEFAULT_DB: &str = "nexafs.db";

/// nexafs - NEXAFS spectroscopy database
#[derive(Parser)]
#[command(name = "nexafs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Database file (default: from config, else nexafs.db)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Act as this user (required for writes)
    #[arg(long, value_name = "ID", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Detection mode argument.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ExperimentTypeArg {
    /// Total electron yield
    #[default]
    Tey,
    /// Partial electron yield
    Pey,
    /// Fluorescence yield
    Fy,
    /// Transmission
    Trans,
}

impl From<ExperimentTypeArg> for ExperimentType {
    fn from(arg: ExperimentTypeArg) -> Self {
        match arg {
            ExperimentTypeArg::Tey => ExperimentType::TotalElectronYield,
            ExperimentTypeArg::Pey => ExperimentType::PartialElectronYield,
            ExperimentTypeArg::Fy => ExperimentType::FluorescenceYield,
            ExperimentTypeArg::Trans => ExperimentType::Transmission,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database (or upgrade its schema)
    Init,

    /// Show row counts for every table
    Info,

    /// Register or show molecules
    Molecule {
        #[command(subcommand)]
        action: MoleculeCommand,
    },

    /// Register an instrument
    Instrument {
        #[command(subcommand)]
        action: InstrumentCommand,
    },

    /// Register an absorption edge
    Edge {
        #[command(subcommand)]
        action: EdgeCommand,
    },

    /// Register a calibration method
    Calibration {
        #[command(subcommand)]
        action: CalibrationCommand,
    },

    /// Search molecules by name, formula, synonym, or registry number
    Search {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Page size
        #[arg(short, long)]
        limit: Option<usize>,

        /// Results to skip
        #[arg(short, long, default_value_t = 0)]
        offset: usize,

        /// Do not match CAS registry numbers
        #[arg(long)]
        no_registry: bool,

        /// Do not match PubChem ids
        #[arg(long)]
        no_external_id: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Ingest a spectrum file as one experiment per geometry
    Ingest(ingest::IngestArgs),

    /// Show or delete experiments
    Experiment {
        #[command(subcommand)]
        action: ExperimentCommand,
    },

    /// Load a directory tree of angle-resolved spectra
    BulkLoad(bulk::BulkLoadArgs),
}

#[derive(Subcommand)]
enum MoleculeCommand {
    /// Register a molecule
    Add(molecule::AddArgs),

    /// Show a molecule by id or canonical name
    Show {
        /// Molecule id or canonical name
        #[arg(value_name = "MOLECULE")]
        molecule: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum InstrumentCommand {
    /// Register an instrument (no-op if the name exists)
    Add {
        /// Instrument name
        name: String,

        /// Hosting facility
        #[arg(long)]
        facility: Option<String>,
    },
}

#[derive(Subcommand)]
enum EdgeCommand {
    /// Register an edge (no-op if it exists)
    Add {
        /// Absorbing atom symbol (e.g., C)
        atom: String,

        /// Core level (e.g., K, L3)
        #[arg(default_value = "K")]
        core: String,
    },
}

#[derive(Subcommand)]
enum CalibrationCommand {
    /// Register a calibration method
    Add {
        /// Method name
        name: String,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum ExperimentCommand {
    /// Show an experiment with its spectrum summary
    Show {
        /// Experiment id
        id: Uuid,

        /// Print JSON including every point
        #[arg(long)]
        json: bool,
    },

    /// Delete an experiment you created
    Delete {
        /// Experiment id
        id: Uuid,
    },
}

/// Settings shared by every command
pub struct Session {
    /// Merged configuration
    pub config: Config,
    /// Database path
    pub db: PathBuf,
    /// Acting caller
    pub caller: Caller,
}

impl Session {
    /// Open the configured database
    pub fn open_store(&self) -> Result<Store> {
        use anyhow::Context;
        Store::open(&self.db).with_context(|| format!("Failed to open {}", self.db.display()))
    }
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let db = cli
        .db
        .or_else(|| config.database.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB));
    let caller = match cli.user {
        Some(user) => Caller::user(user),
        None => Caller::anonymous(),
    };
    let session = Session { config, db, caller };

    match cli.command {
        Commands::Init => init::run(&session),
        Commands::Info => init::info(&session),
        Commands::Molecule { action } => match action {
            MoleculeCommand::Add(args) => molecule::add(&session, args),
            MoleculeCommand::Show { molecule, json } => molecule::show(&session, &molecule, json),
        },
        Commands::Instrument {
            action: InstrumentCommand::Add { name, facility },
        } => reference::add_instrument(&session, &name, facility.as_deref()),
        Commands::Edge {
            action: EdgeCommand::Add { atom, core },
        } => reference::add_edge(&session, &atom, &core),
        Commands::Calibration {
            action: CalibrationCommand::Add { name, description },
        } => reference::add_calibration(&session, &name, description.as_deref()),
        Commands::Search {
            query,
            limit,
            offset,
            no_registry,
            no_external_id,
            json,
        } => search::run(
            &session,
            &query,
            limit,
            offset,
            !no_registry,
            !no_external_id,
            json,
        ),
        Commands::Ingest(args) => ingest::run(&session, args),
        Commands::Experiment { action } => match action {
            ExperimentCommand::Show { id, json } => experiment::show(&session, id, json),
            ExperimentCommand::Delete { id } => experiment::delete(&session, id),
        },
        Commands::BulkLoad(args) => bulk::run(&session, args),
    }
}

/// Parse `ENERGY` or `ENERGY:LABEL` into a peak
fn parse_peak(value: &str) -> std::result::Result<Peak, String> {
    let (energy, label) = match value.split_once(':') {
        Some((energy, label)) => (energy, Some(label.trim().to_string())),
        None => (value, None),
    };
    let energy: f64 = energy
        .trim()
        .parse()
        .map_err(|_| format!("invalid peak energy: {energy:?}"))?;
    Ok(Peak {
        energy,
        intensity: None,
        label: label.filter(|l| !l.is_empty()),
    })
}

/// Style a heading when colour output is enabled
fn heading(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        console::style(text).bold().cyan().to_string()
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

/// Resolve a molecule given as an id or a canonical name
fn resolve_molecule(
    store: &Store,
    key: &str,
) -> std::result::Result<nexafs::catalog::MoleculeDetail, nexafs::NexafsError> {
    match Uuid::parse_str(key.trim()) {
        Ok(id) => nexafs::catalog::molecule(store, id),
        Err(_) => nexafs::catalog::molecule_by_name(store, key),
    }
}
