//! # nexafs
//!
//! Command-line front end for a NEXAFS spectroscopy database.
//!
//! ## Usage
//!
//! ```bash
//! # Create the database
//! nexafs --db spectra.db init
//!
//! # Register reference data and a molecule
//! nexafs --user alice edge add C K
//! nexafs --user alice molecule add --name benzene --formula C6H6 \
//!     --smiles c1ccccc1 --inchi "InChI=1S/C6H6/c1-2-4-6-5-3-1/h1-6H"
//!
//! # Search
//! nexafs search benz
//!
//! # Ingest a spectrum measured at theta = 55 deg
//! nexafs --user alice ingest spectrum.csv -m benzene -i "SST-1" \
//!     --vendor-name Sigma --theta 55
//! ```

use clap::Parser;

mod cli;

fn main() {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());

    if let Err(error) = cli::dispatch(cli) {
        report(&error);
        std::process::exit(1);
    }
}

fn report(error: &anyhow::Error) {
    let message = match error.downcast_ref::<nexafs::NexafsError>() {
        Some(err) => format!("{}: {err}", err.kind().status()),
        None => format!("error: {error:#}"),
    };

    #[cfg(feature = "colorized_output")]
    eprintln!("{}", console::style(message).red());

    #[cfg(not(feature = "colorized_output"))]
    eprintln!("{message}");
}
