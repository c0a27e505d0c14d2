//! Vedic sample chart
//!
//! Computes tropical and sidereal longitudes of the Sun, Moon and Ascendant
//! for one timestamp and location and prints them in DMS and decimal form.
//!
//! Usage:
//!   cargo run --bin sample_chart -- --datetime 1979-10-12T04:30:00+00:00 --lat 35.6892 --lon 51.389

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use vedic_ephemeris::data::DEFAULT_EPHEMERIS_NAME;
use vedic_ephemeris::sidereal::{AyanamsaService, LahiriFallbackAyanamsa, TrueLahiriAyanamsa};
use vedic_ephemeris::{
    compute_sample, parse_timestamp, JplEphemeris, Location, VedicError, VedicSample,
};

/// Vedic sample chart
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prints tropical and sidereal (Lahiri) longitudes of the Sun, Moon and Ascendant",
    long_about = None
)]
struct Args {
    /// ISO-8601 timestamp with offset, e.g. 1997-06-07T20:28:00+03:30
    #[arg(long)]
    datetime: String,

    /// Latitude in degrees (north +)
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude in degrees (east +)
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Print the sample as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Add nutation in longitude to the ayanamsa
    #[arg(long, action = ArgAction::SetTrue)]
    true_lahiri: bool,

    /// Kernel file name to look for first
    #[arg(long, default_value = DEFAULT_EPHEMERIS_NAME)]
    ephemeris: String,

    /// Extra directory searched for the kernel before the cache directories
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log kernel resolution and loading to stderr
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<VedicSample, VedicError> {
    let timestamp = parse_timestamp(&args.datetime)?;
    let ephemeris = JplEphemeris::new(args.data_dir.as_deref(), &args.ephemeris)?;
    let ayanamsa: &dyn AyanamsaService = if args.true_lahiri {
        &TrueLahiriAyanamsa
    } else {
        &LahiriFallbackAyanamsa
    };

    compute_sample(
        &timestamp,
        Location::new(args.lat, args.lon),
        Some(&ephemeris),
        Some(ayanamsa),
    )
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let sample = match run(&args) {
        Ok(sample) => sample,
        Err(e @ VedicError::Kernel(_)) => {
            eprintln!("Kernel warning: {}", e);
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return if e.is_kernel_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            };
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&sample) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", sample);
    }

    ExitCode::SUCCESS
}
