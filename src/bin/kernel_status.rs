//! Ephemeris Kernel Status Tool
//!
//! Resolves the ephemeris kernel the library would use, downloading one if
//! nothing is available locally, and reports where it lives. With
//! `--segments` the kernel is opened and its SPK segment table printed.
//!
//! Usage:
//!   cargo run --bin kernel_status -- [--print-only-path] [--segments] [--data-dir DIR]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use vedic_ephemeris::data::{ensure_kernel_available, DEFAULT_EPHEMERIS_NAME};
use vedic_ephemeris::jplephem::{names, SPK};
use vedic_ephemeris::time::format_date;
use vedic_ephemeris::VedicError;

/// Ephemeris kernel status
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Locates (or downloads) the JPL ephemeris kernel and reports on it",
    long_about = None
)]
struct Args {
    /// Print only the kernel path
    #[arg(long, action = ArgAction::SetTrue)]
    print_only_path: bool,

    /// List the SPK segments in the kernel
    #[arg(short, long, action = ArgAction::SetTrue)]
    segments: bool,

    /// Kernel file name to look for first
    #[arg(long, default_value = DEFAULT_EPHEMERIS_NAME)]
    ephemeris: String,

    /// Extra directory searched before the cache directories
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log resolution steps to stderr
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

/// Format bytes as KB, MB, or GB
fn format_size(size_bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size_bytes >= GB {
        format!("{:.2} GB", size_bytes as f64 / GB as f64)
    } else if size_bytes >= MB {
        format!("{:.2} MB", size_bytes as f64 / MB as f64)
    } else if size_bytes >= KB {
        format!("{:.2} KB", size_bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", size_bytes)
    }
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

fn display_segments(path: &Path) -> Result<(), VedicError> {
    let spk = SPK::open(path)?;

    print_section_header("File Format");
    println!("ID Word: {}", spk.daf.locidw);
    println!("Endian: {:?}", spk.daf.endian);
    println!("Internal name: {}", spk.daf.ifname);

    print_section_header(&format!("Segments ({} total)", spk.segments.len()));
    println!(
        "{:<24} {:<24} {:<6} {:<12} {:<12}",
        "Target", "Center", "Type", "Start Date", "End Date"
    );

    let mut earliest = f64::MAX;
    let mut latest = f64::MIN;
    for segment in &spk.segments {
        println!(
            "{:<24} {:<24} {:<6} {:<12} {:<12}",
            format!("{} ({})", names::display_name(segment.target), segment.target),
            format!("{} ({})", names::display_name(segment.center), segment.center),
            segment.data_type,
            format_date(segment.start_jd()),
            format_date(segment.end_jd())
        );
        earliest = earliest.min(segment.start_jd());
        latest = latest.max(segment.end_jd());
    }

    if !spk.segments.is_empty() {
        print_section_header("Overall Time Coverage");
        println!("Start date: {} (JD {:.1})", format_date(earliest), earliest);
        println!("End date: {} (JD {:.1})", format_date(latest), latest);
        println!(
            "Duration: {:.1} years",
            (latest - earliest) / 365.25
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let extra: Vec<PathBuf> = args.data_dir.into_iter().collect();
    let path = match ensure_kernel_available(&args.ephemeris, &extra) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Kernel warning: {}", e);
            return ExitCode::from(2);
        }
    };

    if args.print_only_path {
        println!("{}", path.display());
        return ExitCode::SUCCESS;
    }

    println!("Kernel ready at: {}", path.display());
    if let Ok(metadata) = std::fs::metadata(&path) {
        println!("File size: {}", format_size(metadata.len()));
    }

    if args.segments {
        if let Err(e) = display_segments(&path) {
            eprintln!("Error: {}", e);
            return if e.is_kernel_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            };
        }
    }

    ExitCode::SUCCESS
}
