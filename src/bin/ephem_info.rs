//! JPL Ephemeris Information Tool
//!
//! Prints the format, segments and coverage of an SPK kernel, and the civil
//! dates the almanac can answer for with it.
//!
//! Usage:
//!   cargo run --bin ephem_info -- [--comments] [path/to/de421.bsp]

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};
use sky_almanac::jplephem::names;
use sky_almanac::jplephem::spk::{format_tdb_date, SPK};
use sky_almanac::time::civil::local_date;
use sky_almanac::{EphemerisProvider, Loader, SpkEphemeris};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// JPL Ephemeris Information Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Displays the segments and usable dates of a JPL ephemeris file (SPK/BSP)",
    long_about = None
)]
struct Args {
    /// Display only file comments
    #[arg(short, long, action = ArgAction::SetTrue)]
    comments: bool,

    /// Ephemeris file to analyze; defaults to the loader's kernel
    file: Option<PathBuf>,
}

/// Format bytes as KB, MB, or GB
fn format_size(size_bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if size_bytes >= MB {
        format!("{:.2} MB", size_bytes as f64 / MB as f64)
    } else if size_bytes >= KB {
        format!("{:.2} KB", size_bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", size_bytes)
    }
}

fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

fn display_comments(spk: &SPK) {
    match spk.comments() {
        Ok(comments) if !comments.is_empty() => {
            print_section_header("File Comments");
            println!("{}", comments);
        }
        Ok(_) => println!("\nNo comments found in file."),
        Err(e) => eprintln!("\nFailed to read comments: {e}"),
    }
}

fn display_file_format(spk: &SPK) {
    print_section_header("File Format");
    println!("ID Word: {}", spk.daf.locidw);
    println!("Endian: {:?}", spk.daf.endian);
    println!("Internal name: {}", spk.daf.ifname);
    println!("Summary records: ND={}, NI={}", spk.daf.nd, spk.daf.ni);
}

/// Segment table sorted by center then target; returns the bodies seen
fn display_segments(spk: &SPK) -> BTreeSet<i32> {
    let mut bodies = BTreeSet::new();
    if spk.segments.is_empty() {
        println!("\nNo valid segments found in the file.");
        return bodies;
    }

    print_section_header(&format!("Segments ({} total)", spk.segments.len()));
    let mut segments: Vec<_> = spk.segments.iter().collect();
    segments.sort_by_key(|segment| (segment.center, segment.target));
    for segment in segments {
        bodies.insert(segment.center);
        bodies.insert(segment.target);
        println!(
            "{}  ({:.1} yr)",
            segment.describe(false),
            (segment.end_jd - segment.start_jd) / 365.25
        );
    }
    bodies
}

/// Span shared by every body chain, and the dates each entry point accepts
fn display_usable_dates(ephemeris: &SpkEphemeris) -> Result<()> {
    let (start, end) = ephemeris.coverage();
    print_section_header("Usable Dates");
    println!(
        "Kernel span: {} to {} (TDB JD {:.1} to {:.1})",
        format_tdb_date(start.tdb()),
        format_tdb_date(end.tdb()),
        start.tdb(),
        end.tdb()
    );

    let (first, last) = (local_date(&start, 0.0)?, local_date(&end, 0.0)?);
    let paddings = [("get_events", 0), ("get_ephemerides", 1), ("get_moon_phase", 12)];
    for (entry_point, padding) in paddings {
        let padding = chrono::Duration::days(padding);
        println!(
            "{:<16} {} to {} (UTC)",
            entry_point,
            first + padding,
            last - padding
        );
    }

    let positioned: Vec<String> = ephemeris.bodies().iter().map(|body| body.to_string()).collect();
    println!("Bodies: {}", positioned.join(", "));
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path = args.file.unwrap_or_else(|| Loader::new().ephemeris_path());

    println!("Analyzing JPL Ephemeris file: {}", path.display());
    println!("-------------------------------------------------------");
    println!("File size: {}", format_size(std::fs::metadata(&path)?.len()));

    let start_time = Instant::now();
    let spk = SPK::open(&path)?;
    println!("File loaded in {:.2?}", start_time.elapsed());

    if args.comments {
        display_comments(&spk);
        return Ok(());
    }

    display_file_format(&spk);
    let bodies = display_segments(&spk);

    print_section_header("Bodies");
    for id in bodies {
        println!("  - {} (ID: {})", names::display_name(id), id);
    }

    match SpkEphemeris::from_spk(spk) {
        Ok(ephemeris) => display_usable_dates(&ephemeris)?,
        Err(e) => eprintln!("\nNot usable by the almanac: {e}"),
    }

    println!("\nTotal analysis time: {:.2?}", start_time.elapsed());
    Ok(())
}
