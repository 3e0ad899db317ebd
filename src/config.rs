//! Configuration types for hotel-indexer
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 256;

/// Maximum attraction search radius in miles
const MAX_RADIUS_MILES: u32 = 100;

/// Concurrent hotel data aggregator with attraction lookup
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hotel-indexer",
    version,
    about = "Concurrent hotel data aggregator with attraction lookup",
    long_about = "Loads a bulk hotel file, fans review parsing out over a worker pool,\n\
                  optionally fetches nearby attractions for each hotel, and writes two\n\
                  text reports.",
    after_help = "EXAMPLES:\n    \
        hotel-indexer hotels.json reviews/\n    \
        hotel-indexer hotels.json reviews/ -w 8 --hotel-report out/hotels.txt\n    \
        hotel-indexer hotels.json reviews/ --api-key $PLACES_KEY --radius 5"
)]
pub struct CliArgs {
    /// Bulk hotel JSON file
    #[arg(value_name = "HOTELS_FILE")]
    pub hotels_file: PathBuf,

    /// Directory of review JSON files (searched recursively)
    #[arg(value_name = "REVIEWS_DIR")]
    pub reviews_dir: PathBuf,

    /// Hotel report output file
    #[arg(long, default_value = "hotels.txt", value_name = "FILE")]
    pub hotel_report: PathBuf,

    /// Attraction report output file
    #[arg(long, default_value = "attractions.txt", value_name = "FILE")]
    pub attraction_report: PathBuf,

    /// Number of worker threads for parsing and fetching
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Attraction search radius in miles
    #[arg(short = 'r', long, default_value = "2", value_name = "MILES")]
    pub radius: u32,

    /// Places API key; attraction fetching is skipped when absent
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Alternate places endpoint root (testing)
    #[arg(long, value_name = "URL", hide = true)]
    pub places_url: Option<String>,

    /// Verbose output (per-task detail)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    // Default to 2x CPU cores, as parse and fetch tasks are I/O bound
    num_cpus::get() * 2
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Bulk hotel file
    pub hotels_file: PathBuf,

    /// Root of the review directory tree
    pub reviews_dir: PathBuf,

    /// Hotel report destination
    pub hotel_report: PathBuf,

    /// Attraction report destination
    pub attraction_report: PathBuf,

    /// Number of worker threads
    pub worker_count: usize,

    /// Attraction search radius (miles)
    pub radius_miles: u32,

    /// Places API key; None disables the fetch phase
    pub api_key: Option<String>,

    /// Alternate places endpoint root
    pub places_url: Option<String>,

    /// Verbose logging
    pub verbose: bool,
}

impl BuildConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // Validate search radius
        if args.radius == 0 || args.radius > MAX_RADIUS_MILES {
            return Err(ConfigError::InvalidRadius {
                miles: args.radius,
                max: MAX_RADIUS_MILES,
            });
        }

        // Validate input paths
        if !args.hotels_file.is_file() {
            return Err(ConfigError::HotelsFileNotFound {
                path: args.hotels_file,
            });
        }

        if !args.reviews_dir.is_dir() {
            return Err(ConfigError::ReviewsDirNotFound {
                path: args.reviews_dir,
            });
        }

        // Validate report destinations
        for report in [&args.hotel_report, &args.attraction_report] {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(ConfigError::InvalidOutputPath {
                        path: report.clone(),
                        reason: format!("Parent directory '{}' does not exist", parent.display()),
                    });
                }
            }
        }

        Ok(Self {
            hotels_file: args.hotels_file,
            reviews_dir: args.reviews_dir,
            hotel_report: args.hotel_report,
            attraction_report: args.attraction_report,
            worker_count: args.workers,
            radius_miles: args.radius,
            api_key: args.api_key,
            places_url: args.places_url,
            verbose: args.verbose,
        })
    }

    /// Whether the attraction fetch phase runs
    pub fn fetch_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
