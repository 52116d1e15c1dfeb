//! bathyray CLI - sound-speed profiles and acoustic ray fans
//!
//! Reads a bathythermograph record as JSON and prints profiles, rays, or
//! ray fans as JSON for an external renderer.

use anyhow::{Context, Result};
use bathyray_profile::{Bathythermograph, ProfileBuilder, SoundSpeedProfile};
use bathyray_trace::{FanGenerator, RayTracer};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "bathyray")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Underwater acoustic ray tracing from bathythermograph data", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// TOML file with [profile], [trace] and [fan] settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a sound-speed profile and summarize it
    Profile {
        /// Bathythermograph JSON file
        input: PathBuf,
        /// Print the full slab table as JSON
        #[arg(long)]
        slabs: bool,
    },
    /// Trace a single ray
    Trace {
        /// Bathythermograph JSON file
        input: PathBuf,
        /// Launch angle in degrees, positive downward
        #[arg(short, long, allow_hyphen_values = true)]
        angle: f64,
        /// Source depth in metres
        #[arg(short, long)]
        source_depth: Option<f64>,
        /// Range limit in metres
        #[arg(short = 'r', long)]
        max_range: Option<f64>,
    },
    /// Trace a fan of rays about a central angle
    Fan {
        /// Bathythermograph JSON file
        input: PathBuf,
        /// Central launch angle in degrees
        #[arg(long, allow_hyphen_values = true)]
        center: Option<f64>,
        /// Number of rays
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Angle between rays in degrees
        #[arg(long)]
        spacing: Option<f64>,
        /// Source depth in metres
        #[arg(short, long)]
        source_depth: Option<f64>,
        /// Range limit in metres
        #[arg(short = 'r', long)]
        max_range: Option<f64>,
    },
}

/// Profile summary printed by `bathyray profile`.
#[derive(Debug, Serialize)]
struct ProfileSummary {
    top_depth: f64,
    bottom_depth: f64,
    slab_count: usize,
    min_speed: Option<f64>,
    max_speed: Option<f64>,
}

impl ProfileSummary {
    fn new(profile: &SoundSpeedProfile) -> Self {
        let range = profile.speed_range();
        Self {
            top_depth: profile.top_depth(),
            bottom_depth: profile.bottom_depth(),
            slab_count: profile.len(),
            min_speed: range.map(|(lo, _)| lo),
            max_speed: range.map(|(_, hi)| hi),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Profile { input, slabs } => {
            let profile = load_profile(&input, &config)?;
            if slabs {
                print_json(&profile)?;
            } else {
                print_json(&ProfileSummary::new(&profile))?;
            }
        }
        Commands::Trace {
            input,
            angle,
            source_depth,
            max_range,
        } => {
            let profile = load_profile(&input, &config)?;
            let tracer = RayTracer::new(config.trace.clone())?;
            let path = tracer.trace(&profile, angle, source_depth, max_range)?;
            info!(
                vertices = path.len(),
                reflections = path.reflections().len(),
                "traced ray"
            );
            print_json(&path)?;
        }
        Commands::Fan {
            input,
            center,
            count,
            spacing,
            source_depth,
            max_range,
        } => {
            let profile = load_profile(&input, &config)?;
            let mut settings = config.fan.clone();
            if let Some(center) = center {
                settings.central_angle_deg = center;
            }
            if let Some(count) = count {
                settings.ray_count = count;
            }
            if let Some(spacing) = spacing {
                settings.angular_spacing_deg = spacing;
            }
            if source_depth.is_some() {
                settings.source_depth = source_depth;
            }
            if max_range.is_some() {
                settings.max_range = max_range;
            }
            let generator = FanGenerator::new(RayTracer::new(config.trace.clone())?);
            let fan = generator.generate(&profile, &settings)?;
            info!(
                rays = fan.len(),
                skipped = fan.skipped_angles().len(),
                "traced fan"
            );
            print_json(&fan)?;
        }
    }

    Ok(())
}

fn load_profile(input: &Path, config: &Config) -> Result<SoundSpeedProfile> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let record: Bathythermograph = serde_json::from_str(&json)
        .with_context(|| format!("parsing bathythermograph {}", input.display()))?;
    let builder = ProfileBuilder::new(config.profile.clone())?;
    let profile = builder.build_record(&record)?;
    info!(
        slabs = profile.len(),
        top = profile.top_depth(),
        bottom = profile.bottom_depth(),
        "built profile from {}",
        input.display()
    );
    Ok(profile)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_record(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_profile_with_units() {
        let file = write_record(
            r#"{"depths": [0, 100, 300], "temperatures": [68, 60, 50],
                "depth_unit": "ft", "temperature_unit": "F"}"#,
        );
        let profile = load_profile(file.path(), &Config::default()).unwrap();
        assert!((profile.bottom_depth() - 91.44).abs() < 1e-9);
    }

    #[test]
    fn test_load_profile_rejects_bad_json() {
        let file = write_record(r#"{"depths": [0, 100]}"#);
        assert!(load_profile(file.path(), &Config::default()).is_err());
    }

    #[test]
    fn test_summary() {
        let file = write_record(r#"{"depths": [0, 50, 200], "temperatures": [15, 12, 8]}"#);
        let profile = load_profile(file.path(), &Config::default()).unwrap();
        let summary = ProfileSummary::new(&profile);
        assert_eq!(summary.slab_count, profile.len());
        assert!(summary.min_speed.unwrap() <= summary.max_speed.unwrap());
    }

    #[test]
    fn test_cli_parses_negative_angle() {
        let cli = Cli::try_parse_from(["bathyray", "trace", "bt.json", "--angle", "-5"]).unwrap();
        match cli.command {
            Commands::Trace { angle, .. } => assert_eq!(angle, -5.0),
            _ => panic!("expected trace command"),
        }
    }
}
