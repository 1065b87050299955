//! `aule` CLI -- compute classroom availability from a day's lessons.
//!
//! ## Usage
//!
//! ```sh
//! # Availability right now, lessons from a file
//! aule status -l lessons.json
//!
//! # Availability at a given civil time, keeping the room registry in a file
//! aule status -l lessons.json -r registry.json --at 2026-03-16T10:30:00 --pretty
//!
//! # Lessons from stdin, custom building catalog
//! cat lessons.json | aule status --campus campus.json
//!
//! # Is a building open?
//! aule hours poloA --at 2026-03-21T13:00:00
//!
//! # List known buildings
//! aule buildings
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` for per-refresh detail.

use std::io::{self, Read};

use anyhow::{Context, Result};
use aule_engine::{
    campus::civil_now, AvailabilityService, AvailabilityStore, Campus, JsonFileBackend, Lesson,
    MemoryBackend, RegistryBackend, CAMPUS_TIMEZONE,
};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "aule",
    version,
    about = "Classroom availability from per-building lesson calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Building catalog JSON (defaults to the built-in University of Pisa table)
    #[arg(long, global = true)]
    campus: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the availability of every building and room as JSON
    Status {
        /// Lessons JSON array (reads from stdin if omitted)
        #[arg(short, long)]
        lessons: Option<String>,
        /// Room registry JSON file; created or extended with newly seen rooms
        #[arg(short, long)]
        registry: Option<String>,
        /// Civil time to evaluate at, e.g. 2026-03-16T10:30:00 (defaults to now)
        #[arg(long)]
        at: Option<NaiveDateTime>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
        /// Fail if any lesson names a building missing from the catalog
        #[arg(long)]
        strict: bool,
    },
    /// Report whether a building is open or closed
    Hours {
        /// Building name, e.g. poloA
        building: String,
        /// Civil time to evaluate at (defaults to now)
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    /// List the buildings in the catalog
    Buildings,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let campus = load_campus(cli.campus.as_deref())?;

    match cli.command {
        Commands::Status {
            lessons,
            registry,
            at,
            pretty,
            strict,
        } => {
            let now = at.unwrap_or_else(|| civil_now(CAMPUS_TIMEZONE));
            let raw = read_input(lessons.as_deref())?;
            let lessons: Vec<Lesson> =
                serde_json::from_str(&raw).context("Failed to parse lessons JSON")?;

            let store = match registry {
                Some(path) => status(campus, JsonFileBackend::new(path), lessons, now, strict)?,
                None => status(campus, MemoryBackend::default(), lessons, now, strict)?,
            };
            let out = if pretty {
                serde_json::to_string_pretty(&store)
            } else {
                serde_json::to_string(&store)
            }
            .context("Failed to serialize availability")?;
            println!("{}", out);
        }
        Commands::Hours { building, at } => {
            let now = at.unwrap_or_else(|| civil_now(CAMPUS_TIMEZONE));
            let closed = campus
                .is_closed(&building, now)
                .with_context(|| format!("Cannot evaluate hours for '{}'", building))?;
            println!("{}", if closed { "closed" } else { "open" });
        }
        Commands::Buildings => {
            for (name, info) in campus.buildings() {
                println!(
                    "{}\t{},{}",
                    name, info.coordinates.lon, info.coordinates.lat
                );
            }
        }
    }

    Ok(())
}

/// Load the day's lessons into a service and return the refreshed store.
fn status<B: RegistryBackend>(
    campus: Campus,
    backend: B,
    lessons: Vec<Lesson>,
    now: NaiveDateTime,
    strict: bool,
) -> Result<AvailabilityStore> {
    info!(%now, lessons = lessons.len(), "loading lessons");
    let service = AvailabilityService::new(campus, backend);
    let errors = service.reload(&lessons, now);
    if strict && !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Configuration errors: {}", messages.join("; "));
    }
    Ok(service.get_status(now))
}

fn load_campus(path: Option<&str>) -> Result<Campus> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path))?;
            Campus::from_json(&json).with_context(|| format!("Invalid campus catalog: {}", path))
        }
        None => Ok(Campus::pisa()),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
