//! cycledata – rapport for én aktivitet fra en JSON-dump av rå-records.
//!
//! Bruk: cycledata <records.json> [--profile profil.json] [--mass kg] [--size m] [--ign] [--metrics]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use cycledata_core::{
    load_profile, print_activity_report, records_from_json, CachedElevationProvider,
    CyclistProfile, IgnElevationClient, Pipeline, PipelineCounters,
};

#[derive(Parser, Debug)]
#[command(
    name = "cycledata",
    about = "Ride report from raw cycling telemetry (JSON array of records)"
)]
struct Cli {
    /// JSON-fil med rå-records
    records: PathBuf,

    /// Rytterprofil (JSON); default-profil hvis utelatt
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Overstyr rytterens masse (kg)
    #[arg(long)]
    mass: Option<f64>,

    /// Overstyr rytterens høyde (m)
    #[arg(long)]
    size: Option<f64>,

    /// Korriger høyde mot IGN-tjenesten
    #[arg(long)]
    ign: bool,

    /// Skriv prometheus-tellere etter rapporten
    #[arg(long)]
    metrics: bool,
}

impl Cli {
    fn resolve_profile(&self) -> Result<CyclistProfile> {
        let mut profile = match &self.profile {
            Some(p) => load_profile(p)?,
            None => CyclistProfile::default(),
        };
        if let Some(m) = self.mass {
            profile.mass = m;
        }
        if let Some(s) = self.size {
            profile.size = s;
        }
        profile.validate()?;
        Ok(profile)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let profile = cli.resolve_profile()?;

    let json = std::fs::read_to_string(&cli.records)
        .with_context(|| format!("reading {}", cli.records.display()))?;
    let records = records_from_json(&json)?;

    let counters = PipelineCounters::new().map_err(|e| anyhow::anyhow!("counters: {e}"))?;
    let ign = CachedElevationProvider::new(IgnElevationClient::new()).with_counters(counters.clone());

    let mut pipeline = Pipeline::new(profile).with_counters(&counters);
    if cli.ign {
        pipeline = pipeline.with_elevation(&ign);
    }
    let activity = pipeline.run(&records)?;

    print_activity_report(&activity);
    if cli.metrics {
        print!("{}", counters.render());
    }
    Ok(())
}
