//! Entry points behind the CLI subcommands.

use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

use crate::city::{CITIES, City, find_city};
use crate::config::Settings;
use crate::distance::{DistanceMatrixClient, TravelMode};
use crate::http::HttpClient;
use crate::pipeline::{
    self, CollectJob, points_file_name, read_points, results_file_name, write_json_file,
};
use crate::runtime::Runtime;
use crate::schedule::CommuteSchedule;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub data_dir: PathBuf,
    pub config: PathBuf,
    /// Overrides the Distance Matrix endpoint
    pub api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub city: String,
    pub points: Option<PathBuf>,
    /// Empty means every mode
    pub modes: Vec<TravelMode>,
    pub schedule: CommuteSchedule,
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub city: String,
    pub points: Option<PathBuf>,
    pub modes: Vec<TravelMode>,
}

fn resolve_city(name: &str) -> Result<&'static City> {
    find_city(name).ok_or_else(|| {
        let known: Vec<&str> = CITIES.iter().map(|c| c.name).collect();
        anyhow!("Unknown city '{}'. Known cities: {}", name, known.join(", "))
    })
}

fn resolve_modes(modes: &[TravelMode]) -> Vec<TravelMode> {
    if modes.is_empty() {
        return TravelMode::ALL.to_vec();
    }
    let mut modes = modes.to_vec();
    modes.sort();
    modes.dedup();
    modes
}

fn points_path(data_dir: &Path, points: Option<PathBuf>, city: &City) -> PathBuf {
    points.unwrap_or_else(|| data_dir.join(points_file_name(&city.slug())))
}

/// Queries and saves every payload for one city.
#[tracing::instrument(skip(runtime))]
pub async fn collect<R: Runtime>(
    runtime: R,
    global: &GlobalOptions,
    options: CollectOptions,
) -> Result<()> {
    let city = resolve_city(&options.city)?;

    let settings = Settings::load(&runtime, &global.config)?;
    let transport = HttpClient::with_user_agent()?;
    let mut client = DistanceMatrixClient::new(&settings, transport, runtime)?;
    if let Some(api_url) = &global.api_url {
        client = client.with_base_url(api_url.as_str());
    }

    let points_path = points_path(&global.data_dir, options.points, city);
    let points = read_points(client.runtime(), &points_path)?;
    let times = options.schedule.resolve(city.timezone)?;
    let modes = resolve_modes(&options.modes);

    let summary = pipeline::collect(
        &client,
        &CollectJob {
            city,
            points: &points,
            modes: &modes,
            times,
            data_dir: &global.data_dir,
            force: options.force,
        },
    )
    .await?;

    println!(
        "Collected {} payload(s) for {} ({} already present) in {}",
        summary.fetched,
        city.name,
        summary.skipped,
        global.data_dir.display()
    );
    Ok(())
}

/// Turns saved payloads into `results-{slug}.json`.
#[tracing::instrument(skip(runtime))]
pub fn assemble<R: Runtime>(
    runtime: R,
    global: &GlobalOptions,
    options: AssembleOptions,
) -> Result<()> {
    let city = resolve_city(&options.city)?;
    let slug = city.slug();

    let points_path = points_path(&global.data_dir, options.points, city);
    let points = read_points(&runtime, &points_path)?;
    let modes = resolve_modes(&options.modes);

    let rows = pipeline::assemble(&runtime, &slug, &points, &modes, &global.data_dir)?;

    let results_path = global.data_dir.join(results_file_name(&slug));
    let json = serde_json::to_string_pretty(&rows)?;
    write_json_file(&runtime, &results_path, &json)?;

    println!("Wrote {} rows to {}", rows.len(), results_path.display());
    Ok(())
}
