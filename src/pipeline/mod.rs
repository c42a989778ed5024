//! Batch collection and result assembly around the distance client.
//!
//! Grid points are sliced into batches, each batch is queried once per
//! travel mode and direction, and each payload is saved as its own file.
//! Assembly reads those files back into one row per grid point.

mod assemble;
mod collect;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::Path;

use crate::distance::{Coordinate, MAX_ELEMENTS, TravelMode};
use crate::runtime::Runtime;

pub use assemble::{Leg, ResultRow, apply_payload, assemble, leg_key};
pub use collect::{CollectJob, CollectSummary, collect, is_complete_payload};

/// Grid points per request. The other side of every request is the single
/// city hall, so a batch may use the whole element allowance.
pub const BATCH_SIZE: usize = MAX_ELEMENTS;

/// Which way the commute runs relative to the reference location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Grid point to city hall, arriving by the morning anchor
    Arrival,
    /// City hall to grid point, leaving at the evening anchor
    Departure,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Arrival, Direction::Departure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Arrival => "arrival",
            Direction::Departure => "departure",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits `0..len` into consecutive ranges of at most `size` items.
pub fn batch_ranges(len: usize, size: usize) -> Vec<Range<usize>> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}

pub fn points_file_name(city_slug: &str) -> String {
    format!("points-{}.json", city_slug)
}

pub fn results_file_name(city_slug: &str) -> String {
    format!("results-{}.json", city_slug)
}

/// `distances-{slug}-{mode}-{direction}-{first}-{last}.json`, with an
/// inclusive last index.
pub fn distances_file_name(
    city_slug: &str,
    mode: TravelMode,
    direction: Direction,
    range: &Range<usize>,
) -> String {
    format!(
        "distances-{}-{}-{}-{}-{}.json",
        city_slug,
        mode,
        direction,
        range.start,
        range.end.saturating_sub(1)
    )
}

/// Writes JSON to `{path}.tmp` and renames it into place, so an interrupted
/// run never leaves a truncated file under the final name.
pub fn write_json_file<R: Runtime>(runtime: &R, path: &Path, json: &str) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    runtime.write(&tmp_path, json.as_bytes())?;
    runtime.rename(&tmp_path, path)?;
    Ok(())
}

/// Reads grid points: a JSON array of `{"lat": .., "lng": ..}` objects.
#[tracing::instrument(skip(runtime))]
pub fn read_points<R: Runtime>(runtime: &R, path: &Path) -> Result<Vec<Coordinate>> {
    let contents = runtime
        .read_to_string(path)
        .with_context(|| format!("Failed to read grid points from {:?}", path))?;
    let points: Vec<Coordinate> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse grid points in {:?}", path))?;
    Ok(points)
}
