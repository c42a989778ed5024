use anyhow::{Context, Result, anyhow, bail};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use super::{BATCH_SIZE, Direction, batch_ranges, distances_file_name};
use crate::distance::{Coordinate, DistanceMatrixResponse, Element, TravelMode};
use crate::runtime::Runtime;

/// One commute leg of one grid point. Values stay empty when the API found
/// no route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub address: Option<String>,
    /// Meters
    pub distance: Option<u64>,
    /// Seconds
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub lat: f64,
    pub lng: f64,
    /// Keyed by `{mode}-{direction}`, e.g. `driving-arrival`
    pub legs: BTreeMap<String, Leg>,
}

impl ResultRow {
    pub fn new(point: Coordinate) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            legs: BTreeMap::new(),
        }
    }
}

pub fn leg_key(mode: TravelMode, direction: Direction) -> String {
    format!("{}-{}", mode, direction)
}

/// Copies one saved payload into the rows of its batch.
///
/// Arrival payloads have one row per grid point (grid points are the
/// origins); departure payloads have a single row whose elements are the
/// grid points.
pub fn apply_payload(
    rows: &mut [ResultRow],
    range: &Range<usize>,
    mode: TravelMode,
    direction: Direction,
    payload: &DistanceMatrixResponse,
) -> Result<()> {
    let total = rows.len();
    let batch = rows.get_mut(range.clone()).ok_or_else(|| {
        anyhow!(
            "Batch {}-{} is outside the {} grid points",
            range.start,
            range.end,
            total
        )
    })?;

    let (addresses, elements): (&[String], Vec<&Element>) = match direction {
        Direction::Arrival => {
            let elements = payload
                .rows
                .iter()
                .map(|row| {
                    row.elements
                        .first()
                        .ok_or_else(|| anyhow!("Found a row without elements"))
                })
                .collect::<Result<Vec<_>>>()?;
            (payload.origin_addresses.as_slice(), elements)
        }
        Direction::Departure => {
            let [row] = payload.rows.as_slice() else {
                bail!(
                    "Expected exactly one row in a departure payload, found {}",
                    payload.rows.len()
                );
            };
            (
                payload.destination_addresses.as_slice(),
                row.elements.iter().collect(),
            )
        }
    };

    if addresses.len() > batch.len() || elements.len() > batch.len() {
        bail!(
            "Payload has {} addresses and {} elements for a batch of {} points",
            addresses.len(),
            elements.len(),
            batch.len()
        );
    }

    let key = leg_key(mode, direction);

    for (row, address) in batch.iter_mut().zip(addresses) {
        row.legs.entry(key.clone()).or_default().address = Some(address.clone());
    }

    for (row, element) in batch.iter_mut().zip(elements) {
        let leg = row.legs.entry(key.clone()).or_default();
        leg.distance = element.distance_meters();
        leg.duration = element.duration_seconds();
    }

    Ok(())
}

/// Rebuilds one row per grid point from the payloads `collect` saved.
#[tracing::instrument(skip(runtime, points, modes))]
pub fn assemble<R: Runtime>(
    runtime: &R,
    city_slug: &str,
    points: &[Coordinate],
    modes: &[TravelMode],
    data_dir: &Path,
) -> Result<Vec<ResultRow>> {
    let mut rows: Vec<ResultRow> = points.iter().copied().map(ResultRow::new).collect();
    let ranges = batch_ranges(points.len(), BATCH_SIZE);

    for mode in modes {
        info!("Mode = {}", mode);

        for range in &ranges {
            for direction in Direction::ALL {
                let path = data_dir.join(distances_file_name(city_slug, *mode, direction, range));

                let contents = runtime.read_to_string(&path).with_context(|| {
                    format!("Missing payload {:?}, run collect first", path)
                })?;
                let payload: DistanceMatrixResponse = serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse payload {:?}", path))?;

                apply_payload(&mut rows, range, *mode, direction, &payload)
                    .with_context(|| format!("Payload {:?} does not match its batch", path))?;
            }
        }
    }

    Ok(rows)
}
