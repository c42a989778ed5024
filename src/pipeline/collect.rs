use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;

use super::{BATCH_SIZE, Direction, batch_ranges, distances_file_name, write_json_file};
use crate::city::City;
use crate::distance::{
    Coordinate, DistanceMatrixClient, DistanceMatrixResponse, ResponseStatus, TravelMode,
};
use crate::http::Transport;
use crate::runtime::Runtime;
use crate::schedule::CommuteTimes;

/// One city's worth of queries.
pub struct CollectJob<'a> {
    pub city: &'a City,
    pub points: &'a [Coordinate],
    pub modes: &'a [TravelMode],
    pub times: CommuteTimes,
    pub data_dir: &'a Path,
    /// Query again even when the payload file already exists
    pub force: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectSummary {
    pub fetched: usize,
    pub skipped: usize,
}

/// Whether `path` holds a saved payload that parses and carries status `OK`.
pub fn is_complete_payload<R: Runtime>(runtime: &R, path: &Path) -> bool {
    runtime
        .read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<DistanceMatrixResponse>(&contents).ok())
        .is_some_and(|payload| payload.response_status() == ResponseStatus::Ok)
}

/// Queries every mode x batch x direction for the job and saves each payload
/// under the data directory. Stops at the first failed query; payloads
/// already written stay on disk, so a rerun resumes where it stopped.
#[tracing::instrument(skip(client, job))]
pub async fn collect<T: Transport, R: Runtime>(
    client: &DistanceMatrixClient<T, R>,
    job: &CollectJob<'_>,
) -> Result<CollectSummary> {
    let runtime = client.runtime();
    let slug = job.city.slug();
    let city_hall = [job.city.city_hall];
    let ranges = batch_ranges(job.points.len(), BATCH_SIZE);

    runtime.create_dir_all(job.data_dir)?;

    info!(
        "City = {} ({} points in {} batches)",
        job.city.name,
        job.points.len(),
        ranges.len()
    );

    let mut summary = CollectSummary::default();

    for mode in job.modes {
        info!("Mode = {}", mode);

        for range in &ranges {
            info!("Slice = {}:{}", range.start, range.end - 1);
            let slice = &job.points[range.clone()];

            for direction in Direction::ALL {
                let path = job
                    .data_dir
                    .join(distances_file_name(&slug, *mode, direction, range));

                if !job.force && runtime.exists(&path) {
                    if is_complete_payload(runtime, &path) {
                        debug!("Skipping {:?}, already collected", path);
                        summary.skipped += 1;
                        continue;
                    }
                    warn!("Payload {:?} is incomplete, querying again", path);
                }

                info!("Direction = {}", direction);

                let response = match direction {
                    Direction::Arrival => {
                        client
                            .query(slice, &city_hall, *mode, Some(job.times.arrival), None)
                            .await
                    }
                    Direction::Departure => {
                        client
                            .query(&city_hall, slice, *mode, None, Some(job.times.departure))
                            .await
                    }
                }
                .with_context(|| {
                    format!(
                        "Failed to query {} {} distances for points {}-{}",
                        mode,
                        direction,
                        range.start,
                        range.end - 1
                    )
                })?;

                let json = serde_json::to_string_pretty(&response)?;
                write_json_file(runtime, &path, &json)?;
                summary.fetched += 1;
            }
        }
    }

    info!(
        "Collected {} payload(s), skipped {} existing",
        summary.fetched, summary.skipped
    );

    Ok(summary)
}
