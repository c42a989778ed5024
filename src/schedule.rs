//! Commute times: a workday plus local clock times, resolved to epoch seconds
//! in the city's time zone.

use anyhow::{Context, Result};
use jiff::civil::{Date, Time, date, time};
use jiff::tz::TimeZone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommuteSchedule {
    pub workday: Date,
    /// Local time the inbound commute must arrive by
    pub arrive_by: Time,
    /// Local time the outbound commute leaves
    pub depart_at: Time,
}

impl Default for CommuteSchedule {
    /// Wednesday, Dec 2 2020, working 9 to 5.
    fn default() -> Self {
        Self {
            workday: date(2020, 12, 2),
            arrive_by: time(9, 0, 0, 0),
            depart_at: time(17, 0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommuteTimes {
    pub arrival: i64,
    pub departure: i64,
}

impl CommuteSchedule {
    pub fn resolve(&self, timezone: &str) -> Result<CommuteTimes> {
        let tz = TimeZone::get(timezone)
            .with_context(|| format!("Unknown time zone '{}'", timezone))?;

        let arrival = self
            .workday
            .to_datetime(self.arrive_by)
            .to_zoned(tz.clone())
            .context("Failed to resolve arrival time")?;
        let departure = self
            .workday
            .to_datetime(self.depart_at)
            .to_zoned(tz)
            .context("Failed to resolve departure time")?;

        Ok(CommuteTimes {
            arrival: arrival.timestamp().as_second(),
            departure: departure.timestamp().as_second(),
        })
    }
}
