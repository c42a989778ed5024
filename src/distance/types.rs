use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ValidationError;

/// Largest number of origin x destination pairs one request may carry.
pub const MAX_ELEMENTS: usize = 100;

/// WGS84 position in degrees. No normalization is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Plain decimal notation that always carries a decimal point: `40.0`,
/// `-73.95`, `0.00001`. Never an exponent.
fn format_degrees(value: f64) -> String {
    let mut text = value.to_string();
    if text.bytes().any(|b| b.is_ascii_digit()) && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// `lat,lng` as the API expects it.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", format_degrees(self.lat), format_degrees(self.lng))
    }
}

/// Joins coordinates into the pipe-separated list used by `origins` and
/// `destinations`.
pub fn join_coordinates(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(Coordinate::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Driving,
        TravelMode::Walking,
        TravelMode::Bicycling,
        TravelMode::Transit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownMode(s.to_string()))
    }
}

/// The single point in time a request is anchored to, in Unix epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAnchor {
    Arrival(i64),
    Departure(i64),
}

impl TimeAnchor {
    /// Exactly one of the two must be given.
    pub fn from_options(
        arrival_time: Option<i64>,
        departure_time: Option<i64>,
    ) -> Result<Self, ValidationError> {
        match (arrival_time, departure_time) {
            (Some(at), None) => Ok(TimeAnchor::Arrival(at)),
            (None, Some(dt)) => Ok(TimeAnchor::Departure(dt)),
            (Some(_), Some(_)) => Err(ValidationError::ConflictingTimeAnchors),
            (None, None) => Err(ValidationError::MissingTimeAnchor),
        }
    }

    pub fn param_name(&self) -> &'static str {
        match self {
            TimeAnchor::Arrival(_) => "arrival_time",
            TimeAnchor::Departure(_) => "departure_time",
        }
    }

    pub fn epoch_seconds(&self) -> i64 {
        match self {
            TimeAnchor::Arrival(t) | TimeAnchor::Departure(t) => *t,
        }
    }
}

/// A validated batch. Only [`BatchRequest::new`] creates one, so every
/// instance satisfies the request-shape limits of the API.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    origins: Vec<Coordinate>,
    destinations: Vec<Coordinate>,
    mode: TravelMode,
    anchor: TimeAnchor,
}

impl BatchRequest {
    pub fn new(
        origins: Vec<Coordinate>,
        destinations: Vec<Coordinate>,
        mode: TravelMode,
        anchor: TimeAnchor,
    ) -> Result<Self, ValidationError> {
        if origins.is_empty() {
            return Err(ValidationError::EmptyOrigins);
        }
        if destinations.is_empty() {
            return Err(ValidationError::EmptyDestinations);
        }
        if origins.len().saturating_mul(destinations.len()) > MAX_ELEMENTS {
            return Err(ValidationError::TooManyElements {
                origins: origins.len(),
                destinations: destinations.len(),
            });
        }

        Ok(Self {
            origins,
            destinations,
            mode,
            anchor,
        })
    }

    pub fn origins(&self) -> &[Coordinate] {
        &self.origins
    }

    pub fn destinations(&self) -> &[Coordinate] {
        &self.destinations
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn element_count(&self) -> usize {
        self.origins.len() * self.destinations.len()
    }

    /// Query parameters without the credential.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("origins", join_coordinates(&self.origins)),
            ("destinations", join_coordinates(&self.destinations)),
            ("mode", self.mode.to_string()),
            (
                self.anchor.param_name(),
                self.anchor.epoch_seconds().to_string(),
            ),
        ]
    }
}
