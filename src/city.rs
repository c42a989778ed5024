//! Reference cities: where commutes start or end, and which clock they run on.

use crate::distance::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub city_hall: Coordinate,
    /// IANA time zone name
    pub timezone: &'static str,
}

impl City {
    /// `"New York City"` -> `"new-york-city"`
    pub fn slug(&self) -> String {
        slugify(self.name)
    }
}

/// The ten most populated cities in the U.S.
pub const CITIES: &[City] = &[
    City {
        name: "New York City",
        city_hall: Coordinate::new(40.7128, -74.0060),
        timezone: "America/New_York",
    },
    City {
        name: "Los Angeles",
        city_hall: Coordinate::new(34.0522, -118.2437),
        timezone: "America/Los_Angeles",
    },
    City {
        name: "Chicago",
        city_hall: Coordinate::new(41.8781, -87.6298),
        timezone: "America/Chicago",
    },
    City {
        name: "Houston",
        city_hall: Coordinate::new(29.7604, -95.3698),
        timezone: "America/Chicago",
    },
    City {
        name: "Phoenix",
        city_hall: Coordinate::new(33.4484, -112.0740),
        timezone: "America/Phoenix",
    },
    City {
        name: "Philadelphia",
        city_hall: Coordinate::new(39.9526, -75.1652),
        timezone: "America/New_York",
    },
    City {
        name: "San Antonio",
        city_hall: Coordinate::new(29.4241, -98.4936),
        timezone: "America/Chicago",
    },
    City {
        name: "San Diego",
        city_hall: Coordinate::new(32.7157, -117.1611),
        timezone: "America/Los_Angeles",
    },
    City {
        name: "Dallas",
        city_hall: Coordinate::new(32.7767, -96.7970),
        timezone: "America/Chicago",
    },
    City {
        name: "San Jose",
        city_hall: Coordinate::new(37.3382, -121.8863),
        timezone: "America/Los_Angeles",
    },
];

pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Looks a city up by display name or slug, ignoring case.
pub fn find_city(query: &str) -> Option<&'static City> {
    let wanted = slugify(query);
    CITIES.iter().find(|city| city.slug() == wanted)
}
