//! Google Distance Matrix queries.
//!
//! [`DistanceMatrixClient`] turns a batch of origins and destinations into a
//! single successful response, retrying transient failures on a fixed
//! exponential schedule and refusing to retry failures that cannot resolve
//! on their own.

mod client;
mod error;
mod response;
mod types;

pub use client::{DISTANCE_MATRIX_BASE_URL, DistanceMatrixClient, classify_response};
pub use error::{DistanceMatrixError, ValidationError};
pub use response::{DistanceMatrixResponse, Element, Measure, ResponseStatus, Row};
pub use types::{BatchRequest, Coordinate, MAX_ELEMENTS, TimeAnchor, TravelMode, join_coordinates};
