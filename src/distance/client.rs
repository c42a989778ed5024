//! Distance Matrix client with retry and response classification.

use log::{debug, info};
use reqwest::Url;

use super::error::DistanceMatrixError;
use super::response::{DistanceMatrixResponse, ResponseStatus};
use super::types::{BatchRequest, Coordinate, TimeAnchor, TravelMode};
use crate::config::{API_KEY_SETTING, Settings, mask_secret};
use crate::http::{Outcome, RetryError, RetryPolicy, TransientFailure, Transport, with_backoff};
use crate::runtime::Runtime;

pub const DISTANCE_MATRIX_BASE_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

pub struct DistanceMatrixClient<T: Transport, R: Runtime> {
    transport: T,
    runtime: R,
    api_key: String,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl<T: Transport, R: Runtime> DistanceMatrixClient<T, R> {
    /// Fails when the settings carry no API key.
    pub fn new(settings: &Settings, transport: T, runtime: R) -> Result<Self, DistanceMatrixError> {
        let api_key = settings.get(API_KEY_SETTING).ok_or_else(|| {
            DistanceMatrixError::Configuration(format!(
                "Could not find key '{}' in the settings",
                API_KEY_SETTING
            ))
        })?;

        debug!("Using {}: {}", API_KEY_SETTING, mask_secret(api_key));

        Ok(Self {
            transport,
            runtime,
            api_key: api_key.to_string(),
            base_url: DISTANCE_MATRIX_BASE_URL.to_string(),
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Full request URL. All parameters, credential included, are encoded
    /// together in one pass.
    pub fn request_url(&self, request: &BatchRequest) -> Result<Url, DistanceMatrixError> {
        let mut params = request.query_params();
        params.push(("key", self.api_key.clone()));

        Url::parse_with_params(&self.base_url, &params).map_err(|e| {
            DistanceMatrixError::Configuration(format!(
                "Invalid base URL '{}': {}",
                self.base_url, e
            ))
        })
    }

    /// Validates the arguments, then runs the request with retries.
    #[tracing::instrument(skip(self, origins, destinations))]
    pub async fn query(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
        mode: TravelMode,
        arrival_time: Option<i64>,
        departure_time: Option<i64>,
    ) -> Result<DistanceMatrixResponse, DistanceMatrixError> {
        let anchor = TimeAnchor::from_options(arrival_time, departure_time)?;
        let request = BatchRequest::new(origins.to_vec(), destinations.to_vec(), mode, anchor)?;
        self.execute(&request).await
    }

    /// Runs an already validated request, retrying transient failures.
    #[tracing::instrument(skip(self, request))]
    pub async fn execute(
        &self,
        request: &BatchRequest,
    ) -> Result<DistanceMatrixResponse, DistanceMatrixError> {
        let url = self.request_url(request)?;

        info!(
            "Querying {} origin(s) x {} destination(s) ({} elements), mode {}",
            request.origins().len(),
            request.destinations().len(),
            request.element_count(),
            request.mode()
        );

        with_backoff(
            &self.runtime,
            &self.retry_policy,
            "Distance Matrix request",
            || self.attempt(&url),
        )
        .await
        .map_err(|e| match e {
            RetryError::Permanent(e) => e,
            RetryError::Exhausted {
                attempts,
                last_cause,
            } => DistanceMatrixError::RetryExhausted {
                attempts,
                last_cause,
            },
        })
    }

    /// One request, classified.
    async fn attempt(&self, url: &Url) -> Outcome<DistanceMatrixResponse, DistanceMatrixError> {
        let body = match self.transport.get_text(url).await {
            Ok(body) => body,
            Err(e) => return Outcome::Transient(TransientFailure::Transport(e)),
        };
        classify_response(&body)
    }
}

/// Sorts a response body into success, retryable, or final failure.
pub fn classify_response(body: &str) -> Outcome<DistanceMatrixResponse, DistanceMatrixError> {
    let response: DistanceMatrixResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => return Outcome::Permanent(DistanceMatrixError::Decode(e.to_string())),
    };

    match response.response_status() {
        ResponseStatus::Ok => Outcome::Success(response),
        status if status.is_retryable() => Outcome::Transient(TransientFailure::UnknownError),
        _ => Outcome::Permanent(DistanceMatrixError::Api {
            message: response.error_message_or_status(),
            status: response.status,
        }),
    }
}
