use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level `status` of a Distance Matrix response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    InvalidRequest,
    MaxElementsExceeded,
    MaxDimensionsExceeded,
    OverDailyLimit,
    OverQueryLimit,
    RequestDenied,
    UnknownError,
    Other(String),
}

impl ResponseStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "OK" => ResponseStatus::Ok,
            "INVALID_REQUEST" => ResponseStatus::InvalidRequest,
            "MAX_ELEMENTS_EXCEEDED" => ResponseStatus::MaxElementsExceeded,
            "MAX_DIMENSIONS_EXCEEDED" => ResponseStatus::MaxDimensionsExceeded,
            "OVER_DAILY_LIMIT" => ResponseStatus::OverDailyLimit,
            "OVER_QUERY_LIMIT" => ResponseStatus::OverQueryLimit,
            "REQUEST_DENIED" => ResponseStatus::RequestDenied,
            "UNKNOWN_ERROR" => ResponseStatus::UnknownError,
            other => ResponseStatus::Other(other.to_string()),
        }
    }

    /// Only `UNKNOWN_ERROR` is worth another attempt; every other failure
    /// status is the API's definitive answer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResponseStatus::UnknownError)
    }
}

/// Response payload, kept close to the API schema so it can be persisted
/// verbatim. Fields this crate does not read land in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub origin_addresses: Vec<String>,
    #[serde(default)]
    pub destination_addresses: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DistanceMatrixResponse {
    pub fn response_status(&self) -> ResponseStatus {
        ResponseStatus::parse(&self.status)
    }

    /// The API's own explanation, or the bare status when it sent none.
    pub fn error_message_or_status(&self) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| self.status.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub elements: Vec<Element>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Measure>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Element {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }

    /// Distance in meters, when the route was found.
    pub fn distance_meters(&self) -> Option<u64> {
        self.is_ok()
            .then(|| self.distance.as_ref().map(|d| d.value))
            .flatten()
    }

    /// Travel time in seconds, when the route was found.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.is_ok()
            .then(|| self.duration.as_ref().map(|d| d.value))
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
