use crate::http::TransientFailure;

/// A request that breaks the API's shape rules. Always a caller bug, never
/// sent over the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyOrigins,
    EmptyDestinations,
    /// More than 100 origin x destination pairs
    TooManyElements { origins: usize, destinations: usize },
    UnknownMode(String),
    MissingTimeAnchor,
    ConflictingTimeAnchors,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyOrigins => write!(f, "At least one origin is required"),
            ValidationError::EmptyDestinations => {
                write!(f, "At least one destination is required")
            }
            ValidationError::TooManyElements {
                origins,
                destinations,
            } => write!(
                f,
                "{} origins x {} destinations exceeds the limit of {} elements per request",
                origins,
                destinations,
                super::MAX_ELEMENTS
            ),
            ValidationError::UnknownMode(mode) => write!(
                f,
                "Unknown travel mode '{}' (expected driving, walking, bicycling or transit)",
                mode
            ),
            ValidationError::MissingTimeAnchor => {
                write!(f, "Either an arrival time or a departure time is required")
            }
            ValidationError::ConflictingTimeAnchors => {
                write!(f, "Arrival time and departure time are mutually exclusive")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Everything a distance query can fail with. Transient failures never
/// appear here on their own; they are retried and only surface as the last
/// cause of [`DistanceMatrixError::RetryExhausted`].
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceMatrixError {
    /// The credential is missing from the settings
    Configuration(String),
    /// The request was rejected before any network I/O
    Validation(ValidationError),
    /// The API answered with a non-retryable status
    Api { status: String, message: String },
    /// Transient failures outlasted the backoff schedule
    RetryExhausted {
        attempts: u32,
        last_cause: TransientFailure,
    },
    /// The response body did not match the expected schema
    Decode(String),
}

impl std::fmt::Display for DistanceMatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMatrixError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            DistanceMatrixError::Validation(e) => write!(f, "Invalid request: {}", e),
            DistanceMatrixError::Api { message, .. } => write!(f, "{}", message),
            DistanceMatrixError::RetryExhausted {
                attempts,
                last_cause,
            } => write!(
                f,
                "Too many retry attempts ({} attempts, last error: {})",
                attempts, last_cause
            ),
            DistanceMatrixError::Decode(msg) => {
                write!(f, "Failed to parse Distance Matrix response: {}", msg)
            }
        }
    }
}

impl std::error::Error for DistanceMatrixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DistanceMatrixError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for DistanceMatrixError {
    fn from(e: ValidationError) -> Self {
        DistanceMatrixError::Validation(e)
    }
}
