//! HTTP transport and retry logic with transient-failure classification.

mod client;
mod retry;

pub use client::{HttpClient, Transport, TransportError};
#[cfg(test)]
pub use client::MockTransport;
pub use retry::{
    Backoff, INITIAL_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS, Outcome, RetryError, RetryPolicy,
    TransientFailure, with_backoff,
};
