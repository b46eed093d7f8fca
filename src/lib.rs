//! Resilient HTTP requests: a thin client wrapper that retries transport
//! failures with exponential backoff and jitter.

pub mod client;
pub mod retry;
pub mod transport;

pub use client::RetryingClient;
pub use retry::{NetworkError, RetryPolicy};
pub use transport::{Method, ReqwestTransport, RequestOptions, Response, Transport, TransportError};
