//! HTTP client wrapper that retries failed requests with backoff.

use log::{debug, warn};
use reqwest::Client;

use crate::retry::{NetworkError, RetryPolicy};
use crate::transport::{Method, ReqwestTransport, RequestOptions, Response, Transport};

/// HTTP client that retries transport failures with exponential backoff.
///
/// Wraps a [`Transport`] and re-issues failed attempts until the policy's
/// attempt budget is spent, then surfaces a single [`NetworkError`]
/// chaining the last transport failure. Successful responses are returned
/// as-is, whatever their status.
#[derive(Clone)]
pub struct RetryingClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl RetryingClient<ReqwestTransport> {
    /// Creates a retrying client over the given reqwest Client.
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self::with_transport(ReqwestTransport::new(client), policy)
    }
}

impl<T: Transport> RetryingClient<T> {
    /// Creates a retrying client over a custom transport.
    pub fn with_transport(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Performs a request, retrying transport failures with backoff.
    ///
    /// Attempts run strictly sequentially; the wait between them is a
    /// non-blocking sleep, so concurrent callers sharing this client are
    /// unaffected.
    #[tracing::instrument(skip(self, options))]
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        debug!("{} {}...", method, url);

        let mut attempt = 0;
        loop {
            match self.transport.send(method, url, options).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.policy.max_retries() {
                        return Err(NetworkError::new(attempt, err));
                    }

                    let delay = self.policy.backoff_delay(attempt);
                    warn!(
                        "{} {}: attempt {}/{} failed ({}), retrying in {:.1}s...",
                        method,
                        url,
                        attempt,
                        self.policy.max_retries(),
                        err,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Performs a GET request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn get(&self, url: &str, options: &RequestOptions) -> Result<Response, NetworkError> {
        self.execute(Method::Get, url, options).await
    }

    /// Performs a POST request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn post(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        self.execute(Method::Post, url, options).await
    }

    /// Performs a PUT request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn put(&self, url: &str, options: &RequestOptions) -> Result<Response, NetworkError> {
        self.execute(Method::Put, url, options).await
    }

    /// Performs a DELETE request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn delete(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        self.execute(Method::Delete, url, options).await
    }

    /// Performs an OPTIONS request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn options(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        self.execute(Method::Options, url, options).await
    }

    /// Performs a HEAD request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn head(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        self.execute(Method::Head, url, options).await
    }

    /// Performs a TRACE request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn trace(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        self.execute(Method::Trace, url, options).await
    }

    /// Performs a PATCH request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn patch(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        self.execute(Method::Patch, url, options).await
    }

    /// Performs a QUERY request with retries.
    #[tracing::instrument(skip(self, options))]
    pub async fn query(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        self.execute(Method::Query, url, options).await
    }
}
