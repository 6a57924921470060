//! Remote audio fetches over `reqwest`
//!
//! Each attempt is classified as done, retryable or fatal. Timeouts,
//! connection failures, `429` and `5xx` are retried with the caller's
//! [`RetryPolicy`]; every other status is returned for the decoder to judge.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("voicecut/", env!("CARGO_PKG_VERSION"));

/// Outcome of a single request.
#[derive(Debug)]
enum Attempt {
    Done(HttpResponse),
    Retry(BridgeError),
    Fatal(BridgeError),
}

/// Desktop `HttpClient` with pooled TLS connections.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Whole-request timeout; a request's own timeout takes precedence.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client configuration");
                Client::new()
            });
        Self { client }
    }

    async fn send_once(&self, request: &HttpRequest) -> Attempt {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return classify_transport_error(e),
        };

        let status = response.status().as_u16();
        if is_retryable_status(status) {
            return Attempt::Retry(BridgeError::OperationFailed(format!("HTTP {}", status)));
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();

        // A body cut short by a dropped connection is worth another try.
        match response.bytes().await {
            Ok(body) => Attempt::Done(HttpResponse {
                status,
                headers,
                body,
            }),
            Err(e) => classify_transport_error(e),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry(request, RetryPolicy::default())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let attempts = policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.send_once(&request).await {
                Attempt::Done(response) => {
                    debug!(
                        status = response.status,
                        bytes = response.body.len(),
                        attempt,
                        "Fetched remote audio"
                    );
                    return Ok(response);
                }
                Attempt::Fatal(e) => return Err(e),
                Attempt::Retry(e) if attempt == attempts => {
                    warn!(attempt, error = %e, "Giving up on remote audio");
                    return Err(e);
                }
                Attempt::Retry(e) => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying remote audio fetch"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(BridgeError::OperationFailed(
            "no fetch attempt was made".to_string(),
        ))
    }
}

fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Errors never carry the URL, which may hold a presigned credential.
fn classify_transport_error(e: reqwest::Error) -> Attempt {
    if e.is_timeout() {
        Attempt::Retry(BridgeError::OperationFailed("request timed out".to_string()))
    } else if e.is_connect() {
        Attempt::Retry(BridgeError::OperationFailed("connection failed".to_string()))
    } else if e.is_body() || e.is_request() {
        Attempt::Retry(BridgeError::OperationFailed(
            "connection dropped mid-transfer".to_string(),
        ))
    } else {
        Attempt::Fatal(BridgeError::OperationFailed(e.without_url().to_string()))
    }
}
