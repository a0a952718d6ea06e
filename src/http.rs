use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const SERVICE_UNAVAILABLE: u16 = 503;
const NOT_FOUND: u16 = 404;

/// Status code and undecoded body of a single GET.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Anything that can perform a GET. `HttpTransport` in production, scripted fakes in tests.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = anyhow::Result<RawResponse>> + Send;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> anyhow::Result<RawResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {0}")]
    Status(u16),
    #[error("HTTP error {status} after {attempts} attempts")]
    Exhausted { attempts: u32, status: u16 },
    #[error("{0}")]
    Transport(String),
    #[error("invalid JSON: {0}")]
    Json(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status(NOT_FOUND))
    }
}

/// Attempt budget plus exponential backoff: attempt `n` (0-based) waits `base_delay * 2^n`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            retryable_statuses: vec![SERVICE_UNAVAILABLE],
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// GET `url` and return the decoded body text.
pub async fn fetch_text<T: Transport>(
    transport: &T,
    policy: &RetryPolicy,
    url: &str,
) -> Result<String, FetchError> {
    fetch_with(transport, policy, url, |body| Ok(decode_body(body))).await
}

/// GET `url` and parse the body as JSON. Unparseable bodies are retried like transport errors.
pub async fn fetch_json<T: Transport>(
    transport: &T,
    policy: &RetryPolicy,
    url: &str,
) -> Result<Value, FetchError> {
    fetch_with(transport, policy, url, |body| {
        serde_json::from_str(&decode_body(body)).map_err(|e| e.to_string())
    })
    .await
}

async fn fetch_with<T, R, F>(
    transport: &T,
    policy: &RetryPolicy,
    url: &str,
    parse: F,
) -> Result<R, FetchError>
where
    T: Transport,
    F: Fn(&[u8]) -> Result<R, String>,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        let (err, reason) = match transport.get(url).await {
            Ok(resp) if resp.status == 200 => match parse(&resp.body) {
                Ok(value) => return Ok(value),
                Err(e) => (FetchError::Json(e.clone()), e),
            },
            Ok(resp) if policy.is_retryable(resp.status) => (
                FetchError::Exhausted {
                    attempts,
                    status: resp.status,
                },
                format!("HTTP {}", resp.status),
            ),
            Ok(resp) => {
                warn!("Error {} for URL: {}", resp.status, url);
                return Err(FetchError::Status(resp.status));
            }
            Err(e) => {
                let msg = format!("{:#}", e);
                (FetchError::Transport(msg.clone()), msg)
            }
        };

        attempt += 1;
        if attempt >= attempts {
            warn!("Giving up on {} after {} attempts: {}", url, attempts, reason);
            return Err(err);
        }

        let backoff = policy.delay_for(attempt - 1);
        warn!(
            "{} for {} (attempt {}/{}), backing off {:.1}s",
            reason,
            url,
            attempt,
            attempts,
            backoff.as_secs_f64()
        );
        tokio::time::sleep(backoff).await;
    }
}

/// UTF-8 decode; on failure read the whole body as Latin-1, one char per byte.
pub fn decode_body(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => body.iter().map(|&b| char::from(b)).collect(),
    }
}
