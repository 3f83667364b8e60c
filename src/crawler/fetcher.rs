use crate::config::HttpConfig;
use crate::crawler::decode::decode_body;
use crate::limiter::RateLimiter;
use crate::retry::{AttemptOutcome, FailureKind, RetryError, RetryExecutor, RetryPolicy};
use crate::url::normalize_seed;
use crate::Result;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Media type prefixes and subtypes that cannot yield useful text
const UNUSABLE_TYPE_PREFIXES: &[&str] = &["image/", "audio/", "video/", "font/"];
const UNUSABLE_TYPES: &[&str] = &[
    "application/pdf",
    "application/zip",
    "application/octet-stream",
];

/// A successfully fetched and decoded page
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects
    pub url: String,
    /// Content-Type as reported by the server, if any
    pub content_type: Option<String>,
    /// Decoded page text
    pub text: String,
}

/// Why a page could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The URL could not be normalized into a fetchable form
    InvalidUrl,
    /// The server answered with a definitive 4xx/5xx rejection
    HttpStatus(u16),
    /// The response body is a media type with no extractable text
    UnusableContentType,
    /// A non-transient transport failure
    Network,
    /// Every retry attempt failed with a transient error
    RetriesExhausted,
    /// No decoding strategy produced readable text
    Undecodable,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl => write!(f, "invalid URL"),
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::UnusableContentType => write!(f, "unusable content type"),
            Self::Network => write!(f, "network error"),
            Self::RetriesExhausted => write!(f, "retries exhausted"),
            Self::Undecodable => write!(f, "undecodable response body"),
        }
    }
}

/// Result of one fetch, after retries and decoding
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(RawPage),
    Unavailable {
        reason: UnavailableReason,
        detail: String,
    },
}

impl FetchOutcome {
    /// Consumes the outcome, yielding the page if the fetch succeeded
    pub fn page(self) -> Option<RawPage> {
        match self {
            Self::Success(page) => Some(page),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Raw bytes of a completed HTTP exchange, before decoding
#[derive(Debug)]
struct FetchedBody {
    final_url: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Polite HTTP fetcher
///
/// Every request passes the shared rate limiter, then a minimum-gap pacer,
/// before going on the wire. Transient failures (timeouts, connection
/// errors) are retried with a constant delay; definitive 4xx/5xx rejections
/// are never retried. Successful bodies run through the decode fallback
/// chain before being returned.
pub struct Fetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
    http: HttpConfig,
    last_request: Mutex<Option<Instant>>,
}

impl Fetcher {
    /// Creates a fetcher over a shared rate limiter
    ///
    /// # Arguments
    /// * `config` - HTTP behavior settings (timeout, retries, pacing, UA)
    /// * `limiter` - Limiter shared by every component that touches the wire
    pub fn new(config: &HttpConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            limiter,
            http: config.clone(),
            last_request: Mutex::new(None),
        })
    }

    /// Fetches a URL, producing decoded text or a tagged unavailability
    ///
    /// # Arguments
    /// * `url` - Target URL; bare hostnames get an https scheme
    /// * `timeout_override` - Per-request deadline replacing the configured
    ///   one (used by bounded sub-crawls like pricing confirmation)
    pub async fn fetch(&self, url: &str, timeout_override: Option<Duration>) -> FetchOutcome {
        let target = match normalize_seed(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                return FetchOutcome::Unavailable {
                    reason: UnavailableReason::InvalidUrl,
                    detail: format!("{}: {}", url, err),
                }
            }
        };

        let policy = RetryPolicy::new(self.http.max_retries, self.http.retry_delay())
            .with_retryable([FailureKind::Timeout, FailureKind::Connection]);
        let mut executor = RetryExecutor::new(policy);

        // Fatal attempts stash their reason here so the terminal outcome can
        // carry more than a message string.
        let fatal_reason: Mutex<Option<UnavailableReason>> = Mutex::new(None);

        let result = executor
            .execute(|| self.attempt(target.clone(), timeout_override, &fatal_reason))
            .await;

        match result {
            Ok(body) => match decode_body(&body.bytes, body.content_type.as_deref()) {
                Some(text) => {
                    tracing::debug!("Fetched {} ({} chars)", body.final_url, text.len());
                    FetchOutcome::Success(RawPage {
                        url: body.final_url,
                        content_type: body.content_type,
                        text,
                    })
                }
                None => FetchOutcome::Unavailable {
                    reason: UnavailableReason::Undecodable,
                    detail: format!(
                        "no decoding strategy produced readable text for {}",
                        body.final_url
                    ),
                },
            },
            Err(RetryError::Exhausted { attempts, last }) => FetchOutcome::Unavailable {
                reason: UnavailableReason::RetriesExhausted,
                detail: format!("{} attempts failed, last error: {}", attempts, last),
            },
            Err(RetryError::Fatal { message }) => {
                let reason = fatal_reason
                    .lock()
                    .unwrap()
                    .take()
                    .unwrap_or(UnavailableReason::Network);
                FetchOutcome::Unavailable {
                    reason,
                    detail: message,
                }
            }
        }
    }

    /// One request attempt: limiter admission, pacing gap, then the exchange
    async fn attempt(
        &self,
        url: url::Url,
        timeout_override: Option<Duration>,
        fatal_reason: &Mutex<Option<UnavailableReason>>,
    ) -> AttemptOutcome<FetchedBody> {
        self.limiter.acquire(true).await;
        self.pace().await;

        let mut request = self.client.get(url);
        if let Some(limit) = timeout_override {
            request = request.timeout(limit);
        }

        let response = request.send().await;
        *self.last_request.lock().unwrap() = Some(Instant::now());

        let response = match response {
            Ok(response) => response,
            Err(err) => return classify_transport_error(err),
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            *fatal_reason.lock().unwrap() = Some(UnavailableReason::HttpStatus(status.as_u16()));
            return AttemptOutcome::FatalFailure {
                message: format!("HTTP {} for {}", status.as_u16(), response.url()),
            };
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(content_type) = &content_type {
            if is_unusable_content_type(content_type) {
                *fatal_reason.lock().unwrap() = Some(UnavailableReason::UnusableContentType);
                return AttemptOutcome::FatalFailure {
                    message: format!("unusable content type '{}'", content_type),
                };
            }
        }

        let final_url = response.url().to_string();
        match response.bytes().await {
            Ok(bytes) => AttemptOutcome::Success(FetchedBody {
                final_url,
                content_type,
                bytes: bytes.to_vec(),
            }),
            // A body that dies mid-stream is as transient as a reset
            Err(err) => AttemptOutcome::RetryableFailure {
                kind: FailureKind::Connection,
                message: format!("body read failed: {}", err),
            },
        }
    }

    /// Sleeps out the remainder of the configured gap since the last request
    async fn pace(&self) {
        let wait = {
            let last = self.last_request.lock().unwrap();
            last.and_then(|at| self.http.request_gap().checked_sub(at.elapsed()))
        };

        if let Some(wait) = wait {
            if !wait.is_zero() {
                tracing::trace!("Pacing: waiting {:?} before next request", wait);
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Builds the HTTP client with browser-like default headers
///
/// Accept-Encoding is left to the client: its gzip and brotli support
/// negotiates compression and transparently decompresses well-behaved
/// responses. The decode fallback chain only sees bodies that servers
/// mislabeled.
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

fn classify_transport_error(err: reqwest::Error) -> AttemptOutcome<FetchedBody> {
    if err.is_timeout() {
        AttemptOutcome::RetryableFailure {
            kind: FailureKind::Timeout,
            message: format!("request timed out: {}", err),
        }
    } else if err.is_connect() {
        AttemptOutcome::RetryableFailure {
            kind: FailureKind::Connection,
            message: format!("connection failed: {}", err),
        }
    } else if err.status() == Some(StatusCode::REQUEST_TIMEOUT) {
        AttemptOutcome::RetryableFailure {
            kind: FailureKind::ServerTimeout,
            message: format!("server-side timeout: {}", err),
        }
    } else {
        AttemptOutcome::FatalFailure {
            message: format!("request failed: {}", err),
        }
    }
}

/// Rejects media types that can never contain extractable page text
fn is_unusable_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase();

    UNUSABLE_TYPE_PREFIXES
        .iter()
        .any(|prefix| essence.starts_with(prefix))
        || UNUSABLE_TYPES.contains(&essence.as_str())
}
