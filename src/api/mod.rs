use serde_json::Value;
use std::{thread, time::Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod models;
mod params;
pub use models::*;
pub use params::*;

use crate::{
    config::{Config, RetryPolicy},
    shared::InvalidArgument,
};

const USER_AGENT: &str = concat!("hk_carpark/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Response from {url} is not valid JSON: {source}")]
    Body {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Response from {url} has no results array")]
    MissingResults { url: String },
}

impl FetchError {
    /// Timeouts, connection problems and 5xx/429 responses are worth
    /// another attempt, everything else fails the same way twice.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Blocking client for the carpark info/vacancy API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one dataset and returns its `results` array untouched.
    pub fn fetch(&self, query: &Query) -> Result<Vec<Value>, Error> {
        let url = query.to_url(&self.base_url).map_err(FetchError::from)?;
        let now = Instant::now();
        let body = self.get_text(url.as_str())?;
        let results = parse_results(url.as_str(), &body)?;
        info!(
            "Fetched {} {} records for {} in {:?}",
            results.len(),
            query.dataset.as_str(),
            query.vehicle_type,
            now.elapsed()
        );
        Ok(results)
    }

    /// Same as [`Client::fetch`] but takes the parameters as plain strings.
    /// All three enumerations are checked before anything goes on the wire.
    pub fn fetch_str(
        &self,
        dataset: &str,
        vehicle_type: &str,
        lang: &str,
        carpark_ids: Option<&[String]>,
        extent: Option<&str>,
    ) -> Result<Vec<Value>, Error> {
        let dataset: Dataset = dataset.parse()?;
        let vehicle_type: VehicleType = vehicle_type.parse()?;
        let lang: Lang = lang.parse()?;
        let query = Query::new(dataset, vehicle_type, lang)
            .carpark_ids(carpark_ids.unwrap_or_default().iter().cloned())
            .extent(extent.map(str::to_string));
        self.fetch(&query)
    }

    /// GET with the configured timeout and retry policy, returning the body.
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.try_get_text(url) {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        "{err}, retrying in {backoff:?} ({attempt}/{})",
                        self.retry.max_retries
                    );
                    thread::sleep(backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn try_get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|err| FetchError::from_reqwest(url, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .text()
            .map_err(|err| FetchError::from_reqwest(url, err))
    }
}

fn parse_results(url: &str, body: &str) -> Result<Vec<Value>, FetchError> {
    let mut value: Value = serde_json::from_str(body).map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;
    match value.get_mut("results").map(Value::take) {
        Some(Value::Array(results)) => Ok(results),
        _ => Err(FetchError::MissingResults {
            url: url.to_string(),
        }),
    }
}

#[test]
fn results_are_returned_verbatim() {
    let body = r#"{"results":[{"park_Id":"10","extra":{"a":1}},{"park_Id":"11"}]}"#;
    let results = parse_results("http://test", body).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["extra"]["a"], 1);
}

#[test]
fn body_without_results_fails() {
    let err = parse_results("http://test", r#"{"error":"x"}"#).unwrap_err();
    assert!(matches!(err, FetchError::MissingResults { .. }));
    let err = parse_results("http://test", "<html>").unwrap_err();
    assert!(matches!(err, FetchError::Body { .. }));
}

#[test]
fn retryable_statuses() {
    let status = |status| FetchError::Status {
        url: String::new(),
        status,
    };
    assert!(status(503).is_retryable());
    assert!(status(429).is_retryable());
    assert!(!status(404).is_retryable());
    assert!(!FetchError::MissingResults { url: String::new() }.is_retryable());
}
