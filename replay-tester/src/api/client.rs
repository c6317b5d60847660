use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::error::ApiError;
use super::ledger::LatencyLedger;
use crate::common::RequestTiming;

/// A response body: JSON when it parses, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    pub const fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The backend's `code` field, if the body carries one.
    pub fn code(&self) -> Option<i64> {
        self.json()?.get("code")?.as_i64()
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimedResponse {
    pub status: u16,
    pub body: Body,
    pub elapsed: Duration,
}

impl TimedResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// HTTP client that times every request and records it in the ledger.
#[derive(Debug)]
pub struct TimedClient {
    http: Client,
    ledger: LatencyLedger,
    timings: Mutex<Vec<RequestTiming>>,
}

impl TimedClient {
    pub fn new(ledger: LatencyLedger, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            ledger,
            timings: Mutex::new(Vec::new()),
        })
    }

    pub const fn http(&self) -> &Client {
        &self.http
    }

    /// Send the request, time it until the response head arrives, then read
    /// the body.
    pub async fn send(&self, request: RequestBuilder) -> Result<TimedResponse, ApiError> {
        let request = request.build()?;
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();

        let start = Instant::now();
        let sent = self.http.execute(request).await;
        let elapsed = start.elapsed();
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        if let Err(err) = self.ledger.record(&method, &url, ms) {
            warn!("failed to record latency for {method} {url}: {err}");
        }
        let status = sent.as_ref().ok().map(|res| res.status().as_u16());
        self.push_timing(RequestTiming {
            method: method.clone(),
            url: url.clone(),
            status,
            ms,
        });

        let response = sent?;
        let status = response.status().as_u16();
        let body = Body::parse(response.text().await?);
        debug!("{method} {url} -> {status} in {ms} ms");
        Ok(TimedResponse {
            status,
            body,
            elapsed,
        })
    }

    /// Timings recorded since the last call.
    pub fn take_timings(&self) -> Vec<RequestTiming> {
        self.timings
            .lock()
            .map(|mut timings| std::mem::take(&mut *timings))
            .unwrap_or_default()
    }

    fn push_timing(&self, timing: RequestTiming) {
        if let Ok(mut timings) = self.timings.lock() {
            timings.push(timing);
        }
    }
}
