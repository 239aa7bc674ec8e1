use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{DATE, HeaderMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::cache::{Quota, QuotaStore};
use crate::client::transport::{Transport, UpstreamResponse};
use crate::config::Config;
use crate::error::AppResult;

/// Throttles every outbound call to one upstream host.
///
/// The quota it reads is whatever the last response reported; nothing here
/// ever guesses or decrements it.
pub struct RateLimitGate {
    quota: Arc<dyn QuotaStore>,
    timeout: Duration,
    remaining_header: String,
    // held from await_slot until the response is recorded
    permit: Mutex<()>,
}

impl RateLimitGate {
    pub fn new(quota: Arc<dyn QuotaStore>, timeout: Duration, remaining_header: &str) -> Self {
        Self {
            quota,
            timeout,
            remaining_header: remaining_header.to_string(),
            permit: Mutex::new(()),
        }
    }

    pub fn from_config(quota: Arc<dyn QuotaStore>, config: &Config) -> Self {
        Self::new(
            quota,
            config.ratelimit_timeout(),
            &config.ratelimit_remaining_header,
        )
    }

    /// Suspend the caller until the upstream budget allows another call.
    pub async fn await_slot(&self) {
        let quota = self.quota.load().await;
        let wait = wait_duration(quota.as_ref(), self.timeout, Utc::now());

        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Upstream quota exhausted, waiting");
            tokio::time::sleep(wait).await;
        }
    }

    /// Store the quota reported by a response. Missing or malformed headers
    /// leave the current quota untouched.
    pub async fn record_response(&self, headers: &HeaderMap) {
        let Some(remaining) = parse_remaining(headers, &self.remaining_header) else {
            return;
        };

        let request_time = parse_date(headers).unwrap_or_else(Utc::now);
        self.quota
            .store(Quota::new(remaining, request_time), self.timeout)
            .await;
    }

    /// Run one upstream call under the gate: wait for a slot, send, record.
    pub async fn gated<F, Fut>(&self, send: F) -> AppResult<UpstreamResponse>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<UpstreamResponse>> + Send,
    {
        let _permit = self.permit.lock().await;

        self.await_slot().await;

        let response = send().await?;
        self.record_response(&response.headers).await;

        Ok(response)
    }
}

/// How long a caller must wait before the next call.
///
/// Zero when no quota is known or requests remain, otherwise the rest of the
/// timeout window measured from the last request. A last-request time ahead of
/// `now` counts as no time elapsed.
pub fn wait_duration(quota: Option<&Quota>, timeout: Duration, now: DateTime<Utc>) -> Duration {
    let Some(quota) = quota.filter(|q| q.is_exhausted()) else {
        return Duration::ZERO;
    };

    let elapsed = now
        .signed_duration_since(quota.last_request_time_utc)
        .to_std()
        .unwrap_or(Duration::ZERO);

    timeout.saturating_sub(elapsed)
}

pub fn parse_remaining(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u32>()
        .ok()
}

pub fn parse_date(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let raw = headers.get(DATE)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Transport decorator that routes every request through a [`RateLimitGate`].
pub struct GatedTransport<T> {
    inner: T,
    gate: Arc<RateLimitGate>,
}

impl<T: Transport> GatedTransport<T> {
    pub fn new(inner: T, gate: Arc<RateLimitGate>) -> Self {
        Self { inner, gate }
    }
}

#[async_trait]
impl<T: Transport> Transport for GatedTransport<T> {
    async fn get(&self, url: &str) -> AppResult<UpstreamResponse> {
        self.gate.gated(|| self.inner.get(url)).await
    }
}
