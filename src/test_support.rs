//! In-process fakes shared by the unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::transport::{Transport, UpstreamResponse};
use crate::error::AppResult;

pub const BASE_URL: &str = "https://api.test/";

/// Transport that answers from a fixed URL → response table and records
/// every URL it was asked for. Unknown URLs answer 404.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
    calls: Arc<Mutex<Vec<String>>>,
    extra_headers: Arc<Mutex<HeaderMap>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remaining(self, header: &str, remaining: u32) -> Self {
        self.extra_headers.lock().unwrap().insert(
            HeaderName::from_bytes(header.as_bytes()).unwrap(),
            HeaderValue::from(remaining),
        );
        self
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.to_string()));
    }

    /// Hold the answer for `url` back by `delay`.
    pub fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    pub fn respond_json(&self, url: &str, body: Value) {
        self.respond(url, 200, &body.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> AppResult<UpstreamResponse> {
        self.calls.lock().unwrap().push(url.to_string());

        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let (status, body) = self
            .routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or((404, r#"{"message": "User does not exist or may have been deleted."}"#.to_string()));

        Ok(UpstreamResponse {
            method: Method::GET,
            url: url.to_string(),
            status: StatusCode::from_u16(status).unwrap(),
            headers: self.extra_headers.lock().unwrap().clone(),
            body,
        })
    }
}

/// A URL the fake serves for page `n` of a collection.
pub fn page_url(resource: &str, n: u32) -> String {
    format!("{}{}?per_page=100&page={}", BASE_URL, resource, n)
}

/// Upstream pagination envelope for page `page` of `pages`.
pub fn envelope(
    items_field: &str,
    items: Vec<Value>,
    page: u32,
    pages: u32,
    next: Option<String>,
) -> Value {
    let mut urls = serde_json::Map::new();
    if let Some(next) = next {
        urls.insert("next".to_string(), Value::String(next));
    }
    let mut body = serde_json::Map::new();
    body.insert(
        "pagination".to_string(),
        json!({
            "per_page": 100,
            "items": items.len(),
            "page": page,
            "pages": pages,
            "urls": urls,
        }),
    );
    body.insert(items_field.to_string(), Value::Array(items));
    Value::Object(body)
}

pub fn listing(id: i64, release_id: i64) -> Value {
    json!({
        "id": id,
        "condition": "Very Good Plus (VG+)",
        "sleeve_condition": "Very Good (VG)",
        "posted": "2024-03-01T10:00:00-08:00",
        "price": { "currency": "GBP", "value": 12.5 },
        "release": { "id": release_id, "description": format!("Release {}", release_id) },
        "seller": { "username": "recordshop", "avatar_url": "https://img.test/recordshop.png" },
    })
}

pub fn want(release_id: i64, date_added: DateTime<Utc>) -> Value {
    json!({ "id": release_id, "date_added": date_added.to_rfc3339() })
}
