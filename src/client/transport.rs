use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};

use crate::config::Config;
use crate::error::{AppResult, RequestError};

/// A fully read upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl UpstreamResponse {
    pub fn into_request_error(self) -> RequestError {
        RequestError {
            method: self.method,
            url: self.url,
            status: self.status,
            body: self.body,
        }
    }
}

/// Issues GET requests against the upstream API.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> AppResult<UpstreamResponse>;
}

/// reqwest-backed transport. The request timeout bounds every call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> AppResult<UpstreamResponse> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        // the requested URL, not the one a redirect ended on
        Ok(UpstreamResponse {
            method: Method::GET,
            url: url.to_string(),
            status,
            headers,
            body,
        })
    }
}
