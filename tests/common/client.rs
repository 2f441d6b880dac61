//! HTTP client for end-to-end tests
//!
//! High-level wrapper around reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

use std::time::Duration;

use reqwest::Response;
use serde_json::{json, Value};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// HTTP test client identifying itself via the X-User-Id header
pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn analyze_mood(&self, mood: &str, user_id: Option<&str>) -> Response {
        let mut request = self
            .client
            .post(format!("{}/mood/analyze", self.base_url))
            .json(&json!({ "mood_input": mood }));
        if let Some(user_id) = user_id {
            request = request.header("X-User-Id", user_id);
        }
        request.send().await.expect("Request failed")
    }

    pub async fn save_suggestions(&self, user_id: Option<&str>, body: &Value) -> Response {
        let mut request = self
            .client
            .post(format!("{}/suggestions", self.base_url))
            .json(body);
        if let Some(user_id) = user_id {
            request = request.header("X-User-Id", user_id);
        }
        request.send().await.expect("Request failed")
    }

    pub async fn recent_suggestions(&self, user_id: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/suggestions/recent", self.base_url));
        if let Some(user_id) = user_id {
            request = request.header("X-User-Id", user_id);
        }
        request.send().await.expect("Request failed")
    }

    pub async fn cache_stats(&self, user_id: Option<&str>) -> Response {
        let mut request = self.client.get(format!("{}/cache/stats", self.base_url));
        if let Some(user_id) = user_id {
            request = request.header("X-User-Id", user_id);
        }
        request.send().await.expect("Request failed")
    }
}
