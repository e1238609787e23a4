//! Async HTTP client wrapping the enroll portal's JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use enroll_core::{
  applicant::{AdmissionStatus, ApplicantRecord},
  gate::LoginGrant,
  store::PartitionCounts,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Connection settings for the portal API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub email:    String,
  pub password: String,
}

/// What `/api/admissions/{id}/approve` reports back.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalResponse {
  pub record:             ApplicantRecord,
  pub generated_password: String,
}

/// Async HTTP client for the portal, authenticated as staff.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
  token:  Option<String>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config, token: None })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// `POST /api/session` with the admin role; stores the bearer token.
  pub async fn login(&mut self) -> Result<LoginGrant> {
    let resp = self
      .client
      .post(self.url("/session"))
      .json(&json!({
        "email":    self.config.email,
        "password": self.config.password,
        "role":     "admin",
      }))
      .send()
      .await
      .context("POST /session failed")?;

    if !resp.status().is_success() {
      let status = resp.status();
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_owned))
        .unwrap_or_else(|| status.to_string());
      return Err(anyhow!("login failed: {message}"));
    }

    let grant: LoginGrant = resp.json().await.context("deserialising login grant")?;
    self.token = Some(grant.token.to_string());
    Ok(grant)
  }

  // ── Admissions ────────────────────────────────────────────────────────────

  /// `GET /api/admissions?status=<status>`
  pub async fn list_admissions(
    &self,
    status: AdmissionStatus,
  ) -> Result<Vec<ApplicantRecord>> {
    let resp = self
      .auth(self.client.get(self.url("/admissions")))
      .query(&[("status", status.as_str())])
      .send()
      .await
      .context("GET /admissions failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /admissions → {}", resp.status()));
    }
    resp.json().await.context("deserialising admissions")
  }

  /// `GET /api/admissions/counts[?wait=true]`
  ///
  /// With `wait`, the portal parks the request until the partition sizes
  /// change or its wait window lapses; the 30-second client timeout
  /// leaves room for that window.
  pub async fn counts(&self, wait: bool) -> Result<PartitionCounts> {
    let mut req = self.auth(self.client.get(self.url("/admissions/counts")));
    if wait {
      req = req.query(&[("wait", "true")]);
    }
    let resp = req.send().await.context("GET /admissions/counts failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /admissions/counts → {}", resp.status()));
    }
    resp.json().await.context("deserialising counts")
  }

  /// `POST /api/admissions/{id}/approve`
  pub async fn approve(&self, id: Uuid) -> Result<ApprovalResponse> {
    let resp = self
      .auth(self.client.post(self.url(&format!("/admissions/{id}/approve"))))
      .send()
      .await
      .context("POST approve failed")?;

    if !resp.status().is_success() {
      let status = resp.status();
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_owned))
        .unwrap_or_else(|| status.to_string());
      return Err(anyhow!("{message}"));
    }
    resp.json().await.context("deserialising approval")
  }

  /// `POST /api/admissions/{id}/reject`
  pub async fn reject(&self, id: Uuid) -> Result<ApplicantRecord> {
    let resp = self
      .auth(self.client.post(self.url(&format!("/admissions/{id}/reject"))))
      .send()
      .await
      .context("POST reject failed")?;

    if !resp.status().is_success() {
      let status = resp.status();
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_owned))
        .unwrap_or_else(|| status.to_string());
      return Err(anyhow!("{message}"));
    }
    resp.json().await.context("deserialising record")
  }
}
