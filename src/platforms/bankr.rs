//! Bankr transaction proxy.
//!
//! Bankr executes natural-language jobs against the agent's wallet.
//! A job is submitted, then polled until it completes, fails, or the
//! wait budget runs out. Only the balance query is used here; the
//! balance must come back as a structured numeric field.
//!
//! Base URL: https://api.bankr.bot
//! Auth: `Authorization: Bearer {key}`

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::BalanceSource;
use crate::types::TraderError;

pub const DEFAULT_BASE_URL: &str = "https://api.bankr.bot";

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(default)]
    job_id: Option<String>,
}

/// Job state as reported by `/agent/job/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Where a job stands after one poll.
#[derive(Debug, Clone, PartialEq)]
enum JobState {
    Pending,
    Completed,
    Failed,
}

impl Job {
    fn state(&self) -> JobState {
        match self.status.as_str() {
            "completed" => JobState::Completed,
            "failed" | "cancelled" => JobState::Failed,
            _ => JobState::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct BankrClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    token: String,
    chain: String,
    max_wait: Duration,
    poll_every: Duration,
}

impl BankrClient {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        token: &str,
        max_wait: Duration,
        poll_every: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("arena-trader/0.1.0")
            .build()
            .context("Failed to build HTTP client for Bankr")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            token: token.to_string(),
            chain: "Base".to_string(),
            max_wait,
            poll_every,
        })
    }

    /// Submit a job and return its id.
    pub async fn submit_job(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/agent/submit", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&SubmitRequest { prompt })
            .send()
            .await
            .context("Bankr submit request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(TraderError::Proxy(format!("submit returned {status}")).into());
        }

        let body: SubmitResponse = resp
            .json()
            .await
            .context("Failed to parse Bankr submit response")?;

        body.job_id
            .ok_or_else(|| TraderError::Proxy("submit response has no jobId".into()).into())
    }

    /// Poll a job until it finishes or `max_wait` elapses.
    /// Transient poll errors are logged and retried within the budget.
    pub async fn poll_job(&self, job_id: &str) -> Result<Job> {
        let url = format!("{}/agent/job/{}", self.base_url, urlencoding::encode(job_id));
        let deadline = Instant::now() + self.max_wait;

        while Instant::now() < deadline {
            match self.fetch_job(&url).await {
                Ok(job) => match job.state() {
                    JobState::Completed => return Ok(job),
                    JobState::Failed => {
                        let reason = job.error.unwrap_or_else(|| job.status.clone());
                        return Err(TraderError::Proxy(format!("job {job_id} {reason}")).into());
                    }
                    JobState::Pending => debug!(job_id, status = %job.status, "Job pending"),
                },
                Err(e) => warn!(job_id, error = %e, "Bankr poll error"),
            }
            tokio::time::sleep(self.poll_every).await;
        }

        Err(TraderError::Proxy(format!("job {job_id} timed out")).into())
    }

    async fn fetch_job(&self, url: &str) -> Result<Job> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .context("Bankr poll request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(TraderError::Proxy(format!("poll returned {status}")).into());
        }

        resp.json().await.context("Failed to parse Bankr job")
    }

    /// Submit and wait for completion.
    pub async fn execute(&self, prompt: &str) -> Result<Job> {
        let job_id = self.submit_job(prompt).await?;
        debug!(job_id = %job_id, "Bankr job submitted");
        self.poll_job(&job_id).await
    }
}

#[async_trait]
impl BalanceSource for BankrClient {
    async fn get_balance(&self) -> Result<f64> {
        let prompt = format!("What is my {} balance on {}?", self.token, self.chain);
        let job = self.execute(&prompt).await?;

        job.result
            .as_ref()
            .and_then(structured_balance)
            .ok_or_else(|| TraderError::Proxy("job result has no numeric balance".into()).into())
    }
}

/// Read a balance from a job result: either the result itself is a
/// number, or it is an object with a numeric (or numeric-string)
/// `balance` field.
fn structured_balance(result: &Value) -> Option<f64> {
    let field = match result {
        Value::Object(map) => map.get("balance")?,
        other => other,
    };
    let balance: Option<f64> = match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    };
    balance.filter(|b| b.is_finite() && *b >= 0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
