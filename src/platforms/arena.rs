//! Arena HTTP integration.
//!
//! Endpoints:
//! - `GET  /api/match/current`       match on offer
//! - `GET  /api/match/{id}/result`   declared winner
//! - `POST /api/bet`                 place a winner bet
//! - `GET  /api/balance`             agent balance
//!
//! Auth: `Authorization: Bearer {session}` plus `X-Agent-Id: {session}`.
//! The session token is generated once per process.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{BalanceSource, MatchSource, WageringSink};
use crate::types::{BetReceipt, Fighter, Match, MatchResult, MatchStatus, Team, TraderError};

const PLATFORM_NAME: &str = "arena";

/// Odds assumed for a team the arena didn't price.
const DEFAULT_ODDS: f64 = 1.0;

// ---------------------------------------------------------------------------
// API response types (arena JSON → Rust)
// ---------------------------------------------------------------------------

/// Match ids arrive as strings (`"SAVAGE-42"`) or bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ArenaTeam {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    fighters: Vec<Fighter>,
    #[serde(default)]
    odds: Option<f64>,
}

/// Two-sided odds: `{"A": 1.9, "B": 2.1}`.
#[derive(Debug, Default, Deserialize)]
struct SideOdds {
    #[serde(rename = "A", default)]
    a: Option<f64>,
    #[serde(rename = "B", default)]
    b: Option<f64>,
}

/// The match snapshot. The arena serves either a `teams` array or the
/// two-sided `teamA` / `teamB` layout with a separate `odds` object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArenaMatch {
    #[serde(default)]
    match_id: Option<RawId>,
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    teams: Vec<ArenaTeam>,
    #[serde(default)]
    team_a: Option<ArenaTeam>,
    #[serde(default)]
    team_b: Option<ArenaTeam>,
    #[serde(default)]
    odds: Option<SideOdds>,
}

impl ArenaMatch {
    /// Normalise into a `Match`. `None` when the payload carries no id.
    fn into_match(self) -> Option<Match> {
        let id = self.match_id.or(self.id)?.into_string();
        let status = self
            .status
            .map(MatchStatus::from)
            .unwrap_or(MatchStatus::Unknown);

        let raw_teams: Vec<(ArenaTeam, Option<f64>)> = if !self.teams.is_empty() {
            self.teams.into_iter().map(|t| (t, None)).collect()
        } else {
            let odds = self.odds.unwrap_or_default();
            [(self.team_a, odds.a), (self.team_b, odds.b)]
                .into_iter()
                .filter_map(|(team, side_odds)| team.map(|t| (t, side_odds)))
                .collect()
        };

        let teams = raw_teams
            .into_iter()
            .enumerate()
            .map(|(i, (team, side_odds))| Team {
                name: team.name.unwrap_or_else(|| format!("Team {i}")),
                odds: team.odds.or(side_odds).unwrap_or(DEFAULT_ODDS),
                fighters: team.fighters,
            })
            .collect();

        Some(Match { id, status, teams })
    }
}

/// Winner as a team index or as a side letter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawWinner {
    Index(u64),
    Label(String),
}

impl RawWinner {
    fn team_index(&self) -> Option<usize> {
        match self {
            RawWinner::Index(i) => usize::try_from(*i).ok(),
            RawWinner::Label(s) => match s.trim() {
                "A" | "a" => Some(0),
                "B" | "b" => Some(1),
                other => other.parse().ok(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArenaResult {
    #[serde(default)]
    winner: Option<RawWinner>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BetRequest<'a> {
    match_id: &'a str,
    team: usize,
    amount: f64,
    currency: &'a str,
    #[serde(rename = "type")]
    bet_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct PlacedBet {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BetConfirmation {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    bets: Vec<PlacedBet>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Balance response. Either a flat `balance` or a per-token `balances` map.
#[derive(Debug, Deserialize)]
struct ArenaBalance {
    #[serde(default)]
    balance: Option<f64>,
    #[serde(default)]
    balances: Option<HashMap<String, f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Arena API client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ArenaClient {
    http: Client,
    base_url: String,
    session_id: String,
    currency: String,
}

impl ArenaClient {
    pub fn new(base_url: &str, timeout: Duration, currency: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("arena-trader/0.1.0")
            .build()
            .context("Failed to build HTTP client for arena")?;

        let session_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        info!(base_url, session_id = %session_id, "Arena client ready");

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id,
            currency: currency.to_string(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.session_id)
            .header("X-Agent-Id", &self.session_id)
    }

    /// Send and reject non-2xx responses.
    async fn send(req: RequestBuilder, what: &str) -> Result<Response> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("Arena {what} request failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TraderError::Platform {
                platform: PLATFORM_NAME.to_string(),
                message: format!("{what} returned {status}: {body}"),
            }
            .into());
        }

        Ok(resp)
    }
}

#[async_trait]
impl MatchSource for ArenaClient {
    async fn fetch_current_match(&self) -> Result<Option<Match>> {
        let url = format!("{}/api/match/current", self.base_url);
        debug!(url = %url, "Fetching current match");

        let resp = Self::send(self.http.get(&url), "current match").await?;
        let raw: ArenaMatch = resp
            .json()
            .await
            .context("Failed to parse arena match response")?;

        Ok(raw.into_match())
    }

    async fn fetch_match_result(&self, match_id: &str) -> Result<Option<MatchResult>> {
        let url = format!(
            "{}/api/match/{}/result",
            self.base_url,
            urlencoding::encode(match_id)
        );
        debug!(url = %url, "Fetching match result");

        let resp = Self::send(self.http.get(&url), "match result").await?;
        let raw: ArenaResult = resp
            .json()
            .await
            .context("Failed to parse arena result response")?;

        Ok(raw
            .winner
            .and_then(|w| w.team_index())
            .map(|winner| MatchResult {
                match_id: match_id.to_string(),
                winner,
            }))
    }
}

#[async_trait]
impl WageringSink for ArenaClient {
    async fn place_bet(&self, match_id: &str, team_idx: usize, amount: f64) -> Result<BetReceipt> {
        let url = format!("{}/api/bet", self.base_url);
        let body = BetRequest {
            match_id,
            team: team_idx,
            amount,
            currency: &self.currency,
            bet_type: "winner",
        };

        let resp = Self::send(self.authed(self.http.post(&url)).json(&body), "bet").await?;
        let confirmation: BetConfirmation = resp
            .json()
            .await
            .context("Failed to parse arena bet confirmation")?;

        if confirmation.success == Some(false) {
            return Err(TraderError::Platform {
                platform: PLATFORM_NAME.to_string(),
                message: confirmation
                    .error
                    .or(confirmation.message)
                    .unwrap_or_else(|| "bet rejected".to_string()),
            }
            .into());
        }

        let bet_id = confirmation
            .bets
            .into_iter()
            .find_map(|b| b.id)
            .unwrap_or_else(|| format!("{match_id}-{team_idx}"));

        Ok(BetReceipt {
            bet_id,
            match_id: match_id.to_string(),
            team_idx,
            amount,
            placed_at: Utc::now(),
        })
    }
}

#[async_trait]
impl BalanceSource for ArenaClient {
    async fn get_balance(&self) -> Result<f64> {
        let url = format!("{}/api/balance", self.base_url);
        let resp = Self::send(self.authed(self.http.get(&url)), "balance").await?;
        let value: Value = resp
            .json()
            .await
            .context("Failed to parse arena balance response")?;

        parse_balance(value, &self.currency)
    }
}

fn parse_balance(value: Value, currency: &str) -> Result<f64> {
    let raw: ArenaBalance =
        serde_json::from_value(value).context("Unexpected arena balance payload")?;

    raw.balance
        .or_else(|| raw.balances.and_then(|b| b.get(currency).copied()))
        .ok_or_else(|| {
            TraderError::Platform {
                platform: PLATFORM_NAME.to_string(),
                message: format!("no {currency} balance in response"),
            }
            .into()
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
