//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section and field has a default, so a missing file or a partial one is
//! fine. Secrets (API keys) are referenced by env-var name in the config
//! and resolved at runtime. Command-line overrides are applied on top via
//! [`Overrides`], then [`AppConfig::validate`] checks the numeric ranges.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use tracing::debug;

use crate::platforms::bankr;
use crate::strategy::{KellyConfig, MatchEvaluator, RiskConfig};
use crate::types::TraderError;

pub const DEFAULT_ARENA_URL: &str = "https://savage-arena.vercel.app";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub arena: ArenaConfig,
    pub proxy: ProxyConfig,
    pub risk: RiskSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    /// Token wagered and reported.
    pub currency: String,
    pub poll_interval_secs: u64,
    /// Log wagers without sending them.
    pub dry_run: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "SAVAGE-TRADER".to_string(),
            currency: "SAVAGE".to_string(),
            poll_interval_secs: 5,
            dry_run: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ARENA_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Bankr transaction proxy, used as the balance source when enabled.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key_env: String,
    pub max_wait_secs: u64,
    pub poll_every_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: bankr::DEFAULT_BASE_URL.to_string(),
            api_key_env: "BANKR_API_KEY".to_string(),
            max_wait_secs: 60,
            poll_every_secs: 2,
        }
    }
}

impl ProxyConfig {
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn poll_every(&self) -> Duration {
        Duration::from_secs(self.poll_every_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RiskSettings {
    pub min_confidence: f64,
    pub max_wager_pct: f64,
    pub min_wager: f64,
    pub kelly_fraction: f64,
    pub stop_loss_pct: f64,
    pub max_consecutive_losses: u32,
    /// Empty result lookups tolerated after the arena moves on.
    pub max_result_attempts: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.55,
            max_wager_pct: 0.20,
            min_wager: 1.0,
            kelly_fraction: 0.25,
            stop_loss_pct: 0.50,
            max_consecutive_losses: 5,
            max_result_attempts: 12,
        }
    }
}

impl RiskSettings {
    pub fn kelly(&self) -> KellyConfig {
        KellyConfig {
            multiplier: self.kelly_fraction,
            max_wager_pct: self.max_wager_pct,
            min_wager: self.min_wager,
        }
    }

    pub fn stop_rules(&self) -> RiskConfig {
        RiskConfig {
            stop_loss_pct: self.stop_loss_pct,
            max_consecutive_losses: self.max_consecutive_losses,
            min_wager: self.min_wager,
        }
    }

    pub fn evaluator(&self) -> MatchEvaluator {
        MatchEvaluator::new(self.min_confidence)
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Values supplied on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub arena_url: Option<String>,
    pub min_confidence: Option<f64>,
    pub max_wager_pct: Option<f64>,
    pub kelly_fraction: Option<f64>,
    pub min_wager: Option<f64>,
    pub stop_loss_pct: Option<f64>,
    pub dry_run: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.arena_url {
            self.arena.base_url = url.clone();
        }
        if let Some(v) = overrides.min_confidence {
            self.risk.min_confidence = v;
        }
        if let Some(v) = overrides.max_wager_pct {
            self.risk.max_wager_pct = v;
        }
        if let Some(v) = overrides.kelly_fraction {
            self.risk.kelly_fraction = v;
        }
        if let Some(v) = overrides.min_wager {
            self.risk.min_wager = v;
        }
        if let Some(v) = overrides.stop_loss_pct {
            self.risk.stop_loss_pct = v;
        }
        if overrides.dry_run {
            self.agent.dry_run = true;
        }
    }

    /// Check every numeric setting against its allowed range.
    pub fn validate(&self) -> Result<(), TraderError> {
        let r = &self.risk;
        check_unit("min_confidence", r.min_confidence)?;
        check_unit("max_wager_pct", r.max_wager_pct)?;
        check_unit("kelly_fraction", r.kelly_fraction)?;
        check_unit("stop_loss_pct", r.stop_loss_pct)?;

        if !(r.min_wager > 0.0 && r.min_wager.is_finite()) {
            return Err(TraderError::Config(format!(
                "min_wager must be positive, got {}",
                r.min_wager
            )));
        }
        if r.max_consecutive_losses == 0 {
            return Err(TraderError::Config("max_consecutive_losses must be at least 1".into()));
        }
        if r.max_result_attempts == 0 {
            return Err(TraderError::Config("max_result_attempts must be at least 1".into()));
        }
        if self.agent.poll_interval_secs == 0 {
            return Err(TraderError::Config("poll_interval_secs must be positive".into()));
        }
        if self.arena.request_timeout_secs == 0 {
            return Err(TraderError::Config("request_timeout_secs must be positive".into()));
        }
        if self.proxy.enabled && self.proxy.poll_every_secs == 0 {
            return Err(TraderError::Config("proxy poll_every_secs must be positive".into()));
        }
        if self.agent.currency.trim().is_empty() {
            return Err(TraderError::Config("currency must not be empty".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.agent.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.arena.request_timeout_secs)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Resolve a secret referenced by env-var name.
    pub fn resolve_secret(env_name: &str) -> Result<SecretString> {
        Self::resolve_env(env_name).map(SecretString::new)
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), TraderError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TraderError::Config(format!("{name} must be within [0, 1], got {value}")))
    }
}
