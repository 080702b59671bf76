//! Session stop conditions.
//!
//! Enforces stop-loss, loss-streak, and minimum-balance limits. Any
//! trigger halts the whole run, not just the current match.

use std::fmt;

use tracing::warn;

use crate::types::SessionStats;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Stop when balance has fallen by at least this fraction of the start balance.
    pub stop_loss_pct: f64,
    /// Stop after this many losses in a row.
    pub max_consecutive_losses: u32,
    /// Stop when the balance can no longer cover one minimum wager.
    pub min_wager: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: 0.50,
            max_consecutive_losses: 5,
            min_wager: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Stop reasons
// ---------------------------------------------------------------------------

/// Why the session halted.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    StopLoss { loss_pct: f64 },
    LossStreak { count: u32 },
    InsufficientBalance { balance: f64, min_wager: f64 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StopLoss { loss_pct } => {
                write!(f, "stop loss triggered: {:.1}% loss", loss_pct * 100.0)
            }
            StopReason::LossStreak { count } => {
                write!(f, "max consecutive losses reached: {count}")
            }
            StopReason::InsufficientBalance { balance, min_wager } => {
                write!(f, "insufficient balance: {balance:.2} < {min_wager:.2}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Risk manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Check stop conditions in order: stop-loss, loss streak, balance.
    /// Stop-loss is only checked once a positive start balance is known.
    pub fn should_stop(&self, stats: &SessionStats, balance: f64) -> Option<StopReason> {
        if let Some(start) = stats.start_balance.filter(|s| *s > 0.0) {
            let loss_pct = 1.0 - balance / start;
            if loss_pct >= self.config.stop_loss_pct {
                let reason = StopReason::StopLoss { loss_pct };
                warn!(start_balance = start, balance, "{reason}");
                return Some(reason);
            }
        }

        if stats.consecutive_losses >= self.config.max_consecutive_losses {
            let reason = StopReason::LossStreak {
                count: stats.consecutive_losses,
            };
            warn!("{reason}");
            return Some(reason);
        }

        if balance < self.config.min_wager {
            let reason = StopReason::InsufficientBalance {
                balance,
                min_wager: self.config.min_wager,
            };
            warn!("{reason}");
            return Some(reason);
        }

        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
