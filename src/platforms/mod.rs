//! External collaborators.
//!
//! Defines the traits the engine relies on and provides implementations for:
//! - Arena: match snapshots, results, bet placement, and balance (HTTP)
//! - Bankr: transaction proxy used as an alternate balance source

pub mod arena;
pub mod bankr;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{BetReceipt, Match, MatchResult};

/// Source of match snapshots and outcomes.
///
/// `Ok(None)` means the source answered but had nothing to report.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// The match currently on offer, if any.
    async fn fetch_current_match(&self) -> Result<Option<Match>>;

    /// Declared winner of a match, if already known.
    async fn fetch_match_result(&self, match_id: &str) -> Result<Option<MatchResult>>;
}

/// Somewhere a wager can be placed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WageringSink: Send + Sync {
    async fn place_bet(&self, match_id: &str, team_idx: usize, amount: f64) -> Result<BetReceipt>;
}

/// Current spendable balance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn get_balance(&self) -> Result<f64>;
}
