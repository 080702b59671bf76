//! Bet executor.
//!
//! Hands sized tickets to the wagering sink. In dry-run mode the sink is
//! never called and a synthetic receipt is returned, so the session still
//! tracks the simulated bet.

use anyhow::Result;
use tracing::{info, warn};

use super::session::BetTicket;
use crate::platforms::WageringSink;
use crate::types::BetReceipt;

pub struct Executor {
    sink: Box<dyn WageringSink>,
    dry_run: bool,
}

impl Executor {
    pub fn new(sink: Box<dyn WageringSink>, dry_run: bool) -> Self {
        Self { sink, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Place one ticket.
    pub async fn place(&self, ticket: &BetTicket) -> Result<BetReceipt> {
        if self.dry_run {
            info!(
                match_id = %ticket.match_id,
                team = %ticket.team_name,
                amount = format!("{:.2}", ticket.amount),
                odds = format!("{:.2}", ticket.odds),
                "[DRY RUN] Would place bet"
            );
            return Ok(BetReceipt::dry_run(&ticket.match_id, ticket.team_idx, ticket.amount));
        }

        match self
            .sink
            .place_bet(&ticket.match_id, ticket.team_idx, ticket.amount)
            .await
        {
            Ok(receipt) => {
                info!(
                    match_id = %ticket.match_id,
                    team = %ticket.team_name,
                    amount = format!("{:.2}", receipt.amount),
                    bet_id = %receipt.bet_id,
                    "Bet placed"
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    match_id = %ticket.match_id,
                    amount = format!("{:.2}", ticket.amount),
                    error = %e,
                    "Bet placement failed"
                );
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
