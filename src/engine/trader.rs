//! One poll cycle against the collaborators.
//!
//! Fetches the current match, asks the session what to do with it, and
//! performs the I/O the session asks for. Collaborator failures are
//! logged and treated as "nothing this cycle"; only a stop rule ends the
//! run.

use tracing::{debug, info, warn};

use super::accountant::Accountant;
use super::executor::Executor;
use super::session::{Decision, Session, Step};
use crate::platforms::{BalanceSource, MatchSource};
use crate::strategy::StopReason;
use crate::types::{Match, SessionStats};

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Continue,
    Stop(StopReason),
}

pub struct Trader {
    source: Box<dyn MatchSource>,
    balances: Box<dyn BalanceSource>,
    executor: Executor,
    session: Session,
    currency: String,
}

impl Trader {
    pub fn new(
        source: Box<dyn MatchSource>,
        balances: Box<dyn BalanceSource>,
        executor: Executor,
        session: Session,
        currency: &str,
    ) -> Self {
        Self {
            source,
            balances,
            executor,
            session,
            currency: currency.to_string(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> &SessionStats {
        self.session.stats()
    }

    pub fn log_summary(&self) {
        Accountant::log_summary(self.session.stats(), &self.currency);
    }

    /// Run one cycle.
    pub async fn run_once(&mut self) -> CycleOutcome {
        let snapshot = match self.source.fetch_current_match().await {
            Ok(Some(m)) => m,
            Ok(None) => {
                debug!("No active match");
                return CycleOutcome::Continue;
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch current match");
                return CycleOutcome::Continue;
            }
        };

        debug!(match_id = %snapshot.id, status = %snapshot.status, "Match snapshot");

        match self.session.observe(&snapshot) {
            Step::Wait => CycleOutcome::Continue,
            Step::CheckResult { match_id, stale } => {
                self.check_result(&match_id, stale).await;
                CycleOutcome::Continue
            }
            Step::Evaluate => self.evaluate(&snapshot).await,
        }
    }

    async fn check_result(&mut self, match_id: &str, stale: bool) {
        let result = match self.source.fetch_match_result(match_id).await {
            Ok(r) => r,
            Err(e) => {
                warn!(match_id, error = %e, "Failed to fetch match result");
                None
            }
        };

        match result {
            Some(result) => {
                if let Some(settlement) = self.session.resolve(&result) {
                    let verdict = if settlement.won { "WON" } else { "LOST" };
                    info!(
                        match_id,
                        team = %settlement.team_name,
                        payout = format!("{:.2}", settlement.payout),
                        "{verdict} {:+.2} {}",
                        settlement.profit,
                        self.currency
                    );
                    self.log_summary();
                }
            }
            None => {
                if self.session.note_missing_result(stale).is_some() {
                    self.log_summary();
                } else {
                    debug!(match_id, stale, "Result not available yet");
                }
            }
        }
    }

    async fn evaluate(&mut self, snapshot: &Match) -> CycleOutcome {
        let balance = match self.balances.get_balance().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Failed to read balance, skipping cycle");
                return CycleOutcome::Continue;
            }
        };

        info!(
            match_id = %snapshot.id,
            balance = format!("{:.2}", balance),
            "New match open for betting"
        );

        let ticket = match self.session.evaluate(snapshot, balance) {
            Decision::Stop(reason) => return CycleOutcome::Stop(reason),
            Decision::Skip { .. } => return CycleOutcome::Continue,
            Decision::Wager(ticket) => ticket,
        };

        info!(
            match_id = %ticket.match_id,
            team = %ticket.team_name,
            wager = format!("{:.2}", ticket.amount),
            odds = format!("{:.2}", ticket.odds),
            edge = format!("{:+.1}%", ticket.edge * 100.0),
            dry_run = self.executor.is_dry_run(),
            "Placing bet"
        );

        // A refused bet leaves the session untouched; the match is retried
        // on the next cycle.
        if self.executor.place(&ticket).await.is_ok() {
            self.session.record_placement(&ticket);
        }

        CycleOutcome::Continue
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
