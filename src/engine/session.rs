//! Session state machine.
//!
//! Owns the per-run state: the (at most one) open bet, the id of the
//! last match evaluated, and the running `SessionStats`. Every method is
//! synchronous and free of I/O; the driver in `trader` feeds it match
//! snapshots, balances and results, and carries out the actions it asks
//! for.
//!
//! Per match id:
//! - Idle → WagerPlaced when the match is `betting`, the id is new, the
//!   stop rules pass and a pick clears the confidence floor.
//! - Idle → Skipped when no pick qualifies. The id is remembered and never
//!   re-analysed.
//! - WagerPlaced → Idle when the match ends and its result is known, or
//!   when the arena has moved on and the result never shows up.

use tracing::{debug, info};

use super::accountant::{Accountant, Settlement};
use crate::strategy::{KellyCalculator, MatchEvaluator, RiskManager, StopReason};
use crate::types::{Match, MatchResult, MatchStatus, OpenBet, SessionStats};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// What the driver should do with the current snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Nothing actionable this cycle.
    Wait,
    /// A new match is open for wagers; read the balance and call `evaluate`.
    Evaluate,
    /// Look up the result of the open bet's match.
    /// `stale` is set when the arena has already moved on to another match.
    CheckResult { match_id: String, stale: bool },
}

/// A sized wager ready to be handed to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct BetTicket {
    pub match_id: String,
    pub team_idx: usize,
    pub team_name: String,
    pub amount: f64,
    pub odds: f64,
    pub confidence: f64,
    pub edge: f64,
}

/// Outcome of evaluating a match.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// A stop rule fired; the run must end.
    Stop(StopReason),
    /// No wager on this match.
    Skip { reason: String },
    /// Place this wager.
    Wager(BetTicket),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    evaluator: MatchEvaluator,
    sizer: KellyCalculator,
    risk: RiskManager,
    max_result_attempts: u32,
    stats: SessionStats,
    open_bet: Option<OpenBet>,
    last_match_id: Option<String>,
    missed_results: u32,
}

impl Session {
    pub fn new(
        evaluator: MatchEvaluator,
        sizer: KellyCalculator,
        risk: RiskManager,
        max_result_attempts: u32,
    ) -> Self {
        Self {
            evaluator,
            sizer,
            risk,
            max_result_attempts: max_result_attempts.max(1),
            stats: SessionStats::new(),
            open_bet: None,
            last_match_id: None,
            missed_results: 0,
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn open_bet(&self) -> Option<&OpenBet> {
        self.open_bet.as_ref()
    }

    pub fn last_match_id(&self) -> Option<&str> {
        self.last_match_id.as_deref()
    }

    /// Decide what to do with a fresh snapshot.
    pub fn observe(&self, snapshot: &Match) -> Step {
        if let Some(bet) = &self.open_bet {
            if bet.match_id != snapshot.id {
                return Step::CheckResult {
                    match_id: bet.match_id.clone(),
                    stale: true,
                };
            }
            if snapshot.status == MatchStatus::Ended {
                return Step::CheckResult {
                    match_id: bet.match_id.clone(),
                    stale: false,
                };
            }
            return Step::Wait;
        }

        let already_seen = self.last_match_id.as_deref() == Some(snapshot.id.as_str());
        if snapshot.status == MatchStatus::Betting && !already_seen {
            Step::Evaluate
        } else {
            Step::Wait
        }
    }

    /// Run the stop rules, pick a team and size the wager.
    ///
    /// A `Wager` decision does not change state: the match only counts as
    /// evaluated once `record_placement` confirms the sink accepted it, so a
    /// failed placement is retried on the next cycle.
    pub fn evaluate(&mut self, snapshot: &Match, balance: f64) -> Decision {
        if self.open_bet.is_some() {
            return Decision::Skip {
                reason: "a bet is already open".to_string(),
            };
        }

        if self.stats.start_balance.is_none() {
            info!(balance = format!("{:.2}", balance), "Starting balance recorded");
            self.stats.start_balance = Some(balance);
        }

        if let Some(reason) = self.risk.should_stop(&self.stats, balance) {
            return Decision::Stop(reason);
        }

        info!(
            match_id = %snapshot.id,
            teams = snapshot.teams.len(),
            "Analysing match"
        );

        let pick = match self.evaluator.pick_best_team(snapshot) {
            Some(p) => p,
            None => return self.skip(snapshot, "no team with positive edge above the confidence floor"),
        };

        info!(
            match_id = %snapshot.id,
            team = %pick.team_name,
            confidence = format!("{:.1}%", pick.confidence * 100.0),
            "{}",
            pick.reasoning
        );

        let amount = self.sizer.calculate_wager(balance, pick.confidence, pick.odds);
        if amount <= 0.0 {
            return self.skip(snapshot, "sized wager is zero");
        }

        Decision::Wager(BetTicket {
            match_id: snapshot.id.clone(),
            team_idx: pick.team_idx,
            team_name: pick.team_name,
            amount,
            odds: pick.odds,
            confidence: pick.confidence,
            edge: pick.edge,
        })
    }

    fn skip(&mut self, snapshot: &Match, reason: &str) -> Decision {
        info!(match_id = %snapshot.id, reason, "Skipping match");
        self.last_match_id = Some(snapshot.id.clone());
        Decision::Skip {
            reason: reason.to_string(),
        }
    }

    /// Open a bet for a ticket the sink accepted.
    /// Returns `false` (and changes nothing) if a bet is already open.
    pub fn record_placement(&mut self, ticket: &BetTicket) -> bool {
        if self.open_bet.is_some() {
            return false;
        }

        Accountant::record_placement(&mut self.stats, ticket.amount);
        self.open_bet = Some(OpenBet {
            match_id: ticket.match_id.clone(),
            team_idx: ticket.team_idx,
            team_name: ticket.team_name.clone(),
            wager: ticket.amount,
            odds: ticket.odds,
            confidence: ticket.confidence,
        });
        self.last_match_id = Some(ticket.match_id.clone());
        self.missed_results = 0;
        true
    }

    /// Settle the open bet against a declared result.
    /// Results for any other match are ignored.
    pub fn resolve(&mut self, result: &MatchResult) -> Option<Settlement> {
        match &self.open_bet {
            Some(bet) if bet.match_id == result.match_id => {}
            _ => {
                debug!(match_id = %result.match_id, "Result does not match open bet");
                return None;
            }
        }

        let bet = self.open_bet.take()?;
        let won = result.winner == bet.team_idx;
        let settlement = Accountant::settle(&mut self.stats, &bet, won);
        self.last_match_id = None;
        self.missed_results = 0;
        Some(settlement)
    }

    /// Record a result lookup that came back empty.
    ///
    /// While the arena still shows the bet's match, the bet stays open.
    /// Once it has moved on, the bet is abandoned after
    /// `max_result_attempts` consecutive misses; the abandoned bet is
    /// returned.
    pub fn note_missing_result(&mut self, stale: bool) -> Option<OpenBet> {
        if !stale || self.open_bet.is_none() {
            return None;
        }

        self.missed_results += 1;
        if self.missed_results < self.max_result_attempts {
            debug!(attempt = self.missed_results, "Result still missing");
            return None;
        }

        let bet = self.open_bet.take()?;
        Accountant::record_abandonment(&mut self.stats, &bet);
        self.last_match_id = None;
        self.missed_results = 0;
        Some(bet)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
