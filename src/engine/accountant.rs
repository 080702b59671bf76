//! Session bookkeeping and summaries.
//!
//! Records placed wagers, settles resolved bets into `SessionStats`,
//! and renders the periodic session summary.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::types::{OpenBet, SessionStats};

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Outcome of one resolved bet.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub match_id: String,
    pub team_name: String,
    pub won: bool,
    pub wager: f64,
    /// Gross payout (0 on a loss).
    pub payout: f64,
    /// Net result: payout − wager on a win, −wager on a loss.
    pub profit: f64,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Accountant
// ---------------------------------------------------------------------------

pub struct Accountant;

impl Accountant {
    /// Count a wager the sink has accepted.
    pub fn record_placement(stats: &mut SessionStats, wager: f64) {
        stats.bets_placed += 1;
        stats.total_wagered += wager;
    }

    /// Settle a resolved bet.
    pub fn settle(stats: &mut SessionStats, bet: &OpenBet, won: bool) -> Settlement {
        let settlement = if won {
            let payout = bet.payout();
            let profit = payout - bet.wager;
            stats.bets_won += 1;
            stats.total_won += payout;
            stats.consecutive_losses = 0;
            stats.best_win = stats.best_win.max(profit);
            Settlement {
                match_id: bet.match_id.clone(),
                team_name: bet.team_name.clone(),
                won,
                wager: bet.wager,
                payout,
                profit,
                timestamp: Utc::now(),
            }
        } else {
            stats.bets_lost += 1;
            stats.consecutive_losses += 1;
            stats.worst_loss = stats.worst_loss.max(bet.wager);
            Settlement {
                match_id: bet.match_id.clone(),
                team_name: bet.team_name.clone(),
                won,
                wager: bet.wager,
                payout: 0.0,
                profit: -bet.wager,
                timestamp: Utc::now(),
            }
        };

        info!(
            match_id = %settlement.match_id,
            team = %settlement.team_name,
            won = settlement.won,
            wager = format!("{:.2}", settlement.wager),
            profit = format!("{:+.2}", settlement.profit),
            streak = stats.consecutive_losses,
            settled_at = %settlement.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            "Bet settled"
        );

        settlement
    }

    /// Drop a bet whose outcome could not be determined.
    /// Neither a win nor a loss; the stake stays counted as wagered.
    pub fn record_abandonment(stats: &mut SessionStats, bet: &OpenBet) {
        stats.bets_abandoned += 1;
        warn!(
            match_id = %bet.match_id,
            wager = format!("{:.2}", bet.wager),
            "Open bet abandoned, result never arrived"
        );
    }

    /// Multi-line session summary.
    pub fn summary(stats: &SessionStats, currency: &str) -> String {
        let runtime_hours = stats.runtime().num_seconds() as f64 / 3600.0;
        format!(
            "\n========== SESSION STATS ==========\n\
             Runtime: {:.1} hours\n\
             Bets: {} ({}W / {}L / {} abandoned)\n\
             Win Rate: {:.1}%\n\
             Total Wagered: {:.2} {currency}\n\
             Total Won: {:.2} {currency}\n\
             Profit: {:+.2} {currency} ({:+.1}% ROI)\n\
             Best Win: {:.2}\n\
             Worst Loss: {:.2}\n\
             ===================================",
            runtime_hours,
            stats.bets_placed,
            stats.bets_won,
            stats.bets_lost,
            stats.bets_abandoned,
            stats.win_rate() * 100.0,
            stats.total_wagered,
            stats.total_won,
            stats.profit(),
            stats.roi() * 100.0,
            stats.best_win,
            stats.worst_loss,
        )
    }

    pub fn log_summary(stats: &SessionStats, currency: &str) {
        info!(
            bets = stats.bets_placed,
            won = stats.bets_won,
            lost = stats.bets_lost,
            profit = format!("{:+.2}", stats.profit()),
            "{}",
            Self::summary(stats, currency)
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
