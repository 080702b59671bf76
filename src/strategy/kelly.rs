//! Kelly criterion wager sizing.
//!
//! Computes wager sizes using fractional Kelly with a per-bet cap,
//! a minimum-wager floor, and a hard ceiling of 95% of bankroll.

use rust_decimal::prelude::*;
use tracing::debug;

/// Never stake more than this fraction of the bankroll on one bet.
const MAX_BANKROLL_AT_RISK: f64 = 0.95;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Kelly sizing configuration.
#[derive(Debug, Clone)]
pub struct KellyConfig {
    /// Fractional Kelly multiplier (0.25 = quarter-Kelly). Lower = more conservative.
    pub multiplier: f64,
    /// Maximum wager as a fraction of bankroll.
    pub max_wager_pct: f64,
    /// Minimum wager. A qualifying pick always stakes at least this much.
    pub min_wager: f64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            multiplier: 0.25,   // Quarter-Kelly
            max_wager_pct: 0.20,
            min_wager: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Kelly calculator
// ---------------------------------------------------------------------------

/// Sized wager recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedWager {
    /// Full Kelly fraction (may be negative).
    pub kelly_fraction: f64,
    /// After multiplier and clamping to `[0, max_wager_pct]`.
    pub bet_fraction: f64,
    /// Final amount, rounded to cents.
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct KellyCalculator {
    config: KellyConfig,
}

impl KellyCalculator {
    pub fn new(config: KellyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KellyConfig {
        &self.config
    }

    /// Full Kelly fraction for win probability `p` at decimal `odds`.
    ///
    /// f* = (bp − q) / b, with b = odds − 1 and q = 1 − p.
    /// Zero when b ≤ 0.
    pub fn full_kelly(p: f64, odds: f64) -> f64 {
        let b = odds - 1.0;
        if b <= 0.0 {
            return 0.0;
        }
        let q = 1.0 - p;
        (b * p - q) / b
    }

    /// Size a wager for a pick with the given confidence and odds.
    ///
    /// The minimum-wager floor is applied even when Kelly recommends zero
    /// or less; the 95% ceiling is applied last and wins over the floor.
    pub fn size(&self, bankroll: f64, confidence: f64, odds: f64) -> SizedWager {
        let kelly = Self::full_kelly(confidence, odds);

        if bankroll <= 0.0 {
            return SizedWager {
                kelly_fraction: kelly,
                bet_fraction: 0.0,
                amount: 0.0,
            };
        }

        let fraction = (kelly * self.config.multiplier)
            .min(self.config.max_wager_pct)
            .max(0.0);

        let wager = (bankroll * fraction)
            .max(self.config.min_wager)
            .min(bankroll * MAX_BANKROLL_AT_RISK);
        let amount = round_cents(wager);

        debug!(
            bankroll = format!("{:.2}", bankroll),
            raw_kelly = format!("{:.2}%", kelly * 100.0),
            fraction = format!("{:.2}%", fraction * 100.0),
            wager = format!("{:.2}", amount),
            "Wager sized"
        );

        SizedWager {
            kelly_fraction: kelly,
            bet_fraction: fraction,
            amount,
        }
    }

    /// Wager amount only.
    pub fn calculate_wager(&self, bankroll: f64, confidence: f64, odds: f64) -> f64 {
        self.size(bankroll, confidence, odds).amount
    }
}

/// Round half away from zero to two decimal places.
fn round_cents(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or_else(|| (value * 100.0).round() / 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
