//! Shared types for the arena trader.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that platform, strategy,
//! and engine modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Fighter role. Names are matched exactly; anything else maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Tank,
    Berserker,
    Mage,
    Rogue,
    Paladin,
    Necromancer,
    Controller,
    Cleric,
    Unknown,
}

impl Role {
    /// All known roles (useful for iteration).
    pub const ALL: &'static [Role] = &[
        Role::Tank,
        Role::Berserker,
        Role::Mage,
        Role::Rogue,
        Role::Paladin,
        Role::Necromancer,
        Role::Controller,
        Role::Cleric,
    ];

    /// Front-liners that soak damage.
    pub fn is_tank(&self) -> bool {
        matches!(self, Role::Tank | Role::Paladin)
    }

    pub fn is_healer(&self) -> bool {
        matches!(self, Role::Cleric | Role::Paladin)
    }

    pub fn is_dps(&self) -> bool {
        matches!(self, Role::Berserker | Role::Rogue | Role::Mage)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Tank => "Tank",
            Role::Berserker => "Berserker",
            Role::Mage => "Mage",
            Role::Rogue => "Rogue",
            Role::Paladin => "Paladin",
            Role::Necromancer => "Necromancer",
            Role::Controller => "Controller",
            Role::Cleric => "Cleric",
            Role::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "Tank" => Role::Tank,
            "Berserker" => Role::Berserker,
            "Mage" => Role::Mage,
            "Rogue" => Role::Rogue,
            "Paladin" => Role::Paladin,
            "Necromancer" => Role::Necromancer,
            "Controller" => Role::Controller,
            "Cleric" => Role::Cleric,
            _ => Role::Unknown,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::from(s.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

/// Match lifecycle status as reported by the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchStatus {
    Betting,
    Live,
    Ended,
    Unknown,
}

impl Default for MatchStatus {
    fn default() -> Self {
        MatchStatus::Unknown
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Betting => write!(f, "betting"),
            MatchStatus::Live => write!(f, "live"),
            MatchStatus::Ended => write!(f, "ended"),
            MatchStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for MatchStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "betting" => MatchStatus::Betting,
            "live" => MatchStatus::Live,
            "ended" => MatchStatus::Ended,
            _ => MatchStatus::Unknown,
        }
    }
}

impl From<String> for MatchStatus {
    fn from(s: String) -> Self {
        MatchStatus::from(s.as_str())
    }
}

impl From<MatchStatus> for String {
    fn from(status: MatchStatus) -> Self {
        status.to_string()
    }
}

// ---------------------------------------------------------------------------
// Match snapshot
// ---------------------------------------------------------------------------

fn default_hp() -> f64 {
    100.0
}

fn default_atk() -> f64 {
    10.0
}

fn default_def() -> f64 {
    5.0
}

fn default_spd() -> f64 {
    1.0
}

/// Role assumed for scoring when a fighter carries none.
const SCORING_FALLBACK_ROLE: Role = Role::Berserker;

/// A single fighter as read from the match snapshot.
/// Missing attributes fall back to baseline values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    #[serde(default)]
    pub name: String,
    /// `None` when the snapshot omits the role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default = "default_hp")]
    pub hp: f64,
    #[serde(default = "default_atk")]
    pub atk: f64,
    #[serde(default = "default_def", rename = "def")]
    pub defense: f64,
    #[serde(default = "default_spd")]
    pub spd: f64,
}

impl Fighter {
    /// A fighter of the given role with baseline attributes.
    pub fn baseline(role: Role) -> Self {
        Self {
            name: String::new(),
            role: Some(role),
            hp: default_hp(),
            atk: default_atk(),
            defense: default_def(),
            spd: default_spd(),
        }
    }

    /// Role used for power and synergy. A fighter without a role is
    /// scored as a Berserker but counts toward no composition flag.
    pub fn scoring_role(&self) -> Role {
        self.role.unwrap_or(SCORING_FALLBACK_ROLE)
    }
}

impl fmt::Display for Fighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] hp={:.0} atk={:.0} def={:.0} spd={:.2}",
            self.name,
            self.role.map_or_else(|| "-".to_string(), |r| r.to_string()),
            self.hp, self.atk, self.defense, self.spd,
        )
    }
}

/// A competing team with its payout odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub fighters: Vec<Fighter>,
    /// Decimal payout multiplier (>= 1.0).
    pub odds: f64,
}

/// A match snapshot. Teams are indexed in the order the arena lists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub status: MatchStatus,
    pub teams: Vec<Team>,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.teams.iter().map(|t| t.name.as_str()).collect();
        write!(f, "{} ({}) {}", self.id, self.status, names.join(" vs "))
    }
}

/// Declared outcome of a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: String,
    /// Index of the winning team.
    pub winner: usize,
}

// ---------------------------------------------------------------------------
// Bets
// ---------------------------------------------------------------------------

/// Confirmation returned by the wagering sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetReceipt {
    pub bet_id: String,
    pub match_id: String,
    pub team_idx: usize,
    pub amount: f64,
    pub placed_at: DateTime<Utc>,
}

impl BetReceipt {
    /// Receipt for a wager that was only simulated.
    pub fn dry_run(match_id: &str, team_idx: usize, amount: f64) -> Self {
        Self {
            bet_id: format!("dry-run-{}", uuid::Uuid::new_v4()),
            match_id: match_id.to_string(),
            team_idx,
            amount,
            placed_at: Utc::now(),
        }
    }
}

impl fmt::Display for BetReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} team={} amount={:.2} [{}]",
            self.match_id, self.team_idx, self.amount, self.bet_id,
        )
    }
}

/// The single in-flight wager tracked between placement and resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenBet {
    pub match_id: String,
    pub team_idx: usize,
    pub team_name: String,
    pub wager: f64,
    pub odds: f64,
    pub confidence: f64,
}

impl OpenBet {
    /// Gross payout if the bet wins (stake included).
    pub fn payout(&self) -> f64 {
        self.wager * self.odds
    }
}

// ---------------------------------------------------------------------------
// Session statistics
// ---------------------------------------------------------------------------

/// Running totals for one betting session. Memory-resident only.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub start_time: DateTime<Utc>,
    /// First balance observed this session.
    pub start_balance: Option<f64>,
    pub bets_placed: u64,
    pub bets_won: u64,
    pub bets_lost: u64,
    pub bets_abandoned: u64,
    pub consecutive_losses: u32,
    pub total_wagered: f64,
    pub total_won: f64,
    pub best_win: f64,
    pub worst_loss: f64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            start_balance: None,
            bets_placed: 0,
            bets_won: 0,
            bets_lost: 0,
            bets_abandoned: 0,
            consecutive_losses: 0,
            total_wagered: 0.0,
            total_won: 0.0,
            best_win: 0.0,
            worst_loss: 0.0,
        }
    }

    /// Fraction of placed bets that won. 0.0 before the first bet.
    pub fn win_rate(&self) -> f64 {
        if self.bets_placed == 0 {
            0.0
        } else {
            self.bets_won as f64 / self.bets_placed as f64
        }
    }

    /// Gross payouts minus total staked.
    pub fn profit(&self) -> f64 {
        self.total_won - self.total_wagered
    }

    pub fn roi(&self) -> f64 {
        if self.total_wagered > 0.0 {
            self.profit() / self.total_wagered
        } else {
            0.0
        }
    }

    pub fn bets_resolved(&self) -> u64 {
        self.bets_won + self.bets_lost
    }

    pub fn runtime(&self) -> chrono::Duration {
        Utc::now() - self.start_time
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bets={} (W{}/L{}) win_rate={:.1}% wagered={:.2} won={:.2} profit={:+.2} roi={:+.1}%",
            self.bets_placed,
            self.bets_won,
            self.bets_lost,
            self.win_rate() * 100.0,
            self.total_wagered,
            self.total_won,
            self.profit(),
            self.roi() * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("Platform error ({platform}): {message}")]
    Platform { platform: String, message: String },

    #[error("Transaction proxy error: {0}")]
    Proxy(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
