//! Strategy engine: team scoring, match evaluation, Kelly sizing, and
//! session stop rules.

pub mod scoring;
pub mod evaluator;
pub mod kelly;
pub mod risk;

pub use evaluator::{MatchEvaluator, Pick, TeamEvaluation};
pub use kelly::{KellyCalculator, KellyConfig, SizedWager};
pub use risk::{RiskConfig, RiskManager, StopReason};
pub use scoring::{analyze_team, fighter_power, team_synergy, TeamAnalysis};
