//! Match evaluation.
//!
//! Turns each team's adjusted power into a win probability, compares it
//! with the offered odds, and picks the team with the largest positive
//! edge that also clears the confidence floor.

use std::cmp::Ordering;

use tracing::{debug, trace};

use super::scoring::{analyze_team, TeamAnalysis};
use crate::types::Match;

/// Weight of the edge term in the reported confidence.
const EDGE_CONFIDENCE_WEIGHT: f64 = 0.3;

// ---------------------------------------------------------------------------
// Per-team evaluation
// ---------------------------------------------------------------------------

/// One team's standing within a match.
#[derive(Debug, Clone)]
pub struct TeamEvaluation {
    /// Position of the team in the match snapshot.
    pub idx: usize,
    pub name: String,
    pub odds: f64,
    pub analysis: TeamAnalysis,
    pub win_prob: f64,
    /// `win_prob × odds − 1`
    pub edge: f64,
}

/// Evaluator output: the team worth backing this cycle.
#[derive(Debug, Clone)]
pub struct Pick {
    pub team_idx: usize,
    pub team_name: String,
    pub confidence: f64,
    pub win_prob: f64,
    pub odds: f64,
    pub edge: f64,
    pub analysis: TeamAnalysis,
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Ranks teams and selects the best value bet.
#[derive(Debug, Clone)]
pub struct MatchEvaluator {
    min_confidence: f64,
}

impl MatchEvaluator {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Score every team, ranked by adjusted power (strongest first).
    ///
    /// Win probabilities are each team's share of the field's total
    /// adjusted power; all zero when the field has no power at all.
    pub fn evaluate_teams(&self, snapshot: &Match) -> Vec<TeamEvaluation> {
        let mut ranked: Vec<TeamEvaluation> = snapshot
            .teams
            .iter()
            .enumerate()
            .map(|(idx, team)| {
                for fighter in &team.fighters {
                    trace!(match_id = %snapshot.id, team = %team.name, "{fighter}");
                }
                TeamEvaluation {
                    idx,
                    name: team.name.clone(),
                    odds: team.odds,
                    analysis: analyze_team(team),
                    win_prob: 0.0,
                    edge: 0.0,
                }
            })
            .collect();

        // Stable sort: equal-power teams keep snapshot order
        ranked.sort_by(|a, b| {
            b.analysis
                .adjusted_power
                .partial_cmp(&a.analysis.adjusted_power)
                .unwrap_or(Ordering::Equal)
        });

        let total_power: f64 = ranked.iter().map(|t| t.analysis.adjusted_power).sum();
        for team in &mut ranked {
            team.win_prob = if total_power > 0.0 {
                team.analysis.adjusted_power / total_power
            } else {
                0.0
            };
            team.edge = team.win_prob * team.odds - 1.0;
        }

        ranked
    }

    /// Pick the team with the strictly greatest positive edge among those
    /// whose win probability reaches `min_confidence`. On exact ties the
    /// first team in ranked order wins.
    pub fn pick_best_team(&self, snapshot: &Match) -> Option<Pick> {
        if snapshot.teams.is_empty() {
            return None;
        }

        let ranked = self.evaluate_teams(snapshot);

        let mut best: Option<&TeamEvaluation> = None;
        let mut best_edge = 0.0;
        for team in &ranked {
            debug!(
                match_id = %snapshot.id,
                team = %team.name,
                power = format!("{:.1}", team.analysis.adjusted_power),
                avg_power = format!("{:.1}", team.analysis.avg_power),
                win_prob = format!("{:.1}%", team.win_prob * 100.0),
                odds = format!("{:.2}", team.odds),
                edge = format!("{:+.1}%", team.edge * 100.0),
                "Team evaluated"
            );
            if team.edge > best_edge && team.win_prob >= self.min_confidence {
                best_edge = team.edge;
                best = Some(team);
            }
        }

        let best = best?;
        let confidence = (best.win_prob + best.edge * EDGE_CONFIDENCE_WEIGHT).min(1.0);

        Some(Pick {
            team_idx: best.idx,
            team_name: best.name.clone(),
            confidence,
            win_prob: best.win_prob,
            odds: best.odds,
            edge: best.edge,
            analysis: best.analysis.clone(),
            reasoning: rationale(best),
        })
    }
}

fn rationale(team: &TeamEvaluation) -> String {
    let a = &team.analysis;
    format!(
        "Team '{}' selected. Win prob: {:.1}%, Odds: {:.2}x, Edge: {:.1}%. \
         Composition: {}, {}, {}. Synergy: {:.2}x",
        team.name,
        team.win_prob * 100.0,
        team.odds,
        team.edge * 100.0,
        if a.has_tank { "Tank✓" } else { "No tank" },
        if a.has_healer { "Healer✓" } else { "No healer" },
        if a.has_dps { "DPS✓" } else { "No DPS" },
        a.synergy,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
