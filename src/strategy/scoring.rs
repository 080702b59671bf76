//! Fighter and team scoring.
//!
//! Pure functions that turn raw fighter attributes into a power rating
//! and aggregate a team into synergy-adjusted power, survivability,
//! and damage profile. No error path: missing data degrades to defaults.

use std::collections::BTreeSet;

use crate::types::{Fighter, Role, Team};

// ---------------------------------------------------------------------------
// Role tables
// ---------------------------------------------------------------------------

/// Per-axis multipliers applied to a fighter's raw attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleWeights {
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
    pub spd: f64,
}

impl RoleWeights {
    const NEUTRAL: RoleWeights = RoleWeights { hp: 1.0, atk: 1.0, def: 1.0, spd: 1.0 };
}

impl Role {
    /// Stat multipliers for this role. Unknown roles are neutral.
    pub fn weights(&self) -> RoleWeights {
        match self {
            Role::Tank => RoleWeights { hp: 1.2, atk: 0.8, def: 1.3, spd: 0.7 },
            Role::Berserker => RoleWeights { hp: 0.9, atk: 1.4, def: 0.7, spd: 1.1 },
            Role::Mage => RoleWeights { hp: 0.7, atk: 1.3, def: 0.6, spd: 0.9 },
            Role::Rogue => RoleWeights { hp: 0.8, atk: 1.3, def: 0.5, spd: 1.4 },
            Role::Paladin => RoleWeights { hp: 1.1, atk: 1.0, def: 1.2, spd: 0.9 },
            Role::Necromancer => RoleWeights { hp: 0.7, atk: 1.1, def: 0.6, spd: 0.9 },
            Role::Controller => RoleWeights { hp: 0.8, atk: 1.0, def: 0.7, spd: 1.0 },
            Role::Cleric => RoleWeights { hp: 0.9, atk: 0.7, def: 0.9, spd: 1.0 },
            Role::Unknown => RoleWeights::NEUTRAL,
        }
    }
}

/// Pairwise synergy coefficient, independent of argument order.
/// `None` for pairs with no listed interaction.
pub fn pair_synergy(a: Role, b: Role) -> Option<f64> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    match (lo, hi) {
        (Role::Tank, Role::Cleric) => Some(1.15),
        (Role::Tank, Role::Necromancer) => Some(1.08),
        // Too squishy together
        (Role::Rogue, Role::Rogue) => Some(0.9),
        (Role::Mage, Role::Mage) => Some(0.92),
        _ => None,
    }
}

/// Flat bonus for fielding at least `DIVERSITY_MIN_ROLES` distinct roles.
const DIVERSITY_BONUS: f64 = 1.05;
const DIVERSITY_MIN_ROLES: usize = 3;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Weighted power rating of a single fighter.
pub fn fighter_power(fighter: &Fighter) -> f64 {
    let w = fighter.scoring_role().weights();
    fighter.hp * 0.4 * w.hp
        + fighter.atk * 2.5 * w.atk
        + fighter.defense * 1.5 * w.def
        + fighter.spd * 15.0 * w.spd
}

/// Synergy multiplier over every unordered pair of fighters.
pub fn team_synergy(fighters: &[Fighter]) -> f64 {
    let mut synergy = 1.0;

    for (i, a) in fighters.iter().enumerate() {
        for b in &fighters[i + 1..] {
            if let Some(coef) = pair_synergy(a.scoring_role(), b.scoring_role()) {
                synergy *= coef;
            }
        }
    }

    let distinct: BTreeSet<Role> = fighters.iter().map(Fighter::scoring_role).collect();
    if distinct.len() >= DIVERSITY_MIN_ROLES {
        synergy *= DIVERSITY_BONUS;
    }

    synergy
}

/// Aggregated view of one team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamAnalysis {
    pub total_power: f64,
    pub avg_power: f64,
    pub adjusted_power: f64,
    pub synergy: f64,
    pub has_tank: bool,
    pub has_healer: bool,
    pub has_dps: bool,
    pub survivability: f64,
    pub damage_output: f64,
    /// Reporting only; never used for selection.
    pub composition_score: f64,
}

/// Analyse a team's fighters.
pub fn analyze_team(team: &Team) -> TeamAnalysis {
    analyze_fighters(&team.fighters)
}

pub fn analyze_fighters(fighters: &[Fighter]) -> TeamAnalysis {
    let total_power: f64 = fighters.iter().map(fighter_power).sum();
    let synergy = team_synergy(fighters);

    // Flags read the declared role only
    let has_tank = fighters.iter().any(|f| f.role.is_some_and(|r| r.is_tank()));
    let has_healer = fighters.iter().any(|f| f.role.is_some_and(|r| r.is_healer()));
    let has_dps = fighters.iter().any(|f| f.role.is_some_and(|r| r.is_dps()));

    // Empty rosters fall back to the baseline fighter profile
    let baseline = Fighter::baseline(Role::Unknown);
    let avg_power = if fighters.is_empty() {
        0.0
    } else {
        total_power / fighters.len() as f64
    };
    let avg_hp = mean_or(fighters, baseline.hp, |f| f.hp);
    let avg_def = mean_or(fighters, baseline.defense, |f| f.defense);
    let avg_atk = mean_or(fighters, baseline.atk, |f| f.atk);
    let avg_spd = mean_or(fighters, baseline.spd, |f| f.spd);

    let survivability = (avg_hp / 400.0) * 0.6 + (avg_def / 15.0) * 0.4;
    let damage_output = (avg_atk / 30.0) * 0.7 + (avg_spd / 1.5) * 0.3;

    let flag = |b: bool, w: f64| if b { w } else { 0.0 };
    let composition_score =
        flag(has_tank, 0.3) + flag(has_healer, 0.2) + flag(has_dps, 0.3) + 0.2 * synergy;

    TeamAnalysis {
        total_power,
        avg_power,
        adjusted_power: total_power * synergy,
        synergy,
        has_tank,
        has_healer,
        has_dps,
        survivability,
        damage_output,
        composition_score,
    }
}

fn mean_or(fighters: &[Fighter], fallback: f64, field: impl Fn(&Fighter) -> f64) -> f64 {
    if fighters.is_empty() {
        fallback
    } else {
        fighters.iter().map(field).sum::<f64>() / fighters.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
