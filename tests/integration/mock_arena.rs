//! Mock arena for integration testing.
//!
//! Provides a deterministic implementation of the collaborator traits
//! that serves a scripted current match, declared results and a wallet
//! balance, all in-memory with no external dependencies. Clones share
//! state, so a test can keep a handle while the trader owns another.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use arena_trader::platforms::{BalanceSource, MatchSource, WageringSink};
use arena_trader::types::*;

#[derive(Clone)]
pub struct MockArena {
    current: Arc<Mutex<Option<Match>>>,
    results: Arc<Mutex<HashMap<String, usize>>>,
    balance: Arc<Mutex<f64>>,
    receipts: Arc<Mutex<Vec<(BetReceipt, f64)>>>,
    /// If set, every call returns this error.
    force_error: Arc<Mutex<Option<String>>>,
    /// If set, only bet placement fails.
    reject_bets: Arc<Mutex<Option<String>>>,
}

impl MockArena {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            results: Arc::new(Mutex::new(HashMap::new())),
            balance: Arc::new(Mutex::new(initial_balance)),
            receipts: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
            reject_bets: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the match the arena is currently showing.
    pub fn show(&self, snapshot: Match) {
        *self.current.lock().unwrap() = Some(snapshot);
    }

    pub fn clear(&self) {
        *self.current.lock().unwrap() = None;
    }

    /// Move the current match to a new status.
    pub fn set_status(&self, status: MatchStatus) {
        if let Some(m) = self.current.lock().unwrap().as_mut() {
            m.status = status;
        }
    }

    /// Declare a winner and pay out winning bets at the odds they were
    /// placed at.
    pub fn declare_winner(&self, match_id: &str, winner: usize) {
        self.results
            .lock()
            .unwrap()
            .insert(match_id.to_string(), winner);

        let payout: f64 = self
            .receipts
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r.match_id == match_id && r.team_idx == winner)
            .map(|(r, odds)| r.amount * odds)
            .sum();
        *self.balance.lock().unwrap() += payout;
    }

    pub fn set_balance(&self, balance: f64) {
        *self.balance.lock().unwrap() = balance;
    }

    pub fn balance(&self) -> f64 {
        *self.balance.lock().unwrap()
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn reject_bets(&self, msg: Option<&str>) {
        *self.reject_bets.lock().unwrap() = msg.map(str::to_string);
    }

    pub fn receipts(&self) -> Vec<BetReceipt> {
        self.receipts
            .lock()
            .unwrap()
            .iter()
            .map(|(r, _)| r.clone())
            .collect()
    }

    fn check_error(&self) -> Result<()> {
        match self.force_error.lock().unwrap().as_ref() {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MatchSource for MockArena {
    async fn fetch_current_match(&self) -> Result<Option<Match>> {
        self.check_error()?;
        Ok(self.current.lock().unwrap().clone())
    }

    async fn fetch_match_result(&self, match_id: &str) -> Result<Option<MatchResult>> {
        self.check_error()?;
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(match_id)
            .map(|&winner| MatchResult {
                match_id: match_id.to_string(),
                winner,
            }))
    }
}

#[async_trait]
impl WageringSink for MockArena {
    async fn place_bet(&self, match_id: &str, team_idx: usize, amount: f64) -> Result<BetReceipt> {
        self.check_error()?;
        if let Some(msg) = self.reject_bets.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }

        let odds = self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .filter(|m| m.id == match_id)
            .and_then(|m| m.teams.get(team_idx))
            .map(|t| t.odds)
            .ok_or_else(|| anyhow!("no such match or team"))?;

        let mut balance = self.balance.lock().unwrap();
        if amount > *balance {
            return Err(anyhow!("insufficient balance"));
        }
        *balance -= amount;

        let receipt = BetReceipt {
            bet_id: format!("MOCK-{}", Uuid::new_v4()),
            match_id: match_id.to_string(),
            team_idx,
            amount,
            placed_at: Utc::now(),
        };
        self.receipts.lock().unwrap().push((receipt.clone(), odds));
        Ok(receipt)
    }
}

#[async_trait]
impl BalanceSource for MockArena {
    async fn get_balance(&self) -> Result<f64> {
        self.check_error()?;
        Ok(self.balance())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn make_fighter(role: Role, hp: f64, atk: f64, defense: f64, spd: f64) -> Fighter {
    Fighter {
        name: format!("{role}"),
        role: Some(role),
        hp,
        atk,
        defense,
        spd,
    }
}

/// A two-team match where side 0 is a well-rounded favourite.
pub fn favourite_match(id: &str, odds: [f64; 2]) -> Match {
    Match {
        id: id.to_string(),
        status: MatchStatus::Betting,
        teams: vec![
            Team {
                name: "Iron Vanguard".to_string(),
                fighters: vec![
                    make_fighter(Role::Tank, 200.0, 12.0, 12.0, 0.8),
                    make_fighter(Role::Mage, 90.0, 25.0, 3.0, 1.0),
                    make_fighter(Role::Cleric, 100.0, 8.0, 6.0, 1.0),
                ],
                odds: odds[0],
            },
            Team {
                name: "Ragged Pair".to_string(),
                fighters: vec![
                    make_fighter(Role::Rogue, 70.0, 12.0, 2.0, 1.2),
                    make_fighter(Role::Rogue, 70.0, 12.0, 2.0, 1.2),
                ],
                odds: odds[1],
            },
        ],
    }
}

/// Two identical teams: no side has an edge at even-ish odds.
pub fn even_match(id: &str) -> Match {
    let team = |name: &str| Team {
        name: name.to_string(),
        fighters: vec![
            make_fighter(Role::Berserker, 120.0, 20.0, 5.0, 1.0),
            make_fighter(Role::Paladin, 150.0, 10.0, 10.0, 1.0),
        ],
        odds: 1.9,
    };
    Match {
        id: id.to_string(),
        status: MatchStatus::Betting,
        teams: vec![team("Left"), team("Right")],
    }
}
