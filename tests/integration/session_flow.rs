//! Multi-cycle sessions driven against the mock arena.

use arena_trader::config::AppConfig;
use arena_trader::engine::{CycleOutcome, Executor, Session, Trader};
use arena_trader::strategy::{KellyCalculator, RiskManager, StopReason};
use arena_trader::types::*;

use crate::mock_arena::{even_match, favourite_match, make_fighter, MockArena};

fn make_trader(arena: &MockArena, dry_run: bool) -> Trader {
    let cfg = AppConfig::default();
    let session = Session::new(
        cfg.risk.evaluator(),
        KellyCalculator::new(cfg.risk.kelly()),
        RiskManager::new(cfg.risk.stop_rules()),
        2,
    );
    Trader::new(
        Box::new(arena.clone()),
        Box::new(arena.clone()),
        Executor::new(Box::new(arena.clone()), dry_run),
        session,
        "SAVAGE",
    )
}

/// Place a bet on `id`, end the match with `winner`, and settle it.
async fn play_match(trader: &mut Trader, arena: &MockArena, id: &str, winner: usize) {
    arena.show(favourite_match(id, [1.8, 2.2]));
    assert_eq!(trader.run_once().await, CycleOutcome::Continue);
    assert!(trader.session().open_bet().is_some(), "bet on {id} not placed");

    arena.set_status(MatchStatus::Ended);
    arena.declare_winner(id, winner);
    assert_eq!(trader.run_once().await, CycleOutcome::Continue);
    assert!(trader.session().open_bet().is_none(), "bet on {id} not settled");
}

#[tokio::test]
async fn test_stronger_team_is_backed() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    // Single neutral fighters with raw power 200 vs 100.
    arena.show(Match {
        id: "A-1".to_string(),
        status: MatchStatus::Betting,
        teams: vec![
            Team {
                name: "Heavy".to_string(),
                fighters: vec![make_fighter(Role::Unknown, 500.0, 0.0, 0.0, 0.0)],
                odds: 2.5,
            },
            Team {
                name: "Light".to_string(),
                fighters: vec![make_fighter(Role::Unknown, 250.0, 0.0, 0.0, 0.0)],
                odds: 1.8,
            },
        ],
    });
    trader.run_once().await;

    let receipts = arena.receipts();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].team_idx, 0);
    assert!(receipts[0].amount >= 1.0);
    assert!(receipts[0].amount <= 20.0);
}

#[tokio::test]
async fn test_full_lifecycle_win() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    arena.show(favourite_match("M-1", [1.8, 2.2]));
    trader.run_once().await;
    let wager = trader.session().open_bet().map(|b| b.wager).unwrap();
    assert_eq!(trader.stats().bets_placed, 1);

    // Live: nothing to do.
    arena.set_status(MatchStatus::Live);
    trader.run_once().await;
    assert!(trader.session().open_bet().is_some());

    // Ended but no result yet: keep waiting.
    arena.set_status(MatchStatus::Ended);
    trader.run_once().await;
    assert!(trader.session().open_bet().is_some());

    arena.declare_winner("M-1", 0);
    trader.run_once().await;

    let stats = trader.stats();
    assert!(trader.session().open_bet().is_none());
    assert_eq!(stats.bets_won, 1);
    assert_eq!(stats.consecutive_losses, 0);
    assert!((stats.total_won - wager * 1.8).abs() < 1e-9);
    assert!((stats.best_win - wager * 0.8).abs() < 1e-9);
    assert!((arena.balance() - (100.0 + wager * 0.8)).abs() < 1e-9);
}

#[tokio::test]
async fn test_no_edge_match_is_skipped_once() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    arena.show(even_match("EVEN-1"));
    for _ in 0..3 {
        assert_eq!(trader.run_once().await, CycleOutcome::Continue);
    }

    assert!(arena.receipts().is_empty());
    assert_eq!(trader.session().last_match_id(), Some("EVEN-1"));
    assert_eq!(trader.stats().bets_placed, 0);
}

#[tokio::test]
async fn test_zero_team_match_places_nothing() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    arena.show(Match {
        id: "EMPTY".to_string(),
        status: MatchStatus::Betting,
        teams: vec![],
    });
    trader.run_once().await;

    assert!(arena.receipts().is_empty());
    assert!(trader.session().open_bet().is_none());
}

#[tokio::test]
async fn test_loss_streak_halts_run() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    for i in 0..5 {
        play_match(&mut trader, &arena, &format!("L-{i}"), 1).await;
        // Top up so the stop-loss rule stays out of the way.
        arena.set_balance(100.0);
    }
    assert_eq!(trader.stats().consecutive_losses, 5);

    arena.show(favourite_match("L-5", [1.8, 2.2]));
    assert_eq!(
        trader.run_once().await,
        CycleOutcome::Stop(StopReason::LossStreak { count: 5 })
    );
    assert_eq!(arena.receipts().len(), 5);
}

#[tokio::test]
async fn test_stop_loss_halts_run() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    play_match(&mut trader, &arena, "S-0", 1).await;
    arena.set_balance(40.0);

    arena.show(favourite_match("S-1", [1.8, 2.2]));
    match trader.run_once().await {
        CycleOutcome::Stop(StopReason::StopLoss { loss_pct }) => {
            assert!((loss_pct - 0.6).abs() < 1e-9)
        }
        other => panic!("expected stop-loss, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stop_loss_boundary_is_inclusive() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    play_match(&mut trader, &arena, "B-0", 1).await;
    arena.set_balance(50.0);
    arena.show(favourite_match("B-1", [1.8, 2.2]));
    assert!(matches!(
        trader.run_once().await,
        CycleOutcome::Stop(StopReason::StopLoss { .. })
    ));

    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);
    play_match(&mut trader, &arena, "B-0", 1).await;
    arena.set_balance(50.01);
    arena.show(favourite_match("B-1", [1.8, 2.2]));
    assert_eq!(trader.run_once().await, CycleOutcome::Continue);
    assert_eq!(arena.receipts().len(), 2);
}

#[tokio::test]
async fn test_one_open_bet_at_a_time() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    arena.show(favourite_match("X-1", [1.8, 2.2]));
    trader.run_once().await;

    // Arena moves on before X-1 is settled: no second wager.
    arena.show(favourite_match("X-2", [1.8, 2.2]));
    trader.run_once().await;
    assert_eq!(arena.receipts().len(), 1);
    assert_eq!(
        trader.session().open_bet().map(|b| b.match_id.as_str()),
        Some("X-1")
    );

    // X-1 resolves, then X-2 is picked up on the following cycle.
    arena.declare_winner("X-1", 0);
    trader.run_once().await;
    assert!(trader.session().open_bet().is_none());

    trader.run_once().await;
    assert_eq!(arena.receipts().len(), 2);
    assert_eq!(
        trader.session().open_bet().map(|b| b.match_id.as_str()),
        Some("X-2")
    );
}

#[tokio::test]
async fn test_unresolved_bet_is_abandoned() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    arena.show(favourite_match("Z-1", [1.8, 2.2]));
    trader.run_once().await;

    arena.show(favourite_match("Z-2", [1.8, 2.2]));
    trader.run_once().await;
    assert!(trader.session().open_bet().is_some());
    trader.run_once().await;

    assert!(trader.session().open_bet().is_none());
    assert_eq!(trader.stats().bets_abandoned, 1);
    assert_eq!(trader.stats().bets_resolved(), 0);

    trader.run_once().await;
    assert_eq!(
        trader.session().open_bet().map(|b| b.match_id.as_str()),
        Some("Z-2")
    );
}

#[tokio::test]
async fn test_rejected_bet_is_retried() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    arena.reject_bets(Some("betting window closed"));
    arena.show(favourite_match("R-1", [1.8, 2.2]));
    trader.run_once().await;
    assert_eq!(trader.stats().bets_placed, 0);
    assert_eq!(trader.stats().total_wagered, 0.0);
    assert_eq!(arena.balance(), 100.0);

    arena.reject_bets(None);
    trader.run_once().await;
    assert_eq!(trader.stats().bets_placed, 1);
    assert_eq!(arena.receipts().len(), 1);
}

#[tokio::test]
async fn test_outage_is_survived() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, false);

    arena.show(favourite_match("O-1", [1.8, 2.2]));
    arena.set_error("503 Service Unavailable");
    for _ in 0..3 {
        assert_eq!(trader.run_once().await, CycleOutcome::Continue);
    }
    assert!(trader.stats().start_balance.is_none());

    arena.clear_error();
    trader.run_once().await;
    assert_eq!(trader.stats().bets_placed, 1);

    arena.clear();
    assert_eq!(trader.run_once().await, CycleOutcome::Continue);
}

#[tokio::test]
async fn test_dry_run_tracks_simulated_bet() {
    let arena = MockArena::new(100.0);
    let mut trader = make_trader(&arena, true);

    arena.show(favourite_match("D-1", [1.8, 2.2]));
    trader.run_once().await;

    assert!(arena.receipts().is_empty());
    assert_eq!(arena.balance(), 100.0);
    assert_eq!(trader.stats().bets_placed, 1);

    arena.set_status(MatchStatus::Ended);
    arena.declare_winner("D-1", 0);
    trader.run_once().await;
    assert_eq!(trader.stats().bets_won, 1);
}
