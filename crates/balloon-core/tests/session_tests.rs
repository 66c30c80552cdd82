//! Integration tests for the session state machine and match timer.
//!
//! These run the real timer threads with millisecond-scale timings. Waits go
//! through `StateWatch::wait_for` so the assertions tolerate scheduler
//! jitter.

use std::time::Duration;

use balloon_core::{GameSession, GameState, Player, SessionTiming};

const MATCH: Duration = Duration::from_millis(400);
const GRACE: Duration = Duration::from_secs(5);

fn short_session() -> GameSession {
    GameSession::with_timing(SessionTiming {
        match_duration: MATCH,
    })
}

fn is_over(state: &GameState) -> bool {
    matches!(state, GameState::Over(_))
}

#[test]
fn test_start_yields_started_with_player() {
    let session = short_session();
    let alice = Player::new("Alice");
    session.start_game_single(alice.clone());

    assert!(session.is_game_started());
    match session.state() {
        GameState::Started(player) => {
            assert!(player.is_same(&alice));
            assert_eq!(player.score(), 0);
        }
        other => panic!("expected Started, got {other:?}"),
    }
}

#[test]
fn test_stop_cancels_the_pending_timeout() {
    let session = short_session();
    let watch = session.watch();
    session.start_game_single(Player::new("Alice"));
    session.stop_game();

    assert_eq!(session.state(), GameState::Stopped);
    assert!(!session.is_game_started());

    // The original deadline passes without an Over transition.
    assert!(watch.wait_for(MATCH * 3, is_over).is_none());
    assert_eq!(session.state(), GameState::Stopped);
}

#[test]
fn test_timeout_transitions_to_over_exactly_once() {
    let session = short_session();
    let watch = session.watch();
    let alice = Player::new("Alice");
    session.start_game_single(alice.clone());

    let over = watch.wait_for(GRACE, is_over).expect("match never ended");
    match over {
        GameState::Over(player) => assert!(player.is_same(&alice)),
        other => panic!("expected Over, got {other:?}"),
    }
    assert!(!session.is_game_started());

    // Nothing else is published after the timeout fires.
    let version = watch.version();
    std::thread::sleep(MATCH * 2);
    assert_eq!(watch.version(), version);
}

#[test]
fn test_zero_duration_match_always_settles_on_over() {
    // With an immediate deadline the Over publication races the start itself;
    // Started must still come first so the match never ends up stuck active.
    for _ in 0..200 {
        let session = GameSession::with_timing(SessionTiming {
            match_duration: Duration::ZERO,
        });
        let watch = session.watch();
        let alice = Player::new("Alice");
        session.start_game_single(alice.clone());

        let over = watch.wait_for(GRACE, is_over).expect("match never ended");
        assert!(over.player().unwrap().is_same(&alice));
        assert!(!session.is_game_started());
        assert!(!session.state().is_active(), "Over was lost to Started");
    }
}

#[test]
fn test_wait_predicate_may_call_back_into_the_session() {
    // Observers commonly consult the session from inside a wait predicate;
    // the timeout publication must not hold the session lock while it runs.
    let session = short_session();
    let watch = session.watch();
    session.start_game_single(Player::new("Alice"));

    let observed = session.clone();
    let over = watch.wait_for(GRACE, |state| {
        is_over(state) && !observed.is_game_started()
    });
    assert!(over.is_some(), "match never ended");
}

#[test]
fn test_over_carries_the_then_current_player() {
    let session = short_session();
    let watch = session.watch();
    session.start_game_single(Player::new("Alice"));

    let bob = Player::new("Bob");
    session.select_player(bob.clone());

    let over = watch.wait_for(GRACE, is_over).expect("match never ended");
    assert!(over.player().unwrap().is_same(&bob));
}

#[test]
fn test_restart_defuses_the_previous_timer() {
    let session = short_session();
    let watch = session.watch();
    let alice = Player::new("Alice");

    session.start_game_single(alice.clone());
    std::thread::sleep(MATCH / 2);

    // Restart halfway through: the original deadline (one MATCH after the
    // first start) must pass without an Over.
    session.start_game_single(alice.clone());
    assert!(watch.wait_for(MATCH * 3 / 4, is_over).is_none());
    assert!(session.is_game_started());
    assert!(session.state().is_active());

    // Only the restarted timer ends the match.
    let over = watch.wait_for(GRACE, is_over).expect("match never ended");
    assert!(over.player().unwrap().is_same(&alice));
}

#[test]
fn test_score_then_stop_worked_example() {
    // startGame(Alice) -> Started(score 0); tap -> ScoreUpdate(score 1);
    // stopGame -> Stopped.
    let session = short_session();
    let alice = Player::new("Alice");

    session.start_game_single(alice.clone());
    match session.state() {
        GameState::Started(player) => assert_eq!(player.score(), 0),
        other => panic!("expected Started, got {other:?}"),
    }

    session.add_score(&alice, 1);
    match session.state() {
        GameState::ScoreUpdate(player) => {
            assert!(player.is_same(&alice));
            assert_eq!(player.score(), 1);
        }
        other => panic!("expected ScoreUpdate, got {other:?}"),
    }

    session.stop_game();
    assert_eq!(session.state(), GameState::Stopped);
    assert!(!session.is_game_started());
}

#[test]
fn test_roster_spans_sessions_in_first_seen_order() {
    let session = short_session();
    let alice = Player::new("Alice");
    let bob = Player::new("Bob");
    let alice_again = Player::new("Alice");

    session.start_game_single(alice.clone());
    session.stop_game();
    session.start_game_single(bob.clone());
    session.stop_game();
    session.start_game_single(alice.clone());
    session.stop_game();
    // A fresh handle with a reused name is a distinct player.
    session.start_game_single(alice_again.clone());
    session.stop_game();

    let players = session.players();
    assert_eq!(players.len(), 3);
    assert!(players[0].is_same(&alice));
    assert!(players[1].is_same(&bob));
    assert!(players[2].is_same(&alice_again));
}

#[test]
fn test_sessions_are_independent() {
    // No global state: two sessions run side by side without interfering.
    let first = short_session();
    let second = short_session();
    let alice = Player::new("Alice");
    let bob = Player::new("Bob");

    first.start_game_single(alice.clone());
    second.start_game_single(bob.clone());
    first.stop_game();

    assert_eq!(first.state(), GameState::Stopped);
    assert!(second.is_game_started());
    let over = second
        .watch()
        .wait_for(GRACE, is_over)
        .expect("second match never ended");
    assert!(over.player().unwrap().is_same(&bob));
}
