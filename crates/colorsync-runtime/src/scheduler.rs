//! The round scheduler: one task per game, driving it from `GAME_START`
//! through `MAX_ROUNDS` rounds to a final `GAME_OVER`.
//!
//! The "wait for the round to resolve" step is a `tokio::select!` between
//! the shared [`Notify`](tokio::sync::Notify) and a deadline sleep rather
//! than a polling loop.

use std::sync::Arc;
use std::time::Duration;

use colorsync_core::domain::{GameStatus, INTER_ROUND_PAUSE_SECS, MAX_ROUNDS, PRE_GAME_PAUSE_SECS, ROUND_DEADLINE_SECS};
use colorsync_core::protocol::{Color, ServerFrame};
use rand::Rng;

use crate::manager::GameManager;

/// Spawned once, when the second player's `OpenSession` flips a game from
/// `waiting_for_players` to `in_progress`.
pub async fn run_round_scheduler(manager: Arc<GameManager>, room_id: String) {
    let Some(session) = manager.get(&room_id).await else {
        return;
    };

    {
        let guard = session.lock().await;
        guard.broadcast(&ServerFrame::GameStart {
            max_rounds: MAX_ROUNDS,
            players: guard.game.players.to_vec(),
        });
    }

    tokio::time::sleep(Duration::from_secs(PRE_GAME_PAUSE_SECS)).await;

    for _ in 0..MAX_ROUNDS {
        // Step 3a: abort if a player has disconnected, or the game ended
        // some other way while we were asleep (disconnect raced ahead of
        // us) — the disconnect path is the sole broadcaster of the final
        // GAME_OVER.
        {
            let guard = session.lock().await;
            if guard.game.any_disconnected() || guard.game.status != GameStatus::InProgress {
                return;
            }
        }

        let (word_color, color) = draw_round_colors();
        let wake = {
            let mut guard = session.lock().await;
            guard.game.start_round(word_color, color);
            let round = guard.game.current_round;
            guard.broadcast(&ServerFrame::RoundStart {
                round,
                word: word_color.as_word().to_string(),
                color,
            });
            guard.wake.clone()
        };

        tokio::select! {
            _ = wake.notified() => {}
            _ = tokio::time::sleep(Duration::from_secs(ROUND_DEADLINE_SECS)) => {}
        }

        let result = {
            let mut guard = session.lock().await;
            if guard.game.status != GameStatus::InProgress {
                return;
            }
            guard.game.expire_round_if_unanswered();
            guard.game.latch_round_finished();
            let result = guard.game.finish_round();
            if let Some(result) = &result {
                guard.broadcast(&ServerFrame::RoundResult {
                    round: result.round,
                    winner: result.winner.clone(),
                    latency_ms: result.latency_ms,
                });
            }
            result
        };
        if result.is_none() {
            return;
        }

        tokio::time::sleep(Duration::from_secs(INTER_ROUND_PAUSE_SECS)).await;
    }

    if session.lock().await.game.status == GameStatus::InProgress {
        manager.finish_game_completed(&room_id).await;
    }
}

/// Word and displayed color are drawn independently and uniformly at
/// random, so they agree roughly a quarter of the time.
fn draw_round_colors() -> (Color, Color) {
    let mut rng = rand::rng();
    let word_color = Color::ALL[rng.random_range(0..Color::ALL.len())];
    let display_color = Color::ALL[rng.random_range(0..Color::ALL.len())];
    (word_color, display_color)
}
