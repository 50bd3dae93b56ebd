//! Manages all active games.
//!
//! An outer `RwLock` allows concurrent reads (status probes, new
//! `OpenSession` calls) while the map itself is only briefly write-locked to
//! insert or remove a game; each game's own state lives behind the single
//! per-game lock described in `session.rs`.

use std::collections::HashMap;
use std::sync::Arc;

use colorsync_core::domain::{ClickOutcome, Game, GameStatus};
use colorsync_core::error::CoreError;
use colorsync_core::protocol::{Color, EndReason, GameWinner, PlayerId, ServerFrame};
use tokio::sync::{Mutex, RwLock};

use crate::session::{ConnectionSlot, Outbound, PlayerRx, Session};

pub type SessionHandle = Arc<Mutex<Session>>;

pub struct GameManager {
    games: RwLock<HashMap<String, SessionHandle>>,
}

/// Result of [`GameManager::open_session`]: the caller uses `game_started`
/// to decide whether to spawn the round scheduler, and must pass
/// `generation` back into [`GameManager::disconnect`] when its read loop
/// ends, so a superseded connection can't be mistaken for the live one.
pub struct OpenedSession {
    pub session: SessionHandle,
    pub rx: PlayerRx,
    pub game_started: bool,
    pub generation: u64,
}

impl GameManager {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }

    /// `POST /game/start`. Rejects a duplicate
    /// announcement for a room that already has a runtime record.
    pub async fn start_game(
        &self,
        room_id: String,
        players: [PlayerId; 2],
    ) -> Result<GameStatus, CoreError> {
        let mut games = self.games.write().await;
        if games.contains_key(&room_id) {
            return Err(CoreError::BadRequest(format!(
                "game for room '{room_id}' already exists"
            )));
        }
        let game = Game::new(room_id.clone(), players);
        let status = game.status;
        games.insert(room_id, Arc::new(Mutex::new(Session::new(game))));
        Ok(status)
    }

    pub async fn status(&self, room_id: &str) -> Option<GameStatus> {
        let games = self.games.read().await;
        let session = games.get(room_id)?.clone();
        drop(games);
        Some(session.lock().await.game.status)
    }

    pub async fn get(&self, room_id: &str) -> Option<SessionHandle> {
        self.games.read().await.get(room_id).cloned()
    }

    pub async fn remove(&self, room_id: &str) {
        self.games.write().await.remove(room_id);
    }

    /// `OpenSession`.
    pub async fn open_session(
        &self,
        room_id: &str,
        player_id: &str,
    ) -> Result<OpenedSession, CoreError> {
        let session = self
            .get(room_id)
            .await
            .ok_or_else(|| CoreError::GameNotFound(room_id.to_string()))?;

        let (rx, game_started, generation) = {
            let mut guard = session.lock().await;

            if !matches!(guard.game.status, GameStatus::WaitingForPlayers) {
                return Err(CoreError::GameNotJoinable);
            }
            if !guard.game.players.iter().any(|p| p == player_id) {
                return Err(CoreError::GameNotFound(room_id.to_string()));
            }

            // Last-writer-wins: close the previous connection for this
            // player, if any, by telling its write task to send a close
            // frame and exit, then replace the slot under a new generation.
            // A read loop belonging to the old generation that's still
            // blocked on its socket will, once it does terminate, see its
            // generation no longer matches and skip `disconnect` entirely
            // (see `GameManager::disconnect`) — this is only reachable
            // during the pre-start window since the status check above
            // already excludes any later state.
            let generation = match guard.connections.get(player_id) {
                Some(old) => {
                    let _ = old.tx.send(Outbound::Close);
                    old.generation + 1
                }
                None => 0,
            };

            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            guard
                .connections
                .insert(player_id.to_string(), ConnectionSlot { tx, generation });
            guard.game.disconnected.insert(player_id.to_string(), false);

            let both_registered = guard
                .game
                .players
                .iter()
                .all(|p| guard.connections.contains_key(p));

            let game_started = both_registered && guard.game.status == GameStatus::WaitingForPlayers;
            if game_started {
                guard.game.status = GameStatus::InProgress;
            }

            (rx, game_started, generation)
        };

        Ok(OpenedSession {
            session,
            rx,
            game_started,
            generation,
        })
    }

    /// Disconnect handling. Authoritative: if the game was
    /// `in_progress`, this is the sole place that transitions it to
    /// `finished` and broadcasts the disconnect `GAME_OVER`. The round
    /// scheduler only ever observes the resulting status change and bails
    /// out without re-broadcasting.
    ///
    /// `generation` is the one [`GameManager::open_session`] handed the
    /// caller's connection. If a newer connection has since replaced this
    /// player's slot, this call is a stale read loop's exit — it must not
    /// flip a live game to `finished` out from under the connection that
    /// actually superseded it, so it's ignored entirely.
    pub async fn disconnect(self: &Arc<Self>, room_id: &str, player_id: &str, generation: u64) {
        let Some(session) = self.get(room_id).await else {
            return;
        };

        let should_complete = {
            let mut guard = session.lock().await;

            let current_generation = guard.connections.get(player_id).map(|slot| slot.generation);
            if current_generation != Some(generation) {
                return;
            }

            guard.game.mark_disconnected(player_id);

            if guard.game.status != GameStatus::InProgress {
                false
            } else {
                guard.game.status = GameStatus::Finished;
                let winner = guard
                    .game
                    .opponent_of(player_id)
                    .cloned()
                    .map(GameWinner::Player)
                    .unwrap_or(GameWinner::Draw);

                let frame = ServerFrame::GameOver {
                    reason: EndReason::OpponentDisconnected,
                    winner,
                    results: guard.game.results.clone(),
                    // Open question: stats are optional on
                    // disconnect; we omit them here and only compute them
                    // for a completed game.
                    stats: None,
                };
                guard.broadcast(&frame);
                guard.wake.notify_one();
                true
            }
        };

        if should_complete {
            self.clone().schedule_completion(room_id.to_string());
        }
    }

    /// Compute final stats, broadcast `GAME_OVER`, and schedule the
    /// `completed` transition + eviction.
    pub async fn finish_game_completed(self: &Arc<Self>, room_id: &str) {
        let Some(session) = self.get(room_id).await else {
            return;
        };

        {
            let mut guard = session.lock().await;
            guard.game.status = GameStatus::Finished;

            let stats = colorsync_core::domain::compute_stats(&guard.game.results, &guard.game.players);
            let winner = colorsync_core::domain::determine_game_winner(&stats, &guard.game.players);

            let frame = ServerFrame::GameOver {
                reason: EndReason::GameCompleted,
                winner,
                results: guard.game.results.clone(),
                stats: Some(stats),
            };
            guard.broadcast(&frame);
        }

        self.clone().schedule_completion(room_id.to_string());
    }

    /// Step 6: "pause briefly, close both connections, transition status
    /// to completed." Connection close is driven by the write loop seeing
    /// the `GAME_OVER` frame pass through (see `ws_handler.rs`); here we
    /// only flip the bookkeeping status and evict the finished game so the
    /// map doesn't grow without bound over the process lifetime.
    fn schedule_completion(self: Arc<Self>, room_id: String) {
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            if let Some(session) = self.get(&room_id).await {
                session.lock().await.game.status = GameStatus::Completed;
            }
            self.remove(&room_id).await;
        });
    }
}

/// Evaluate a `CLICK` under the game's lock and react to the outcome.
pub async fn handle_click(session: &SessionHandle, player_id: &str, answer: Color) {
    let mut guard = session.lock().await;
    if guard.game.status != GameStatus::InProgress {
        return;
    }
    match guard.game.evaluate_click(player_id, answer) {
        ClickOutcome::Won { .. } => {
            guard.wake.notify_one();
        }
        ClickOutcome::Wrong => {
            guard.send_to_player(player_id, &ServerFrame::WrongAnswer {});
        }
        ClickOutcome::Ignored => {}
    }
}
