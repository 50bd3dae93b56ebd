//! Transport-agnostic data model for rooms and games.
//!
//! Nothing here holds a lock, a socket, or a channel — those live in the
//! Matchmaker's room table and the Runtime's per-game session wrapper
//! respectively, keeping pure rules separate from connection/locking
//! concerns.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::protocol::{Color, GameWinner, PlayerId, PlayerStats, RoundResult, RoundWinner};

/// Fixed number of rounds per game.
pub const MAX_ROUNDS: u32 = 5;

/// Hard per-round deadline from `ROUND_START`.
pub const ROUND_DEADLINE_SECS: u64 = 5;

/// Pre-game pause after `GAME_START` so clients can present lobby UI.
pub const PRE_GAME_PAUSE_SECS: u64 = 2;

/// Pause between a round's `ROUND_RESULT` and the next `ROUND_START`.
pub const INTER_ROUND_PAUSE_SECS: u64 = 3;

// ---------------------------------------------------------------------------
// Room (Matchmaker side)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Full,
    Closed,
}

/// A matchmaking room: up to two player ids, tracked from creation through
/// handoff to the Runtime.
#[derive(Debug, Clone)]
pub struct Room {
    pub room_id: String,
    pub players: Vec<PlayerId>,
    pub status: RoomStatus,
}

impl Room {
    pub fn new(room_id: String, first_player: PlayerId) -> Self {
        Self {
            room_id,
            players: vec![first_player],
            status: RoomStatus::Waiting,
        }
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }

    /// Append the second player and mark the room `full`.
    pub fn fill(&mut self, second_player: PlayerId) {
        self.players.push(second_player);
        self.status = RoomStatus::Full;
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.status, RoomStatus::Closed)
    }
}

// ---------------------------------------------------------------------------
// Game (Runtime side)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    WaitingForPlayers,
    InProgress,
    Finished,
    Completed,
}

/// Mutable round state, live only while
/// `Game::status == InProgress` and reset at the top of every round.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub word: String,
    pub color: Color,
    pub round_start_time: Instant,
    pub round_answered: bool,
    pub round_finished: bool,
    pub round_winner: Option<RoundWinner>,
    pub round_latency_ms: u64,
    pub wrong_answers: HashSet<PlayerId>,
}

impl RoundState {
    /// `word` and `color` are drawn independently and uniformly at random
    /// — the caller passes the two independent draws in.
    fn new(word_color: Color, color: Color) -> Self {
        Self {
            word: word_color.as_word().to_string(),
            color,
            round_start_time: Instant::now(),
            round_answered: false,
            round_finished: false,
            round_winner: None,
            round_latency_ms: 0,
            wrong_answers: HashSet::new(),
        }
    }
}

/// Outcome of evaluating a single `CLICK` under the game's lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// First correct answer this round; `latency_ms` is the elapsed time
    /// since `round_start_time`.
    Won { latency_ms: u64 },
    /// Wrong color; the player is now locked out for this round.
    Wrong,
    /// Late frame, already-resolved round, or a repeat click from a
    /// locked-out player — no state change.
    Ignored,
}

/// Per-room runtime record.
///
/// `players` is an immutable snapshot copied at handoff time; it never
/// changes after construction.
#[derive(Debug, Clone)]
pub struct Game {
    pub room_id: String,
    pub players: [PlayerId; 2],
    pub disconnected: HashMap<PlayerId, bool>,
    pub status: GameStatus,
    pub current_round: u32,
    pub max_rounds: u32,
    pub results: Vec<RoundResult>,
    pub round: Option<RoundState>,
}

impl Game {
    pub fn new(room_id: String, players: [PlayerId; 2]) -> Self {
        let disconnected = players.iter().cloned().map(|p| (p, false)).collect();
        Self {
            room_id,
            players,
            disconnected,
            status: GameStatus::WaitingForPlayers,
            current_round: 0,
            max_rounds: MAX_ROUNDS,
            results: Vec::new(),
            round: None,
        }
    }

    pub fn opponent_of<'a>(&'a self, player_id: &str) -> Option<&'a PlayerId> {
        self.players.iter().find(|p| p.as_str() != player_id)
    }

    pub fn both_registered(&self, registered: impl Fn(&PlayerId) -> bool) -> bool {
        self.players.iter().all(registered)
    }

    pub fn any_disconnected(&self) -> bool {
        self.disconnected.values().any(|&d| d)
    }

    pub fn mark_disconnected(&mut self, player_id: &str) {
        if let Some(flag) = self.disconnected.get_mut(player_id) {
            *flag = true;
        }
    }

    /// Advance to a new round: bumps `current_round` and installs fresh
    /// round state.
    pub fn start_round(&mut self, word_color: Color, color: Color) {
        self.current_round += 1;
        self.round = Some(RoundState::new(word_color, color));
    }

    /// Evaluate a `CLICK` from `player_id` under the game's lock.
    pub fn evaluate_click(&mut self, player_id: &str, answer: Color) -> ClickOutcome {
        let Some(round) = self.round.as_mut() else {
            return ClickOutcome::Ignored;
        };
        if round.round_finished || round.round_answered {
            return ClickOutcome::Ignored;
        }
        if round.wrong_answers.contains(player_id) {
            return ClickOutcome::Ignored;
        }

        let latency_ms = round.round_start_time.elapsed().as_millis() as u64;

        if answer == round.color {
            round.round_answered = true;
            round.round_winner = Some(RoundWinner::Player(player_id.to_string()));
            round.round_latency_ms = latency_ms;
            ClickOutcome::Won { latency_ms }
        } else {
            round.wrong_answers.insert(player_id.to_string());
            ClickOutcome::Wrong
        }
    }

    /// Deadline fires with no winner yet: set the sentinel,
    /// the caller is responsible for latching `round_finished` afterwards.
    pub fn expire_round_if_unanswered(&mut self) {
        if let Some(round) = self.round.as_mut()
            && !round.round_answered
        {
            round.round_winner = Some(RoundWinner::Timeout);
        }
    }

    /// Latch `round_finished`. Monotonic: calling this twice is a no-op.
    pub fn latch_round_finished(&mut self) {
        if let Some(round) = self.round.as_mut() {
            round.round_finished = true;
        }
    }

    /// Consume the current round state and append a [`RoundResult`] to
    /// `results`. Returns `None` if no round is in progress.
    pub fn finish_round(&mut self) -> Option<RoundResult> {
        let round = self.round.take()?;
        let winner = round.round_winner.unwrap_or(RoundWinner::Timeout);
        let result = RoundResult {
            round: self.current_round,
            word: round.word,
            color: round.color,
            winner,
            latency_ms: round.round_latency_ms,
        };
        self.results.push(result.clone());
        Some(result)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Per-player wins / total / average latency over the recorded rounds.
///
/// Pure function of `results` — re-running it on the same slice always
/// yields the same output.
pub fn compute_stats(
    results: &[RoundResult],
    players: &[PlayerId; 2],
) -> HashMap<PlayerId, PlayerStats> {
    let mut stats: HashMap<PlayerId, PlayerStats> =
        players.iter().cloned().map(|p| (p, PlayerStats::default())).collect();

    for result in results {
        if let RoundWinner::Player(ref winner) = result.winner
            && let Some(entry) = stats.get_mut(winner)
        {
            entry.wins += 1;
            entry.total_latency += result.latency_ms;
        }
    }

    for entry in stats.values_mut() {
        if entry.wins > 0 {
            entry.avg_latency = entry.total_latency / entry.wins as u64;
        }
    }

    stats
}

/// Determine `game_winner` from final stats.
pub fn determine_game_winner(
    stats: &HashMap<PlayerId, PlayerStats>,
    players: &[PlayerId; 2],
) -> GameWinner {
    let [a, b] = players;
    let sa = stats.get(a).copied().unwrap_or_default();
    let sb = stats.get(b).copied().unwrap_or_default();

    match sa.wins.cmp(&sb.wins) {
        Ordering::Greater => GameWinner::Player(a.clone()),
        Ordering::Less => GameWinner::Player(b.clone()),
        Ordering::Equal if sa.wins == 0 => GameWinner::Draw,
        Ordering::Equal => match sa.total_latency.cmp(&sb.total_latency) {
            Ordering::Less => GameWinner::Player(a.clone()),
            Ordering::Greater => GameWinner::Player(b.clone()),
            Ordering::Equal => GameWinner::Draw,
        },
    }
}
