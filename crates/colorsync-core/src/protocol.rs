//! Wire protocol shared by the Matchmaker and Game Runtime.
//!
//! Frames exchanged over the Runtime's WebSocket session are JSON objects of
//! the shape `{"type": "...", "payload": {...}}`; the HTTP surfaces of both
//! services exchange plain JSON request/response bodies. Everything here is
//! pure data — no I/O, no locking.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque player identifier, supplied by the identity service via the
/// authenticated request's claims. The core never mints these.
pub type PlayerId = String;

// ---------------------------------------------------------------------------
// Stroop prompt
// ---------------------------------------------------------------------------

/// One of the four colors a round's word can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// The word text rendered on screen when this color is chosen as the
    /// *semantic* word (as opposed to the *displayed* color).
    pub fn as_word(self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::Green => "GREEN",
            Color::Yellow => "YELLOW",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Blue => write!(f, "blue"),
            Color::Green => write!(f, "green"),
            Color::Yellow => write!(f, "yellow"),
        }
    }
}

// ---------------------------------------------------------------------------
// Round / game sentinels
// ---------------------------------------------------------------------------

/// The winner of a single round: either a player, or the `"timeout"`
/// sentinel when the deadline latch fired with no correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundWinner {
    Player(PlayerId),
    Timeout,
}

impl Serialize for RoundWinner {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            RoundWinner::Player(id) => s.serialize_str(id),
            RoundWinner::Timeout => s.serialize_str("timeout"),
        }
    }
}

impl<'de> Deserialize<'de> for RoundWinner {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(if raw == "timeout" {
            RoundWinner::Timeout
        } else {
            RoundWinner::Player(raw)
        })
    }
}

/// The winner of a whole game: either a player, or the `"draw"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameWinner {
    Player(PlayerId),
    Draw,
}

impl Serialize for GameWinner {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            GameWinner::Player(id) => s.serialize_str(id),
            GameWinner::Draw => s.serialize_str("draw"),
        }
    }
}

impl<'de> Deserialize<'de> for GameWinner {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(if raw == "draw" {
            GameWinner::Draw
        } else {
            GameWinner::Player(raw)
        })
    }
}

/// Why a `GAME_OVER` frame was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    GameCompleted,
    OpponentDisconnected,
}

/// A single round's result, appended to `Game::results` as each round ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub word: String,
    pub color: Color,
    pub winner: RoundWinner,
    pub latency_ms: u64,
}

/// Per-player end-of-game statistics, keyed by player id in `GAME_OVER`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PlayerStats {
    pub wins: u32,
    pub total_latency: u64,
    pub avg_latency: u64,
}

// ---------------------------------------------------------------------------
// WebSocket frames (Game Runtime session layer)
// ---------------------------------------------------------------------------

/// Frames the Runtime sends to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerFrame {
    GameStart {
        max_rounds: u32,
        players: Vec<PlayerId>,
    },
    RoundStart {
        round: u32,
        word: String,
        color: Color,
    },
    RoundResult {
        round: u32,
        winner: RoundWinner,
        latency_ms: u64,
    },
    /// Unicast to the offending player only.
    WrongAnswer {},
    GameOver {
        reason: EndReason,
        winner: GameWinner,
        results: Vec<RoundResult>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stats: Option<HashMap<PlayerId, PlayerStats>>,
    },
    Error {
        message: String,
    },
    Pong {},
}

/// Frames a client sends to the Runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientFrame {
    Click { answer: Color },
    Ping {},
}

// ---------------------------------------------------------------------------
// Matchmaker HTTP surface
// ---------------------------------------------------------------------------

/// `status` as reported by [`crate::domain::Room`] on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatusWire {
    Waiting,
    Full,
    Closed,
}

/// `POST /join` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    pub user_id: PlayerId,
}

/// `POST /join` response body.
#[derive(Debug, Clone, Serialize)]
pub struct JoinResponse {
    pub room_id: String,
    pub players: Vec<PlayerId>,
    pub status: RoomStatusWire,
    pub message: String,
}

/// `GET /rooms/{id}` response body.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub id: String,
    pub players: Vec<PlayerId>,
    pub status: RoomStatusWire,
}

/// `GET /room/{id}/ready` response body.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyView {
    pub ready: bool,
    pub players: Vec<PlayerId>,
}

/// Generic `{"error": "..."}` body for request-scoped failures (§7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `GET /health` response body, identical on both services.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "healthy" }
    }
}

// ---------------------------------------------------------------------------
// Runtime HTTP surface (inter-service + status probe)
// ---------------------------------------------------------------------------

/// `POST /game/start` request body, sent by the Matchmaker with a service
/// credential attached as a header (not part of the body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStartRequest {
    pub room_id: String,
    pub players: [PlayerId; 2],
}

/// `POST /game/start` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStartResponse {
    pub room_id: String,
    pub status: GameStatusWire,
}

/// `GET /game/status` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatusResponse {
    pub room_id: String,
    pub status: GameStatusWire,
}

/// `Game::status` as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatusWire {
    WaitingForPlayers,
    InProgress,
    Finished,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_frame_round_trip_tagging() {
        let frame = ServerFrame::RoundStart {
            round: 1,
            word: "RED".to_string(),
            color: Color::Blue,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "ROUND_START");
        assert_eq!(json["payload"]["word"], "RED");
        assert_eq!(json["payload"]["color"], "blue");
    }

    #[test]
    fn round_winner_sentinel_round_trips() {
        let timeout: RoundWinner = serde_json::from_str("\"timeout\"").unwrap();
        assert_eq!(timeout, RoundWinner::Timeout);
        let player: RoundWinner = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(player, RoundWinner::Player("alice".to_string()));
        assert_eq!(serde_json::to_string(&RoundWinner::Timeout).unwrap(), "\"timeout\"");
    }

    #[test]
    fn game_winner_draw_sentinel() {
        let draw: GameWinner = serde_json::from_str("\"draw\"").unwrap();
        assert_eq!(draw, GameWinner::Draw);
        assert_eq!(serde_json::to_string(&GameWinner::Draw).unwrap(), "\"draw\"");
    }

    #[test]
    fn client_frame_click_tagging() {
        let raw = r#"{"type":"CLICK","payload":{"answer":"red"}}"#;
        let frame: ClientFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ClientFrame::Click { answer } => assert_eq!(answer, Color::Red),
            _ => panic!("expected CLICK"),
        }
    }
}
