//! A single game's live connections, wrapping the transport-agnostic
//! [`Game`]. One lock must cover connections, disconnect flags, round
//! state, and results together, so `Session` holds `Game` directly rather
//! than behind its own nested mutex.

use std::collections::HashMap;
use std::sync::Arc;

use colorsync_core::domain::Game;
use colorsync_core::protocol::{PlayerId, ServerFrame};
use tokio::sync::{Notify, mpsc};

/// A message on a player's outbound channel: either a frame to forward, or
/// an instruction from [`GameManager::open_session`](crate::manager::GameManager::open_session)
/// telling the write task that this connection has been superseded and
/// should close itself.
#[derive(Debug, Clone)]
pub enum Outbound {
    Frame(ServerFrame),
    Close,
}

/// Per-player outbound channel; the WebSocket write loop drains the paired
/// receiver and forwards frames as text.
pub type PlayerTx = mpsc::UnboundedSender<Outbound>;
pub type PlayerRx = mpsc::UnboundedReceiver<Outbound>;

/// One player's registered connection, tagged with the generation it was
/// installed under. `OpenSession` bumps the generation every time it
/// replaces a player's slot, so a read loop that outlives its replacement
/// can tell, when it finally terminates, whether it's still the connection
/// of record for that player.
pub struct ConnectionSlot {
    pub tx: PlayerTx,
    pub generation: u64,
}

pub struct Session {
    pub game: Game,
    pub connections: HashMap<PlayerId, ConnectionSlot>,
    /// Wakes the round scheduler's "first of answer / deadline" wait.
    /// Notified on a winning `CLICK` and on disconnect, so the scheduler
    /// never blocks longer than necessary once the round is decided one
    /// way or another.
    pub wake: Arc<Notify>,
}

impl Session {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            connections: HashMap::new(),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn send_to_player(&self, player_id: &str, frame: &ServerFrame) {
        if let Some(slot) = self.connections.get(player_id) {
            let _ = slot.tx.send(Outbound::Frame(frame.clone()));
        }
    }

    pub fn broadcast(&self, frame: &ServerFrame) {
        for slot in self.connections.values() {
            let _ = slot.tx.send(Outbound::Frame(frame.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorsync_core::domain::Game;

    fn session_with_players() -> (Session, PlayerRx, PlayerRx) {
        let mut session = Session::new(Game::new(
            "room1".to_string(),
            ["alice".to_string(), "bob".to_string()],
        ));
        let (alice_tx, alice_rx) = mpsc::unbounded_channel();
        let (bob_tx, bob_rx) = mpsc::unbounded_channel();
        session.connections.insert("alice".to_string(), ConnectionSlot { tx: alice_tx, generation: 0 });
        session.connections.insert("bob".to_string(), ConnectionSlot { tx: bob_tx, generation: 0 });
        (session, alice_rx, bob_rx)
    }

    #[test]
    fn send_to_player_reaches_only_that_players_channel() {
        let (session, mut alice_rx, mut bob_rx) = session_with_players();
        session.send_to_player("alice", &ServerFrame::WrongAnswer {});
        assert!(matches!(alice_rx.try_recv().unwrap(), Outbound::Frame(ServerFrame::WrongAnswer {})));
        assert!(bob_rx.try_recv().is_err());
    }

    #[test]
    fn broadcast_reaches_every_connected_player() {
        let (session, mut alice_rx, mut bob_rx) = session_with_players();
        session.broadcast(&ServerFrame::Pong {});
        assert!(matches!(alice_rx.try_recv().unwrap(), Outbound::Frame(ServerFrame::Pong {})));
        assert!(matches!(bob_rx.try_recv().unwrap(), Outbound::Frame(ServerFrame::Pong {})));
    }

    #[test]
    fn send_to_unregistered_player_is_a_silent_no_op() {
        let (session, _alice_rx, _bob_rx) = session_with_players();
        session.send_to_player("carol", &ServerFrame::Pong {});
    }
}
