//! The room table + waiting slot, guarded by a single lock: a map behind one
//! async synchronization primitive, methods returning plain `Result`s. One
//! `Mutex` covers both the waiting slot and the room map, since the two must
//! be observed and mutated atomically together rather than independently.

use std::collections::HashMap;

use colorsync_core::domain::{Room, RoomStatus};
use colorsync_core::error::CoreError;
use colorsync_core::protocol::PlayerId;
use tokio::sync::Mutex;

struct Inner {
    rooms: HashMap<String, Room>,
    /// `Some(id)` only while `rooms[id].status == Waiting` and that room
    /// holds exactly one player.
    waiting: Option<String>,
}

/// Result of a successful `Join`.
pub enum JoinOutcome {
    Waiting(Room),
    Full(Room),
}

pub struct RoomTable {
    inner: Mutex<Inner>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rooms: HashMap::new(),
                waiting: None,
            }),
        }
    }

    /// `Join` under the single critical section.
    pub async fn join(&self, player_id: &PlayerId) -> Result<JoinOutcome, CoreError> {
        let mut inner = self.inner.lock().await;

        // A player id appears in at most one non-closed room.
        if inner
            .rooms
            .values()
            .any(|room| !room.is_closed() && room.contains(player_id))
        {
            return Err(CoreError::AlreadyQueued);
        }

        match inner.waiting.clone() {
            None => {
                let room_id = new_room_id();
                let room = Room::new(room_id.clone(), player_id.clone());
                inner.rooms.insert(room_id.clone(), room.clone());
                inner.waiting = Some(room_id);
                Ok(JoinOutcome::Waiting(room))
            }
            Some(room_id) => {
                let room = inner
                    .rooms
                    .get_mut(&room_id)
                    .expect("waiting slot always points at a live room");
                room.fill(player_id.clone());
                let filled = room.clone();
                inner.waiting = None;
                Ok(JoinOutcome::Full(filled))
            }
        }
    }

    pub async fn get(&self, room_id: &str) -> Option<Room> {
        self.inner.lock().await.rooms.get(room_id).cloned()
    }

    /// `Leave`: removes the caller, closes the room if it's now
    /// empty, and clears the waiting slot if this was the waiting room.
    pub async fn leave(&self, room_id: &str, player_id: &str) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        let room = inner
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| CoreError::RoomNotFound(room_id.to_string()))?;

        room.players.retain(|p| p != player_id);

        if room.players.is_empty() {
            room.status = RoomStatus::Closed;
            if inner.waiting.as_deref() == Some(room_id) {
                inner.waiting = None;
            }
        }

        Ok(())
    }

    /// Close a room once the Runtime reports the game has ended. The Matchmaker only learns this from the client's
    /// `leave` call — see `DESIGN.md` for why there's no runtime callback.
    pub async fn close(&self, room_id: &str) {
        let mut inner = self.inner.lock().await;
        if let Some(room) = inner.rooms.get_mut(room_id) {
            room.status = RoomStatus::Closed;
        }
    }
}

fn new_room_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_join_waits_second_fills() {
        let table = RoomTable::new();
        match table.join(&"a".to_string()).await.unwrap() {
            JoinOutcome::Waiting(room) => assert_eq!(room.players, vec!["a".to_string()]),
            JoinOutcome::Full(_) => panic!("expected waiting"),
        }
        match table.join(&"b".to_string()).await.unwrap() {
            JoinOutcome::Full(room) => {
                assert_eq!(room.players, vec!["a".to_string(), "b".to_string()]);
            }
            JoinOutcome::Waiting(_) => panic!("expected full"),
        }
    }

    #[tokio::test]
    async fn duplicate_join_rejected() {
        let table = RoomTable::new();
        table.join(&"a".to_string()).await.unwrap();
        let err = table.join(&"a".to_string()).await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyQueued));
    }

    #[tokio::test]
    async fn leave_closes_empty_room_and_clears_waiting_slot() {
        let table = RoomTable::new();
        let room_id = match table.join(&"a".to_string()).await.unwrap() {
            JoinOutcome::Waiting(room) => room.room_id,
            _ => unreachable!(),
        };
        table.leave(&room_id, "a").await.unwrap();
        assert!(table.get(&room_id).await.unwrap().is_closed());

        // The slot is free again; a third player should start a new room.
        match table.join(&"c".to_string()).await.unwrap() {
            JoinOutcome::Waiting(room) => assert_ne!(room.room_id, room_id),
            JoinOutcome::Full(_) => panic!("expected a fresh waiting room"),
        }
    }
}
