//! Error kind taxonomy shared by the Matchmaker and Game Runtime.
//!
//! This enum is transport-agnostic: each service maps it onto its own HTTP
//! status codes / WebSocket close behavior at its boundary, staying a plain
//! `thiserror` enum and letting its caller decide what to do with it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("missing credential")]
    AuthMissing,

    #[error("invalid credential")]
    AuthInvalid,

    #[error("credential does not match requested identity")]
    AuthMismatch,

    #[error("unknown player")]
    UnknownPlayer,

    #[error("player already queued in another room")]
    AlreadyQueued,

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("no game for room '{0}'")]
    GameNotFound(String),

    #[error("game is not joinable in its current state")]
    GameNotJoinable,

    #[error("upstream call failed: {0}")]
    Transient(String),
}
