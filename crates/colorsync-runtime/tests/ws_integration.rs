//! Integration tests driving a real `TestServer` over real WebSocket
//! connections, covering the invariants the review flagged as untested:
//! P3 (single ownership of a player's connection), P4 (round arbitration
//! under concurrent clicks), and P6 (frame ordering through a disconnect).

mod common;

use colorsync_core::protocol::{EndReason, GameWinner, ServerFrame};
use common::{TestServer, ws_connect, ws_read, ws_send, ws_try_read};
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

/// P3: reconnecting before the game starts closes the stale socket and the
/// new connection becomes the one that actually takes part in the game.
#[tokio::test]
async fn reconnect_closes_stale_connection_before_game_start() {
    let server = TestServer::new().await;
    server
        .start_game("room1", ["alice".to_string(), "bob".to_string()])
        .await;

    let mut alice_stale = ws_connect(&server.ws_url("room1", "alice")).await;
    let mut alice_live = ws_connect(&server.ws_url("room1", "alice")).await;

    // The stale connection is told to close rather than being left to hang
    // until its socket times out on its own.
    let closed = tokio::time::timeout(std::time::Duration::from_secs(2), async {
        loop {
            match alice_stale.next().await {
                Some(Ok(Message::Close(_))) => return true,
                None => return true,
                Some(Ok(_)) => continue,
                Some(Err(_)) => return true,
            }
        }
    })
    .await
    .expect("stale connection should be closed promptly");
    assert!(closed);

    let mut bob = ws_connect(&server.ws_url("room1", "bob")).await;

    // Both the surviving reconnect and the second player see the game
    // start — the stale connection never does.
    let start_for_alice = ws_read(&mut alice_live).await;
    assert!(matches!(start_for_alice, ServerFrame::GameStart { .. }));
    let start_for_bob = ws_read(&mut bob).await;
    assert!(matches!(start_for_bob, ServerFrame::GameStart { .. }));
}

/// P4: when both players click the correct color, exactly one of them wins
/// the round, even when the clicks are sent back-to-back with no
/// coordination between the two connections.
#[tokio::test]
async fn concurrent_correct_clicks_yield_single_round_winner() {
    let server = TestServer::new().await;
    server
        .start_game("room2", ["alice".to_string(), "bob".to_string()])
        .await;

    let mut alice = ws_connect(&server.ws_url("room2", "alice")).await;
    let mut bob = ws_connect(&server.ws_url("room2", "bob")).await;

    assert!(matches!(ws_read(&mut alice).await, ServerFrame::GameStart { .. }));
    assert!(matches!(ws_read(&mut bob).await, ServerFrame::GameStart { .. }));

    let round_start = loop {
        match ws_read(&mut alice).await {
            ServerFrame::RoundStart { color, .. } => break color,
            _ => continue,
        }
    };
    let _ = ws_read(&mut bob).await; // bob's own ROUND_START

    tokio::join!(
        ws_send(&mut alice, &colorsync_core::protocol::ClientFrame::Click { answer: round_start }),
        ws_send(&mut bob, &colorsync_core::protocol::ClientFrame::Click { answer: round_start }),
    );

    let alice_result = loop {
        match ws_read(&mut alice).await {
            ServerFrame::RoundResult { winner, .. } => break winner,
            ServerFrame::WrongAnswer {} => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    };
    let bob_result = loop {
        match ws_read(&mut bob).await {
            ServerFrame::RoundResult { winner, .. } => break winner,
            ServerFrame::WrongAnswer {} => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    };

    // Both connections observe the same, single winner for the round.
    assert_eq!(alice_result, bob_result);
    assert!(matches!(
        alice_result,
        colorsync_core::protocol::RoundWinner::Player(ref p) if p == "alice" || p == "bob"
    ));
}

/// P6: a mid-game disconnect produces exactly one `GAME_OVER` frame for the
/// surviving player, and nothing further arrives after it.
#[tokio::test]
async fn disconnect_mid_game_ends_game_for_survivor_only() {
    let server = TestServer::new().await;
    server
        .start_game("room3", ["alice".to_string(), "bob".to_string()])
        .await;

    let mut alice = ws_connect(&server.ws_url("room3", "alice")).await;
    let mut bob = ws_connect(&server.ws_url("room3", "bob")).await;

    assert!(matches!(ws_read(&mut alice).await, ServerFrame::GameStart { .. }));
    assert!(matches!(ws_read(&mut bob).await, ServerFrame::GameStart { .. }));

    // Drop alice's connection outright instead of sending a close frame —
    // the read loop on the server side sees the socket die either way.
    drop(alice);

    let frame = loop {
        match ws_read(&mut bob).await {
            ServerFrame::GameOver { reason, winner, .. } => break (reason, winner),
            ServerFrame::RoundStart { .. } | ServerFrame::RoundResult { .. } => continue,
            other => panic!("unexpected frame before GAME_OVER: {other:?}"),
        }
    };
    assert_eq!(frame.0, EndReason::OpponentDisconnected);
    assert_eq!(frame.1, GameWinner::Player("bob".to_string()));

    // Nothing more arrives — a single GAME_OVER, then the survivor's
    // connection closes too.
    assert!(ws_try_read(&mut bob, 500).await.is_none());
}
