//! Shared test server harness: binds a real `TcpListener`, builds the
//! router via [`colorsync_runtime::build_app`], and serves it on a
//! background task so integration tests can drive it with real WebSocket
//! clients.

use std::net::SocketAddr;
use std::time::Duration;

use colorsync_core::protocol::{ClientFrame, GameStartRequest, ServerFrame};
use colorsync_runtime::config::Config;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    pub service_token_secret: Vec<u8>,
    _serve: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new() -> Self {
        let config = Config {
            port: 0,
            service_token_secret: b"test-service-secret".to_vec(),
        };
        let service_token_secret = config.service_token_secret.clone();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = colorsync_runtime::build_app(config);
        let serve = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            service_token_secret,
            _serve: serve,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, room_id: &str, user_id: &str) -> String {
        format!("ws://{}/game/ws?room_id={room_id}&user_id={user_id}", self.addr)
    }

    /// Announce a game directly through the HTTP handoff endpoint, the way
    /// the Matchmaker would after filling a room.
    pub async fn start_game(&self, room_id: &str, players: [String; 2]) {
        let token = colorsync_core::auth::mint_service_token("matchmaker", 60, &self.service_token_secret)
            .expect("service token");
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/game/start", self.base_url()))
            .header("X-Service-Token", token)
            .json(&GameStartRequest {
                room_id: room_id.to_string(),
                players,
            })
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success(), "game/start failed: {}", resp.status());
    }
}

pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

pub async fn ws_send(stream: &mut WsStream, frame: &ClientFrame) {
    let json = serde_json::to_string(frame).unwrap();
    stream.send(Message::Text(json.into())).await.unwrap();
}

/// Read the next `ServerFrame`, skipping any WS control frames, with a 5s
/// timeout so a hung assertion fails fast instead of blocking the suite.
pub async fn ws_read(stream: &mut WsStream) -> ServerFrame {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Close(_))) => panic!("websocket closed unexpectedly"),
                Some(Err(e)) => panic!("websocket error: {e}"),
                None => panic!("websocket stream ended"),
                _ => continue,
            }
        }
    })
    .await
    .expect("timed out waiting for a server frame")
}

/// Like [`ws_read`] but returns `None` on timeout, a closed socket, or a
/// transport error, for asserting that nothing more arrives on a
/// connection.
pub async fn ws_try_read(stream: &mut WsStream, timeout_ms: u64) -> Option<ServerFrame> {
    let result = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(serde_json::from_str(&text).unwrap()),
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
                _ => continue,
            }
        }
    })
    .await;
    result.ok().flatten()
}
