//! WebSocket client for log streams.

use std::{fmt::Display, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{
    Sink, SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{net::TcpStream, sync::Mutex, task::JoinHandle};
use tokio_tungstenite::{
    Connector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config,
    tungstenite::{
        self, Message,
        client::IntoClientRequest,
        http::{HeaderName, HeaderValue},
    },
};
use url::Url;

use crate::protocol::Frame;

/// Interval between liveness frames.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Header carrying the access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

const HEARTBEAT_PAYLOAD: &[u8] = b"ping";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid server URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid access token: {0}")]
    InvalidToken(String),
    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// Connection options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectOptions {
    /// Skip server certificate verification.
    pub insecure: bool,
}

/// Source of inbound frames for a session.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame.
    ///
    /// Returns `None` once the stream has ended.
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError>;

    /// Close the connection. Errors are ignored.
    async fn close(&mut self);
}

/// Map the server base URL to its websocket counterpart and append `path`.
///
/// # Errors
/// Returns error if the URL is invalid or its scheme is not http(s).
pub fn websocket_url(server_url: &str, path: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: server_url.to_string(),
        reason,
    };

    let mut url = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid(format!("cannot switch scheme to {scheme}")))?;

    let base = url.as_str().trim_end_matches('/');
    let joined = format!("{base}/{}", path.trim_start_matches('/'));
    Url::parse(&joined).map_err(|e| invalid(e.to_string()))
}

/// Spawn the heartbeat task.
///
/// Sends a ping immediately and then once per `period`. The task ends
/// silently on the first failed write.
pub fn spawn_heartbeat<S>(sink: Arc<Mutex<S>>, period: Duration) -> JoinHandle<()>
where
    S: Sink<Message> + Send + Unpin + 'static,
    S::Error: Display + Send,
{
    tokio::spawn(async move {
        loop {
            let ping = Message::Ping(HEARTBEAT_PAYLOAD.to_vec());
            if let Err(e) = sink.lock().await.send(ping).await {
                tracing::debug!("Heartbeat stopped: {e}");
                break;
            }
            tokio::time::sleep(period).await;
        }
    })
}

/// Open a log stream connection.
///
/// # Errors
/// Returns error if the URL, token or TLS setup is invalid, or the handshake fails.
pub async fn connect(
    server_url: &str,
    path: &str,
    access_token: &str,
    options: ConnectOptions,
) -> Result<WsConnection, TransportError> {
    let url = websocket_url(server_url, path)?;

    let mut request = url.as_str().into_client_request()?;
    let token =
        HeaderValue::from_str(access_token).map_err(|e| TransportError::InvalidToken(e.to_string()))?;
    request
        .headers_mut()
        .insert(HeaderName::from_static(ACCESS_TOKEN_HEADER), token);

    let connector = if options.insecure {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;
        Some(Connector::NativeTls(tls))
    } else {
        None
    };

    let (ws, response) = connect_async_tls_with_config(request, None, false, connector).await?;
    tracing::debug!("WEBSOCKET {url} {}", response.status());

    Ok(WsConnection::new(ws))
}

/// Open websocket connection with a running heartbeat.
pub struct WsConnection {
    sink: Arc<Mutex<SplitSink<WsStream, Message>>>,
    stream: SplitStream<WsStream>,
    heartbeat: JoinHandle<()>,
}

impl WsConnection {
    fn new(ws: WsStream) -> Self {
        let (sink, stream) = ws.split();
        let sink = Arc::new(Mutex::new(sink));
        let heartbeat = spawn_heartbeat(Arc::clone(&sink), HEARTBEAT_INTERVAL);
        Self {
            sink,
            stream,
            heartbeat,
        }
    }
}

#[async_trait]
impl FrameSource for WsConnection {
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            let Some(msg) = self.stream.next().await else {
                return Ok(None);
            };
            let frame = match msg? {
                Message::Text(text) => Frame::Text(text),
                Message::Binary(data) => Frame::Binary(data),
                Message::Ping(_) => Frame::Ping,
                Message::Pong(_) => Frame::Pong,
                Message::Close(_) => Frame::Close,
                Message::Frame(_) => continue,
            };
            return Ok(Some(frame));
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.lock().await.close().await {
            tracing::debug!("WebSocket close: {e}");
        }
        tracing::debug!(
            heartbeat_stopped = self.heartbeat.is_finished(),
            "WebSocket closed"
        );
    }
}
