//! Link module - the peer channel over TCP
//!
//! Exactly two endpoints. The host derives a discoverable socket address
//! from the room code by a fixed port offset and listens there; the joiner
//! connects to the derived address. Messages travel as line-delimited JSON.
//!
//! The link owns its tokio runtime (bridging the sync session timeline with
//! async I/O): a read task turns inbound lines into [`LinkEvent`]s drained
//! via `try_recv`, a write task drains the outbound queue and emits
//! HEARTBEAT on a fixed interval while the channel is open. Sends are
//! fire-and-forget; a send against a closed channel is a no-op. Dropping
//! the link aborts every task and releases the socket.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::protocol::{self, PeerMessage};
use crate::session::RoomCode;
use crate::types::{COUNTDOWN_MS, HEARTBEAT_INTERVAL_MS};

/// Default first port of the room namespace; room N listens on base + N
pub const DEFAULT_PORT_BASE: u16 = 20000;

/// Link configuration
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub host: String,
    pub port_base: u16,
    pub heartbeat_ms: u64,
    pub countdown_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port_base: DEFAULT_PORT_BASE,
            heartbeat_ms: HEARTBEAT_INTERVAL_MS,
            countdown_ms: COUNTDOWN_MS,
        }
    }
}

impl LinkConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("LUX2048_MP_HOST").unwrap_or(defaults.host);
        let port_base = env::var("LUX2048_MP_PORT_BASE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port_base);
        let heartbeat_ms = env::var("LUX2048_MP_HEARTBEAT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.heartbeat_ms);
        let countdown_ms = env::var("LUX2048_MP_COUNTDOWN_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.countdown_ms);

        Self {
            host,
            port_base,
            heartbeat_ms,
            countdown_ms,
        }
    }

    /// Discoverable address for a room: fixed namespace base plus the code
    pub fn room_addr(&self, code: RoomCode) -> SocketAddr {
        format!("{}:{}", self.host, self.port_base + code.value())
            .parse()
            .expect("Invalid socket address")
    }
}

/// Session-scoped, recoverable connection failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The derived address is already bound: the room code is taken
    RoomTaken,
    /// Nothing is listening at the derived address
    RoomNotFound,
    /// Any other underlying network failure
    Network,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            LinkError::RoomTaken => "Room code already in use. Try again.",
            LinkError::RoomNotFound => "Room not found. Check the code.",
            LinkError::Network => "Network error. Check your connection.",
        };
        f.write_str(message)
    }
}

impl std::error::Error for LinkError {}

/// Notifications delivered from the channel, drained in arrival order
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// The channel to the peer is established
    Opened,
    /// A recognized protocol message arrived
    Message(PeerMessage),
    /// The channel closed (peer-initiated or network-caused)
    Closed,
    /// Connection establishment failed
    Failed(LinkError),
}

/// One end of the peer channel
pub struct PeerLink {
    _rt: Runtime,
    event_rx: mpsc::UnboundedReceiver<LinkEvent>,
    out_tx: mpsc::UnboundedSender<PeerMessage>,
}

impl PeerLink {
    /// Publish a room: bind the derived address and accept exactly one peer.
    /// Binding is synchronous so a room-code collision surfaces immediately.
    pub fn host(config: &LinkConfig, code: RoomCode) -> Result<Self, LinkError> {
        let rt = Runtime::new().expect("Failed to create tokio runtime");
        let addr = config.room_addr(code);

        let listener = rt.block_on(TcpListener::bind(addr)).map_err(|err| {
            log::warn!("bind {} failed: {}", addr, err);
            if err.kind() == io::ErrorKind::AddrInUse {
                LinkError::RoomTaken
            } else {
                LinkError::Network
            }
        })?;
        log::info!("room {} listening on {}", code, addr);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let heartbeat = Duration::from_millis(config.heartbeat_ms.max(1));

        rt.spawn(async move {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    log::info!("peer connected from {}", peer_addr);
                    let _ = event_tx.send(LinkEvent::Opened);
                    drive_connection(socket, event_tx, out_rx, heartbeat).await;
                }
                Err(err) => {
                    log::warn!("accept failed: {}", err);
                    let _ = event_tx.send(LinkEvent::Failed(LinkError::Network));
                }
            }
        });

        Ok(Self {
            _rt: rt,
            event_rx,
            out_tx,
        })
    }

    /// Connect to a published room. Establishment is asynchronous; failure
    /// arrives later as [`LinkEvent::Failed`].
    pub fn join(config: &LinkConfig, code: RoomCode) -> Self {
        let rt = Runtime::new().expect("Failed to create tokio runtime");
        let addr = config.room_addr(code);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let heartbeat = Duration::from_millis(config.heartbeat_ms.max(1));

        rt.spawn(async move {
            match TcpStream::connect(addr).await {
                Ok(socket) => {
                    log::info!("connected to room at {}", addr);
                    let _ = event_tx.send(LinkEvent::Opened);
                    drive_connection(socket, event_tx, out_rx, heartbeat).await;
                }
                Err(err) => {
                    log::warn!("connect to {} failed: {}", addr, err);
                    let failure = if err.kind() == io::ErrorKind::ConnectionRefused {
                        LinkError::RoomNotFound
                    } else {
                        LinkError::Network
                    };
                    let _ = event_tx.send(LinkEvent::Failed(failure));
                }
            }
        });

        Self {
            _rt: rt,
            event_rx,
            out_tx,
        }
    }

    /// Drain the next pending channel notification, if any
    pub fn try_recv(&mut self) -> Option<LinkEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Fire-and-forget send; silently a no-op once the channel is gone
    pub fn send(&self, message: PeerMessage) {
        let _ = self.out_tx.send(message);
    }
}

/// Pump one established connection until either side goes away
async fn drive_connection(
    socket: TcpStream,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
    mut out_rx: mpsc::UnboundedReceiver<PeerMessage>,
    heartbeat: Duration,
) {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let write_task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + heartbeat;
        let mut beat = tokio::time::interval_at(start, heartbeat);
        loop {
            let message = tokio::select! {
                out = out_rx.recv() => match out {
                    Some(message) => message,
                    None => break,
                },
                _ = beat.tick() => PeerMessage::Heartbeat,
            };

            let Ok(line) = serde_json::to_string(&message) else {
                continue;
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match protocol::decode(trimmed) {
                    Some(message) => {
                        if event_tx.send(LinkEvent::Message(message)).is_err() {
                            break;
                        }
                    }
                    None => {
                        log::debug!("dropping unrecognized message: {}", trimmed);
                    }
                }
            }
        }
    }

    let _ = event_tx.send(LinkEvent::Closed);
    write_task.abort();
}
