//! Net module - peer-to-peer versus mode over a discoverable channel
//!
//! Two peers coordinate a match with no authoritative server: each side runs
//! its own board and merely reports summary signals (score, loss) to the
//! other. This crate holds the pieces that make that work:
//!
//! - [`session`]: the pure coordination state machine
//!   (`idle -> searching|waiting -> countdown -> playing -> ended`)
//! - [`protocol`]: the closed wire-message set exchanged between peers
//! - [`link`]: the TCP channel, discovered by deriving a socket address from
//!   a human-shareable 4-digit room code
//! - [`driver`]: the synchronous front door serializing UI actions, timer
//!   ticks, and inbound messages onto one event timeline
//!
//! # Protocol Overview
//!
//! 1. **Discovery**: the host binds `port_base + code`; the joiner connects
//!    to the same derived address
//! 2. **Handshake**: joiner sends `HELLO` once on channel open, host replies
//!    `WELCOME` carrying its readiness; both sides are then `waiting`
//! 3. **Readiness**: each side sends `PLAYER_READY` on its local ready
//!    action; readiness never reverts within a session
//! 4. **Start**: when both are ready the host — and only the host — sends
//!    `START_COUNTDOWN`; each side then runs a fixed 3-2-1 local timer and
//!    independently re-initializes its own board
//! 5. **Play**: `SCORE_UPDATE` flows on score changes; the first side to top
//!    out sends `I_LOST` exactly once and the receiver wins
//! 6. **Liveness**: `HEARTBEAT` flows on a fixed interval; it carries no
//!    state, it only makes silent channel death detectable
//!
//! Every connection failure (code collision, room not found, network error,
//! disconnect) is session-scoped and recoverable: the session returns to
//! `idle` with a user-facing error string and the user retries.
//!
//! # Environment Variables
//!
//! - `LUX2048_MP_HOST`: bind/connect address (default: "127.0.0.1")
//! - `LUX2048_MP_PORT_BASE`: first port of the room namespace (default: 20000)
//! - `LUX2048_MP_HEARTBEAT_MS`: heartbeat interval (default: 5000)
//! - `LUX2048_MP_COUNTDOWN_MS`: pre-match countdown length (default: 3000)

pub mod driver;
pub mod link;
pub mod protocol;
pub mod session;

pub use lux_2048_core as core;
pub use lux_2048_types as types;

// Re-export the public surface for convenience
pub use driver::Multiplayer;
pub use link::{LinkConfig, LinkError, LinkEvent, PeerLink, DEFAULT_PORT_BASE};
pub use protocol::PeerMessage;
pub use session::{Command, RoomCode, Session, SessionEvent};
