//! Protocol module - wire messages exchanged between the two peers
//!
//! Line-delimited JSON with a closed tagged-union envelope:
//!
//! ```text
//! {"type":"WELCOME","payload":{"ready":false}}
//! ```
//!
//! The dispatcher only reacts to recognized message types; anything else —
//! unknown tags, malformed JSON, wrong payload shape — is dropped without
//! error.

use serde::{Deserialize, Serialize};

/// Every message that may cross the peer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PeerMessage {
    /// Joiner, once on channel open; starts the handshake
    #[serde(rename = "HELLO")]
    Hello,
    /// Host reply to HELLO; carries the host's current readiness
    #[serde(rename = "WELCOME")]
    Welcome { ready: bool },
    /// Either side, on the local ready action; readiness is monotonic
    #[serde(rename = "PLAYER_READY")]
    PlayerReady { ready: bool },
    /// Either side, only while playing
    #[serde(rename = "SCORE_UPDATE")]
    ScoreUpdate { score: u32 },
    /// Either side, at most once, on reaching local game over while playing
    #[serde(rename = "I_LOST")]
    ILost,
    /// Host only, once, when both sides are ready
    #[serde(rename = "START_COUNTDOWN")]
    StartCountdown,
    /// Periodic liveness signal; no state effect on the receiver
    #[serde(rename = "HEARTBEAT")]
    Heartbeat,
}

/// Decode one wire line. Returns None for anything unrecognized, which the
/// caller drops silently.
pub fn decode(line: &str) -> Option<PeerMessage> {
    serde_json::from_str(line).ok()
}
