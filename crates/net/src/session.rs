//! Session module - the multiplayer coordination state machine
//!
//! Pure and synchronous: events in, bounded command lists out. The driver
//! executes every command a transition produces (including message sends)
//! before the next event is handled, which is what keeps the protocol
//! ordering invariants intact without any locking.
//!
//! Host/joiner asymmetry: only the host ever authors the
//! `waiting -> countdown` transition (it sends START_COUNTDOWN); the joiner
//! reaches countdown purely by receiving that message. This avoids a
//! split-brain countdown start.

use std::fmt;

use arrayvec::ArrayVec;

use crate::link::LinkError;
use crate::protocol::PeerMessage;
use crate::types::{SessionStatus, Winner};
use lux_2048_core::SimpleRng;

/// Human-shareable 4-digit room token used as the sole discovery input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomCode(u16);

impl RoomCode {
    pub const MIN: u16 = 1000;
    pub const MAX: u16 = 9999;

    /// Parse a user-entered code: exactly four digits, no leading zero
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = s.parse::<u16>().ok()?;
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Draw a fresh code from the given rng
    pub fn generate(rng: &mut SimpleRng) -> Self {
        Self(Self::MIN + rng.next_range(u32::from(Self::MAX - Self::MIN + 1)) as u16)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete inputs serialized onto the session's single event timeline
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Host bound the discoverable address
    RoomCreated(RoomCode),
    /// Joiner started a connect attempt
    JoinStarted(RoomCode),
    /// Underlying channel established
    ChannelOpened,
    /// Inbound protocol message
    MessageReceived(PeerMessage),
    /// Channel closed by the peer or the network
    ChannelClosed,
    /// Connection establishment failed
    LinkFailed(LinkError),
    /// Local ready action
    LocalReady,
    /// The fixed local countdown timer expired
    CountdownFinished,
    /// Local score changed while playing
    LocalScore(u32),
    /// Local board reached game over
    LocalGameOver,
    /// Explicit session reset
    Reset,
}

/// Side effects a transition requests from the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fire-and-forget send over the peer channel
    Send(PeerMessage),
    /// Arm the fixed 3-2-1 local countdown timer
    BeginCountdown,
    /// Re-initialize the local board for the match
    ResetBoard,
}

/// Bounded command list; no transition produces more than a few effects
pub type Commands = ArrayVec<Command, 4>;

/// Multiplayer coordination record
#[derive(Debug, Clone)]
pub struct Session {
    room_code: Option<RoomCode>,
    status: SessionStatus,
    is_host: bool,
    opponent_score: u32,
    opponent_ready: bool,
    local_ready: bool,
    winner: Option<Winner>,
    error: Option<String>,
    /// Exactly one HELLO/WELCOME exchange per connection lifetime
    handshaken: bool,
    /// At most one I_LOST per session
    loss_sent: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            room_code: None,
            status: SessionStatus::Idle,
            is_host: false,
            opponent_score: 0,
            opponent_ready: false,
            local_ready: false,
            winner: None,
            error: None,
            handshaken: false,
            loss_sent: false,
        }
    }

    pub fn room_code(&self) -> Option<RoomCode> {
        self.room_code
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn opponent_score(&self) -> u32 {
        self.opponent_score
    }

    pub fn opponent_ready(&self) -> bool {
        self.opponent_ready
    }

    pub fn local_ready(&self) -> bool {
        self.local_ready
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process one event to completion and return the effects it produced
    pub fn handle(&mut self, event: SessionEvent) -> Commands {
        let mut commands = Commands::new();

        match event {
            SessionEvent::RoomCreated(code) => {
                *self = Self::new();
                self.room_code = Some(code);
                self.is_host = true;
                self.status = SessionStatus::Waiting;
            }

            SessionEvent::JoinStarted(code) => {
                *self = Self::new();
                self.room_code = Some(code);
                self.status = SessionStatus::Searching;
            }

            SessionEvent::ChannelOpened => {
                // The joiner initiates the handshake; the host just waits
                // for HELLO
                if !self.is_host && self.status == SessionStatus::Searching {
                    commands.push(Command::Send(PeerMessage::Hello));
                }
            }

            SessionEvent::MessageReceived(message) => {
                self.dispatch(message, &mut commands);
            }

            SessionEvent::ChannelClosed => {
                if self.status != SessionStatus::Idle {
                    let message = if self.handshaken {
                        "Opponent disconnected."
                    } else {
                        "Network error. Check your connection."
                    };
                    self.force_idle(Some(message.to_string()));
                }
            }

            SessionEvent::LinkFailed(err) => {
                self.force_idle(Some(err.to_string()));
            }

            SessionEvent::LocalReady => {
                if self.status == SessionStatus::Waiting && !self.local_ready {
                    self.local_ready = true;
                    commands.push(Command::Send(PeerMessage::PlayerReady { ready: true }));
                    self.maybe_start_countdown(&mut commands);
                }
            }

            SessionEvent::CountdownFinished => {
                if self.status == SessionStatus::Countdown {
                    self.status = SessionStatus::Playing;
                    self.opponent_score = 0;
                    commands.push(Command::ResetBoard);
                }
            }

            SessionEvent::LocalScore(score) => {
                if self.status == SessionStatus::Playing {
                    commands.push(Command::Send(PeerMessage::ScoreUpdate { score }));
                }
            }

            SessionEvent::LocalGameOver => {
                if self.status == SessionStatus::Playing && !self.loss_sent {
                    self.loss_sent = true;
                    self.status = SessionStatus::Ended;
                    self.winner = Some(Winner::Opponent);
                    commands.push(Command::Send(PeerMessage::ILost));
                }
            }

            SessionEvent::Reset => {
                *self = Self::new();
            }
        }

        commands
    }

    fn dispatch(&mut self, message: PeerMessage, commands: &mut Commands) {
        match message {
            PeerMessage::Hello => {
                if self.is_host && !self.handshaken {
                    self.handshaken = true;
                    self.status = SessionStatus::Waiting;
                    commands.push(Command::Send(PeerMessage::Welcome {
                        ready: self.local_ready,
                    }));
                }
            }

            PeerMessage::Welcome { ready } => {
                if !self.is_host && !self.handshaken {
                    self.handshaken = true;
                    self.status = SessionStatus::Waiting;
                    self.opponent_ready = ready;
                }
            }

            PeerMessage::PlayerReady { ready } => {
                // Readiness never reverts within one session
                self.opponent_ready |= ready;
                self.maybe_start_countdown(commands);
            }

            PeerMessage::ScoreUpdate { score } => {
                self.opponent_score = score;
            }

            PeerMessage::ILost => {
                if self.status != SessionStatus::Idle {
                    self.status = SessionStatus::Ended;
                    self.winner = Some(Winner::Local);
                }
            }

            PeerMessage::StartCountdown => {
                // Purely reactive on the joiner side
                if !self.is_host && self.status == SessionStatus::Waiting {
                    self.status = SessionStatus::Countdown;
                    commands.push(Command::BeginCountdown);
                }
            }

            PeerMessage::Heartbeat => {}
        }
    }

    /// Only the host may author the waiting -> countdown transition
    fn maybe_start_countdown(&mut self, commands: &mut Commands) {
        if self.is_host
            && self.status == SessionStatus::Waiting
            && self.local_ready
            && self.opponent_ready
        {
            self.status = SessionStatus::Countdown;
            commands.push(Command::Send(PeerMessage::StartCountdown));
            commands.push(Command::BeginCountdown);
        }
    }

    fn force_idle(&mut self, error: Option<String>) {
        *self = Self::new();
        self.error = error;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_parse() {
        assert_eq!(RoomCode::parse("4217").map(RoomCode::value), Some(4217));
        assert_eq!(RoomCode::parse("0999"), None);
        assert_eq!(RoomCode::parse("123"), None);
        assert_eq!(RoomCode::parse("12345"), None);
        assert_eq!(RoomCode::parse("12a4"), None);
        assert_eq!(RoomCode::parse(""), None);
    }

    #[test]
    fn test_room_code_generate_in_range() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..100 {
            let code = RoomCode::generate(&mut rng);
            assert!((RoomCode::MIN..=RoomCode::MAX).contains(&code.value()));
            assert_eq!(code.to_string().len(), 4);
        }
    }

    #[test]
    fn test_host_replies_welcome_once() {
        let mut session = Session::new();
        session.handle(SessionEvent::RoomCreated(RoomCode::parse("4217").unwrap()));
        assert_eq!(session.status(), SessionStatus::Waiting);

        let first = session.handle(SessionEvent::MessageReceived(PeerMessage::Hello));
        assert_eq!(
            first.as_slice(),
            [Command::Send(PeerMessage::Welcome { ready: false })]
        );

        let second = session.handle(SessionEvent::MessageReceived(PeerMessage::Hello));
        assert!(second.is_empty());
    }

    #[test]
    fn test_joiner_countdown_is_reactive() {
        let mut session = Session::new();
        session.handle(SessionEvent::JoinStarted(RoomCode::parse("4217").unwrap()));
        session.handle(SessionEvent::ChannelOpened);
        session.handle(SessionEvent::MessageReceived(PeerMessage::Welcome {
            ready: true,
        }));
        session.handle(SessionEvent::LocalReady);
        // Both sides are ready, but the joiner must not author the transition
        assert_eq!(session.status(), SessionStatus::Waiting);

        let commands = session.handle(SessionEvent::MessageReceived(PeerMessage::StartCountdown));
        assert_eq!(session.status(), SessionStatus::Countdown);
        assert_eq!(commands.as_slice(), [Command::BeginCountdown]);
    }

    #[test]
    fn test_heartbeat_has_no_state_effect() {
        let mut session = Session::new();
        session.handle(SessionEvent::RoomCreated(RoomCode::parse("4217").unwrap()));
        let before = session.status();
        let commands = session.handle(SessionEvent::MessageReceived(PeerMessage::Heartbeat));
        assert!(commands.is_empty());
        assert_eq!(session.status(), before);
    }
}
