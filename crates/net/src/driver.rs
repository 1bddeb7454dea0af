//! Driver module - the cooperative event timeline
//!
//! [`Multiplayer`] owns the session machine and the peer link and serializes
//! everything onto one processing timeline: local UI actions, timer expiry,
//! and inbound channel messages. Each event is handled to completion —
//! including any sends it triggers — before the next one is drained.

use std::time::{Duration, Instant};

use crate::link::{LinkConfig, LinkEvent, PeerLink};
use crate::session::{Command, RoomCode, Session, SessionEvent};
use crate::types::SessionStatus;
use lux_2048_core::SimpleRng;

/// Synchronous front door for the multiplayer mode
pub struct Multiplayer {
    config: LinkConfig,
    session: Session,
    link: Option<PeerLink>,
    countdown_deadline: Option<Instant>,
    last_sent_score: Option<u32>,
    rng: SimpleRng,
}

impl Multiplayer {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            session: Session::new(),
            link: None,
            countdown_deadline: None,
            last_sent_score: None,
            rng: SimpleRng::new(clock_seed()),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(LinkConfig::from_env())
    }

    /// Read-only session snapshot for the presentation layer
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Seconds left on the pre-match countdown, if one is running
    pub fn countdown_seconds_left(&self) -> Option<u64> {
        let deadline = self.countdown_deadline?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        Some((remaining.as_millis() as u64 + 999) / 1000)
    }

    /// Host a room under a freshly drawn code. A collision surfaces as a
    /// session error and the user simply retries with a new code.
    pub fn create_room(&mut self) {
        let code = RoomCode::generate(&mut self.rng);
        self.create_room_with(code);
    }

    /// Host a room under a specific code
    pub fn create_room_with(&mut self, code: RoomCode) {
        self.teardown();
        match PeerLink::host(&self.config, code) {
            Ok(link) => {
                self.link = Some(link);
                self.apply(SessionEvent::RoomCreated(code));
            }
            Err(err) => {
                self.apply(SessionEvent::LinkFailed(err));
            }
        }
    }

    /// Join a published room. Malformed codes are ignored, matching the
    /// observed UI behavior.
    pub fn join_room(&mut self, code: &str) {
        let Some(code) = RoomCode::parse(code) else {
            return;
        };
        self.teardown();
        self.link = Some(PeerLink::join(&self.config, code));
        self.apply(SessionEvent::JoinStarted(code));
    }

    /// Local ready action; readiness is monotonic within a session
    pub fn set_ready(&mut self) {
        self.apply(SessionEvent::LocalReady);
    }

    /// Tear everything down: abort timers, release the channel, back to idle
    pub fn reset(&mut self) {
        self.teardown();
        self.apply(SessionEvent::Reset);
    }

    /// Report the local score after a move; broadcast only while playing and
    /// only when the value actually changed
    pub fn publish_score(&mut self, score: u32) {
        if self.session.status() != SessionStatus::Playing {
            return;
        }
        if self.last_sent_score == Some(score) {
            return;
        }
        self.last_sent_score = Some(score);
        self.apply(SessionEvent::LocalScore(score));
    }

    /// Report that the local board reached game over
    pub fn report_loss(&mut self) {
        self.apply(SessionEvent::LocalGameOver);
    }

    /// Drain pending channel notifications through the session machine.
    /// Returns true when the match just started and the local board must be
    /// re-initialized.
    pub fn pump(&mut self) -> bool {
        let mut board_reset = false;
        loop {
            let Some(event) = self.link.as_mut().and_then(PeerLink::try_recv) else {
                break;
            };
            let event = match event {
                LinkEvent::Opened => SessionEvent::ChannelOpened,
                LinkEvent::Message(message) => SessionEvent::MessageReceived(message),
                LinkEvent::Closed => SessionEvent::ChannelClosed,
                LinkEvent::Failed(err) => SessionEvent::LinkFailed(err),
            };
            board_reset |= self.apply(event);
        }
        board_reset
    }

    /// Advance the countdown timer. Returns true when the match just started
    /// and the local board must be re-initialized.
    pub fn tick(&mut self) -> bool {
        let Some(deadline) = self.countdown_deadline else {
            return false;
        };
        if Instant::now() < deadline {
            return false;
        }
        self.countdown_deadline = None;
        self.apply(SessionEvent::CountdownFinished)
    }

    fn apply(&mut self, event: SessionEvent) -> bool {
        let commands = self.session.handle(event);
        let mut board_reset = false;

        for command in commands {
            match command {
                Command::Send(message) => {
                    if let Some(link) = &self.link {
                        link.send(message);
                    }
                }
                Command::BeginCountdown => {
                    self.countdown_deadline =
                        Some(Instant::now() + Duration::from_millis(self.config.countdown_ms));
                }
                Command::ResetBoard => {
                    self.last_sent_score = None;
                    board_reset = true;
                }
            }
        }

        // Any transition back to idle releases the channel and timers
        if self.session.status() == SessionStatus::Idle {
            self.teardown();
        }

        board_reset
    }

    fn teardown(&mut self) {
        if self.link.take().is_some() {
            log::debug!("peer link released");
        }
        self.countdown_deadline = None;
        self.last_sent_score = None;
    }
}

/// Seed the room-code rng from the wall clock
fn clock_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u32
}
