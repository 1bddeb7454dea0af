//! End-to-end multiplayer tests over loopback TCP
//!
//! Each test uses its own room code so the derived ports never collide when
//! the test harness runs files in parallel.

use std::io::{BufRead, BufReader, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use lux_2048::net::{LinkConfig, Multiplayer, RoomCode};
use lux_2048::types::{SessionStatus, Winner};

fn test_config() -> LinkConfig {
    LinkConfig {
        heartbeat_ms: 200,
        countdown_ms: 120,
        ..LinkConfig::default()
    }
}

fn code(s: &str) -> RoomCode {
    RoomCode::parse(s).expect("valid room code")
}

/// Pump both peers until the condition holds or the deadline passes
fn settle<F>(a: &mut Multiplayer, b: &mut Multiplayer, cond: F) -> bool
where
    F: Fn(&Multiplayer, &Multiplayer) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        a.pump();
        a.tick();
        b.pump();
        b.tick();
        if cond(a, b) {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

fn settle_one<F>(mp: &mut Multiplayer, cond: F) -> bool
where
    F: Fn(&Multiplayer) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        mp.pump();
        mp.tick();
        if cond(mp) {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_full_match_flow() {
    let mut host = Multiplayer::new(test_config());
    let mut joiner = Multiplayer::new(test_config());

    host.create_room_with(code("4501"));
    assert_eq!(host.session().status(), SessionStatus::Waiting);
    assert!(host.session().is_host());

    joiner.join_room("4501");
    assert_eq!(joiner.session().status(), SessionStatus::Searching);
    assert!(!joiner.session().is_host());

    // Handshake settles both sides into waiting
    assert!(settle(&mut host, &mut joiner, |h, j| {
        h.session().status() == SessionStatus::Waiting
            && j.session().status() == SessionStatus::Waiting
    }));

    // Readiness: joiner first, then the host triggers the countdown
    joiner.set_ready();
    assert!(settle(&mut host, &mut joiner, |h, _| h
        .session()
        .opponent_ready()));

    host.set_ready();
    assert_eq!(host.session().status(), SessionStatus::Countdown);

    assert!(settle(&mut host, &mut joiner, |h, j| {
        h.session().status() == SessionStatus::Playing
            && j.session().status() == SessionStatus::Playing
    }));

    // Score reports reach the opponent
    host.publish_score(64);
    assert!(settle(&mut host, &mut joiner, |_, j| j
        .session()
        .opponent_score()
        == 64));

    // Loss report ends both sides with mirrored outcomes
    host.report_loss();
    assert_eq!(host.session().status(), SessionStatus::Ended);
    assert_eq!(host.session().winner(), Some(Winner::Opponent));

    assert!(settle(&mut host, &mut joiner, |_, j| {
        j.session().status() == SessionStatus::Ended
            && j.session().winner() == Some(Winner::Local)
    }));
}

#[test]
fn test_welcome_carries_earlier_host_readiness() {
    let mut host = Multiplayer::new(test_config());
    let mut joiner = Multiplayer::new(test_config());

    host.create_room_with(code("4601"));
    host.set_ready();
    assert!(host.session().local_ready());

    joiner.join_room("4601");
    assert!(settle(&mut host, &mut joiner, |_, j| {
        j.session().status() == SessionStatus::Waiting && j.session().opponent_ready()
    }));
}

#[test]
fn test_disconnect_after_handshake() {
    let mut host = Multiplayer::new(test_config());
    let mut joiner = Multiplayer::new(test_config());

    host.create_room_with(code("4701"));
    joiner.join_room("4701");
    assert!(settle(&mut host, &mut joiner, |h, j| {
        h.session().status() == SessionStatus::Waiting
            && j.session().status() == SessionStatus::Waiting
    }));

    // Joiner walks away; the host learns through the channel closing
    joiner.reset();
    assert_eq!(joiner.session().status(), SessionStatus::Idle);

    assert!(settle_one(&mut host, |h| {
        h.session().status() == SessionStatus::Idle
            && h.session().error() == Some("Opponent disconnected.")
    }));
}

#[test]
fn test_join_missing_room_reports_not_found() {
    let mut joiner = Multiplayer::new(test_config());
    joiner.join_room("4801");

    assert!(settle_one(&mut joiner, |j| {
        j.session().status() == SessionStatus::Idle
            && j.session().error() == Some("Room not found. Check the code.")
    }));
}

#[test]
fn test_room_code_collision_is_recoverable() {
    let mut first = Multiplayer::new(test_config());
    let mut second = Multiplayer::new(test_config());

    first.create_room_with(code("4901"));
    assert_eq!(first.session().status(), SessionStatus::Waiting);

    second.create_room_with(code("4901"));
    assert_eq!(second.session().status(), SessionStatus::Idle);
    assert_eq!(
        second.session().error(),
        Some("Room code already in use. Try again.")
    );

    // The original room is untouched and the loser can rehost elsewhere
    assert_eq!(first.session().status(), SessionStatus::Waiting);
    second.create_room_with(code("4902"));
    assert_eq!(second.session().status(), SessionStatus::Waiting);
    assert_eq!(second.session().error(), None);
}

#[test]
fn test_raw_socket_handshake_and_heartbeat() {
    let config = LinkConfig {
        heartbeat_ms: 100,
        ..test_config()
    };
    let mut host = Multiplayer::new(config.clone());
    host.create_room_with(code("5101"));

    let addr = config.room_addr(code("5101"));
    let stream = std::net::TcpStream::connect(addr).expect("connect");
    let mut writer = stream.try_clone().expect("clone stream");

    let (line_tx, line_rx) = mpsc::channel::<String>();
    let reader_thread = thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    writeln!(writer, r#"{{"type":"HELLO"}}"#).expect("send hello");

    // The host replies WELCOME with its readiness, then heartbeats follow
    let mut welcome: Option<serde_json::Value> = None;
    let mut saw_heartbeat = false;
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline && !(welcome.is_some() && saw_heartbeat) {
        host.pump();
        while let Ok(line) = line_rx.try_recv() {
            let value: serde_json::Value = serde_json::from_str(&line).expect("json line");
            match value["type"].as_str() {
                Some("WELCOME") => welcome = Some(value.clone()),
                Some("HEARTBEAT") => saw_heartbeat = true,
                _ => {}
            }
        }
        thread::sleep(Duration::from_millis(10));
    }

    let welcome = welcome.expect("host sent WELCOME");
    assert_eq!(welcome["payload"]["ready"], serde_json::Value::Bool(false));
    assert_eq!(host.session().status(), SessionStatus::Waiting);
    assert!(saw_heartbeat, "expected a HEARTBEAT within the deadline");

    // Unknown tags are dropped without breaking the session
    writeln!(writer, r#"{{"type":"TAUNT","payload":{{"text":"hi"}}}}"#).expect("send unknown");
    writeln!(writer, r#"{{"type":"SCORE_UPDATE","payload":{{"score":31}}}}"#).expect("send score");
    assert!(settle_one(&mut host, |h| h.session().opponent_score() == 31));

    drop(host);
    drop(writer);
    let _ = reader_thread.join();
}
