//! Terminal 2048 runner (default binary).
//!
//! This is the presentation adapter: it forwards directions and UI actions
//! into the core and renders board/session snapshots as plain text frames.
//! All game and protocol correctness lives in the member crates.

use std::io::{stdout, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::Print;
use crossterm::{cursor, execute, queue, terminal};

use lux_2048::core::BoardState;
use lux_2048::net::Multiplayer;
use lux_2048::types::{Direction, SessionStatus, Winner};

const INPUT_POLL_MS: u64 = 50;

fn main() -> Result<()> {
    env_logger::init();

    terminal::enable_raw_mode()?;
    execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run();

    // Always try to restore terminal state.
    let _ = execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    result
}

fn run() -> Result<()> {
    let mut board = BoardState::new(wall_clock_seed());
    let mut mp = Multiplayer::from_env();
    // Some while the user is typing a room code
    let mut join_entry: Option<String> = None;

    loop {
        // Countdown expiry or match start both demand a fresh board.
        let restart = mp.pump() | mp.tick();
        if restart {
            board.restart();
        }

        render(&board, &mp, join_entry.as_deref())?;

        if !event::poll(Duration::from_millis(INPUT_POLL_MS))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(mut entry) = join_entry.take() {
            match key.code {
                KeyCode::Esc => {}
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    entry.push(c);
                    if entry.len() == 4 {
                        mp.join_room(&entry);
                    } else {
                        join_entry = Some(entry);
                    }
                }
                KeyCode::Backspace => {
                    entry.pop();
                    join_entry = Some(entry);
                }
                _ => join_entry = Some(entry),
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Up | KeyCode::Char('w') => apply(&mut board, &mut mp, Direction::Up),
            KeyCode::Down | KeyCode::Char('s') => apply(&mut board, &mut mp, Direction::Down),
            KeyCode::Left | KeyCode::Char('a') => apply(&mut board, &mut mp, Direction::Left),
            KeyCode::Right | KeyCode::Char('d') => apply(&mut board, &mut mp, Direction::Right),
            KeyCode::Char('r') => board.restart(),
            KeyCode::Char('u') => {
                board.undo();
            }
            KeyCode::Char('c') => mp.create_room(),
            KeyCode::Char('j') => join_entry = Some(String::new()),
            KeyCode::Char(' ') => mp.set_ready(),
            KeyCode::Char('x') => mp.reset(),
            _ => {}
        }
    }
}

/// Run one directional intent through the engine and republish the summary
/// signals the opponent cares about.
fn apply(board: &mut BoardState, mp: &mut Multiplayer, direction: Direction) {
    let status = mp.session().status();
    if status != SessionStatus::Idle && status != SessionStatus::Playing {
        return;
    }

    let outcome = board.apply_move(direction);
    if !outcome.moved {
        return;
    }

    mp.publish_score(board.score());
    if board.game_over() {
        mp.report_loss();
    }
}

fn render(board: &BoardState, mp: &Multiplayer, join_entry: Option<&str>) -> Result<()> {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "LUX 2048    score {:>6}    best {:>6}",
        board.score(),
        board.best_score()
    ));
    lines.push(String::new());

    let border = "+------+------+------+------+".to_string();
    lines.push(border.clone());
    for row in board.grid() {
        let cells: Vec<String> = row
            .iter()
            .map(|&v| {
                if v == 0 {
                    "      ".to_string()
                } else {
                    format!("{:^6}", v)
                }
            })
            .collect();
        lines.push(format!("|{}|", cells.join("|")));
        lines.push(border.clone());
    }
    lines.push(String::new());

    if board.won() {
        lines.push("2048! keep going or press r to restart".to_string());
    }
    if board.game_over() {
        lines.push("game over - press r to restart (u to undo)".to_string());
    }

    let session = mp.session();
    match session.status() {
        SessionStatus::Idle => {}
        status => {
            let mut line = format!("versus: {}", status.as_str());
            if let Some(code) = session.room_code() {
                line.push_str(&format!("    room {}", code));
            }
            lines.push(line);
        }
    }
    match session.status() {
        SessionStatus::Waiting => {
            let local = if session.local_ready() { "ready" } else { "space = ready" };
            let remote = if session.opponent_ready() { "ready" } else { "not ready" };
            lines.push(format!("you: {}    opponent: {}", local, remote));
        }
        SessionStatus::Countdown => {
            if let Some(seconds) = mp.countdown_seconds_left() {
                lines.push(format!("starting in {}...", seconds));
            }
        }
        SessionStatus::Playing => {
            lines.push(format!("opponent score: {}", session.opponent_score()));
        }
        SessionStatus::Ended => {
            let verdict = match session.winner() {
                Some(Winner::Local) => "you win!",
                Some(Winner::Opponent) => "you lose.",
                None => "match over.",
            };
            lines.push(format!("{} press x to leave the match", verdict));
        }
        _ => {}
    }

    if let Some(entry) = join_entry {
        lines.push(format!("join code: {}_", entry));
    }
    if let Some(error) = session.error() {
        lines.push(format!("! {}", error));
    }

    lines.push(String::new());
    lines.push("arrows/wasd move | r restart | u undo | c host | j join | q quit".to_string());

    let mut out = stdout();
    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    for line in lines {
        queue!(out, Print(line), cursor::MoveToNextLine(1))?;
    }
    out.flush()?;
    Ok(())
}

/// Seed the solo board from the wall clock
fn wall_clock_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u32
}
