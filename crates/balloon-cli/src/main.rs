//! Terminal front-end for the balloon game.
//!
//! Presentation only: it observes the session state, polls the spawner for
//! live targets, and forwards key presses as taps. All game rules live in
//! `balloon-core`.

use std::io::{Stdout, Write, stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use balloon_core::{GameSession, GameState, Player, Spawner, SpawnerHandle, timing};
use chrono::Utc;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use owo_colors::OwoColorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "balloon", about = "Balloon reaction game", version)]
struct Args {
    /// Player name used when starting a match
    #[arg(short, long, default_value = "Player 1")]
    player: String,

    /// Print the final scoreboard as JSON on exit
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("balloon=info".parse()?)
                .add_directive("balloon_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let session = GameSession::new();
    let (cols, _rows) = terminal::size()?;
    let spawner = Spawner::new(session.clone(), f32::from(cols.saturating_sub(1)));
    info!(
        player = args.player,
        width = spawner.play_area_width(),
        "balloon starting..."
    );

    let guard = TerminalGuard::enter()?;
    let result = run_ui(&session, &spawner, &args, &running);
    drop(guard);

    info!(players = session.players().len(), "exiting");
    print_scoreboard(&session, args.json)?;
    result
}

fn run_ui(
    session: &GameSession,
    spawner: &Spawner,
    args: &Args,
    running: &AtomicBool,
) -> Result<()> {
    let mut out = stdout();
    let mut handle: Option<SpawnerHandle> = None;

    while running.load(Ordering::SeqCst) {
        if event::poll(Duration::from_millis(33))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !handle_key(key, session, spawner, args, &mut handle) {
                        break;
                    }
                }
                _ => {}
            }
        }
        draw(&mut out, session, spawner)?;
    }

    session.stop_game();
    if let Some(handle) = handle.take() {
        handle.shutdown();
        let _ = handle.join();
    }
    Ok(())
}

/// Returns `false` when the user asked to quit.
fn handle_key(
    key: KeyEvent,
    session: &GameSession,
    spawner: &Spawner,
    args: &Args,
    handle: &mut Option<SpawnerHandle>,
) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
        KeyCode::Char('s') => {
            // Restarting supersedes the previous cadence run.
            if let Some(previous) = handle.take() {
                previous.shutdown();
            }
            session.start_game_single(Player::new(args.player.as_str()));
            *handle = spawner.start().ok();
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if let Some(target) = spawner.live_targets().get(index) {
                spawner.tap(target.id);
            }
        }
        _ => {}
    }
    true
}

fn draw(out: &mut Stdout, session: &GameSession, spawner: &Spawner) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let area_h = rows.saturating_sub(1);

    queue!(out, Clear(ClearType::All))?;

    for (index, target) in spawner.live_targets().iter().enumerate() {
        let col = (target.offset.round() as u16).min(cols.saturating_sub(1));
        // progress 0.0 sits just below the visible area, 1.0 just above it.
        let row = (f32::from(area_h) * (1.0 - target.progress)) as i32;
        if row < 0 || row >= i32::from(area_h) {
            continue;
        }
        let label = match index {
            0..=8 => char::from_digit(index as u32 + 1, 10).unwrap_or('*'),
            _ => '*',
        };
        queue!(out, cursor::MoveTo(col, row as u16), Print(label))?;
    }

    queue!(out, cursor::MoveTo(0, area_h), Print(status_line(session)))?;
    out.flush()?;
    Ok(())
}

fn status_line(session: &GameSession) -> String {
    let state = session.state();
    match &state {
        GameState::None => "[s] start  [q] quit".to_string(),
        GameState::Started(player) | GameState::ScoreUpdate(player) => {
            let remaining = session
                .started_at()
                .map(|start| {
                    let elapsed = Utc::now().signed_duration_since(start).num_seconds();
                    (timing::MATCH_DURATION.as_secs() as i64 - elapsed).max(0)
                })
                .unwrap_or(0);
            format!(
                "{} | {}: {} | {remaining:>2}s left | tap [1-9]  [s] restart  [q] quit",
                state.phase_name(),
                player.name(),
                player.score(),
            )
        }
        GameState::Stopped => "Stopped | [s] restart  [q] quit".to_string(),
        GameState::Over(player) => format!(
            "Time! {} finished with {} | [s] play again  [q] quit",
            player.name(),
            player.score(),
        ),
    }
}

fn print_scoreboard(session: &GameSession, json: bool) -> Result<()> {
    let summaries: Vec<_> = session.players().iter().map(Player::summary).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No games played.");
        return Ok(());
    }
    println!("{}", "Final scores".bold());
    for summary in &summaries {
        println!("  {:<20} {}", summary.name, summary.score.green());
    }
    Ok(())
}

/// Raw-mode + alternate-screen scope; restores the terminal on drop, panics
/// included.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
