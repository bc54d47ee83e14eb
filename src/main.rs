mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use sky_battle::{Engine, GameConfig, GameError, Intent, LevelId, TickOutcome};

/// A movement key counts as "held" if its last press/repeat arrived within
/// this many ticks. Only used on terminals that never report key releases;
/// OS key-repeat (≥ 15 Hz) refreshes it well inside 4 ticks at 20 Hz.
const HOLD_WINDOW: u64 = 4;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn is_move_key(code: &KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Up
            | KeyCode::Down
            | KeyCode::Char('w')
            | KeyCode::Char('W')
            | KeyCode::Char('s')
            | KeyCode::Char('S')
    )
}

fn intent_for(code: &KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Intent::MoveUp),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Intent::MoveDown),
        KeyCode::Char(' ') => Some(Intent::Fire),
        _ => None,
    }
}

/// Auto-repeat of a held key. Movement is already latched by the press, so
/// only fire repeats; classic terminals deliver the same repeats as presses.
fn repeat_intent_for(code: &KeyCode) -> Option<Intent> {
    match intent_for(code) {
        Some(Intent::Fire) => Some(Intent::Fire),
        _ => None,
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal is in raw/alternate-screen mode, so logs only go to a file,
/// and only when `SKY_BATTLE_LOG` names one.
fn init_logging() -> std::io::Result<()> {
    let Ok(path) = std::env::var("SKY_BATTLE_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Restart,
    Next(LevelId),
}

/// Drive one level until it completes or the player quits.
///
/// Input is drained between ticks and applied as intents, so a tick never
/// observes a half-applied change. Press → move, release → stop; on
/// terminals without release events a move key that goes quiet for
/// `HOLD_WINDOW` ticks counts as released.
fn game_loop<W: Write>(
    out: &mut W,
    engine: &mut Engine,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    config: &GameConfig,
    keyboard_enhanced: bool,
) -> std::io::Result<LoopExit> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain pending input (non-blocking) ───────────────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(LoopExit::Quit);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(LoopExit::Quit);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if !engine.is_running() => {
                            return Ok(LoopExit::Restart);
                        }
                        _ => {}
                    }
                    if is_move_key(&code) {
                        key_frame.insert(code, frame);
                    }
                    if let Some(intent) = intent_for(&code) {
                        engine.apply(intent);
                    }
                }
                KeyEventKind::Repeat => {
                    if is_move_key(&code) {
                        key_frame.insert(code, frame);
                    }
                    if let Some(intent) = repeat_intent_for(&code) {
                        engine.apply(intent);
                    }
                }
                KeyEventKind::Release => {
                    if is_move_key(&code) {
                        key_frame.remove(&code);
                        engine.apply(Intent::Stop);
                    }
                }
            }
        }

        if !keyboard_enhanced {
            let moving = key_frame.keys().any(|code| is_held(&key_frame, code, frame));
            if !moving && !key_frame.is_empty() {
                key_frame.clear();
                engine.apply(Intent::Stop);
            }
        }

        // ── Advance the simulation ───────────────────────────────────────────
        if let TickOutcome::LevelComplete { next } = engine.tick(rng) {
            return Ok(LoopExit::Next(next));
        }

        display::render(out, engine, config.screen_height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < config.tick {
            thread::sleep(config.tick - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), GameError> {
    let config = GameConfig::from_env()?;
    init_logging()?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release events; terminals without the kitty protocol refuse
    // and we fall back to the hold window.
    let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();

    // Blocking reads live on their own thread so the loop never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &config, keyboard_enhanced);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
    keyboard_enhanced: bool,
) -> Result<(), GameError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut engine = Engine::for_level(config.start_level, config)?;

    loop {
        match game_loop(out, &mut engine, rx, &mut rng, config, keyboard_enhanced)? {
            LoopExit::Quit => break,
            LoopExit::Restart => engine = Engine::for_level(config.start_level, config)?,
            LoopExit::Next(next) => engine = Engine::for_level(next, config)?,
        }
    }
    Ok(())
}
