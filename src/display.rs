/// Rendering layer: all terminal output lives here.
///
/// The simulation works in playfield pixels (1300×750 by default); this
/// module squeezes that onto whatever terminal grid is available. No game
/// logic happens here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use sky_battle::hud::{Banner, HudState};
use sky_battle::{Actor, ActorKind, Engine};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_HEARTS: Color = Color::Red;
const C_HUD_KILLS: Color = Color::Yellow;
const C_HUD_LEVEL: Color = Color::Cyan;
const C_SHIELD: Color = Color::Blue;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_BOSS: Color = Color::Magenta;
const C_SHOT_USER: Color = Color::Cyan;
const C_SHOT_ENEMY: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

/// Maps playfield pixels onto the terminal cells between the borders.
struct Viewport {
    cols: u16,
    rows: u16,
    scale_x: f64,
    scale_y: f64,
}

impl Viewport {
    fn new(engine: &Engine, cols: u16, rows: u16, screen_height: f64) -> Self {
        let inner_cols = cols.saturating_sub(2).max(1);
        let inner_rows = rows.saturating_sub(3).max(1);
        Viewport {
            cols,
            rows,
            scale_x: f64::from(inner_cols) / engine.stage().screen_width(),
            scale_y: f64::from(inner_rows) / screen_height,
        }
    }

    /// Terminal cell for a playfield point, or `None` when off-screen.
    fn cell(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let col = (x * self.scale_x).floor() as i64 + 1;
        let row = (y * self.scale_y).floor() as i64 + 2;
        let in_cols = col >= 1 && col < i64::from(self.cols) - 1;
        let in_rows = row >= 2 && row < i64::from(self.rows) - 1;
        (in_cols && in_rows).then(|| (col as u16, row as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, engine: &Engine, screen_height: f64) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let view = Viewport::new(engine, cols, rows, screen_height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;
    draw_border(out, &view)?;
    draw_hud(out, engine, &view)?;

    let stage = engine.stage();
    for actor in stage
        .enemy_units()
        .iter()
        .chain(stage.user_projectiles())
        .chain(stage.enemy_projectiles())
        .chain(stage.friendly_units())
        .filter(|a| stage.in_scene(a.id))
    {
        draw_actor(out, actor, &view)?;
    }

    draw_controls_hint(out, &view)?;
    if let Some(banner) = engine.hud().banner {
        draw_banner(out, banner, engine.hud(), &view)?;
    }

    out.queue(style::ResetColor)?;
    out.flush()
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let width = view.cols.saturating_sub(2) as usize;
    let bottom = view.rows.saturating_sub(2);
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(width))))?;
    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(width))))?;

    for row in 2..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, engine: &Engine, view: &Viewport) -> std::io::Result<()> {
    let hud = engine.hud();

    if hud.hearts_visible {
        out.queue(cursor::MoveTo(1, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_HEARTS))?;
        out.queue(Print("♥".repeat(hud.hearts as usize)))?;
    }

    let level = format!("[ {} ]", engine.level_id().key().replace('_', " ").to_uppercase());
    let lx = (view.cols / 2).saturating_sub(level.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(&level))?;

    if hud.kills_visible {
        let kills = format!("Kills: {:>3}", hud.kills);
        let kx = view.cols.saturating_sub(kills.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(kx, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_KILLS))?;
        out.queue(Print(&kills))?;
    }

    if hud.shield_visible {
        let (x, y) = hud.shield_anchor;
        if let Some((col, row)) = view.cell(x, y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_SHIELD))?;
            out.queue(Print("◈"))?;
        }
    }
    Ok(())
}

// ── Actors ────────────────────────────────────────────────────────────────────

fn draw_actor<W: Write>(out: &mut W, actor: &Actor, view: &Viewport) -> std::io::Result<()> {
    let (glyph, color) = match actor.kind {
        ActorKind::Player => ("=>", C_PLAYER),
        ActorKind::Enemy => ("<=", C_ENEMY),
        ActorKind::Boss if actor.is_shielded() => ("{<BOSS>}", C_SHIELD),
        ActorKind::Boss => ("<BOSS>", C_BOSS),
        ActorKind::UserProjectile => ("-", C_SHOT_USER),
        ActorKind::EnemyProjectile => ("·", C_SHOT_ENEMY),
        ActorKind::BossProjectile => ("●", C_SHOT_ENEMY),
    };
    // Anchor sprites on the vertical middle of their bounding box.
    let Some((col, row)) = view.cell(actor.x(), actor.y() + actor.height / 2.0) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("↑ ↓ / W S : Move   SPACE : Fire   Q : Quit"))?;
    Ok(())
}

// ── Win / game-over overlay ───────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    banner: Banner,
    hud: &HudState,
    view: &Viewport,
) -> std::io::Result<()> {
    let (title, color) = match banner {
        Banner::Win => ("║     YOU  WIN     ║", Color::Green),
        Banner::GameOver => ("║    GAME  OVER    ║", Color::Red),
    };
    let kills_line = format!("Kills: {}", hud.kills);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", color),
        (title, color),
        ("╚══════════════════╝", color),
        (kills_line.as_str(), Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}
