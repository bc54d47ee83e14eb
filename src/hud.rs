/// HUD collaborator: what the simulation tells the on-screen widgets.
///
/// Every call is fire-and-forget. `HudState` is the stock implementation; it
/// records what should be on screen so a renderer (or a test) can read it.

pub trait LevelView {
    fn show_heart_display(&mut self);
    fn show_kill_count_display(&mut self);
    fn show_shield(&mut self);
    fn hide_shield(&mut self);
    /// Drop hearts until only `hearts_remaining` are shown. Never adds any back.
    fn remove_hearts(&mut self, hearts_remaining: u32);
    fn update_kill_count(&mut self, kills: u32);
    fn show_win_image(&mut self);
    fn show_game_over_image(&mut self);
}

/// Where the shield icon sits for ordinary levels.
pub const SHIELD_ANCHOR: (f64, f64) = (1200.0, 500.0);
/// Boss-only levels pull the icon in a little.
pub const BOSS_LEVEL_SHIELD_ANCHOR: (f64, f64) = (1150.0, 500.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Banner {
    Win,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudState {
    pub hearts: u32,
    pub kills: u32,
    pub hearts_visible: bool,
    pub kills_visible: bool,
    pub shield_visible: bool,
    pub shield_anchor: (f64, f64),
    pub banner: Option<Banner>,
    /// How many times each banner was requested; a level should end once.
    pub win_images_shown: u32,
    pub game_over_images_shown: u32,
}

impl HudState {
    pub fn new(hearts_to_display: u32) -> Self {
        HudState {
            hearts: hearts_to_display,
            kills: 0,
            hearts_visible: false,
            kills_visible: false,
            shield_visible: false,
            shield_anchor: SHIELD_ANCHOR,
            banner: None,
            win_images_shown: 0,
            game_over_images_shown: 0,
        }
    }

    pub fn with_shield_anchor(mut self, anchor: (f64, f64)) -> Self {
        self.shield_anchor = anchor;
        self
    }
}

impl LevelView for HudState {
    fn show_heart_display(&mut self) {
        self.hearts_visible = true;
    }

    fn show_kill_count_display(&mut self) {
        self.kills_visible = true;
    }

    fn show_shield(&mut self) {
        self.shield_visible = true;
    }

    fn hide_shield(&mut self) {
        self.shield_visible = false;
    }

    fn remove_hearts(&mut self, hearts_remaining: u32) {
        self.hearts = self.hearts.min(hearts_remaining);
    }

    fn update_kill_count(&mut self, kills: u32) {
        self.kills = kills;
    }

    fn show_win_image(&mut self) {
        self.banner = Some(Banner::Win);
        self.win_images_shown += 1;
    }

    fn show_game_over_image(&mut self) {
        self.banner = Some(Banner::GameOver);
        self.game_over_images_shown += 1;
    }
}
