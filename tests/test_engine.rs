use sky_battle::engine::{Engine, Stage, TickOutcome};
use sky_battle::entities::*;
use sky_battle::hud::HudState;
use sky_battle::level::{LevelId, LevelPolicy, Verdict};
use sky_battle::GameConfig;

use rand::rngs::mock::StepRng;
use rand::RngCore;

/// Every probability roll fails, so nothing spawns or fires on its own.
fn never_rng() -> StepRng {
    StepRng::new(1 << 63, 0)
}

/// A level that never spawns anything and only ends when the player dies.
struct Sandbox;

impl LevelPolicy for Sandbox {
    fn id(&self) -> LevelId {
        LevelId::One
    }

    fn player_initial_health(&self) -> u32 {
        5
    }

    fn instantiate_level_view(&self) -> HudState {
        HudState::new(5)
    }

    fn initialize_friendly_units(&mut self, stage: &mut Stage) {
        stage.add_to_scene(stage.user_id());
    }

    fn spawn_enemy_units(&mut self, _stage: &mut Stage, _rng: &mut dyn RngCore) {}

    fn check_if_game_over(&self, stage: &Stage) -> Verdict {
        if stage.user_is_destroyed() {
            Verdict::Lose
        } else {
            Verdict::Continue
        }
    }
}

fn sandbox() -> Engine {
    Engine::new(Box::new(Sandbox), &GameConfig::default()).unwrap()
}

fn user_mut(engine: &mut Engine) -> &mut Actor {
    let id = engine.stage().user_id();
    engine.stage_mut().actor_mut(id).unwrap()
}

// ── Setup ─────────────────────────────────────────────────────────────────────

#[test]
fn new_engine_places_player_on_screen() {
    let engine = sandbox();
    let stage = engine.stage();
    assert_eq!(stage.friendly_units().len(), 1);
    assert!(stage.in_scene(stage.user_id()));
    assert_eq!(stage.user_health(), 5);
    assert!(engine.hud().hearts_visible);
    assert!(engine.hud().kills_visible);
    assert!(engine.is_running());
}

#[test]
fn zero_player_health_is_a_config_error() {
    struct Hopeless;
    impl LevelPolicy for Hopeless {
        fn id(&self) -> LevelId {
            LevelId::One
        }
        fn player_initial_health(&self) -> u32 {
            0
        }
        fn instantiate_level_view(&self) -> HudState {
            HudState::new(0)
        }
        fn initialize_friendly_units(&mut self, _stage: &mut Stage) {}
        fn spawn_enemy_units(&mut self, _stage: &mut Stage, _rng: &mut dyn RngCore) {}
        fn check_if_game_over(&self, _stage: &Stage) -> Verdict {
            Verdict::Continue
        }
    }
    let result = Engine::new(Box::new(Hopeless), &GameConfig::default());
    assert!(matches!(result, Err(sky_battle::ConfigError::InvalidPlayerHealth)));
}

#[test]
fn empty_tick_is_a_no_op() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    assert_eq!(engine.tick(&mut rng), TickOutcome::Continue);
    assert_eq!(engine.frame(), 1);
    assert_eq!(engine.stage().actor_count(), 1);
    assert_eq!(engine.kills(), 0);
}

// ── Intents ───────────────────────────────────────────────────────────────────

#[test]
fn fire_intent_spawns_one_projectile_per_press() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    engine.apply(Intent::Fire);
    engine.apply(Intent::Fire);
    engine.tick(&mut rng);

    // Launched before the movement step, so they have already moved once.
    let shots = engine.stage().user_projectiles();
    assert_eq!(shots.len(), 2);
    assert!(shots.iter().all(|s| s.x() == 125.0));
    assert!(shots.iter().all(|s| engine.stage().in_scene(s.id)));

    // Consumed: the next tick moves them without adding more.
    engine.tick(&mut rng);
    let shots = engine.stage().user_projectiles();
    assert_eq!(shots.len(), 2);
    assert!(shots.iter().all(|s| s.x() == 140.0));
}

#[test]
fn fresh_shot_can_hit_on_its_first_tick() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    // Drifts to x=241; only a shot that has moved to 125..250 reaches it.
    let target = engine.stage_mut().add_enemy_unit(Actor::enemy_plane(247.0, 250.0));
    engine.apply(Intent::Fire);

    assert_eq!(engine.tick(&mut rng), TickOutcome::Continue);

    assert!(engine.stage().actor(target).is_none());
    assert!(engine.stage().user_projectiles().is_empty());
    assert_eq!(engine.kills(), 1);
}

#[test]
fn move_intents_apply_at_next_tick() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    let start = engine.stage().user().unwrap().y();

    engine.apply(Intent::MoveUp);
    assert_eq!(engine.stage().user().unwrap().y(), start);
    engine.tick(&mut rng);
    assert_eq!(engine.stage().user().unwrap().y(), start - 8.0);

    engine.apply(Intent::Stop);
    engine.tick(&mut rng);
    assert_eq!(engine.stage().user().unwrap().y(), start - 8.0);
}

// ── Kill accounting ───────────────────────────────────────────────────────────

#[test]
fn one_projectile_kill_among_three_enemies_counts_once() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    let stage = engine.stage_mut();
    let target = stage.add_enemy_unit(Actor::enemy_plane(400.0, 100.0));
    let survivor_a = stage.add_enemy_unit(Actor::enemy_plane(700.0, 100.0));
    let survivor_b = stage.add_enemy_unit(Actor::enemy_plane(1000.0, 100.0));
    let shot = stage.add_user_projectile(Actor::user_projectile(380.0, 150.0));

    assert_eq!(engine.tick(&mut rng), TickOutcome::Continue);

    let stage = engine.stage();
    assert_eq!(engine.kills(), 1);
    assert_eq!(engine.hud().kills, 1);
    assert_eq!(stage.current_number_of_enemies(), 2);
    assert!(stage.actor(target).is_none());
    assert!(stage.actor(shot).is_none());
    assert!(!stage.in_scene(target));
    assert!(!stage.in_scene(shot));
    assert!(stage.in_scene(survivor_a));
    assert!(stage.in_scene(survivor_b));
}

#[test]
fn plane_collision_damages_both_sides() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    // Right on top of the player at (5, 300).
    let rammer = engine.stage_mut().add_enemy_unit(Actor::enemy_plane(50.0, 280.0));

    engine.tick(&mut rng);

    assert_eq!(engine.stage().user_health(), 4);
    assert_eq!(engine.hud().hearts, 4);
    assert!(engine.stage().actor(rammer).is_none());
    assert_eq!(engine.kills(), 1);
}

#[test]
fn enemy_projectile_hits_player() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    let shot = engine.stage_mut().add_enemy_projectile(Actor::enemy_projectile(60.0, 310.0));

    engine.tick(&mut rng);

    assert_eq!(engine.stage().user_health(), 4);
    assert!(engine.stage().actor(shot).is_none());
    assert_eq!(engine.kills(), 0);
}

#[test]
fn shielded_boss_survives_projectile_but_projectile_dies() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    let mut boss = Actor::boss_plane(&mut rng);
    if let Role::Boss(brain) = &mut boss.role {
        brain.shield = ShieldState::Shielded;
    }
    let stage = engine.stage_mut();
    let boss_id = stage.add_enemy_unit(boss);
    let shot = stage.add_user_projectile(Actor::user_projectile(990.0, 500.0));

    engine.tick(&mut rng);

    let boss = engine.stage().actor(boss_id).unwrap();
    assert_eq!(boss.health, Some(sky_battle::boss::HEALTH));
    assert!(engine.stage().actor(shot).is_none());
}

// ── Penetration ───────────────────────────────────────────────────────────────

#[test]
fn enemy_crossing_the_screen_damages_player_and_dies() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    let mut runner = Actor::enemy_plane(1300.0, 0.0);
    // One more step of -6 takes it to -1301.
    runner.translate_x = -1295.0;
    let runner = engine.stage_mut().add_enemy_unit(runner);

    engine.tick(&mut rng);

    assert_eq!(engine.stage().user_health(), 4);
    assert!(engine.stage().actor(runner).is_none());
    assert!(!engine.stage().in_scene(runner));
}

#[test]
fn enemy_exactly_one_screen_away_has_not_penetrated() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    let mut runner = Actor::enemy_plane(1300.0, 0.0);
    runner.translate_x = -1294.0;
    let runner = engine.stage_mut().add_enemy_unit(runner);

    engine.tick(&mut rng);

    assert_eq!(engine.stage().user_health(), 5);
    let runner = engine.stage().actor(runner).unwrap();
    assert_eq!(runner.translate_x, -1300.0);
    assert!(!runner.is_destroyed());
}

// ── Loss ──────────────────────────────────────────────────────────────────────

#[test]
fn losing_stops_the_loop_after_one_game_over() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    user_mut(&mut engine).health = Some(1);
    engine.stage_mut().add_enemy_projectile(Actor::enemy_projectile(60.0, 310.0));

    assert_eq!(engine.tick(&mut rng), TickOutcome::Lost);
    assert!(!engine.is_running());
    assert!(engine.stage().user_is_destroyed());
    assert!(engine.stage().user().is_none());
    assert_eq!(engine.hud().hearts, 0);
    assert_eq!(engine.hud().game_over_images_shown, 1);

    let frame = engine.frame();
    for _ in 0..5 {
        assert_eq!(engine.tick(&mut rng), TickOutcome::Halted);
    }
    assert_eq!(engine.frame(), frame);
    assert_eq!(engine.hud().game_over_images_shown, 1);
    assert_eq!(engine.hud().win_images_shown, 0);
}

#[test]
fn intents_after_stop_are_ignored() {
    let mut engine = sandbox();
    let mut rng = never_rng();
    user_mut(&mut engine).health = Some(1);
    engine.stage_mut().add_enemy_projectile(Actor::enemy_projectile(60.0, 310.0));
    engine.tick(&mut rng);

    engine.apply(Intent::Fire);
    engine.apply(Intent::MoveUp);
    assert_eq!(engine.tick(&mut rng), TickOutcome::Halted);
    assert!(engine.stage().user_projectiles().is_empty());
}
