//! # keystone_demo
//!
//! Runs a scripted duel headlessly: two enemy turrets fire on their own while
//! a keyboard-controlled player steers and fires on `Space`, until the
//! configured frame count is reached.
//!
//! ```text
//! keystone_demo [config.toml]
//! RUST_LOG=keystone=debug keystone_demo
//! ```

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use keystone::components::{
    BoxCollider, Health, KeyboardControlled, ProjectileEmitter, RigidBody, Transform, Vec2,
};
use keystone::core::{EcsResult, Entity, Registry};
use keystone::systems::{ENEMIES_GROUP, PLAYER_TAG};
use keystone::{GameLoop, HeadlessRenderer, Key, SimulationConfig};

/// Frames at which the scripted player presses a key.
const SCRIPT: [(u64, Key); 7] = [
    (60, Key::Right),
    (90, Key::Space),
    (120, Key::Up),
    (150, Key::Space),
    (240, Key::Down),
    (300, Key::Right),
    (360, Key::Space),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keystone=info".parse()?))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_path(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => SimulationConfig::default(),
    };
    info!(frames = config.frames, membership = ?config.registry.membership, "keystone demo starting");

    let frames = config.frames;
    let delta_secs = config.fixed_delta_secs();
    let mut game_loop = GameLoop::new(config)?;
    let mut renderer = HeadlessRenderer::default();

    let player = spawn_scene(game_loop.registry_mut())?;
    for frame in 0..frames {
        for &(_, key) in SCRIPT.iter().filter(|(at, _)| *at == frame) {
            game_loop.press_key(key);
        }
        game_loop.tick(delta_secs, &mut renderer)?;
    }

    let registry = game_loop.registry();
    let player_health = registry
        .get_component::<Health>(player)
        .map_or(0, |health| health.percentage);
    let enemies_left = registry
        .entities_by_group(ENEMIES_GROUP)
        .map_or(0, |members| members.len());
    info!(
        player_alive = registry.is_alive(player),
        player_health,
        enemies_left,
        live_entities = registry.live_entity_count(),
        "demo finished"
    );
    game_loop.stats().log_summary();
    Ok(())
}

/// Spawns the player and the enemy turrets. Returns the player.
fn spawn_scene(registry: &mut Registry) -> EcsResult<Entity> {
    let player = registry.create_entity();
    registry
        .entity_mut(player)
        .add_component(Transform::at(Vec2::new(100.0, 100.0)))?
        .add_component(RigidBody::default())?
        .add_component(BoxCollider::new(32.0, 32.0))?
        .add_component(Health::default())?
        .add_component(KeyboardControlled { speed: 40.0 })?
        .add_component(ProjectileEmitter::new(Vec2::new(150.0, 150.0), 0.2, true))?
        .tag(PLAYER_TAG);

    for position in [Vec2::new(400.0, 100.0), Vec2::new(400.0, 60.0)] {
        let enemy = registry.create_entity();
        registry
            .entity_mut(enemy)
            .add_component(Transform::at(position))?
            .add_component(RigidBody::default())?
            .add_component(BoxCollider::new(32.0, 32.0))?
            .add_component(Health::default())?
            .add_component(ProjectileEmitter {
                duration_secs: 4.0,
                ..ProjectileEmitter::new(Vec2::new(-120.0, 0.0), 0.5, false)
            })?
            .group(ENEMIES_GROUP);
    }
    Ok(player)
}
