//! # KEYSTONE Game Loop
//!
//! One call to [`GameLoop::tick`] runs one frame:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. RESET BUS                                                        │
//! │    └─ Drop last frame's subscriptions, systems subscribe again      │
//! │                                                                     │
//! │ 2. FLUSH                                                            │
//! │    └─ Registry::update: admit new entities, destroy killed ones     │
//! │                                                                     │
//! │ 3. INPUT                                                            │
//! │    └─ Emit one KeyPressedEvent per queued key                       │
//! │                                                                     │
//! │ 4. LOGIC                                                            │
//! │    ├─ Collision (emits CollisionEvent → Damage)                     │
//! │    ├─ Movement                                                      │
//! │    ├─ Projectile emission                                           │
//! │    └─ Projectile lifecycle                                          │
//! │                                                                     │
//! │ 5. RENDER                                                           │
//! │    └─ Caller-supplied RenderPass reads the registry                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities killed during a frame stay visible to every later step of that
//! frame and disappear at the next frame's flush.

use std::time::{Duration, Instant};

use keystone_core::{FlushStats, Registry};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::events::{EventBus, Key, KeyPressedEvent};
use crate::systems::{
    CollisionSystem, DamageSystem, KeyboardControlSystem, MovementSystem, ProjectileEmitSystem,
    ProjectileLifecycleSystem,
};

/// Read-only access to the world at the end of a frame.
pub trait RenderPass {
    /// Draws frame `frame` from `registry`.
    fn render(&mut self, registry: &Registry, frame: u64);
}

/// Render pass that draws nothing and counts frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessRenderer {
    /// Frames rendered so far.
    pub frames_rendered: u64,
}

impl RenderPass for HeadlessRenderer {
    fn render(&mut self, _registry: &Registry, _frame: u64) {
        self.frames_rendered += 1;
    }
}

/// Frame timing and activity statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Flush time in microseconds.
    pub flush_us: u64,
    /// Input and logic time in microseconds.
    pub logic_us: u64,
    /// Render time in microseconds.
    pub render_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Delta time actually simulated, after clamping.
    pub delta_secs: f32,
    /// What the flush did.
    pub flush: FlushStats,
    /// Key events dispatched.
    pub keys_dispatched: usize,
    /// Collisions detected.
    pub collisions: usize,
    /// Projectiles spawned by automatic emitters.
    pub projectiles_emitted: usize,
    /// Live entities after the frame, pending kills included.
    pub live_entities: usize,
}

/// The frame driver.
///
/// Owns the registry and the event bus, registers the gameplay systems and
/// runs them in a fixed order every frame.
pub struct GameLoop {
    registry: Registry,
    bus: EventBus<Registry>,
    config: SimulationConfig,
    /// Keys pressed since the last frame.
    pending_keys: Vec<Key>,
    frame_count: u64,
    last_frame_time: Option<Instant>,
    stats_accumulator: FrameStatsAccumulator,
}

impl GameLoop {
    /// Creates a loop with every gameplay system registered.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the loop and its registry
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a system cannot
    /// be registered.
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let mut registry = Registry::new(config.registry.clone());
        registry.add_system(MovementSystem::new())?;
        registry.add_system(CollisionSystem::new())?;
        registry.add_system(DamageSystem::new())?;
        registry.add_system(KeyboardControlSystem::new())?;
        registry.add_system(ProjectileEmitSystem::new())?;
        registry.add_system(ProjectileLifecycleSystem::new())?;
        debug!(systems = registry.system_count(), "game loop created");

        Ok(Self {
            registry,
            bus: EventBus::new(),
            config,
            pending_keys: Vec::new(),
            frame_count: 0,
            last_frame_time: None,
            stats_accumulator: FrameStatsAccumulator::new(),
        })
    }

    /// Queues a key press for the next frame.
    pub fn press_key(&mut self, key: Key) {
        self.pending_keys.push(key);
    }

    /// Runs one frame of `delta_secs` simulated seconds.
    ///
    /// The delta is clamped to `max_delta_secs` to keep a long pause from
    /// teleporting bodies. A negative or non-finite delta simulates nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a gameplay system was removed from the registry.
    pub fn tick(
        &mut self,
        delta_secs: f32,
        renderer: &mut dyn RenderPass,
    ) -> SimulationResult<FrameStats> {
        let frame_start = Instant::now();
        let delta_secs = sanitize_delta(delta_secs, self.config.max_delta_secs);

        self.bus.reset();
        DamageSystem::subscribe_to_events(&mut self.bus);
        KeyboardControlSystem::subscribe_to_events(&mut self.bus);
        ProjectileEmitSystem::subscribe_to_events(&mut self.bus);

        let flush = self.registry.update();
        let flush_done = Instant::now();

        let keys = std::mem::take(&mut self.pending_keys);
        for &key in &keys {
            self.bus.emit(&mut self.registry, KeyPressedEvent { key });
        }
        let collisions = CollisionSystem::update(&mut self.registry, &mut self.bus)?;
        MovementSystem::update(&mut self.registry, delta_secs)?;
        let projectiles_emitted = ProjectileEmitSystem::update(&mut self.registry, delta_secs)?;
        ProjectileLifecycleSystem::update(&mut self.registry, delta_secs)?;
        let logic_done = Instant::now();

        renderer.render(&self.registry, self.frame_count);
        let render_done = Instant::now();

        let stats = FrameStats {
            total_us: micros(render_done - frame_start),
            flush_us: micros(flush_done - frame_start),
            logic_us: micros(logic_done - flush_done),
            render_us: micros(render_done - logic_done),
            frame: self.frame_count,
            delta_secs,
            flush,
            keys_dispatched: keys.len(),
            collisions,
            projectiles_emitted,
            live_entities: self.registry.live_entity_count(),
        };
        self.end_frame(stats);
        Ok(stats)
    }

    /// Runs one frame timed by the wall clock since the previous call.
    ///
    /// The first call simulates one fixed frame at `target_fps`.
    ///
    /// # Errors
    ///
    /// See [`GameLoop::tick`].
    pub fn step(&mut self, renderer: &mut dyn RenderPass) -> SimulationResult<FrameStats> {
        let now = Instant::now();
        let delta_secs = self
            .last_frame_time
            .map_or(self.config.fixed_delta_secs(), |last| {
                now.duration_since(last).as_secs_f32()
            });
        self.last_frame_time = Some(now);
        self.tick(delta_secs, renderer)
    }

    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats_accumulator
            .record(stats, self.config.target_frame_time());

        let max_frame_us = micros(self.config.target_frame_time() * 2);
        if self.config.enable_timing_logs && stats.total_us > max_frame_us {
            warn!(
                frame = stats.frame,
                total_us = stats.total_us,
                budget_us = micros(self.config.target_frame_time()),
                "frame exceeded budget"
            );
        }
    }

    /// Returns the number of completed frames.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The registry, for spawning and editing entities between frames.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The event bus as left by the last frame.
    #[must_use]
    pub fn bus(&self) -> &EventBus<Registry> {
        &self.bus
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }
}

/// Clamps `delta_secs` into `[0, max_delta_secs]`, mapping NaN and
/// infinities to zero.
fn sanitize_delta(delta_secs: f32, max_delta_secs: f32) -> f32 {
    if delta_secs.is_finite() {
        delta_secs.clamp(0.0, max_delta_secs)
    } else {
        0.0
    }
}

#[allow(clippy::cast_possible_truncation)]
fn micros(duration: Duration) -> u64 {
    duration.as_micros() as u64
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of flush times.
    pub flush_us_sum: u64,
    /// Sum of logic times.
    pub logic_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    /// Entities admitted across all flushes.
    pub entities_added: u64,
    /// Entities destroyed across all flushes.
    pub entities_killed: u64,
    /// Collisions across all frames.
    pub collisions: u64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            flush_us_sum: 0,
            logic_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            entities_added: 0,
            entities_killed: 0,
            collisions: 0,
        }
    }

    /// Records a frame's statistics against a frame `budget`.
    pub fn record(&mut self, stats: FrameStats, budget: Duration) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.flush_us_sum += stats.flush_us;
        self.logic_us_sum += stats.logic_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.entities_added += stats.flush.added as u64;
        self.entities_killed += stats.flush.killed as u64;
        self.collisions += stats.collisions as u64;

        if stats.total_us > micros(budget) {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs a summary of the statistics at `info` level.
    #[allow(clippy::cast_precision_loss)]
    pub fn log_summary(&self) {
        if self.frames_recorded == 0 {
            info!("no frames recorded");
            return;
        }
        let frames = self.frames_recorded as f64;
        info!(
            frames = self.frames_recorded,
            avg_frame_ms = self.avg_frame_ms(),
            avg_fps = self.avg_fps(),
            min_frame_ms = self.min_frame_us as f64 / 1000.0,
            max_frame_ms = self.max_frame_us as f64 / 1000.0,
            over_budget_pct = self.over_budget_ratio() * 100.0,
            "frame timing"
        );
        info!(
            avg_flush_ms = self.flush_us_sum as f64 / frames / 1000.0,
            avg_logic_ms = self.logic_us_sum as f64 / frames / 1000.0,
            avg_render_ms = self.render_us_sum as f64 / frames / 1000.0,
            "frame breakdown"
        );
        info!(
            added = self.entities_added,
            killed = self.entities_killed,
            collisions = self.collisions,
            "entity activity"
        );
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Projectile, RigidBody, Transform, Vec2};

    #[test]
    fn test_game_loop_creation() {
        let game_loop = GameLoop::new(SimulationConfig::default()).unwrap();
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.registry().system_count(), 6);
    }

    #[test]
    fn test_frame_cycle() {
        let mut game_loop = GameLoop::new(SimulationConfig::default()).unwrap();
        let mut renderer = HeadlessRenderer::default();

        let e = game_loop.registry_mut().create_entity();
        game_loop
            .registry_mut()
            .add_component(e, Transform::at(Vec2::ZERO))
            .unwrap();
        game_loop
            .registry_mut()
            .add_component(e, RigidBody::moving(Vec2::new(1.0, 2.0)))
            .unwrap();

        let stats = game_loop.tick(0.05, &mut renderer).unwrap();
        assert_eq!(stats.frame, 0);
        assert_eq!(stats.flush.added, 1);
        assert_eq!(stats.live_entities, 1);
        assert_eq!(game_loop.frame_count(), 1);
        assert_eq!(renderer.frames_rendered, 1);

        let position = game_loop
            .registry()
            .get_component::<Transform>(e)
            .unwrap()
            .position;
        assert!((position.x - 0.05).abs() < 1e-6);
        assert!((position.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut game_loop = GameLoop::new(SimulationConfig::default()).unwrap();
        let mut renderer = HeadlessRenderer::default();

        let stats = game_loop.tick(5.0, &mut renderer).unwrap();
        assert!((stats.delta_secs - 0.1).abs() < f32::EPSILON);
        let stats = game_loop.tick(-1.0, &mut renderer).unwrap();
        assert!(stats.delta_secs.abs() < f32::EPSILON);
    }

    #[test]
    fn test_non_finite_delta_simulates_nothing() {
        let mut game_loop = GameLoop::new(SimulationConfig::default()).unwrap();
        let mut renderer = HeadlessRenderer::default();

        let registry = game_loop.registry_mut();
        let shot = registry.create_entity();
        registry
            .add_component(shot, Transform::at(Vec2::ZERO))
            .unwrap();
        registry
            .add_component(shot, RigidBody::moving(Vec2::new(1.0, 0.0)))
            .unwrap();
        registry
            .add_component(shot, Projectile::new(10, 0.05, true))
            .unwrap();

        for delta in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let stats = game_loop.tick(delta, &mut renderer).unwrap();
            assert!(stats.delta_secs.abs() < f32::EPSILON);
        }
        let registry = game_loop.registry();
        assert_eq!(
            registry.get_component::<Transform>(shot).unwrap().position,
            Vec2::ZERO
        );
        assert!(registry.get_component::<Projectile>(shot).unwrap().age_secs.abs() < f32::EPSILON);

        for _ in 0..10 {
            game_loop.tick(0.1, &mut renderer).unwrap();
        }
        assert!(!game_loop.registry().is_alive(shot));
    }

    #[test]
    fn test_bus_resubscribed_every_frame() {
        let mut game_loop = GameLoop::new(SimulationConfig::default()).unwrap();
        let mut renderer = HeadlessRenderer::default();

        for _ in 0..3 {
            game_loop.step(&mut renderer).unwrap();
            assert_eq!(
                game_loop
                    .bus()
                    .subscriber_count::<crate::events::CollisionEvent>(),
                1
            );
            assert_eq!(game_loop.bus().subscriber_count::<KeyPressedEvent>(), 2);
        }
    }

    #[test]
    fn test_stats_accumulator() {
        let mut acc = FrameStatsAccumulator::new();
        let budget = Duration::from_micros(16_666);

        for i in 0..100 {
            acc.record(
                FrameStats {
                    total_us: 10_000 + (i * 100),
                    flush_us: 1000,
                    logic_us: 5000,
                    render_us: 2000,
                    frame: i,
                    ..FrameStats::default()
                },
                budget,
            );
        }

        assert_eq!(acc.frames_recorded, 100);
        // Frames 67.. take longer than 16.666 ms.
        assert_eq!(acc.frames_over_budget, 33);
        assert!(acc.avg_fps() > 50.0);
        assert!(acc.avg_fps() < 100.0);
    }
}
