//! # KEYSTONE
//!
//! The simulation crate, built on the `keystone_core` registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          GameLoop                            │
//! │                                                              │
//! │  ┌──────────────────┐   emit(&mut Registry, E)  ┌─────────┐  │
//! │  │     Registry     │<──────────────────────────│ EventBus│  │
//! │  │  (keystone_core) │                           └─────────┘  │
//! │  │                  │        system logic           ▲        │
//! │  │  entities, pools,│<───────────┬──────────────────┘        │
//! │  │  systems, tags   │            │                           │
//! │  └──────────────────┘     Collision, Damage, Movement,       │
//! │                           KeyboardControl, Projectiles       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: Type-indexed event bus and gameplay events
//! - `components`: Gameplay component data
//! - `systems`: Gameplay systems
//! - `game_loop`: Frame orchestration and timing
//! - `config`: TOML simulation configuration

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod game_loop;
pub mod systems;

// Re-export the core
pub use keystone_core as core;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use error::{ConfigError, SimulationError, SimulationResult};
pub use events::{CollisionEvent, Event, EventBus, Key, KeyPressedEvent};
pub use game_loop::{FrameStats, FrameStatsAccumulator, GameLoop, HeadlessRenderer, RenderPass};
