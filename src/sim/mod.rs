//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entities;
pub mod focus;
pub mod generator;
pub mod health;
pub mod inventory;
pub mod player;
pub mod state;
pub mod tick;
pub mod timeline;
pub mod weighted;

pub use collision::{ContactOutcome, resolve_contacts};
pub use entities::{Body, Entity, EntityArena, EntityId, EntityKind, PrefabDef, PrefabTable, SceneHost};
pub use focus::{FocusTime, FocusTuning};
pub use generator::{GeneratorConfig, LevelGenerator, Section, SpawnCategory, SpawnKind, SpawnRules};
pub use health::{DamageOutcome, Health, HealthTuning};
pub use inventory::{Inventory, Item, ItemCatalog, ItemEffect, ItemKind};
pub use player::{FlatGround, GroundProbe, MotionIntents, MovementMode, PlayerMotion, PlayerTuning};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{Swipe, TickInput, tick, tick_with_probe};
pub use timeline::SpatialTimeline;
pub use weighted::pick_weighted;
