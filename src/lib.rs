//! Lane Runner - streaming level generation and player motion for an
//! endless three-lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (generator, motion, combat, session)
//! - `tuning`: Data-driven game balance
//! - `error`: Error types for the fallible edges

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{InventoryError, TuningError};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Player collider half extents on the lateral and forward axes
    pub const PLAYER_HALF_WIDTH: f32 = 0.5;
    pub const PLAYER_HALF_DEPTH: f32 = 0.5;
    /// Obstacle/enemy/collectible half extents on the lateral and forward axes
    pub const ENTITY_HALF_WIDTH: f32 = 0.75;
    pub const ENTITY_HALF_DEPTH: f32 = 0.75;
    /// Vertical half extent of a collectible around its spawn height
    pub const COLLECTIBLE_RADIUS: f32 = 0.75;

    /// Damage a dash deals to an enemy it runs into
    pub const DASH_DAMAGE: i32 = 1;
    /// Seconds a dead enemy lingers before removal
    pub const ENEMY_DEATH_DELAY: f32 = 0.2;
}
