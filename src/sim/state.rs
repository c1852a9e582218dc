//! Game state and run lifecycle
//!
//! [`GameState`] owns every simulation component for one run. The tick
//! driver in `tick.rs` mutates it; hosts read it for presentation and drain
//! the [`GameEvent`] queue for effects and audio.

use serde::{Deserialize, Serialize};

use super::entities::{EntityArena, EntityId, EntityKind};
use super::focus::FocusTime;
use super::generator::LevelGenerator;
use super::health::Health;
use super::inventory::{Inventory, ItemEffect};
use super::player::PlayerMotion;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Player died; the world is frozen
    GameOver,
    /// Non-endless run reached its distance
    LevelComplete,
}

/// Notifications for presentation (effects, audio, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { seed: u64 },
    Paused,
    Resumed,
    Jumped,
    Landed,
    SlideStarted,
    SlideEnded,
    DashStarted,
    DashEnded,
    FocusStarted,
    FocusEnded,
    Spawned { id: EntityId, kind: EntityKind },
    EnemyAttack { id: EntityId },
    PlayerHit { damage: i32 },
    PlayerDied,
    ObstacleBroken { id: EntityId },
    EnemyHit { id: EntityId },
    EnemyDied { id: EntityId },
    Collected { id: EntityId, value: u32 },
    ItemStored { item_id: String },
    InventoryFull { item_id: String },
    ItemUsed { item_id: String },
    Healed { amount: i32 },
    LevelComplete,
    GameOver,
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub tuning: Tuning,
    pub player: PlayerMotion,
    pub health: Health,
    pub inventory: Inventory,
    pub focus: FocusTime,
    pub generator: LevelGenerator,
    pub arena: EntityArena,
    /// Pending notifications, oldest first
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a run with the given tuning and seed and start it
    pub fn new(mut tuning: Tuning, seed: u64) -> Self {
        tuning.normalize();
        let mut state = Self {
            seed,
            phase: GamePhase::Playing,
            score: 0,
            time_ticks: 0,
            player: PlayerMotion::new(tuning.player),
            health: Health::from_tuning(&tuning.health),
            inventory: Inventory::new(tuning.inventory.max_slots),
            focus: FocusTime::new(tuning.focus),
            generator: LevelGenerator::new(tuning.generator.clone(), seed),
            arena: EntityArena::new(tuning.prefabs.clone()),
            events: Vec::new(),
            tuning,
        };
        state.start();
        state
    }

    /// Reset every component and start a fresh run with the same seed
    pub fn restart(&mut self) {
        self.player.reset();
        self.health.restore();
        self.inventory.clear();
        self.focus.reset();
        self.arena.clear();
        self.generator = LevelGenerator::new(self.tuning.generator.clone(), self.seed);
        self.score = 0;
        self.time_ticks = 0;
        self.phase = GamePhase::Playing;
        self.start();
    }

    fn start(&mut self) {
        self.generator.start(&mut self.arena);
        self.record_placements();

        for id in &self.tuning.inventory.starting_items {
            if let Err(err) = self.inventory.add_from_catalog(&self.tuning.catalog, id) {
                log::warn!("Starting item '{id}' not granted: {err}");
            }
        }

        log::info!(
            "Run started: seed={} endless={}",
            self.seed,
            self.tuning.session.endless_mode
        );
        self.events.push(GameEvent::RunStarted { seed: self.seed });
    }

    /// Turn the generator's placement log into spawn notifications
    pub(crate) fn record_placements(&mut self) {
        for placement in self.generator.drain_placements() {
            self.events.push(GameEvent::Spawned {
                id: placement.id,
                kind: placement.kind.into(),
            });
        }
    }

    /// Distance travelled this run
    pub fn distance(&self) -> f32 {
        self.player.state().distance_traveled
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Use the item in `slot` and apply its effect. Returns false for an empty slot.
    pub fn use_item(&mut self, slot: usize) -> bool {
        let Some((item, effect)) = self.inventory.use_item(slot) else {
            return false;
        };

        match effect {
            ItemEffect::Heal { amount } => {
                let healed = self.health.heal(amount);
                self.events.push(GameEvent::Healed { amount: healed });
            }
            ItemEffect::SpeedBoost {
                multiplier,
                duration,
            } => self.player.apply_speed_boost(multiplier, duration),
            ItemEffect::None => log::debug!("Item '{}' has no effect", item.id),
        }

        log::debug!("Used '{}' from slot {slot}", item.id);
        self.events.push(GameEvent::ItemUsed { item_id: item.id });
        true
    }

    /// Take every pending notification
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::inventory::{Item, ItemCatalog, ItemKind};

    fn tuning_with_items() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.catalog = ItemCatalog::new(vec![
            Item {
                id: "heal".into(),
                name: "Heal".into(),
                kind: ItemKind::Heal,
                magnitude: 1.0,
                duration_seconds: 0.0,
            },
            Item {
                id: "boost".into(),
                name: "Boost".into(),
                kind: ItemKind::SpeedBoost,
                magnitude: 2.0,
                duration_seconds: 3.0,
            },
        ]);
        tuning.inventory.starting_items = vec!["heal".into(), "boost".into(), "missing".into()];
        tuning
    }

    #[test]
    fn test_new_starts_run() {
        let state = GameState::new(tuning_with_items(), 7);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.generator.section_indices(), vec![0, 1]);
        // Unknown starting items are skipped
        assert_eq!(state.inventory.len(), 2);
        assert!(state.events.contains(&GameEvent::RunStarted { seed: 7 }));
    }

    #[test]
    fn test_use_heal_and_boost() {
        let mut state = GameState::new(tuning_with_items(), 1);
        state.health.take_damage(1);
        assert!(state.use_item(0));
        assert_eq!(state.health.current(), 3);

        // Boost is now in slot 0
        assert!(state.use_item(0));
        assert_eq!(state.player.forward_speed(), 20.0);
        assert!(!state.use_item(0));

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ItemUsed {
            item_id: "boost".into()
        }));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = GameState::new(tuning_with_items(), 3);
        let sections = state.generator.section_indices();
        state.score = 500;
        state.phase = GamePhase::GameOver;
        state.use_item(0);
        state.generator.advance(400.0, &mut state.arena);

        state.restart();
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.inventory.len(), 2);
        assert_eq!(state.generator.section_indices(), sections);
        assert_eq!(state.distance(), 0.0);
    }
}
