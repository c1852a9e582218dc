//! Data-driven game balance
//!
//! Every knob the simulation reads is collected here and loaded once from
//! JSON. Missing fields fall back to the defaults, which reproduce the
//! stock game. Out-of-range values are clamped by [`Tuning::normalize`]
//! rather than rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::entities::PrefabTable;
use crate::sim::focus::FocusTuning;
use crate::sim::generator::{GeneratorConfig, SpawnKind};
use crate::sim::health::HealthTuning;
use crate::sim::inventory::{InventoryTuning, ItemCatalog};
use crate::sim::player::PlayerTuning;

/// Run-level rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    /// Never complete; run until the player dies
    pub endless_mode: bool,
    /// Distance that completes a non-endless run
    pub level_distance: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            endless_mode: true,
            level_distance: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub session: SessionTuning,
    pub generator: GeneratorConfig,
    pub player: PlayerTuning,
    pub health: HealthTuning,
    pub inventory: InventoryTuning,
    pub focus: FocusTuning,
    pub catalog: ItemCatalog,
    pub prefabs: PrefabTable,
}

impl Tuning {
    /// Parse and normalize tuning JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.normalize();
        Ok(tuning)
    }

    /// Read a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!(
            "Loaded tuning from {} ({} prefabs, {} items)",
            path.display(),
            tuning.prefabs.len(),
            tuning.catalog.items().len()
        );
        Ok(tuning)
    }

    /// Clamp values the simulation cannot run with
    pub fn normalize(&mut self) {
        let generator = &mut self.generator;
        if !(generator.section_length >= 1.0) {
            log::warn!("section_length {} too small, using 1", generator.section_length);
            generator.section_length = 1.0;
        }
        if generator.placement_lanes < 0 {
            log::warn!("placement_lanes {} negative, using 0", generator.placement_lanes);
            generator.placement_lanes = 0;
        }
        if generator.lane_distance != self.player.lane_distance {
            log::warn!(
                "Generator lane distance {} differs from player lane distance {}; using the player's",
                generator.lane_distance,
                self.player.lane_distance
            );
            generator.lane_distance = self.player.lane_distance;
        }

        for kind in SpawnKind::ALL {
            let rules = match kind {
                SpawnKind::Obstacle => &mut generator.obstacles,
                SpawnKind::Collectible => &mut generator.collectibles,
                SpawnKind::Enemy => &mut generator.enemies,
            };
            if !(0.0..=1.0).contains(&rules.probability) {
                log::warn!("{kind:?} probability {} clamped to [0, 1]", rules.probability);
                rules.probability = if rules.probability.is_nan() {
                    0.0
                } else {
                    rules.probability.clamp(0.0, 1.0)
                };
            }
            if rules.max_distance < rules.min_distance {
                log::warn!(
                    "{kind:?} max_distance {} below min_distance {}",
                    rules.max_distance,
                    rules.min_distance
                );
                rules.max_distance = rules.min_distance;
            }
        }

        if self.player.max_lane_index < 0 {
            log::warn!("max_lane_index {} negative, using 0", self.player.max_lane_index);
            self.player.max_lane_index = 0;
        }

        if self.inventory.max_slots == 0 {
            log::warn!("Inventory with zero slots, using 1");
            self.inventory.max_slots = 1;
        }
        for id in &self.inventory.starting_items {
            if self.catalog.get(id).is_none() {
                log::warn!("Starting item '{id}' is not in the catalog");
            }
        }

        let slow = self.focus.time_slow_factor;
        if !(slow > 0.0 && slow <= 1.0) {
            log::warn!("time_slow_factor {slow} outside (0, 1], using 1");
            self.focus.time_slow_factor = 1.0;
        }

        if !(self.session.level_distance > 0.0) {
            log::warn!(
                "level_distance {} not positive, using 1000",
                self.session.level_distance
            );
            self.session.level_distance = 1000.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::PrefabDef;
    use crate::sim::generator::SpawnRules;

    #[test]
    fn test_bundled_tuning_parses() {
        let tuning = Tuning::from_json(include_str!("../assets/default_tuning.json")).unwrap();
        assert!(!tuning.generator.obstacles.sets.is_empty());
        assert!(!tuning.catalog.items().is_empty());
        for id in &tuning.inventory.starting_items {
            assert!(tuning.catalog.get(id).is_some(), "missing {id}");
        }
        // Every candidate resolves to a prefab of its kind
        for set in &tuning.generator.enemies.sets {
            for candidate in &set.candidates {
                assert!(matches!(
                    tuning.prefabs.get(candidate),
                    Some(PrefabDef::Enemy(_))
                ));
            }
        }
    }

    #[test]
    fn test_empty_object_gives_defaults() {
        let tuning = Tuning::from_json("{}").unwrap();
        assert_eq!(tuning, Tuning::default());
        assert_eq!(tuning.generator.section_length, 50.0);
        assert_eq!(tuning.inventory.max_slots, 4);
        assert!(tuning.session.endless_mode);
    }

    #[test]
    fn test_partial_spawn_rules_keep_kind_defaults() {
        let json = r#"{
            "generator": {
                "enemies": { "sets": [{ "name": "walkers", "candidates": ["grunt"] }] },
                "collectibles": { "probability": 0.25 }
            }
        }"#;
        let tuning = Tuning::from_json(json).unwrap();

        let enemies = &tuning.generator.enemies;
        assert_eq!(enemies.sets.len(), 1);
        assert_eq!(enemies.end_margin, 10.0);
        assert_eq!(enemies.min_distance, 20.0);
        assert_eq!(enemies.max_distance, 40.0);
        assert_eq!(enemies.probability, 0.3);

        let collectibles = &tuning.generator.collectibles;
        assert_eq!(collectibles.probability, 0.25);
        assert_eq!(collectibles.height_offset, 1.0);
        assert_eq!(collectibles.min_distance, 5.0);

        assert_eq!(tuning.generator.obstacles, SpawnRules::obstacles());
    }

    #[test]
    fn test_normalize_clamps() {
        let json = r#"{
            "generator": {
                "section_length": 0.0,
                "obstacles": { "probability": 3.0, "min_distance": 10.0, "max_distance": 2.0 }
            },
            "inventory": { "max_slots": 0 },
            "focus": { "time_slow_factor": 0.0 }
        }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.generator.section_length, 1.0);
        assert_eq!(tuning.generator.obstacles.probability, 1.0);
        assert_eq!(tuning.generator.obstacles.max_distance, 10.0);
        assert_eq!(tuning.inventory.max_slots, 1);
        assert_eq!(tuning.focus.time_slow_factor, 1.0);
    }

    #[test]
    fn test_parse_error_and_missing_file() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
        assert!(matches!(
            Tuning::load("/nonexistent/tuning.json"),
            Err(TuningError::Io { .. })
        ));
    }
}
