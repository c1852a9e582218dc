//! Streaming level generator
//!
//! Keeps a window of track sections around the player: sections ahead are
//! spawned and populated as the player advances, sections behind are torn
//! down. Population walks each new section in random strides and places
//! obstacles, collectibles and enemies (always in that order) under
//! probability, weighted-set and minimum-spacing rules.
//!
//! Spacing is tracked by one [`PlacementCursor`] per kind that survives
//! section boundaries, so the minimum gap holds across the whole run, not just
//! inside a section.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize};

use super::entities::{EntityId, EntityKind, SceneHost};
use super::timeline::SpatialTimeline;
use super::weighted::pick_weighted;

/// Smallest stride the population walk will take
const MIN_STRIDE: f32 = 0.5;

/// The three populated kinds, in population order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    Obstacle,
    Collectible,
    Enemy,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 3] = [SpawnKind::Obstacle, SpawnKind::Collectible, SpawnKind::Enemy];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            SpawnKind::Obstacle => 0,
            SpawnKind::Collectible => 1,
            SpawnKind::Enemy => 2,
        }
    }
}

impl From<SpawnKind> for EntityKind {
    fn from(kind: SpawnKind) -> Self {
        match kind {
            SpawnKind::Obstacle => EntityKind::Obstacle,
            SpawnKind::Collectible => EntityKind::Collectible,
            SpawnKind::Enemy => EntityKind::Enemy,
        }
    }
}

/// A named, weighted group of interchangeable prefabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnCategory {
    pub name: String,
    pub candidates: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Minimum gap between two placements from this set
    #[serde(default)]
    pub min_spacing: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl SpawnCategory {
    pub fn new(name: &str, candidates: &[&str], weight: f32) -> Self {
        Self {
            name: name.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            weight,
            min_spacing: 0.0,
        }
    }
}

/// Placement rules for one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRules {
    pub sets: Vec<SpawnCategory>,
    /// Shortest stride, and the minimum gap between placements of this kind
    pub min_distance: f32,
    pub max_distance: f32,
    /// Chance of placing something at each stride
    pub probability: f32,
    /// Free run left before the end of each section
    pub end_margin: f32,
    /// Spawn height above the floor
    pub height_offset: f32,
}

impl SpawnRules {
    pub fn obstacles() -> Self {
        Self {
            sets: Vec::new(),
            min_distance: 15.0,
            max_distance: 25.0,
            probability: 0.7,
            end_margin: 5.0,
            height_offset: 0.01,
        }
    }

    pub fn collectibles() -> Self {
        Self {
            sets: Vec::new(),
            min_distance: 5.0,
            max_distance: 15.0,
            probability: 0.5,
            end_margin: 5.0,
            height_offset: 1.0,
        }
    }

    pub fn enemies() -> Self {
        Self {
            sets: Vec::new(),
            min_distance: 20.0,
            max_distance: 40.0,
            probability: 0.3,
            end_margin: 10.0,
            height_offset: 0.01,
        }
    }

    pub fn with_sets(mut self, sets: Vec<SpawnCategory>) -> Self {
        self.sets = sets;
        self
    }

    /// Stride bounds after clamping degenerate configuration
    fn stride_bounds(&self) -> (f32, f32) {
        let min = self.min_distance.max(MIN_STRIDE);
        (min, self.max_distance.max(min))
    }

    fn weights(&self) -> Vec<f32> {
        self.sets.iter().map(|s| s.weight).collect()
    }
}

/// Rules as written in a tuning file; absent fields keep the kind's defaults
#[derive(Deserialize)]
struct RulesOverride {
    sets: Option<Vec<SpawnCategory>>,
    min_distance: Option<f32>,
    max_distance: Option<f32>,
    probability: Option<f32>,
    end_margin: Option<f32>,
    height_offset: Option<f32>,
}

impl RulesOverride {
    fn apply(self, base: SpawnRules) -> SpawnRules {
        SpawnRules {
            sets: self.sets.unwrap_or(base.sets),
            min_distance: self.min_distance.unwrap_or(base.min_distance),
            max_distance: self.max_distance.unwrap_or(base.max_distance),
            probability: self.probability.unwrap_or(base.probability),
            end_margin: self.end_margin.unwrap_or(base.end_margin),
            height_offset: self.height_offset.unwrap_or(base.height_offset),
        }
    }
}

fn obstacle_rules<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpawnRules, D::Error> {
    Ok(RulesOverride::deserialize(deserializer)?.apply(SpawnRules::obstacles()))
}

fn collectible_rules<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpawnRules, D::Error> {
    Ok(RulesOverride::deserialize(deserializer)?.apply(SpawnRules::collectibles()))
}

fn enemy_rules<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpawnRules, D::Error> {
    Ok(RulesOverride::deserialize(deserializer)?.apply(SpawnRules::enemies()))
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub section_length: f32,
    pub sections_ahead: u32,
    pub sections_behind: u32,
    /// Finite track length in sections; `None` for endless
    pub total_sections: Option<u32>,
    pub section_prefabs: Vec<String>,
    /// Lateral distance between lanes
    pub lane_distance: f32,
    /// Placements use lanes `-placement_lanes..=placement_lanes`
    pub placement_lanes: i32,
    #[serde(deserialize_with = "obstacle_rules")]
    pub obstacles: SpawnRules,
    #[serde(deserialize_with = "collectible_rules")]
    pub collectibles: SpawnRules,
    #[serde(deserialize_with = "enemy_rules")]
    pub enemies: SpawnRules,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            section_length: 50.0,
            sections_ahead: 2,
            sections_behind: 1,
            total_sections: None,
            section_prefabs: vec!["section_plain".to_string()],
            lane_distance: 3.0,
            placement_lanes: 1,
            obstacles: SpawnRules::obstacles(),
            collectibles: SpawnRules::collectibles(),
            enemies: SpawnRules::enemies(),
        }
    }
}

impl GeneratorConfig {
    pub fn rules(&self, kind: SpawnKind) -> &SpawnRules {
        match kind {
            SpawnKind::Obstacle => &self.obstacles,
            SpawnKind::Collectible => &self.collectibles,
            SpawnKind::Enemy => &self.enemies,
        }
    }
}

/// An instantiated stretch of track
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub index: i64,
    pub start_distance: f32,
    pub length: f32,
    /// `None` when no section prefabs are configured
    pub prefab_id: Option<String>,
    pub handle: Option<EntityId>,
    /// Placements parented to this section
    pub children: Vec<EntityId>,
}

impl Section {
    pub fn end_distance(&self) -> f32 {
        self.start_distance + self.length
    }
}

/// Spacing state for one kind, carried across sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementCursor {
    pub last_placed: f32,
    /// Last placement of each set (indexed like `SpawnRules::sets`)
    pub per_set: Vec<Option<f32>>,
}

impl PlacementCursor {
    fn new(set_count: usize) -> Self {
        Self {
            last_placed: 0.0,
            per_set: vec![None; set_count],
        }
    }
}

/// Record of one placement, returned for logging and tests
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: EntityId,
    pub kind: SpawnKind,
    pub set: usize,
    pub prefab: String,
    pub position: Vec3,
}

/// Spawns sections ahead of the player and retires them behind
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    config: GeneratorConfig,
    timeline: SpatialTimeline,
    rng: Pcg32,
    sections: Vec<Section>,
    next_section_index: i64,
    cursors: [PlacementCursor; 3],
    active: bool,
    placements: Vec<Placement>,
}

impl LevelGenerator {
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        let timeline = SpatialTimeline::new(config.section_length);
        let cursors = Self::fresh_cursors(&config);
        Self {
            config,
            timeline,
            rng: Pcg32::seed_from_u64(seed),
            sections: Vec::new(),
            next_section_index: 0,
            cursors,
            active: false,
            placements: Vec::new(),
        }
    }

    fn fresh_cursors(config: &GeneratorConfig) -> [PlacementCursor; 3] {
        SpawnKind::ALL.map(|kind| PlacementCursor::new(config.rules(kind).sets.len()))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn timeline(&self) -> &SpatialTimeline {
        &self.timeline
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn active_sections(&self) -> &[Section] {
        &self.sections
    }

    /// Indices of active sections, in spawn order
    pub fn section_indices(&self) -> Vec<i64> {
        self.sections.iter().map(|s| s.index).collect()
    }

    pub fn cursor(&self, kind: SpawnKind) -> &PlacementCursor {
        &self.cursors[kind.index()]
    }

    /// Placements made since the last call
    pub fn drain_placements(&mut self) -> Vec<Placement> {
        std::mem::take(&mut self.placements)
    }

    /// Clear everything and spawn the opening sections from distance 0
    pub fn start(&mut self, host: &mut impl SceneHost) {
        for section in self.sections.drain(..) {
            Self::destroy_section(&section, host);
        }
        self.cursors = Self::fresh_cursors(&self.config);
        self.placements.clear();
        self.next_section_index = 0;
        self.active = true;

        for _ in 0..self.config.sections_ahead {
            self.spawn_next(host);
        }
        log::info!(
            "Generator started: {} sections of {}",
            self.sections.len(),
            self.timeline.section_length()
        );
    }

    /// Stop streaming; spawned sections stay until the next [`start`](Self::start)
    pub fn stop(&mut self) {
        if self.active {
            log::info!("Generator stopped with {} sections", self.sections.len());
        }
        self.active = false;
    }

    /// Stream the window around `player_distance`. Call once per tick.
    pub fn advance(&mut self, player_distance: f32, host: &mut impl SceneHost) {
        if !self.active {
            return;
        }

        let player_section = self.timeline.section_index(player_distance);
        let first = (player_section - self.config.sections_behind as i64).max(0);
        let last = player_section + self.config.sections_ahead as i64;

        // Sections that would be retired in this same tick are never built
        if self.next_section_index < first {
            log::debug!(
                "Skipping sections {}..{}",
                self.next_section_index,
                first
            );
            self.next_section_index = first;
        }

        while self.next_section_index <= last {
            self.spawn_next(host);
        }

        self.sections.retain(|section| {
            if section.index < first {
                Self::destroy_section(section, host);
                false
            } else {
                true
            }
        });
    }

    fn destroy_section(section: &Section, host: &mut impl SceneHost) {
        for &child in &section.children {
            host.destroy(child, 0.0);
        }
        if let Some(handle) = section.handle {
            host.destroy(handle, 0.0);
        }
        log::debug!("Section {} retired", section.index);
    }

    /// Spawn and populate `next_section_index`, then move past it
    fn spawn_next(&mut self, host: &mut impl SceneHost) {
        let index = self.next_section_index;
        self.next_section_index += 1;

        if let Some(total) = self.config.total_sections
            && index >= total as i64
        {
            return;
        }

        let start_distance = self.timeline.section_start(index);
        let prefab_id = if self.config.section_prefabs.is_empty() {
            None
        } else {
            let pick = self.rng.random_range(0..self.config.section_prefabs.len());
            Some(self.config.section_prefabs[pick].clone())
        };
        let handle = prefab_id.as_deref().map(|prefab| {
            host.instantiate(prefab, EntityKind::Section, Vec3::new(0.0, 0.0, start_distance))
        });

        let mut section = Section {
            index,
            start_distance,
            length: self.timeline.section_length(),
            prefab_id,
            handle,
            children: Vec::new(),
        };

        for kind in SpawnKind::ALL {
            self.populate(kind, &mut section, host);
        }

        log::debug!(
            "Section {} spawned at {} with {} placements",
            index,
            start_distance,
            section.children.len()
        );
        self.sections.push(section);
    }

    /// Walk `section` in random strides placing `kind`
    fn populate(&mut self, kind: SpawnKind, section: &mut Section, host: &mut impl SceneHost) {
        let rules = self.config.rules(kind);
        if rules.sets.is_empty() {
            return;
        }

        let (stride_min, stride_max) = rules.stride_bounds();
        let weights = rules.weights();
        let cursor = &mut self.cursors[kind.index()];
        let limit = section.end_distance() - rules.end_margin;
        let mut z = section
            .start_distance
            .max(self.timeline.earliest_after(cursor.last_placed, stride_min));

        while z < limit {
            if self.rng.random::<f32>() < rules.probability
                && let Some(set_index) = choose_set(rules, &weights, &mut self.rng)
                && self
                    .timeline
                    .is_spaced(cursor.per_set[set_index], z, rules.sets[set_index].min_spacing)
            {
                let set = &rules.sets[set_index];
                let prefab = &set.candidates[self.rng.random_range(0..set.candidates.len())];
                let span = self.config.placement_lanes.max(0);
                let lane = self.rng.random_range(-span..=span);
                let position = Vec3::new(
                    lane as f32 * self.config.lane_distance,
                    rules.height_offset,
                    z,
                );

                let id = host.instantiate(prefab, kind.into(), position);
                section.children.push(id);
                cursor.last_placed = z;
                cursor.per_set[set_index] = Some(z);
                self.placements.push(Placement {
                    id,
                    kind,
                    set: set_index,
                    prefab: prefab.clone(),
                    position,
                });
            }

            z += self.rng.random_range(stride_min..=stride_max);
        }
    }
}

/// Weighted set pick; a winner with no candidates falls back to the first
/// set that has some
fn choose_set(rules: &SpawnRules, weights: &[f32], rng: &mut Pcg32) -> Option<usize> {
    let picked = pick_weighted(weights, rng)?;
    if !rules.sets[picked].candidates.is_empty() {
        return Some(picked);
    }
    let fallback = rules.sets.iter().position(|s| !s.candidates.is_empty());
    if fallback.is_none() {
        log::debug!("No spawnable candidates in any set");
    }
    fallback
}
