//! Spawned world objects
//!
//! The arena stands in for the engine scene graph: the generator asks it to
//! instantiate and destroy things by prefab name, and it keeps the gameplay
//! payload of each object behind a stable id. Removal is always deferred to
//! the end of the tick; a delayed destroy just pushes the removal time out.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::health::Health;
use super::state::GameEvent;

/// Stable handle for a spawned object; never reused within an arena
pub type EntityId = u32;

/// What role a spawned object plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Section,
    Obstacle,
    Collectible,
    Enemy,
}

/// Instantiate/destroy primitives the generator needs from its host
pub trait SceneHost {
    fn instantiate(&mut self, prefab: &str, kind: EntityKind, position: Vec3) -> EntityId;
    fn destroy(&mut self, id: EntityId, delay: f32);
}

/// Obstacle behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleDef {
    pub damage: i32,
    /// Shatters when the player dashes into it
    pub breakable: bool,
    pub can_be_jumped_over: bool,
    pub can_be_slid_under: bool,
    /// Top of the obstacle above the floor
    pub height: f32,
}

impl Default for ObstacleDef {
    fn default() -> Self {
        Self {
            damage: 1,
            breakable: false,
            can_be_jumped_over: true,
            can_be_slid_under: false,
            height: 1.0,
        }
    }
}

/// Collectible behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleDef {
    /// Catalog item granted on pickup, if any
    pub item_id: Option<String>,
    /// Score awarded on pickup
    pub value: u32,
}

impl Default for CollectibleDef {
    fn default() -> Self {
        Self {
            item_id: None,
            value: 1,
        }
    }
}

/// Enemy behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyDef {
    pub damage: i32,
    pub health: i32,
    /// Speed toward the player along the travel axis
    pub move_speed: f32,
    /// Lateral sway amplitude around the spawn lane (0 disables)
    pub sway_range: f32,
    pub sway_speed: f32,
    pub can_attack: bool,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub height: f32,
}

impl Default for EnemyDef {
    fn default() -> Self {
        Self {
            damage: 1,
            health: 2,
            move_speed: 3.0,
            sway_range: 3.0,
            sway_speed: 2.0,
            can_attack: true,
            attack_range: 2.0,
            attack_cooldown: 1.5,
            height: 2.0,
        }
    }
}

/// Per-prefab gameplay data, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PrefabDef {
    Obstacle(ObstacleDef),
    Collectible(CollectibleDef),
    Enemy(EnemyDef),
}

/// Prefab name -> behaviour
pub type PrefabTable = BTreeMap<String, PrefabDef>;

/// Live enemy state
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyBody {
    pub def: EnemyDef,
    pub health: Health,
    /// Lateral position the sway oscillates around
    pub origin_x: f32,
    pub attack_cooldown: f32,
}

/// Tagged payload of a spawned object
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Section,
    Obstacle(ObstacleDef),
    Collectible(CollectibleDef),
    Enemy(EnemyBody),
}

impl Body {
    pub fn kind(&self) -> EntityKind {
        match self {
            Body::Section => EntityKind::Section,
            Body::Obstacle(_) => EntityKind::Obstacle,
            Body::Collectible(_) => EntityKind::Collectible,
            Body::Enemy(_) => EntityKind::Enemy,
        }
    }
}

/// A spawned object
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub prefab: String,
    pub position: Vec3,
    pub body: Body,
    /// Overlapping the player last tick (contact reactions fire on entry)
    pub touching: bool,
    /// Arena clock time at which the entity is dropped
    pub remove_at: Option<f32>,
}

impl Entity {
    /// Still part of the simulation (not scheduled for removal)
    pub fn is_live(&self) -> bool {
        self.remove_at.is_none()
    }
}

/// Id-keyed store of spawned objects with deferred removal
#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    prefabs: PrefabTable,
    /// Sorted by id (ids are handed out in increasing order)
    entities: Vec<Entity>,
    next_id: EntityId,
    clock: f32,
}

impl EntityArena {
    pub fn new(prefabs: PrefabTable) -> Self {
        Self {
            prefabs,
            entities: Vec::new(),
            next_id: 1,
            clock: 0.0,
        }
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Live entities of one kind
    pub fn live_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| e.is_live() && e.body.kind() == kind)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &mut self.entities[i])
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_live)
    }

    fn build_body(&self, prefab: &str, kind: EntityKind, position: Vec3) -> Body {
        let def = self.prefabs.get(prefab);
        match (kind, def) {
            (EntityKind::Section, _) => Body::Section,
            (EntityKind::Obstacle, Some(PrefabDef::Obstacle(def))) => Body::Obstacle(*def),
            (EntityKind::Collectible, Some(PrefabDef::Collectible(def))) => {
                Body::Collectible(def.clone())
            }
            (EntityKind::Enemy, Some(PrefabDef::Enemy(def))) => Body::Enemy(EnemyBody {
                def: *def,
                health: Health::enemy(def.health),
                origin_x: position.x,
                attack_cooldown: 0.0,
            }),
            (kind, def) => {
                if def.is_some() {
                    log::warn!("Prefab '{prefab}' is not a {kind:?}; using defaults");
                }
                Self::default_body(kind, position)
            }
        }
    }

    fn default_body(kind: EntityKind, position: Vec3) -> Body {
        match kind {
            EntityKind::Section => Body::Section,
            EntityKind::Obstacle => Body::Obstacle(ObstacleDef::default()),
            EntityKind::Collectible => Body::Collectible(CollectibleDef::default()),
            EntityKind::Enemy => {
                let def = EnemyDef::default();
                Body::Enemy(EnemyBody {
                    def,
                    health: Health::enemy(def.health),
                    origin_x: position.x,
                    attack_cooldown: 0.0,
                })
            }
        }
    }

    /// Move enemies, sway them around their lane and fire attacks in range
    pub fn update_enemies(&mut self, dt: f32, player: Vec3, events: &mut Vec<GameEvent>) {
        let time = self.clock;
        for entity in self.entities.iter_mut().filter(|e| e.is_live()) {
            let Body::Enemy(enemy) = &mut entity.body else {
                continue;
            };

            entity.position.z -= enemy.def.move_speed * dt;
            if enemy.def.sway_range > 0.0 {
                entity.position.x =
                    enemy.origin_x + (time * enemy.def.sway_speed).sin() * enemy.def.sway_range;
            }

            enemy.attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);
            if enemy.def.can_attack
                && enemy.attack_cooldown <= 0.0
                && entity.position.distance(player) <= enemy.def.attack_range
            {
                enemy.attack_cooldown = enemy.def.attack_cooldown;
                events.push(GameEvent::EnemyAttack { id: entity.id });
            }
        }
    }

    /// Advance the clock and drop entities whose removal time has passed
    pub fn flush(&mut self, dt: f32) -> usize {
        self.clock += dt;
        let clock = self.clock;
        let before = self.entities.len();
        self.entities
            .retain(|e| e.remove_at.is_none_or(|at| at > clock));
        before - self.entities.len()
    }

    /// Drop everything immediately (new run)
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl SceneHost for EntityArena {
    fn instantiate(&mut self, prefab: &str, kind: EntityKind, position: Vec3) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        let body = self.build_body(prefab, kind, position);
        self.entities.push(Entity {
            id,
            prefab: prefab.to_string(),
            position,
            body,
            touching: false,
            remove_at: None,
        });
        id
    }

    fn destroy(&mut self, id: EntityId, delay: f32) {
        let at = self.clock + delay.max(0.0);
        if let Some(entity) = self.get_mut(id) {
            // An earlier removal time wins
            entity.remove_at = Some(entity.remove_at.map_or(at, |t| t.min(at)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PrefabTable {
        let mut prefabs = PrefabTable::new();
        prefabs.insert(
            "crate".into(),
            PrefabDef::Obstacle(ObstacleDef {
                breakable: true,
                ..Default::default()
            }),
        );
        prefabs.insert(
            "drone".into(),
            PrefabDef::Enemy(EnemyDef {
                sway_range: 0.0,
                ..Default::default()
            }),
        );
        prefabs
    }

    #[test]
    fn test_instantiate_uses_prefab_table() {
        let mut arena = EntityArena::new(table());
        let a = arena.instantiate("crate", EntityKind::Obstacle, Vec3::ZERO);
        let b = arena.instantiate("unknown", EntityKind::Obstacle, Vec3::ZERO);
        let c = arena.instantiate("crate", EntityKind::Enemy, Vec3::ZERO);
        assert!(a < b && b < c);

        assert!(matches!(arena.get(a).unwrap().body, Body::Obstacle(def) if def.breakable));
        assert!(matches!(arena.get(b).unwrap().body, Body::Obstacle(def) if !def.breakable));
        // Kind mismatch falls back to the default for the requested kind
        assert_eq!(arena.get(c).unwrap().body.kind(), EntityKind::Enemy);
    }

    #[test]
    fn test_destroy_is_deferred_until_flush() {
        let mut arena = EntityArena::new(PrefabTable::new());
        let id = arena.instantiate("wall", EntityKind::Obstacle, Vec3::ZERO);
        arena.destroy(id, 0.0);
        assert!(arena.get(id).is_some());
        assert!(!arena.is_live(id));

        assert_eq!(arena.flush(0.01), 1);
        assert!(arena.get(id).is_none());
    }

    #[test]
    fn test_delayed_destroy() {
        let mut arena = EntityArena::new(PrefabTable::new());
        let id = arena.instantiate("grunt", EntityKind::Enemy, Vec3::ZERO);
        arena.destroy(id, 0.2);
        arena.flush(0.1);
        assert!(arena.get(id).is_some());
        arena.flush(0.15);
        assert!(arena.get(id).is_none());
    }

    #[test]
    fn test_destroy_unknown_is_ignored() {
        let mut arena = EntityArena::new(PrefabTable::new());
        arena.destroy(99, 0.0);
        assert_eq!(arena.flush(0.1), 0);
    }

    #[test]
    fn test_enemy_advances_and_attacks_with_cooldown() {
        let mut arena = EntityArena::new(table());
        let id = arena.instantiate("drone", EntityKind::Enemy, Vec3::new(0.0, 0.0, 1.0));
        let mut events = Vec::new();

        arena.update_enemies(0.1, Vec3::ZERO, &mut events);
        assert!((arena.get(id).unwrap().position.z - 0.7).abs() < 1e-5);
        assert_eq!(events, vec![GameEvent::EnemyAttack { id }]);

        // Still in range but cooling down
        arena.update_enemies(0.1, Vec3::ZERO, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_enemy_sways_around_origin() {
        let mut arena = EntityArena::new(PrefabTable::new());
        let id = arena.instantiate("grunt", EntityKind::Enemy, Vec3::new(3.0, 0.0, 100.0));
        let mut events = Vec::new();
        for _ in 0..50 {
            arena.flush(0.05);
            arena.update_enemies(0.05, Vec3::ZERO, &mut events);
            let x = arena.get(id).unwrap().position.x;
            assert!((0.0..=6.0).contains(&x));
        }
        assert!(events.is_empty());
    }
}
