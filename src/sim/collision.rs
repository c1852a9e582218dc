//! Player contact resolution
//!
//! Overlap is tested per entity kind on the lateral and forward axes plus a
//! vertical rule, and reactions fire only on the tick the player enters an
//! entity. Each tagged body kind has its own resolution function.

use super::entities::{
    Body, CollectibleDef, Entity, EntityArena, EntityId, ObstacleDef, SceneHost,
};
use super::health::{DamageOutcome, Health};
use super::inventory::{Inventory, ItemCatalog};
use super::player::PlayerMotion;
use super::state::GameEvent;
use crate::consts::*;
use crate::error::InventoryError;

/// What a contact did
#[derive(Debug, Clone, PartialEq)]
pub enum ContactOutcome {
    PlayerHit { damage: i32, outcome: DamageOutcome },
    ObstacleBroken,
    EnemyHit { killed: bool },
    Collected { value: u32, stored_item: Option<String> },
}

/// Everything a contact may touch besides the arena
pub struct ContactContext<'a> {
    pub player: &'a PlayerMotion,
    pub health: &'a mut Health,
    pub inventory: &'a mut Inventory,
    pub catalog: &'a ItemCatalog,
    pub score: &'a mut u64,
    pub events: &'a mut Vec<GameEvent>,
}

/// Player footprint overlaps the entity on the lateral and forward axes
fn footprint_overlaps(player: &PlayerMotion, entity: &Entity) -> bool {
    let p = player.position();
    (p.x - entity.position.x).abs() < PLAYER_HALF_WIDTH + ENTITY_HALF_WIDTH
        && (p.z - entity.position.z).abs() < PLAYER_HALF_DEPTH + ENTITY_HALF_DEPTH
}

/// Whether the player clears an obstacle by jumping over or sliding under it
pub fn clears_obstacle(player: &PlayerMotion, def: &ObstacleDef) -> bool {
    (def.can_be_jumped_over && player.state().height > def.height)
        || (def.can_be_slid_under && player.is_sliding())
}

/// Vertical spans `[a0, a1)` and `[b0, b1)` intersect
#[inline]
fn spans_overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> bool {
    a0 < b1 && b0 < a1
}

/// Full overlap test for one entity
pub fn overlaps(player: &PlayerMotion, entity: &Entity) -> bool {
    if !footprint_overlaps(player, entity) {
        return false;
    }
    let feet = player.state().height;
    let head = feet + player.state().collider_height;
    match &entity.body {
        Body::Section => false,
        Body::Obstacle(def) => !clears_obstacle(player, def),
        Body::Enemy(enemy) => spans_overlap(
            feet,
            head,
            entity.position.y,
            entity.position.y + enemy.def.height,
        ),
        Body::Collectible(_) => spans_overlap(
            feet,
            head,
            entity.position.y - COLLECTIBLE_RADIUS,
            entity.position.y + COLLECTIBLE_RADIUS,
        ),
    }
}

/// Update contact flags and resolve every contact entered this tick
pub fn resolve_contacts(arena: &mut EntityArena, ctx: &mut ContactContext) -> Vec<ContactOutcome> {
    let mut entered: Vec<EntityId> = Vec::new();
    for entity in arena.iter_mut() {
        if !entity.is_live() {
            continue;
        }
        let now = overlaps(ctx.player, entity);
        if now && !entity.touching {
            entered.push(entity.id);
        }
        entity.touching = now;
    }

    let mut outcomes = Vec::with_capacity(entered.len());
    for id in entered {
        if ctx.health.is_dead() {
            break;
        }
        let Some(entity) = arena.get(id) else {
            continue;
        };
        let outcome = match &entity.body {
            Body::Obstacle(def) => resolve_obstacle(id, *def, arena, ctx),
            Body::Enemy(_) => resolve_enemy(id, arena, ctx),
            Body::Collectible(def) => resolve_collectible(id, def.clone(), arena, ctx),
            Body::Section => continue,
        };
        outcomes.push(outcome);
    }
    outcomes
}

fn hit_player(damage: i32, ctx: &mut ContactContext) -> ContactOutcome {
    let outcome = ctx.health.take_damage(damage);
    match outcome {
        DamageOutcome::Ignored => {}
        DamageOutcome::Damaged => ctx.events.push(GameEvent::PlayerHit { damage }),
        DamageOutcome::Died => {
            ctx.events.push(GameEvent::PlayerHit { damage });
            ctx.events.push(GameEvent::PlayerDied);
        }
    }
    ContactOutcome::PlayerHit { damage, outcome }
}

/// Dash breaks breakable obstacles; anything else hurts
pub fn resolve_obstacle(
    id: EntityId,
    def: ObstacleDef,
    arena: &mut EntityArena,
    ctx: &mut ContactContext,
) -> ContactOutcome {
    if def.breakable && ctx.player.is_dashing() {
        arena.destroy(id, 0.0);
        ctx.events.push(GameEvent::ObstacleBroken { id });
        return ContactOutcome::ObstacleBroken;
    }
    hit_player(def.damage, ctx)
}

/// Dashing hurts the enemy; otherwise the enemy hurts the player
pub fn resolve_enemy(id: EntityId, arena: &mut EntityArena, ctx: &mut ContactContext) -> ContactOutcome {
    let Some(Body::Enemy(enemy)) = arena.get_mut(id).map(|e| &mut e.body) else {
        return ContactOutcome::EnemyHit { killed: false };
    };

    if ctx.player.is_dashing() {
        let killed = enemy.health.take_damage(DASH_DAMAGE) == DamageOutcome::Died;
        if killed {
            arena.destroy(id, ENEMY_DEATH_DELAY);
            ctx.events.push(GameEvent::EnemyDied { id });
        } else {
            ctx.events.push(GameEvent::EnemyHit { id });
        }
        return ContactOutcome::EnemyHit { killed };
    }

    let damage = enemy.def.damage;
    hit_player(damage, ctx)
}

/// Score the pickup, offer its item to the inventory and remove it
pub fn resolve_collectible(
    id: EntityId,
    def: CollectibleDef,
    arena: &mut EntityArena,
    ctx: &mut ContactContext,
) -> ContactOutcome {
    *ctx.score += u64::from(def.value);
    arena.destroy(id, 0.0);
    ctx.events.push(GameEvent::Collected { id, value: def.value });

    let mut stored_item = None;
    if let Some(item_id) = def.item_id {
        match ctx.inventory.add_from_catalog(ctx.catalog, &item_id) {
            Ok(()) => {
                ctx.events.push(GameEvent::ItemStored {
                    item_id: item_id.clone(),
                });
                stored_item = Some(item_id);
            }
            Err(InventoryError::Full { .. }) => {
                ctx.events.push(GameEvent::InventoryFull { item_id });
            }
            Err(err) => log::debug!("Collectible {id}: {err}"),
        }
    }

    ContactOutcome::Collected {
        value: def.value,
        stored_item,
    }
}
