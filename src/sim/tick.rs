//! Fixed timestep simulation tick
//!
//! One call advances a run by one frame. Focus time reads the real frame
//! time; everything else runs on the scaled time it produces.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{ContactContext, resolve_contacts};
use super::entities::{Body, Entity};
use super::player::{FlatGround, GroundProbe, MotionIntents, MovementMode};
use super::state::{GameEvent, GamePhase, GameState};

/// How far ahead the autopilot looks for hazards
const AUTOPILOT_LOOKAHEAD: f32 = 12.0;
/// Distance at which the autopilot commits to a jump or slide
const AUTOPILOT_REACT_DISTANCE: f32 = 4.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub jump: bool,
    pub slide: bool,
    pub lane_left: bool,
    pub lane_right: bool,
    pub dash: bool,
    /// Pause toggle
    pub pause: bool,
    /// Focus button is held down
    pub focus_held: bool,
    /// Inventory slot picked this tick. Selects while focused, uses otherwise.
    pub select_item: Option<usize>,
    /// Let the AI play (demo mode and soak runs)
    pub autopilot: bool,
}

/// Classified pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Up,
    Down,
    Left,
    Right,
    /// Movement below the swipe threshold
    Tap,
}

impl Swipe {
    /// Classify a drag by its dominant axis. `delta` is in screen space, y down.
    pub fn classify(delta: Vec2, min_distance: f32) -> Swipe {
        if delta.length() < min_distance {
            return Swipe::Tap;
        }
        if delta.x.abs() > delta.y.abs() {
            if delta.x < 0.0 { Swipe::Left } else { Swipe::Right }
        } else if delta.y < 0.0 {
            Swipe::Up
        } else {
            Swipe::Down
        }
    }
}

impl TickInput {
    /// Movement requests carried by this input
    pub fn intents(&self) -> MotionIntents {
        MotionIntents {
            jump: self.jump,
            slide: self.slide,
            lane_left: self.lane_left,
            lane_right: self.lane_right,
            dash: self.dash,
        }
    }

    /// Map a gesture onto the movement events
    pub fn apply_swipe(&mut self, swipe: Swipe) {
        match swipe {
            Swipe::Up => self.jump = true,
            Swipe::Down => self.slide = true,
            Swipe::Left => self.lane_left = true,
            Swipe::Right => self.lane_right = true,
            Swipe::Tap => self.dash = true,
        }
    }
}

/// Advance the game state by one frame on flat ground
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    tick_with_probe(state, input, dt, &FlatGround);
}

/// Advance the game state by one frame against a custom ground probe
pub fn tick_with_probe(state: &mut GameState, input: &TickInput, dt: f32, probe: &impl GroundProbe) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }

    // Focus drains in real time
    let released = state.focus.update(input.focus_held, dt, &mut state.events);
    if let Some(slot) = input.select_item {
        if state.focus.is_active() {
            state.focus.select(slot);
        } else {
            state.use_item(slot);
        }
    }
    if let Some(slot) = released {
        state.use_item(slot);
    }
    let dt = dt * state.focus.time_scale();

    state.player.step(&input.intents(), dt, probe, &mut state.events);

    let distance = state.distance();
    state.generator.advance(distance, &mut state.arena);
    state.record_placements();

    let player_pos = state.player.position();
    state.arena.update_enemies(dt, player_pos, &mut state.events);

    let mut ctx = ContactContext {
        player: &state.player,
        health: &mut state.health,
        inventory: &mut state.inventory,
        catalog: &state.tuning.catalog,
        score: &mut state.score,
        events: &mut state.events,
    };
    resolve_contacts(&mut state.arena, &mut ctx);

    state.health.tick(dt);
    state.arena.flush(dt);
    state.time_ticks += 1;

    check_phase(state);
}

fn check_phase(state: &mut GameState) {
    if state.health.is_dead() {
        state.phase = GamePhase::GameOver;
        state.generator.stop();
        state.events.push(GameEvent::GameOver);
        log::info!(
            "Game over: distance={:.1} score={} ticks={}",
            state.distance(),
            state.score,
            state.time_ticks
        );
        return;
    }

    let session = state.tuning.session;
    if !session.endless_mode && state.distance() >= session.level_distance {
        state.phase = GamePhase::LevelComplete;
        state.generator.stop();
        state.events.push(GameEvent::LevelComplete);
        log::info!("Level complete: score={}", state.score);
    }
}

/// Lane an x position is closest to
fn lane_of(x: f32, lane_distance: f32) -> i32 {
    if lane_distance > 0.0 {
        (x / lane_distance).round() as i32
    } else {
        0
    }
}

/// Nearest live entity ahead in `lane` within `range` matching `filter`
fn nearest_ahead<'a>(
    state: &'a GameState,
    lane: i32,
    range: f32,
    filter: impl Fn(&Body) -> bool,
) -> Option<(&'a Entity, f32)> {
    let pos = state.player.position();
    let lane_distance = state.player.tuning.lane_distance;
    state
        .arena
        .iter()
        .filter(|e| e.is_live() && filter(&e.body))
        .filter(|e| lane_of(e.position.x, lane_distance) == lane)
        .map(|e| (e, e.position.z - pos.z))
        .filter(|&(_, dz)| dz > -1.0 && dz < range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn is_hazard(body: &Body) -> bool {
    matches!(body, Body::Obstacle(_) | Body::Enemy(_))
}

/// Demo AI: jump or slide what can be cleared, change lanes around the rest,
/// and drift toward pickups when the way is clear.
fn autopilot(state: &GameState, input: &mut TickInput) {
    let player = &state.player;
    let lane = player.state().lane_index;
    let max_lane = player.tuning.max_lane_index.max(0);
    let settled = lane_of(player.state().lateral_position, player.tuning.lane_distance) == lane;
    let can_act = player.state().mode == MovementMode::Grounded;

    let lane_clear = |l: i32| nearest_ahead(state, l, AUTOPILOT_LOOKAHEAD, is_hazard).is_none();
    let steer_to = |target: i32, input: &mut TickInput| {
        if target < lane {
            input.lane_left = true;
        } else if target > lane {
            input.lane_right = true;
        }
    };
    let neighbours = [lane - 1, lane + 1];

    if let Some((hazard, dz)) = nearest_ahead(state, lane, AUTOPILOT_LOOKAHEAD, is_hazard) {
        match &hazard.body {
            Body::Obstacle(def) if def.can_be_jumped_over => {
                if can_act && dz < AUTOPILOT_REACT_DISTANCE {
                    input.jump = true;
                }
            }
            Body::Obstacle(def) if def.can_be_slid_under => {
                if can_act && dz < AUTOPILOT_REACT_DISTANCE {
                    input.slide = true;
                }
            }
            body => {
                let escape = neighbours
                    .into_iter()
                    .filter(|l| (-max_lane..=max_lane).contains(l))
                    .find(|&l| lane_clear(l));
                match escape {
                    Some(target) if settled => steer_to(target, input),
                    Some(_) => {}
                    None => {
                        let breakable = match body {
                            Body::Obstacle(def) => def.breakable,
                            _ => true,
                        };
                        if breakable && dz < AUTOPILOT_REACT_DISTANCE && !player.is_dashing() {
                            input.dash = true;
                        }
                    }
                }
            }
        }
        return;
    }

    if !settled {
        return;
    }
    let is_pickup = |body: &Body| matches!(body, Body::Collectible(_));
    if nearest_ahead(state, lane, AUTOPILOT_LOOKAHEAD, is_pickup).is_some() {
        return;
    }
    if let Some(target) = neighbours
        .into_iter()
        .filter(|l| (-max_lane..=max_lane).contains(l))
        .find(|&l| lane_clear(l) && nearest_ahead(state, l, AUTOPILOT_LOOKAHEAD, is_pickup).is_some())
    {
        steer_to(target, input);
    }
}
