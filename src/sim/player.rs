//! Player motion controller
//!
//! Movement modes form a small state machine:
//!
//! ```text
//!            jump                    ground contact, v < 0
//! Grounded ---------> Airborne ---------------------------> Grounded
//!    |  ^
//!    |  | slide timer expires
//!    v  |
//!  Sliding
//! ```
//!
//! Dash is an overlay that can be active in any mode. Gravity, lane easing
//! and forward displacement run every tick regardless of mode.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::GameEvent;

/// Player tuning constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Base forward speed (units/s)
    pub forward_speed: f32,
    /// Jump apex height factor; take-off velocity is `sqrt(2 * jump_force * gravity)`
    pub jump_force: f32,
    /// Gravity magnitude (units/s², applied downward)
    pub gravity: f32,
    /// Lateral speed while changing lanes (units/s)
    pub lane_change_speed: f32,
    pub slide_duration: f32,
    /// Lateral distance between lane centres
    pub lane_distance: f32,
    /// Lanes span `-max_lane_index..=max_lane_index`
    pub max_lane_index: i32,
    pub dash_duration: f32,
    pub dash_multiplier: f32,
    /// Vertical velocity held while standing so the ground probe keeps hitting
    pub ground_rest_velocity: f32,
    pub ground_check_radius: f32,
    /// Full collider height; halved while sliding
    pub standing_height: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            forward_speed: 10.0,
            jump_force: 10.0,
            gravity: 20.0,
            lane_change_speed: 5.0,
            slide_duration: 1.0,
            lane_distance: 3.0,
            max_lane_index: 1,
            dash_duration: 2.0,
            dash_multiplier: 1.5,
            ground_rest_velocity: -2.0,
            ground_check_radius: 0.2,
            standing_height: 2.0,
        }
    }
}

/// Answers "is there solid ground within `radius` below `feet`"
pub trait GroundProbe {
    fn is_grounded(&self, feet: Vec3, radius: f32) -> bool;
}

/// Infinite floor plane at height 0
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround;

impl GroundProbe for FlatGround {
    fn is_grounded(&self, feet: Vec3, radius: f32) -> bool {
        feet.y <= radius
    }
}

/// Exclusive movement modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    Grounded,
    Airborne,
    Sliding,
}

/// Discrete movement requests for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionIntents {
    pub jump: bool,
    pub slide: bool,
    pub lane_left: bool,
    pub lane_right: bool,
    pub dash: bool,
}

/// Temporary forward-speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBoost {
    pub multiplier: f32,
    pub remaining: f32,
}

/// Live player kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub distance_traveled: f32,
    /// Current lateral (x) position
    pub lateral_position: f32,
    /// Height of the feet above the floor
    pub height: f32,
    pub lane_index: i32,
    pub vertical_velocity: f32,
    pub mode: MovementMode,
    pub grounded: bool,
    pub dash_active: bool,
    pub dash_remaining: f32,
    pub slide_remaining: f32,
    pub collider_height: f32,
    pub base_speed: f32,
    pub speed_boosts: Vec<SpeedBoost>,
}

impl PlayerState {
    fn new(tuning: &PlayerTuning) -> Self {
        Self {
            distance_traveled: 0.0,
            lateral_position: 0.0,
            height: 0.0,
            lane_index: 0,
            vertical_velocity: 0.0,
            mode: MovementMode::Grounded,
            grounded: true,
            dash_active: false,
            dash_remaining: 0.0,
            slide_remaining: 0.0,
            collider_height: tuning.standing_height,
            base_speed: tuning.forward_speed,
            speed_boosts: Vec::new(),
        }
    }
}

/// Drives [`PlayerState`] from intents, gravity and timers
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMotion {
    pub tuning: PlayerTuning,
    state: PlayerState,
}

impl PlayerMotion {
    pub fn new(tuning: PlayerTuning) -> Self {
        let state = PlayerState::new(&tuning);
        Self { tuning, state }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Back to the start line with base speed and no timers running
    pub fn reset(&mut self) {
        self.state = PlayerState::new(&self.tuning);
    }

    /// World position of the player's feet
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.state.lateral_position,
            self.state.height,
            self.state.distance_traveled,
        )
    }

    pub fn target_lane_position(&self) -> f32 {
        self.state.lane_index as f32 * self.tuning.lane_distance
    }

    pub fn is_dashing(&self) -> bool {
        self.state.dash_active
    }

    pub fn is_sliding(&self) -> bool {
        self.state.mode == MovementMode::Sliding
    }

    /// Effective forward speed: base scaled by dash and every active boost
    pub fn forward_speed(&self) -> f32 {
        let dash = if self.state.dash_active {
            self.tuning.dash_multiplier
        } else {
            1.0
        };
        let boosts: f32 = self.state.speed_boosts.iter().map(|b| b.multiplier).product();
        self.state.base_speed * dash * boosts
    }

    /// Advance one tick
    pub fn step(
        &mut self,
        intents: &MotionIntents,
        dt: f32,
        probe: &impl GroundProbe,
        events: &mut Vec<GameEvent>,
    ) {
        self.check_ground(probe, events);
        self.handle_intents(intents, events);

        self.state.vertical_velocity -= self.tuning.gravity * dt;

        // Rate-limited approach to the lane centre
        let target = self.target_lane_position();
        let max_step = self.tuning.lane_change_speed * dt;
        let delta = (target - self.state.lateral_position).clamp(-max_step, max_step);
        self.state.lateral_position += delta;

        self.update_slide(dt, events);
        self.update_dash(dt, events);
        self.update_boosts(dt);

        self.state.height = (self.state.height + self.state.vertical_velocity * dt).max(0.0);
        self.state.distance_traveled += self.forward_speed() * dt;
    }

    fn check_ground(&mut self, probe: &impl GroundProbe, events: &mut Vec<GameEvent>) {
        let grounded = probe.is_grounded(self.position(), self.tuning.ground_check_radius);
        self.state.grounded = grounded;

        if grounded && self.state.vertical_velocity < 0.0 {
            self.state.vertical_velocity = self.tuning.ground_rest_velocity;
            if self.state.mode == MovementMode::Airborne {
                self.state.mode = MovementMode::Grounded;
                events.push(GameEvent::Landed);
            }
        } else if !grounded && self.state.mode == MovementMode::Grounded {
            self.state.mode = MovementMode::Airborne;
        }
    }

    fn handle_intents(&mut self, intents: &MotionIntents, events: &mut Vec<GameEvent>) {
        let can_act = self.state.grounded && self.state.mode == MovementMode::Grounded;

        if intents.jump && can_act {
            self.jump(events);
        } else if intents.slide && can_act {
            self.start_slide(events);
        }

        if intents.lane_left {
            self.change_lane(-1);
        } else if intents.lane_right {
            self.change_lane(1);
        }

        if intents.dash && !self.state.dash_active {
            self.start_dash(events);
        }
    }

    fn jump(&mut self, events: &mut Vec<GameEvent>) {
        self.state.vertical_velocity = (2.0 * self.tuning.jump_force * self.tuning.gravity).sqrt();
        self.state.mode = MovementMode::Airborne;
        log::debug!("Jump: v={}", self.state.vertical_velocity);
        events.push(GameEvent::Jumped);
    }

    fn start_slide(&mut self, events: &mut Vec<GameEvent>) {
        self.state.mode = MovementMode::Sliding;
        self.state.slide_remaining = self.tuning.slide_duration;
        self.state.collider_height = self.tuning.standing_height / 2.0;
        events.push(GameEvent::SlideStarted);
    }

    fn end_slide(&mut self, events: &mut Vec<GameEvent>) {
        self.state.mode = MovementMode::Grounded;
        self.state.slide_remaining = 0.0;
        self.state.collider_height = self.tuning.standing_height;
        events.push(GameEvent::SlideEnded);
    }

    fn update_slide(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if self.state.mode == MovementMode::Sliding {
            self.state.slide_remaining -= dt;
            if self.state.slide_remaining <= 0.0 {
                self.end_slide(events);
            }
        }
    }

    /// Request a move of `direction` lanes; clamped to the corridor.
    /// Returns false when already at the boundary.
    pub fn change_lane(&mut self, direction: i32) -> bool {
        let max = self.tuning.max_lane_index.max(0);
        let target = self.state.lane_index.saturating_add(direction).clamp(-max, max);
        if target == self.state.lane_index {
            return false;
        }
        log::debug!("Lane {} -> {}", self.state.lane_index, target);
        self.state.lane_index = target;
        true
    }

    /// Begin a dash; no-op while one is running
    pub fn start_dash(&mut self, events: &mut Vec<GameEvent>) {
        if self.state.dash_active {
            return;
        }
        self.state.dash_active = true;
        self.state.dash_remaining = self.tuning.dash_duration;
        events.push(GameEvent::DashStarted);
    }

    /// Stop the dash and drop its speed factor
    pub fn end_dash(&mut self, events: &mut Vec<GameEvent>) {
        if !self.state.dash_active {
            return;
        }
        self.state.dash_active = false;
        self.state.dash_remaining = 0.0;
        events.push(GameEvent::DashEnded);
    }

    fn update_dash(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if self.state.dash_active {
            self.state.dash_remaining -= dt;
            if self.state.dash_remaining <= 0.0 {
                self.end_dash(events);
            }
        }
    }

    /// Scale forward speed by `multiplier` for `duration` seconds
    pub fn apply_speed_boost(&mut self, multiplier: f32, duration: f32) {
        if !multiplier.is_finite() || multiplier <= 0.0 || duration <= 0.0 {
            log::warn!("Ignoring speed boost x{multiplier} for {duration}s");
            return;
        }
        self.state.speed_boosts.push(SpeedBoost {
            multiplier,
            remaining: duration,
        });
    }

    fn update_boosts(&mut self, dt: f32) {
        for boost in &mut self.state.speed_boosts {
            boost.remaining -= dt;
        }
        self.state.speed_boosts.retain(|b| b.remaining > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn run(motion: &mut PlayerMotion, intents: MotionIntents, ticks: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        motion.step(&intents, SIM_DT, &FlatGround, &mut events);
        for _ in 1..ticks {
            motion.step(&MotionIntents::default(), SIM_DT, &FlatGround, &mut events);
        }
        events
    }

    #[test]
    fn test_jump_and_land() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        run(&mut motion, MotionIntents::default(), 10);

        let jump = MotionIntents {
            jump: true,
            ..Default::default()
        };
        let events = run(&mut motion, jump, 1);
        assert_eq!(events, vec![GameEvent::Jumped]);
        assert_eq!(motion.state().mode, MovementMode::Airborne);
        assert!(motion.state().vertical_velocity > 0.0);

        // sqrt(2 * 10 * 20) = 20 units/s take-off; airtime ~2s
        let events = run(&mut motion, MotionIntents::default(), 300);
        assert!(events.contains(&GameEvent::Landed));
        assert_eq!(motion.state().mode, MovementMode::Grounded);
        assert_eq!(motion.state().height, 0.0);
        assert!(motion.state().vertical_velocity < 0.0);
    }

    #[test]
    fn test_no_jump_while_sliding() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        run(
            &mut motion,
            MotionIntents {
                slide: true,
                ..Default::default()
            },
            1,
        );
        assert!(motion.is_sliding());
        assert_eq!(motion.state().collider_height, 1.0);

        run(
            &mut motion,
            MotionIntents {
                jump: true,
                ..Default::default()
            },
            1,
        );
        assert!(motion.is_sliding());
        assert_eq!(motion.state().height, 0.0);
    }

    #[test]
    fn test_slide_expires() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        let slide = MotionIntents {
            slide: true,
            ..Default::default()
        };
        let events = run(&mut motion, slide, 125);
        assert!(events.contains(&GameEvent::SlideEnded));
        assert_eq!(motion.state().mode, MovementMode::Grounded);
        assert_eq!(motion.state().collider_height, 2.0);
    }

    #[test]
    fn test_lane_eases_toward_target() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        let right = MotionIntents {
            lane_right: true,
            ..Default::default()
        };
        run(&mut motion, right, 1);
        assert_eq!(motion.state().lane_index, 1);
        // 5 units/s: a 3-unit lane change is not instant
        assert!(motion.state().lateral_position > 0.0);
        assert!(motion.state().lateral_position < 3.0);

        run(&mut motion, MotionIntents::default(), 120);
        assert!((motion.state().lateral_position - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_lane_clamps_at_boundary() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        assert!(motion.change_lane(1));
        assert!(!motion.change_lane(1));
        assert_eq!(motion.state().lane_index, 1);
        assert!(motion.change_lane(-1));
        assert!(motion.change_lane(-1));
        assert!(!motion.change_lane(-1));
        assert_eq!(motion.state().lane_index, -1);
    }

    #[test]
    fn test_extreme_lane_requests_clamp() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        assert!(motion.change_lane(i32::MAX));
        assert_eq!(motion.state().lane_index, 1);
        assert!(!motion.change_lane(i32::MAX));
        assert!(motion.change_lane(i32::MIN));
        assert_eq!(motion.state().lane_index, -1);
    }

    #[test]
    fn test_dash_round_trips_speed() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        let before = motion.forward_speed();
        let mut events = Vec::new();
        for _ in 0..5 {
            motion.start_dash(&mut events);
            assert!((motion.forward_speed() - before * 1.5).abs() < 1e-5);
            motion.end_dash(&mut events);
        }
        assert_eq!(motion.forward_speed(), before);
    }

    #[test]
    fn test_dash_expires_after_duration() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        let dash = MotionIntents {
            dash: true,
            ..Default::default()
        };
        let events = run(&mut motion, dash, 250);
        assert_eq!(events.first(), Some(&GameEvent::DashStarted));
        assert!(events.contains(&GameEvent::DashEnded));
        assert!(!motion.is_dashing());
        assert_eq!(motion.forward_speed(), 10.0);
    }

    #[test]
    fn test_speed_boost_restores_exactly() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        motion.apply_speed_boost(1.7, 0.5);
        let mut events = Vec::new();
        motion.start_dash(&mut events);
        assert!((motion.forward_speed() - 10.0 * 1.5 * 1.7).abs() < 1e-4);
        run(&mut motion, MotionIntents::default(), 61);
        motion.end_dash(&mut events);
        assert!(motion.state().speed_boosts.is_empty());
        assert_eq!(motion.forward_speed(), 10.0);
    }

    #[test]
    fn test_forward_motion_in_every_mode() {
        let mut motion = PlayerMotion::new(PlayerTuning::default());
        run(&mut motion, MotionIntents::default(), 120);
        let grounded = motion.state().distance_traveled;
        assert!((grounded - 10.0).abs() < 0.01);

        run(
            &mut motion,
            MotionIntents {
                jump: true,
                ..Default::default()
            },
            60,
        );
        assert!(motion.state().distance_traveled > grounded + 4.9);
    }

    proptest::proptest! {
        #[test]
        fn prop_lane_index_stays_in_range(moves in proptest::collection::vec(-3i32..=3, 0..64)) {
            let mut motion = PlayerMotion::new(PlayerTuning::default());
            for direction in moves {
                motion.change_lane(direction);
                let lane = motion.state().lane_index;
                proptest::prop_assert!((-1..=1).contains(&lane));
            }
        }
    }
}
