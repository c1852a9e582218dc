//! Focus time: a slow-motion window for picking an item
//!
//! Holding focus slows the simulation and drains a meter in real (unscaled)
//! time. Letting go uses whichever inventory slot was selected. Running the
//! meter dry forces focus off and starts a cooldown, after which the meter
//! refills.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusTuning {
    /// Simulation time scale while focused
    pub time_slow_factor: f32,
    /// Meter capacity in seconds
    pub max_duration: f32,
    pub cooldown: f32,
    /// Meter seconds drained per real second
    pub drain_rate: f32,
}

impl Default for FocusTuning {
    fn default() -> Self {
        Self {
            time_slow_factor: 0.3,
            max_duration: 10.0,
            cooldown: 25.0,
            drain_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusTime {
    pub tuning: FocusTuning,
    active: bool,
    remaining: f32,
    cooldown_remaining: f32,
    selected: Option<usize>,
}

impl FocusTime {
    pub fn new(tuning: FocusTuning) -> Self {
        Self {
            tuning,
            active: false,
            remaining: tuning.max_duration,
            cooldown_remaining: 0.0,
            selected: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown_remaining > 0.0
    }

    /// Meter fill in `[0, 1]`
    pub fn meter(&self) -> f32 {
        if self.tuning.max_duration > 0.0 {
            (self.remaining / self.tuning.max_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Simulation time scale to apply this tick
    pub fn time_scale(&self) -> f32 {
        if self.active {
            self.tuning.time_slow_factor.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Pick the slot to use on release; ignored unless focus is active
    pub fn select(&mut self, slot: usize) {
        if self.active {
            self.selected = Some(slot);
        }
    }

    /// Advance by real time. Returns the slot to use when focus ends on release.
    pub fn update(&mut self, held: bool, real_dt: f32, events: &mut Vec<GameEvent>) -> Option<usize> {
        let mut used = None;

        if held && !self.active && !self.is_cooling_down() && self.remaining > 0.0 {
            self.active = true;
            self.selected = None;
            events.push(GameEvent::FocusStarted);
        } else if !held && self.active {
            used = self.deactivate(events);
        }

        if self.active {
            self.remaining -= self.tuning.drain_rate * real_dt;
            if self.remaining <= 0.0 {
                self.remaining = 0.0;
                used = self.deactivate(events);
                self.cooldown_remaining = self.tuning.cooldown;
                log::debug!("Focus exhausted, cooling down for {}s", self.tuning.cooldown);
            }
        } else if self.is_cooling_down() {
            self.cooldown_remaining -= real_dt;
            if self.cooldown_remaining <= 0.0 {
                self.cooldown_remaining = 0.0;
                self.remaining = self.tuning.max_duration;
            }
        }

        used
    }

    fn deactivate(&mut self, events: &mut Vec<GameEvent>) -> Option<usize> {
        self.active = false;
        events.push(GameEvent::FocusEnded);
        self.selected.take()
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.tuning);
    }
}
