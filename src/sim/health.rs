//! Actor health
//!
//! Shared by the player and by enemies. The player gets an invulnerability
//! window after each hit; enemies are built with a zero-length window.

use serde::{Deserialize, Serialize};

/// Health tuning for the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTuning {
    pub max_health: i32,
    /// Seconds of damage immunity after a hit
    pub invulnerability_duration: f32,
}

impl Default for HealthTuning {
    fn default() -> Self {
        Self {
            max_health: 3,
            invulnerability_duration: 1.5,
        }
    }
}

/// What a call to [`Health::take_damage`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable or already dead
    Ignored,
    /// Health dropped but the actor survives
    Damaged,
    /// Health reached zero; fired exactly once
    Died,
}

/// Numeric health with an invulnerability countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
    invulnerable_remaining: f32,
    invulnerability_duration: f32,
    dead: bool,
}

impl Health {
    /// Full health; `invulnerability_duration` of zero disables the window
    pub fn new(max: i32, invulnerability_duration: f32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            invulnerable_remaining: 0.0,
            invulnerability_duration: invulnerability_duration.max(0.0),
            dead: false,
        }
    }

    pub fn from_tuning(tuning: &HealthTuning) -> Self {
        Self::new(tuning.max_health, tuning.invulnerability_duration)
    }

    /// Enemy health: no invulnerability window
    pub fn enemy(max: i32) -> Self {
        Self::new(max, 0.0)
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_remaining > 0.0
    }

    pub fn invulnerable_remaining(&self) -> f32 {
        self.invulnerable_remaining
    }

    /// Apply damage unless invulnerable; negative amounts are treated as zero
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }

        self.current = self.current.saturating_sub(amount.max(0)).clamp(0, self.max);
        self.invulnerable_remaining = self.invulnerability_duration;

        if self.current == 0 {
            self.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Restore health up to max; never revives. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.dead {
            return 0;
        }
        let before = self.current;
        self.current = self.current.saturating_add(amount.max(0)).min(self.max);
        self.current - before
    }

    /// Count the invulnerability window down
    pub fn tick(&mut self, dt: f32) {
        if self.invulnerable_remaining > 0.0 {
            self.invulnerable_remaining = (self.invulnerable_remaining - dt).max(0.0);
        }
    }

    /// Back to full health for a new run
    pub fn restore(&mut self) {
        self.current = self.max;
        self.invulnerable_remaining = 0.0;
        self.dead = false;
    }
}
