//! Forward-axis coordinate model
//!
//! Everything the generator places lives on a single travel axis (world `z`).
//! The timeline cuts that axis into fixed-length sections and answers the
//! distance questions the spacing rules need.

use serde::{Deserialize, Serialize};

/// 1-D model of the travel axis, split into equal sections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialTimeline {
    section_length: f32,
}

impl SpatialTimeline {
    /// Smallest section length accepted; shorter values are clamped up
    pub const MIN_SECTION_LENGTH: f32 = 1.0;

    pub fn new(section_length: f32) -> Self {
        let section_length = if section_length.is_finite() {
            section_length.max(Self::MIN_SECTION_LENGTH)
        } else {
            Self::MIN_SECTION_LENGTH
        };
        Self { section_length }
    }

    #[inline]
    pub fn section_length(&self) -> f32 {
        self.section_length
    }

    /// Section containing `distance` (floor division, negative before the origin)
    #[inline]
    pub fn section_index(&self, distance: f32) -> i64 {
        (distance / self.section_length).floor() as i64
    }

    /// Distance at which section `index` starts
    #[inline]
    pub fn section_start(&self, index: i64) -> f32 {
        index as f32 * self.section_length
    }

    /// Distance at which section `index` ends (exclusive)
    #[inline]
    pub fn section_end(&self, index: i64) -> f32 {
        self.section_start(index) + self.section_length
    }

    /// First position a new placement may occupy given the previous one
    #[inline]
    pub fn earliest_after(&self, last_placed: f32, min_spacing: f32) -> f32 {
        last_placed + min_spacing.max(0.0)
    }

    /// Whether `candidate` keeps at least `min_spacing` from `last_placed`
    #[inline]
    pub fn is_spaced(&self, last_placed: Option<f32>, candidate: f32, min_spacing: f32) -> bool {
        match last_placed {
            Some(last) => candidate - last >= min_spacing.max(0.0),
            None => true,
        }
    }
}

impl Default for SpatialTimeline {
    fn default() -> Self {
        Self::new(50.0)
    }
}
