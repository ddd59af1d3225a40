use std::f32::consts::{PI, TAU};

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("fall trigger window {min}..{max} must lie within 0..1 and be ordered")]
    TriggerWindow { min: f32, max: f32 },
    #[error("{field} bounds {lower}..{upper} are out of order")]
    LandingWindow { field: &'static str, lower: f32, upper: f32 },
    #[error("threshold {field} must be positive, got {value}")]
    Threshold { field: &'static str, value: i32 },
    #[error("path gait thresholds walk<={walk} run<={run} are out of order")]
    PathGaits { walk: i32, run: i32 },
}

/// Remaining-drop window that switches a fall from its loop to landing:
/// `clamp(factor * total_drop + bias, lower, upper)`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct LandingWindow {
    pub bias: f32,
    pub lower: f32,
    pub upper: f32,
}

impl LandingWindow {
    pub fn threshold(&self, factor: f32, total_drop: f32) -> f32 {
        (factor * total_drop + self.bias).clamp(self.lower, self.upper)
    }
}

/// Tunables for the movement controller. Distances are world units, times
/// seconds, heights elevation levels.
#[derive(Clone, Debug, Deserialize, PartialEq, Resource, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    // ===== Gait =====
    /// Walk speed used when no walk clip can be measured.
    pub fallback_walk_speed: f32,
    pub run_multiplier: f32,
    pub drunk_walk_multiplier: f32,
    pub drunk_run_multiplier: f32,
    /// Continuous forward running required before sprint engages.
    pub sprint_delay: f32,
    pub sprint_multiplier: f32,
    /// Clips shorter than this count as missing.
    pub min_clip_duration: f32,

    // ===== Steps =====
    pub fall_threshold: i32,
    pub hard_landing_threshold: i32,
    pub fall_trigger_min: f32,
    pub fall_trigger_max: f32,

    // ===== Phases =====
    pub start_blend_lead: f32,
    pub stop_blend_lead: f32,
    /// Fraction of the stop clip during which the token still glides.
    pub stop_travel_portion: f32,
    pub start_fade: f32,
    pub loop_fade: f32,
    pub stop_fade: f32,
    pub idle_fade: f32,

    // ===== Fall =====
    pub fall_vertical_speed: f32,
    /// Drops beyond this many world units lengthen the fall sub-linearly.
    pub fall_attenuation_knee: f32,
    pub fall_min_duration: f32,
    pub fall_max_duration: f32,
    pub fall_fade: f32,
    pub landing_drop_factor: f32,
    pub landing_normal: LandingWindow,
    pub landing_hard: LandingWindow,

    // ===== Orientation =====
    /// Radians per second while a rotate key is held.
    pub angular_speed: f32,
    /// Radians per second while homing toward a path goal.
    pub path_turn_speed: f32,

    // ===== Path =====
    pub path_tolerance_fraction: f32,
    pub path_tolerance_floor: f32,
    pub path_walk_max_tiles: i32,
    pub path_run_max_tiles: i32,

    // ===== Tick =====
    pub max_tick_delta: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            fallback_walk_speed: 1.2,
            run_multiplier: 2.0,
            drunk_walk_multiplier: 0.75,
            drunk_run_multiplier: 1.5,
            sprint_delay: 3.0,
            sprint_multiplier: 1.15,
            min_clip_duration: 0.01,

            fall_threshold: 3,
            hard_landing_threshold: 8,
            fall_trigger_min: 0.35,
            fall_trigger_max: 0.98,

            start_blend_lead: 0.15,
            stop_blend_lead: 0.2,
            stop_travel_portion: 0.35,
            start_fade: 0.15,
            loop_fade: 0.2,
            stop_fade: 0.15,
            idle_fade: 0.25,

            fall_vertical_speed: 6.0,
            fall_attenuation_knee: 2.0,
            fall_min_duration: 0.2,
            fall_max_duration: 1.2,
            fall_fade: 0.1,
            landing_drop_factor: 0.05,
            landing_normal: LandingWindow { bias: 0.1, lower: 0.1, upper: 0.35 },
            landing_hard: LandingWindow { bias: 0.15, lower: 0.15, upper: 0.5 },

            angular_speed: PI,
            path_turn_speed: TAU,

            path_tolerance_fraction: 0.1,
            path_tolerance_floor: 0.05,
            path_walk_max_tiles: 3,
            path_run_max_tiles: 6,

            max_tick_delta: 0.1,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0. { Ok(()) }
    else { Err(ConfigError::NotPositive { field, value }) }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0. { Ok(()) }
    else { Err(ConfigError::Negative { field, value }) }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fallback_walk_speed", self.fallback_walk_speed)?;
        positive("run_multiplier", self.run_multiplier)?;
        positive("drunk_walk_multiplier", self.drunk_walk_multiplier)?;
        positive("drunk_run_multiplier", self.drunk_run_multiplier)?;
        positive("sprint_multiplier", self.sprint_multiplier)?;
        positive("fall_vertical_speed", self.fall_vertical_speed)?;
        positive("angular_speed", self.angular_speed)?;
        positive("path_turn_speed", self.path_turn_speed)?;
        positive("max_tick_delta", self.max_tick_delta)?;
        positive("fall_max_duration", self.fall_max_duration)?;

        for (field, value) in [
            ("sprint_delay", self.sprint_delay),
            ("min_clip_duration", self.min_clip_duration),
            ("start_blend_lead", self.start_blend_lead),
            ("stop_blend_lead", self.stop_blend_lead),
            ("stop_travel_portion", self.stop_travel_portion),
            ("start_fade", self.start_fade),
            ("loop_fade", self.loop_fade),
            ("stop_fade", self.stop_fade),
            ("idle_fade", self.idle_fade),
            ("fall_attenuation_knee", self.fall_attenuation_knee),
            ("fall_min_duration", self.fall_min_duration),
            ("fall_fade", self.fall_fade),
            ("landing_drop_factor", self.landing_drop_factor),
            ("path_tolerance_fraction", self.path_tolerance_fraction),
            ("path_tolerance_floor", self.path_tolerance_floor),
        ] {
            non_negative(field, value)?;
        }

        let (min, max) = (self.fall_trigger_min, self.fall_trigger_max);
        if !(0. ..=1.).contains(&min) || !(0. ..=1.).contains(&max) || min > max {
            return Err(ConfigError::TriggerWindow { min, max });
        }
        for (field, window) in [("landing_normal", self.landing_normal), ("landing_hard", self.landing_hard)] {
            non_negative(field, window.bias)?;
            if !(window.lower.is_finite() && window.upper.is_finite()) || window.lower > window.upper {
                return Err(ConfigError::LandingWindow { field, lower: window.lower, upper: window.upper });
            }
        }
        if self.fall_min_duration > self.fall_max_duration {
            return Err(ConfigError::LandingWindow {
                field: "fall_duration",
                lower: self.fall_min_duration,
                upper: self.fall_max_duration,
            });
        }
        for (field, value) in [("fall_threshold", self.fall_threshold), ("hard_landing_threshold", self.hard_landing_threshold)] {
            if value <= 0 { return Err(ConfigError::Threshold { field, value }); }
        }
        if self.path_walk_max_tiles < 0 || self.path_walk_max_tiles > self.path_run_max_tiles {
            return Err(ConfigError::PathGaits { walk: self.path_walk_max_tiles, run: self.path_run_max_tiles });
        }
        Ok(())
    }

    /// Arrival tolerance for a path goal on tiles of `tile_size`.
    pub fn path_tolerance(&self, tile_size: f32) -> f32 {
        (self.path_tolerance_fraction * tile_size).max(self.path_tolerance_floor)
    }

    /// Clamp a frame delta; non-finite or negative deltas become zero.
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0. { return 0.; }
        dt.min(self.max_tick_delta)
    }
}
