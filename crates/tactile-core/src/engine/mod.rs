//! Animation engine capability
//!
//! The marquee never talks to a concrete animation runtime. It asks an
//! [`AnimationEngine`] for a [`Timeline`] and drives it through the trait.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing curves
//! - `timing` - Progress, interpolation and snapping helpers
//!
//! ## L3 Molecular Layer
//! - `timeline` - Frame-driven timeline built from timed motions

// L4 Atomic Layer
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod timeline;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use easing::EasingType;
pub use timeline::{FrameTimeline, Motion};

/// How many times a timeline plays after its first pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Repeat forever (`-1` in config files)
    #[default]
    Infinite,
    /// Repeat a fixed number of extra times
    Count(u32),
}

impl Repeat {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Repeat::Infinite)
    }
}

impl Serialize for Repeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Repeat::Infinite => serializer.serialize_i64(-1),
            Repeat::Count(n) => serializer.serialize_i64(i64::from(*n)),
        }
    }
}

impl<'de> Deserialize<'de> for Repeat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        match value {
            -1 => Ok(Repeat::Infinite),
            n if n >= 0 => u32::try_from(n)
                .map(Repeat::Count)
                .map_err(|_| serde::de::Error::custom(format!("repeat count {} is too large", n))),
            n => Err(serde::de::Error::custom(format!(
                "repeat must be -1 (forever) or a non-negative count, got {}",
                n
            ))),
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repeat::Infinite => write!(f, "forever"),
            Repeat::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Options for a new timeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineOptions {
    pub repeat: Repeat,
    pub paused: bool,
}

/// Boundary notifications produced while advancing a timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEvent {
    /// Playing in reverse reached the start. `raw_time` is the unclamped
    /// total time the step would have landed on.
    ReverseComplete { raw_time: f64 },
    /// Playing forward reached the end of the last repeat
    Complete,
}

/// A schedulable, rate-controlled timeline of scalar motions.
///
/// Each target carries one animated scalar channel.
pub trait Timeline {
    /// Append a motion starting at the absolute offset `at` (seconds)
    fn add(&mut self, motion: Motion, at: f64);

    /// Register a named marker at `at` seconds
    fn add_label(&mut self, name: &str, at: f64);

    /// Time of a named marker
    fn label_time(&self, name: &str) -> Option<f64>;

    /// Length of a single iteration in seconds
    fn duration(&self) -> f64;

    /// Length of all iterations; infinite for [`Repeat::Infinite`]
    fn total_duration(&self) -> f64;

    /// Signed playback rate
    fn time_scale(&self) -> f64;

    fn set_time_scale(&mut self, scale: f64);

    /// Playhead position inside the current iteration
    fn time(&self) -> f64;

    /// Playhead position across all iterations
    fn total_time(&self) -> f64;

    /// Unclamped total time of the latest step
    fn raw_time(&self) -> f64;

    /// Move the playhead, across iterations
    fn set_total_time(&mut self, time: f64);

    /// Advance by `dt` wall-clock seconds, scaled by the playback rate
    fn advance(&mut self, dt: f64) -> Option<TimelineEvent>;

    /// Current value of a target's channel
    fn value(&self, target: usize) -> Option<f64>;

    /// Set a target's value outside of any motion
    fn set_value(&mut self, target: usize, value: f64);

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;
}

/// Factory for timelines
pub trait AnimationEngine {
    type Timeline: Timeline;

    fn timeline(&mut self, options: TimelineOptions) -> Self::Timeline;
}

/// Built-in engine producing [`FrameTimeline`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameEngine;

impl AnimationEngine for FrameEngine {
    type Timeline = FrameTimeline;

    fn timeline(&mut self, options: TimelineOptions) -> FrameTimeline {
        FrameTimeline::new(options)
    }
}
