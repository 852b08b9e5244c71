//! L3 Molecular Layer: Frame-driven timeline
//!
//! Motions are placed at absolute offsets and sampled from the playhead on
//! demand; nothing is rendered between frames, so a motion's start value is
//! only visible once the playhead reaches it.

use std::collections::HashMap;

use super::easing::EasingType;
use super::timing::{lerp, progress};
use super::{Repeat, Timeline, TimelineEvent, TimelineOptions};

/// A timed transition of one target's channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub target: usize,
    pub from: f64,
    pub to: f64,
    /// Seconds
    pub duration: f64,
    pub easing: EasingType,
}

impl Motion {
    /// Constant-speed motion
    pub fn linear(target: usize, from: f64, to: f64, duration: f64) -> Self {
        Self {
            target,
            from,
            to,
            duration,
            easing: EasingType::Linear,
        }
    }

    /// Value `elapsed` seconds after the motion started
    #[inline]
    pub fn sample(&self, elapsed: f64) -> f64 {
        let t = self.easing.apply(progress(elapsed, self.duration));
        if t >= 1.0 {
            // exact end value, no interpolation drift
            return self.to;
        }
        lerp(self.from, self.to, t)
    }
}

#[derive(Debug, Clone)]
struct ScheduledMotion {
    motion: Motion,
    start: f64,
}

/// Deterministic timeline advanced by explicit frame deltas
#[derive(Debug, Clone)]
pub struct FrameTimeline {
    motions: Vec<ScheduledMotion>,
    labels: Vec<(String, f64)>,
    base_values: HashMap<usize, f64>,
    repeat: Repeat,
    paused: bool,
    time_scale: f64,
    total_time: f64,
    raw_time: f64,
    duration: f64,
}

impl Default for FrameTimeline {
    fn default() -> Self {
        Self::new(TimelineOptions::default())
    }
}

impl FrameTimeline {
    pub fn new(options: TimelineOptions) -> Self {
        Self {
            motions: Vec::new(),
            labels: Vec::new(),
            base_values: HashMap::new(),
            repeat: options.repeat,
            paused: options.paused,
            time_scale: 1.0,
            total_time: 0.0,
            raw_time: 0.0,
            duration: 0.0,
        }
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Number of scheduled motions
    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    /// Sample a target at an arbitrary local time without moving the playhead
    pub fn value_at(&self, target: usize, local_time: f64) -> Option<f64> {
        let mut scheduled = self.motions.iter().filter(|s| s.motion.target == target).peekable();

        let mut value = match (self.base_values.get(&target), scheduled.peek()) {
            (Some(base), _) => *base,
            (None, Some(first)) => first.motion.from,
            (None, None) => return None,
        };

        // Later motions override earlier ones once they have started
        for s in scheduled {
            if local_time >= s.start {
                value = s.motion.sample(local_time - s.start);
            }
        }
        Some(value)
    }
}

impl Timeline for FrameTimeline {
    fn add(&mut self, motion: Motion, at: f64) {
        let end = at + motion.duration.max(0.0);
        if end > self.duration {
            self.duration = end;
        }
        self.motions.push(ScheduledMotion { motion, start: at });
    }

    fn add_label(&mut self, name: &str, at: f64) {
        match self.labels.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = at,
            None => self.labels.push((name.to_string(), at)),
        }
    }

    fn label_time(&self, name: &str) -> Option<f64> {
        self.labels.iter().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn total_duration(&self) -> f64 {
        match self.repeat {
            Repeat::Infinite => f64::INFINITY,
            Repeat::Count(n) => self.duration * (f64::from(n) + 1.0),
        }
    }

    fn time_scale(&self) -> f64 {
        self.time_scale
    }

    fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }

    fn time(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        if self.total_time >= self.total_duration() {
            return self.duration;
        }
        self.total_time.rem_euclid(self.duration)
    }

    fn total_time(&self) -> f64 {
        self.total_time
    }

    fn raw_time(&self) -> f64 {
        self.raw_time
    }

    fn set_total_time(&mut self, time: f64) {
        let time = time.clamp(0.0, self.total_duration());
        self.total_time = time;
        self.raw_time = time;
    }

    fn advance(&mut self, dt: f64) -> Option<TimelineEvent> {
        if self.paused || self.duration <= 0.0 {
            return None;
        }
        let delta = dt * self.time_scale;
        if delta == 0.0 {
            return None;
        }

        let raw = self.total_time + delta;
        self.raw_time = raw;

        if delta < 0.0 && raw <= 0.0 {
            self.total_time = 0.0;
            return Some(TimelineEvent::ReverseComplete { raw_time: raw });
        }

        let end = self.total_duration();
        if raw >= end {
            self.total_time = end;
            return Some(TimelineEvent::Complete);
        }

        self.total_time = raw;
        None
    }

    fn value(&self, target: usize) -> Option<f64> {
        self.value_at(target, self.time())
    }

    fn set_value(&mut self, target: usize, value: f64) {
        self.base_values.insert(target, value);
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
