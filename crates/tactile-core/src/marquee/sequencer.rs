//! L3 Molecular Layer: Seamless horizontal loop sequencer
//!
//! Every item slides left at a constant pixel speed until its right edge
//! passes the rail start, then re-enters one `total_width` further right and
//! slides back to where it began. All items start at time 0; the phase of
//! each item lives entirely in its percentages and durations, which is what
//! makes the rail read as one continuous strip.

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{
    AnimationEngine, FrameTimeline, Motion, Repeat, Timeline, TimelineEvent, TimelineOptions,
};

use super::controller::PlaybackRate;
use super::measure::Measurable;
use super::offset::{ItemOffset, Snap};

/// Pixels per second at `speed = 1`
pub const PIXELS_PER_SPEED_UNIT: f64 = 100.0;

/// Forward playback wraps onto this many cycles ahead when rebasing a
/// reversed loop, so the playhead never revisits t = 0.
pub const REVERSE_REBASE_CYCLES: f64 = 100.0;

/// Loop construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    /// Speed multiplier; `speed * 100` pixels per second
    pub speed: f64,
    /// Gap appended after the last item before the cycle repeats
    pub padding_right: f64,
    pub repeat: Repeat,
    pub snap: Snap,
    /// Build the timeline paused
    pub paused: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            padding_right: 0.0,
            repeat: Repeat::Infinite,
            snap: Snap::default(),
            paused: false,
        }
    }
}

/// One marquee entry after measurement
#[derive(Debug, Clone, Serialize)]
pub struct LoopItem {
    pub index: usize,
    pub width: f64,
    pub scale_x: f64,
    /// Left edge relative to the first item, at build time
    pub initial_offset: f64,
    /// Steady-state displacement
    pub offset: ItemOffset,
}

impl LoopItem {
    /// Width including scale
    #[inline]
    pub fn span(&self) -> f64 {
        self.width * self.scale_x
    }
}

/// One scheduled motion, in percent of the item's width
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: f64,
    pub duration: f64,
    pub from_percent: f64,
    pub to_percent: f64,
}

/// Timing of a single item across one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSchedule {
    pub index: usize,
    pub label: String,
    pub distance_to_start: f64,
    pub distance_to_loop: f64,
    /// Slide from the resting position until fully past the rail start
    pub forward: Segment,
    /// Re-entry one total width to the right, back to rest
    pub wrap: Segment,
    pub label_time: f64,
}

/// Rendered position of an item at the playhead
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemPosition {
    pub index: usize,
    pub percent: f64,
    /// Displacement from the item's layout position
    pub pixels: f64,
    /// Left edge relative to the rail start
    pub left: f64,
}

/// A running loop. Owns its timeline and all derived state.
#[derive(Debug, Clone)]
pub struct LoopHandle<T: Timeline = FrameTimeline> {
    timeline: T,
    items: Vec<LoopItem>,
    schedule: Vec<ItemSchedule>,
    total_width: f64,
    pixels_per_second: f64,
    repeat: Repeat,
}

fn label_name(index: usize) -> String {
    format!("label{}", index)
}

/// Build a loop from measured items.
///
/// Geometry is read once; resizing the rail afterwards requires a rebuild.
/// An empty item list yields an inert handle.
pub fn build_loop<E, M>(engine: &mut E, items: &[M], config: &LoopConfig) -> LoopHandle<E::Timeline>
where
    E: AnimationEngine,
    M: Measurable,
{
    let mut timeline = engine.timeline(TimelineOptions {
        repeat: config.repeat,
        paused: config.paused,
    });

    let speed = if config.speed.is_finite() && config.speed > 0.0 {
        config.speed
    } else {
        warn!("Loop speed {} is not positive, falling back to 1", config.speed);
        1.0
    };
    let pixels_per_second = speed * PIXELS_PER_SPEED_UNIT;

    if items.is_empty() {
        debug!("No marquee items, building an inert loop");
        return LoopHandle {
            timeline,
            items: Vec::new(),
            schedule: Vec::new(),
            total_width: 0.0,
            pixels_per_second,
            repeat: config.repeat,
        };
    }

    let snap = config.snap;
    let start_x = items[0].offset_left();

    // Normalize any existing translation into a snapped percentage
    let loop_items: Vec<LoopItem> = items
        .iter()
        .enumerate()
        .map(|(index, m)| {
            let width = m.width();
            let offset = ItemOffset::new(m.x(), m.x_percent(), width).normalized(snap);
            if !offset.has_measurable_width() {
                warn!(index, width, "Marquee item has no measurable width; it will not move");
            }
            LoopItem {
                index,
                width,
                scale_x: m.scale_x(),
                initial_offset: m.offset_left() - start_x,
                offset,
            }
        })
        .collect();

    for item in &loop_items {
        timeline.set_value(item.index, item.offset.percent_offset);
    }

    let last = &loop_items[loop_items.len() - 1];
    let total_width = last.initial_offset
        + last.offset.to_pixels()
        + finite_or_zero(last.span())
        + config.padding_right;

    let mut schedule = Vec::with_capacity(loop_items.len());
    for item in &loop_items {
        let entry = schedule_item(item, total_width, pixels_per_second, snap);

        timeline.add(
            Motion::linear(
                item.index,
                entry.forward.from_percent,
                entry.forward.to_percent,
                entry.forward.duration,
            ),
            entry.forward.start,
        );
        // The wrap motion owns its start value, so the jump is never shown
        // before the forward motion has carried the item off the rail.
        timeline.add(
            Motion::linear(
                item.index,
                entry.wrap.from_percent,
                entry.wrap.to_percent,
                entry.wrap.duration,
            ),
            entry.wrap.start,
        );
        timeline.add_label(&entry.label, entry.label_time);

        schedule.push(entry);
    }

    debug!(
        items = loop_items.len(),
        total_width,
        duration = timeline.duration(),
        pixels_per_second,
        "Built marquee loop"
    );

    LoopHandle {
        timeline,
        items: loop_items,
        schedule,
        total_width,
        pixels_per_second,
        repeat: config.repeat,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn schedule_item(item: &LoopItem, total_width: f64, pixels_per_second: f64, snap: Snap) -> ItemSchedule {
    let offset = item.offset;
    let percent = offset.percent_offset;
    let cur_x = offset.to_pixels();
    let distance_to_start = item.initial_offset + cur_x;
    let label_time = distance_to_start / pixels_per_second;

    if !offset.has_measurable_width() {
        let still = Segment {
            start: 0.0,
            duration: 0.0,
            from_percent: percent,
            to_percent: percent,
        };
        return ItemSchedule {
            index: item.index,
            label: label_name(item.index),
            distance_to_start,
            distance_to_loop: distance_to_start,
            forward: still,
            wrap: still,
            label_time,
        };
    }

    let distance_to_loop = distance_to_start + item.span();
    let forward_duration = distance_to_loop / pixels_per_second;

    ItemSchedule {
        index: item.index,
        label: label_name(item.index),
        distance_to_start,
        distance_to_loop,
        forward: Segment {
            start: 0.0,
            duration: forward_duration,
            from_percent: percent,
            to_percent: snap.apply(offset.percent_of(cur_x - distance_to_loop)),
        },
        wrap: Segment {
            start: forward_duration,
            duration: (total_width - distance_to_loop) / pixels_per_second,
            from_percent: snap.apply(offset.percent_of(cur_x - distance_to_loop + total_width)),
            to_percent: percent,
        },
        label_time,
    }
}

impl<T: Timeline> LoopHandle<T> {
    /// Advance by `dt` wall-clock seconds.
    ///
    /// A forever-repeating loop that reverses past its start is rebased a
    /// hundred cycles ahead instead of wrapping through zero.
    pub fn tick(&mut self, dt: f64) -> Option<TimelineEvent> {
        if self.items.is_empty() {
            return None;
        }

        let event = self.timeline.advance(dt);
        match event {
            Some(TimelineEvent::ReverseComplete { raw_time }) if self.repeat.is_infinite() => {
                let rebased = raw_time + self.timeline.duration() * REVERSE_REBASE_CYCLES;
                debug!(raw_time, rebased, "Rebasing reversed marquee loop");
                self.timeline.set_total_time(rebased);
            }
            Some(TimelineEvent::ReverseComplete { .. }) => {
                debug!("Marquee loop reached its start in reverse");
            }
            Some(TimelineEvent::Complete) => {
                debug!("Marquee loop completed");
            }
            None => {}
        }
        event
    }

    /// Signed playback rate
    pub fn rate(&self) -> f64 {
        self.timeline.time_scale()
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.timeline.set_time_scale(rate);
    }

    /// Flip the playback direction, keeping the magnitude
    pub fn reverse(&mut self) {
        let rate = self.rate();
        self.set_rate(-rate);
    }

    pub fn is_reversed(&self) -> bool {
        self.rate() < 0.0
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    pub fn resume(&mut self) {
        self.timeline.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.timeline.is_paused()
    }

    /// Playhead inside the current cycle
    pub fn time(&self) -> f64 {
        self.timeline.time()
    }

    pub fn raw_time(&self) -> f64 {
        self.timeline.raw_time()
    }

    pub fn total_time(&self) -> f64 {
        self.timeline.total_time()
    }

    /// Length of one cycle in seconds
    pub fn duration(&self) -> f64 {
        self.timeline.duration()
    }

    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    pub fn items(&self) -> &[LoopItem] {
        &self.items
    }

    pub fn schedule(&self) -> &[ItemSchedule] {
        &self.schedule
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn timeline(&self) -> &T {
        &self.timeline
    }

    /// Current displacement of one item
    pub fn item_offset(&self, index: usize) -> Option<ItemOffset> {
        let item = self.items.get(index)?;
        let percent = self
            .timeline
            .value(index)
            .unwrap_or(item.offset.percent_offset);
        Some(item.offset.with_percent(percent))
    }

    /// Positions of every item at the playhead, in rail order
    pub fn positions(&self) -> Vec<ItemPosition> {
        self.items
            .iter()
            .filter_map(|item| {
                let offset = self.item_offset(item.index)?;
                let pixels = offset.to_pixels();
                Some(ItemPosition {
                    index: item.index,
                    percent: offset.percent_offset,
                    pixels,
                    left: item.initial_offset + pixels,
                })
            })
            .collect()
    }

    /// Time of the marker for item `index`
    pub fn label_time(&self, index: usize) -> Option<f64> {
        self.timeline.label_time(&label_name(index))
    }

    /// Item whose marker was passed most recently in this cycle
    pub fn current_index(&self) -> Option<usize> {
        if self.schedule.is_empty() {
            return None;
        }
        let time = self.time();
        let mut best: Option<(usize, f64)> = None;
        for entry in &self.schedule {
            if entry.label_time <= time + f64::EPSILON
                && best.map_or(true, |(_, t)| entry.label_time >= t)
            {
                best = Some((entry.index, entry.label_time));
            }
        }
        // Before the first marker we are still on the last item of the previous cycle
        best.map(|(i, _)| i)
            .or_else(|| self.schedule.last().map(|e| e.index))
    }

    /// Jump to item `index`'s marker within the current cycle. Wraps.
    pub fn seek_index(&mut self, index: usize) {
        if self.schedule.is_empty() {
            return;
        }
        let index = index % self.schedule.len();
        let label_time = self.schedule[index].label_time;
        let cycle_start = self.timeline.total_time() - self.timeline.time();
        self.timeline.set_total_time(cycle_start + label_time);
        debug!(index, label_time, "Seeked marquee loop");
    }

    /// Seek to the marker after the current one
    pub fn next(&mut self) {
        if let Some(current) = self.current_index() {
            self.seek_index(current + 1);
        }
    }

    /// Seek to the marker before the current one
    pub fn previous(&mut self) {
        if let Some(current) = self.current_index() {
            let len = self.schedule.len();
            self.seek_index(current + len - 1);
        }
    }
}

impl<T: Timeline> PlaybackRate for LoopHandle<T> {
    fn rate(&self) -> f64 {
        self.timeline.time_scale()
    }

    fn set_rate(&mut self, rate: f64) {
        self.timeline.set_time_scale(rate);
    }
}
