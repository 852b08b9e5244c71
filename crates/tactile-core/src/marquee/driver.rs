//! L2 Organism Layer: Marquee driver
//!
//! Ties a loop to an optional velocity controller and advances both once
//! per frame. The controller is the only thing that writes the rate while
//! it is attached.

use std::time::Duration;

use tracing::debug;

use crate::engine::{FrameTimeline, Timeline, TimelineEvent};

use super::controller::{Attachment, ControllerOptions, VelocityController};
use super::sequencer::LoopHandle;
use super::signal::ScrollSubscription;

/// A loop plus its scroll reaction
#[derive(Debug)]
pub struct Marquee<T: Timeline = FrameTimeline> {
    handle: LoopHandle<T>,
    attachment: Option<Attachment>,
}

impl<T: Timeline> Marquee<T> {
    pub fn new(handle: LoopHandle<T>) -> Self {
        Self {
            handle,
            attachment: None,
        }
    }

    /// React to a scroll subscription, replacing any previous one
    pub fn attach(&mut self, subscription: ScrollSubscription, options: ControllerOptions) {
        self.detach();
        self.attachment = Some(VelocityController::attach(subscription, options));
    }

    /// Stop reacting to scroll. The loop keeps its current rate.
    pub fn detach(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            attachment.dispose();
            debug!(rate = self.handle.rate(), "Marquee detached from scroll");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    pub fn controller(&self) -> Option<&VelocityController> {
        self.attachment.as_ref().map(Attachment::controller)
    }

    /// Flip direction. While attached the controller does the write.
    pub fn reverse(&mut self) {
        match self.attachment.as_mut() {
            Some(attachment) => attachment.reverse(&mut self.handle),
            None => self.handle.reverse(),
        }
    }

    /// Swap in a rebuilt loop, returning the old one.
    ///
    /// The attachment carries over with its pending decay.
    pub fn replace_handle(&mut self, handle: LoopHandle<T>) -> LoopHandle<T> {
        std::mem::replace(&mut self.handle, handle)
    }

    /// Advance one frame: controller first, then the loop
    pub fn frame(&mut self, dt: Duration) -> Option<TimelineEvent> {
        if let Some(attachment) = self.attachment.as_mut() {
            attachment.pump(&mut self.handle, dt);
        }
        self.handle.tick(dt.as_secs_f64())
    }

    pub fn handle(&self) -> &LoopHandle<T> {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut LoopHandle<T> {
        &mut self.handle
    }

    /// Give up the loop, detaching first
    pub fn into_handle(mut self) -> LoopHandle<T> {
        self.detach();
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FrameEngine;
    use crate::marquee::measure::Measurement;
    use crate::marquee::sequencer::{build_loop, LoopConfig};
    use crate::marquee::signal::{subscribe, ScrollRegion};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn marquee() -> Marquee {
        let row = Measurement::row([500.0; 6], 48.0);
        let handle = build_loop(
            &mut FrameEngine,
            &row,
            &LoopConfig {
                speed: 1.5,
                ..Default::default()
            },
        );
        Marquee::new(handle)
    }

    #[test]
    fn test_unattached_marquee_runs_at_initial_rate() {
        let mut marquee = marquee();
        marquee.frame(ms(500));
        assert_eq!(marquee.handle().rate(), 1.0);
        assert!((marquee.handle().total_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_scroll_drives_rate_then_relaxes() {
        let mut marquee = marquee();
        let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
        marquee.attach(subscription, ControllerOptions::default());
        assert!(marquee.is_attached());

        tracker.observe(0.0, ms(0));
        tracker.observe(-37.5, ms(125));
        marquee.frame(ms(16));
        assert_eq!(marquee.handle().rate(), -4.5);

        for _ in 0..50 {
            marquee.frame(ms(16));
        }
        assert_eq!(marquee.handle().rate(), -1.5);
        assert_eq!(
            marquee.controller().map(|c| c.samples()),
            Some(1)
        );
    }

    #[test]
    fn test_reverse_playback_keeps_running_across_cycles() {
        let mut marquee = marquee();
        let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
        marquee.attach(subscription, ControllerOptions::default());
        tracker.observe(100.0, ms(0));
        tracker.observe(0.0, ms(1000));

        // several cycles backward at the base rate
        for _ in 0..3000 {
            marquee.frame(ms(16));
        }
        assert_eq!(marquee.handle().rate(), -1.5);
        assert!(marquee.handle().total_time() > marquee.handle().duration());
    }

    #[test]
    fn test_detach_keeps_rate() {
        let mut marquee = marquee();
        let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
        marquee.attach(subscription, ControllerOptions::default());
        tracker.observe(0.0, ms(0));
        tracker.observe(50.0, ms(125));
        marquee.frame(ms(16));
        assert_eq!(marquee.handle().rate(), 5.5);

        marquee.detach();
        assert!(!marquee.is_attached());
        assert!(tracker.is_closed());
        marquee.frame(ms(1000));
        assert_eq!(marquee.handle().rate(), 5.5);
    }

    #[test]
    fn test_replaced_handle_still_relaxes() {
        let mut marquee = marquee();
        let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
        marquee.attach(subscription, ControllerOptions::default());
        tracker.observe(0.0, ms(0));
        tracker.observe(50.0, ms(125));
        marquee.frame(ms(16));
        assert_eq!(marquee.handle().rate(), 5.5);

        let row = Measurement::row([300.0; 4], 48.0);
        let mut rebuilt = build_loop(&mut FrameEngine, &row, &LoopConfig::default());
        rebuilt.set_rate(marquee.handle().rate());
        let old = marquee.replace_handle(rebuilt);
        assert_eq!(old.len(), 6);
        assert_eq!(marquee.handle().len(), 4);

        for _ in 0..50 {
            marquee.frame(ms(16));
        }
        assert_eq!(marquee.handle().rate(), 1.5);
        assert!(!tracker.is_closed());
    }

    #[test]
    fn test_reverse_goes_through_controller() {
        let mut marquee = marquee();
        marquee.reverse();
        assert_eq!(marquee.handle().rate(), -1.0);

        let (_tracker, subscription) = subscribe(ScrollRegion::unbounded());
        marquee.attach(subscription, ControllerOptions::default());
        marquee.reverse();
        assert_eq!(marquee.handle().rate(), 1.0);
        for _ in 0..50 {
            marquee.frame(ms(16));
            assert!(marquee.handle().rate() >= 1.0);
        }
        assert_eq!(marquee.handle().rate(), 1.5);
    }

    #[test]
    fn test_into_handle_detaches() {
        let mut marquee = marquee();
        let (tracker, subscription) = subscribe(ScrollRegion::unbounded());
        marquee.attach(subscription, ControllerOptions::default());
        let handle = marquee.into_handle();
        assert!(tracker.is_closed());
        assert_eq!(handle.len(), 6);
    }
}
