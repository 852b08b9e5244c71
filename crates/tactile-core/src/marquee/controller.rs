//! L3 Molecular Layer: Velocity-reactive playback controller
//!
//! Scrolling pushes the rail's playback rate up in the direction of travel.
//! Once scrolling goes quiet the rate eases back to a base speed in the last
//! direction seen; it never settles at zero.

use std::time::Duration;

use tracing::{debug, trace};

use crate::engine::timing::{lerp, progress_of};
use crate::engine::EasingType;

use super::signal::{ScrollDirection, ScrollEvent, ScrollSample, ScrollSubscription};

/// Idle rate multiplier
pub const BASE_MULTIPLIER: f64 = 1.5;

/// Velocity divisor giving the extra rate on top of the base
pub const VELOCITY_NORMALIZER: f64 = 100.0;

/// Silence required before the rate starts relaxing
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Length of the relaxation
pub const DECAY_DURATION: Duration = Duration::from_millis(500);

/// Relaxation curve
pub const DECAY_EASING: EasingType = EasingType::Cubic;

/// Anything with a signed playback rate
pub trait PlaybackRate {
    fn rate(&self) -> f64;

    fn set_rate(&mut self, rate: f64);
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub base_multiplier: f64,
    pub velocity_normalizer: f64,
    pub quiet_period: Duration,
    pub decay_duration: Duration,
    pub easing: EasingType,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            base_multiplier: BASE_MULTIPLIER,
            velocity_normalizer: VELOCITY_NORMALIZER,
            quiet_period: QUIET_PERIOD,
            decay_duration: DECAY_DURATION,
            easing: DECAY_EASING,
        }
    }
}

/// Eased transition of the playback rate
#[derive(Debug, Clone, Copy, PartialEq)]
struct RateTween {
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
    easing: EasingType,
}

impl RateTween {
    fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn sample(&self) -> f64 {
        if self.is_done() {
            return self.to;
        }
        let t = self.easing.apply(progress_of(self.elapsed, self.duration));
        lerp(self.from, self.to, t)
    }
}

/// The single scheduled decay. Replacing it cancels whatever was there.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DecayTask {
    #[default]
    Idle,
    /// Counting down the quiet period
    Pending { remaining: Duration },
    /// Relaxing toward the base rate
    Easing(RateTween),
}

/// Maps scroll samples onto a playback rate
#[derive(Debug, Clone)]
pub struct VelocityController {
    options: ControllerOptions,
    last_direction: ScrollDirection,
    decay: DecayTask,
    samples: u64,
}

impl Default for VelocityController {
    fn default() -> Self {
        Self::new(ControllerOptions::default())
    }
}

impl VelocityController {
    pub fn new(options: ControllerOptions) -> Self {
        Self {
            options,
            last_direction: ScrollDirection::default(),
            decay: DecayTask::Idle,
            samples: 0,
        }
    }

    /// Start reacting to a scroll subscription
    pub fn attach(subscription: ScrollSubscription, options: ControllerOptions) -> Attachment {
        debug!(
            base = options.base_multiplier,
            quiet_ms = options.quiet_period.as_millis() as u64,
            decay_ms = options.decay_duration.as_millis() as u64,
            "Attaching velocity controller"
        );
        Attachment {
            controller: Self::new(options),
            subscription,
        }
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn last_direction(&self) -> ScrollDirection {
        self.last_direction
    }

    /// Number of samples applied so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Extra rate contributed by a velocity
    pub fn boost(&self, velocity: f64) -> f64 {
        if !velocity.is_finite() || self.options.velocity_normalizer <= 0.0 {
            return 0.0;
        }
        velocity.abs() / self.options.velocity_normalizer
    }

    /// Rate the controller relaxes toward
    pub fn base_rate(&self) -> f64 {
        self.last_direction.sign() * self.options.base_multiplier
    }

    /// A decay is counting down or running
    pub fn has_pending_decay(&self) -> bool {
        !matches!(self.decay, DecayTask::Idle)
    }

    /// The rate is currently relaxing
    pub fn is_decaying(&self) -> bool {
        matches!(self.decay, DecayTask::Easing(_))
    }

    /// Apply a scroll sample immediately, then reschedule the decay
    pub fn on_sample<R: PlaybackRate + ?Sized>(&mut self, target: &mut R, sample: ScrollSample) {
        self.last_direction = sample.direction;
        let boost = self.boost(sample.velocity);

        self.cancel();
        let rate = self.last_direction.sign() * (self.options.base_multiplier + boost);
        target.set_rate(rate);
        self.decay = DecayTask::Pending {
            remaining: self.options.quiet_period,
        };
        self.samples += 1;

        trace!(velocity = sample.velocity, boost, rate, "Scroll sample applied");
    }

    /// Advance the decay by one frame
    pub fn tick<R: PlaybackRate + ?Sized>(&mut self, target: &mut R, dt: Duration) {
        let mut dt = dt;

        if let DecayTask::Pending { remaining } = self.decay {
            if dt < remaining {
                self.decay = DecayTask::Pending {
                    remaining: remaining - dt,
                };
                return;
            }
            dt -= remaining;

            let from = target.rate();
            let to = self.base_rate();
            debug!(from, to, "Scroll quiet, relaxing marquee rate");
            self.decay = DecayTask::Easing(RateTween {
                from,
                to,
                elapsed: Duration::ZERO,
                duration: self.options.decay_duration,
                easing: self.options.easing,
            });
        }

        let done = match &mut self.decay {
            DecayTask::Easing(tween) => {
                tween.elapsed += dt;
                target.set_rate(tween.sample());
                tween.is_done()
            }
            _ => false,
        };
        if done {
            self.decay = DecayTask::Idle;
        }
    }

    /// Flip the playback direction, keeping the rate's magnitude.
    ///
    /// The new direction becomes the one the decay relaxes toward, so the
    /// rate never passes through zero on its way back to base.
    pub fn reverse<R: PlaybackRate + ?Sized>(&mut self, target: &mut R) {
        self.cancel();
        // Flip what is on screen; the controller may not have seen a sample yet
        self.last_direction = ScrollDirection::from_delta(target.rate())
            .unwrap_or(self.last_direction)
            .flipped();
        let rate = self.last_direction.sign() * target.rate().abs();
        target.set_rate(rate);
        self.decay = DecayTask::Pending {
            remaining: self.options.quiet_period,
        };
        debug!(rate, direction = ?self.last_direction, "Marquee reversed");
    }

    /// Drop any scheduled decay without touching the rate
    pub fn cancel(&mut self) {
        self.decay = DecayTask::Idle;
    }
}

/// A controller bound to a scroll subscription. Dispose to detach.
#[derive(Debug)]
pub struct Attachment {
    controller: VelocityController,
    subscription: ScrollSubscription,
}

impl Attachment {
    /// Advance the decay, then apply every queued scroll event.
    ///
    /// Returns the number of samples applied.
    pub fn pump<R: PlaybackRate + ?Sized>(&mut self, target: &mut R, dt: Duration) -> usize {
        self.controller.tick(target, dt);

        let mut applied = 0;
        while let Some(event) = self.subscription.try_next() {
            match event {
                ScrollEvent::Update(sample) => {
                    self.controller.on_sample(target, sample);
                    applied += 1;
                }
                ScrollEvent::Enter(direction) => debug!(?direction, "Scroll region entered"),
                ScrollEvent::Leave(direction) => debug!(?direction, "Scroll region left"),
            }
        }
        applied
    }

    pub fn controller(&self) -> &VelocityController {
        &self.controller
    }

    /// Reverse through the controller so it stays the only rate writer
    pub fn reverse<R: PlaybackRate + ?Sized>(&mut self, target: &mut R) {
        self.controller.reverse(target);
    }

    /// Cancel the decay and stop listening. The rate stays where it is.
    pub fn dispose(mut self) {
        self.controller.cancel();
        self.subscription.close();
        debug!(samples = self.controller.samples(), "Velocity controller detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marquee::signal::{subscribe, ScrollRegion};

    #[derive(Debug, Default)]
    struct Probe {
        rate: f64,
        writes: usize,
    }

    impl PlaybackRate for Probe {
        fn rate(&self) -> f64 {
            self.rate
        }

        fn set_rate(&mut self, rate: f64) {
            self.rate = rate;
            self.writes += 1;
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn run_frames(controller: &mut VelocityController, probe: &mut Probe, total_ms: u64, frame_ms: u64) {
        let mut elapsed = 0;
        while elapsed < total_ms {
            controller.tick(probe, ms(frame_ms));
            elapsed += frame_ms;
        }
    }

    #[test]
    fn test_sample_sets_rate_immediately() {
        let mut controller = VelocityController::default();
        let mut probe = Probe { rate: 1.0, ..Default::default() };

        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Backward, 300.0));
        assert_eq!(probe.rate, -4.5);
        assert_eq!(controller.last_direction(), ScrollDirection::Backward);
        assert!(controller.has_pending_decay());
        assert!(!controller.is_decaying());
    }

    #[test]
    fn test_decays_to_base_after_quiet_period() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Backward, 300.0));

        run_frames(&mut controller, &mut probe, 190, 10);
        assert_eq!(probe.rate, -4.5, "rate must hold during the quiet period");

        run_frames(&mut controller, &mut probe, 100, 10);
        assert!(controller.is_decaying());
        assert!(probe.rate > -4.5 && probe.rate < -1.5);

        run_frames(&mut controller, &mut probe, 410, 10);
        assert_eq!(probe.rate, -1.5);
        assert!(!controller.has_pending_decay());
    }

    #[test]
    fn test_single_large_frame_converges() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Forward, 1234.0));
        controller.tick(&mut probe, ms(700));
        assert_eq!(probe.rate, 1.5);
    }

    #[test]
    fn test_odd_frame_lengths_converge() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Backward, 80.0));
        run_frames(&mut controller, &mut probe, 704, 16);
        assert!((probe.rate + 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_decay_is_decelerating() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Forward, 300.0));
        controller.tick(&mut probe, ms(200));
        controller.tick(&mut probe, ms(250));
        // half way through a cubic ease-out, 87.5% of the drop is done
        assert!((probe.rate - (4.5 - 3.0 * 0.875)).abs() < 1e-9);
    }

    #[test]
    fn test_direction_flip_is_immediate() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Forward, 500.0));
        controller.tick(&mut probe, ms(300));
        assert!(probe.rate > 0.0);

        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Backward, 100.0));
        assert_eq!(probe.rate, -2.5);
    }

    #[test]
    fn test_new_sample_cancels_running_decay() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Forward, 300.0));
        controller.tick(&mut probe, ms(400));
        assert!(controller.is_decaying());

        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Forward, 600.0));
        assert!(!controller.is_decaying());
        assert_eq!(probe.rate, 7.5);

        // the old transition is gone: nothing moves until the new quiet period ends
        let writes = probe.writes;
        controller.tick(&mut probe, ms(150));
        assert_eq!(probe.writes, writes);
        assert_eq!(probe.rate, 7.5);
    }

    #[test]
    fn test_zero_velocity_sets_base_rate() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Backward, 0.0));
        assert_eq!(probe.rate, -1.5);
    }

    #[test]
    fn test_rate_never_reaches_zero() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Forward, 900.0));
        for _ in 0..200 {
            controller.tick(&mut probe, ms(7));
            assert!(probe.rate.abs() >= BASE_MULTIPLIER - 1e-12);
        }
    }

    #[test]
    fn test_reverse_relaxes_without_crossing_zero() {
        let mut controller = VelocityController::default();
        let mut probe = Probe::default();
        controller.on_sample(&mut probe, ScrollSample::new(ScrollDirection::Forward, 960.0));
        controller.tick(&mut probe, ms(16));

        controller.reverse(&mut probe);
        assert!((probe.rate + 11.1).abs() < 1e-9, "rate = {}", probe.rate);
        assert_eq!(controller.last_direction(), ScrollDirection::Backward);
        assert!(controller.has_pending_decay());

        for _ in 0..60 {
            controller.tick(&mut probe, ms(16));
            assert!(probe.rate <= -BASE_MULTIPLIER + 1e-12, "rate = {}", probe.rate);
        }
        assert_eq!(probe.rate, -1.5);
    }

    #[test]
    fn test_reverse_from_idle_rate() {
        let mut controller = VelocityController::default();
        let mut probe = Probe { rate: 1.0, ..Default::default() };
        controller.reverse(&mut probe);
        assert_eq!(probe.rate, -1.0);
        controller.tick(&mut probe, ms(700));
        assert_eq!(probe.rate, -1.5);
    }

    #[test]
    fn test_non_finite_velocity_has_no_boost() {
        let controller = VelocityController::default();
        assert_eq!(controller.boost(f64::NAN), 0.0);
        assert_eq!(controller.boost(-250.0), 2.5);
    }

    #[test]
    fn test_attachment_pumps_queued_samples() {
        let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
        let mut attachment = VelocityController::attach(subscription, ControllerOptions::default());
        let mut probe = Probe::default();

        tracker.observe(0.0, ms(0));
        tracker.observe(-37.5, ms(125));
        assert_eq!(attachment.pump(&mut probe, ms(16)), 1);
        assert_eq!(probe.rate, -4.5);
        assert_eq!(attachment.controller().samples(), 1);

        assert_eq!(attachment.pump(&mut probe, ms(700)), 0);
        assert_eq!(probe.rate, -1.5);
    }

    #[test]
    fn test_dispose_leaves_rate_and_closes_subscription() {
        let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
        let mut attachment = VelocityController::attach(subscription, ControllerOptions::default());
        let mut probe = Probe::default();

        tracker.observe(0.0, ms(0));
        tracker.observe(50.0, ms(125));
        attachment.pump(&mut probe, ms(16));
        assert_eq!(probe.rate, 5.5);

        attachment.dispose();
        assert!(tracker.is_closed());
        assert_eq!(probe.rate, 5.5);
    }
}
