//! L4 Atomic Layer: Viewport scroll signal
//!
//! Turns raw scroll positions into direction and velocity samples and
//! delivers them over a channel, so scroll input can arrive far more often
//! than frames without the consumer missing any.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::trace;

/// Sign of the most recent scroll movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ScrollDirection {
    /// Scrolling down the page; the rail moves left
    #[default]
    Forward,
    /// Scrolling up the page
    Backward,
}

impl ScrollDirection {
    /// +1 or -1
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            ScrollDirection::Forward => 1.0,
            ScrollDirection::Backward => -1.0,
        }
    }

    /// Direction of a movement, or `None` when nothing moved
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(ScrollDirection::Forward)
        } else if delta < 0.0 {
            Some(ScrollDirection::Backward)
        } else {
            None
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ScrollDirection::Forward => ScrollDirection::Backward,
            ScrollDirection::Backward => ScrollDirection::Forward,
        }
    }
}

/// One scroll observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollSample {
    pub direction: ScrollDirection,
    /// Signed, in scroll units per second
    pub velocity: f64,
}

impl ScrollSample {
    pub fn new(direction: ScrollDirection, velocity: f64) -> Self {
        Self { direction, velocity }
    }
}

/// Events delivered to a subscription
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollEvent {
    /// The viewport entered the observed region
    Enter(ScrollDirection),
    /// Scroll movement inside the region
    Update(ScrollSample),
    /// The viewport left the observed region
    Leave(ScrollDirection),
}

/// Scroll range inside which updates are reported
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollRegion {
    pub start: f64,
    pub end: f64,
}

impl ScrollRegion {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            start: f64::NEG_INFINITY,
            end: f64::INFINITY,
        }
    }

    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position <= self.end
    }
}

/// Producer side: feed it scroll positions
#[derive(Debug)]
pub struct ScrollTracker {
    region: ScrollRegion,
    last: Option<(f64, Duration)>,
    direction: ScrollDirection,
    velocity: f64,
    active: bool,
    tx: mpsc::UnboundedSender<ScrollEvent>,
}

/// Consumer side: drained by the controller once per frame
#[derive(Debug)]
pub struct ScrollSubscription {
    rx: mpsc::UnboundedReceiver<ScrollEvent>,
}

/// Start observing scroll positions within `region`
pub fn subscribe(region: ScrollRegion) -> (ScrollTracker, ScrollSubscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    let tracker = ScrollTracker {
        region,
        last: None,
        direction: ScrollDirection::default(),
        velocity: 0.0,
        active: false,
        tx,
    };
    (tracker, ScrollSubscription { rx })
}

impl ScrollTracker {
    /// Record the scroll position at time `at` since observation began.
    ///
    /// The first observation only establishes the baseline.
    pub fn observe(&mut self, position: f64, at: Duration) {
        let Some((prev, prev_at)) = self.last.replace((position, at)) else {
            self.active = self.region.contains(position);
            if self.active {
                self.emit(ScrollEvent::Enter(self.direction));
            }
            return;
        };

        let delta = position - prev;
        let dt = at.saturating_sub(prev_at).as_secs_f64();
        self.velocity = if dt > 0.0 { delta / dt } else { 0.0 };
        if let Some(direction) = ScrollDirection::from_delta(delta) {
            self.direction = direction;
        }

        let inside = self.region.contains(position);
        let sample = ScrollSample::new(self.direction, self.velocity);
        match (self.active, inside) {
            (false, true) => {
                self.active = true;
                self.emit(ScrollEvent::Enter(self.direction));
                self.emit(ScrollEvent::Update(sample));
            }
            (true, true) => self.emit(ScrollEvent::Update(sample)),
            (true, false) => {
                self.active = false;
                self.emit(ScrollEvent::Update(sample));
                self.emit(ScrollEvent::Leave(self.direction));
            }
            (false, false) => {}
        }
    }

    fn emit(&self, event: ScrollEvent) {
        if self.tx.send(event).is_err() {
            trace!("Scroll event dropped: subscription closed");
        }
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    /// Velocity of the latest observation
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn region(&self) -> ScrollRegion {
        self.region
    }

    /// Whether the last observed position was inside the region
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The consumer has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ScrollSubscription {
    /// Next queued event without waiting
    pub fn try_next(&mut self) -> Option<ScrollEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Stop accepting events
    pub fn close(&mut self) {
        self.rx.close();
    }
}
