//! Seamless marquee for tactile
//!
//! A rail of items scrolls left forever without a visible seam, and page
//! scrolling speeds it up or turns it around.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `offset` - Pixel/percent offsets and snapping
//! - `measure` - Layout measurement capability
//! - `signal` - Scroll positions to direction and velocity samples
//!
//! ## L3 Molecular Layer
//! - `sequencer` - Loop construction and playback handle
//! - `controller` - Velocity-reactive playback rate
//!
//! ## L2 Organism Layer
//! - `driver` - Per-frame composition of loop and controller
//!
//! # Usage
//!
//! ```ignore
//! use tactile_core::engine::FrameEngine;
//! use tactile_core::marquee::{build_loop, subscribe, LoopConfig, Marquee, Measurement, ScrollRegion};
//!
//! let row = Measurement::row([500.0; 6], 48.0);
//! let handle = build_loop(&mut FrameEngine, &row, &LoopConfig { speed: 1.5, ..Default::default() });
//! let mut marquee = Marquee::new(handle);
//!
//! let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
//! marquee.attach(subscription, Default::default());
//!
//! // On scroll
//! tracker.observe(scroll_y, since_start);
//! // Each frame
//! marquee.frame(dt);
//! ```

// L4 Atomic Layer
pub mod measure;
pub mod offset;
pub mod signal;

// L3 Molecular Layer
pub mod controller;
pub mod sequencer;

// L2 Organism Layer
pub mod driver;

pub use controller::{Attachment, ControllerOptions, PlaybackRate, VelocityController};
pub use driver::Marquee;
pub use measure::{Measurable, Measurement};
pub use offset::{ItemOffset, Snap};
pub use sequencer::{build_loop, ItemPosition, ItemSchedule, LoopConfig, LoopHandle, LoopItem, Segment};
pub use signal::{subscribe, ScrollDirection, ScrollEvent, ScrollRegion, ScrollSample, ScrollSubscription, ScrollTracker};
