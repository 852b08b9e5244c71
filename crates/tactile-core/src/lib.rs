pub mod config;
pub mod engine;
pub mod error;
pub mod marquee;

pub use config::{AppConfig, ControllerConfig, MarqueeConfig};
pub use engine::{AnimationEngine, EasingType, FrameEngine, Repeat, Timeline};
pub use error::{Error, Result};
