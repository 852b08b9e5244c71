use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use tactile_core::marquee::{subscribe, ItemPosition, Marquee, ScrollRegion};
use tactile_core::AppConfig;

use super::build_configured_loop;

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Simulated wall-clock length
    #[arg(long, default_value_t = 2.0)]
    pub seconds: f64,
    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,
    /// Scroll velocity sample as AT_MS:VELOCITY (px/s, negative scrolls up)
    #[arg(long = "sample", value_parser = parse_sample)]
    pub samples: Vec<ScriptedSample>,
    /// Report every Nth frame
    #[arg(long, default_value_t = 6)]
    pub every: usize,
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// A scroll velocity injected at a point in simulated time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedSample {
    pub at: Duration,
    pub velocity: f64,
}

pub fn parse_sample(raw: &str) -> Result<ScriptedSample, String> {
    let (at, velocity) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected AT_MS:VELOCITY, got '{}'", raw))?;
    let at: u64 = at
        .trim()
        .parse()
        .map_err(|_| format!("invalid time '{}' in '{}'", at, raw))?;
    let velocity: f64 = velocity
        .trim()
        .parse()
        .map_err(|_| format!("invalid velocity '{}' in '{}'", velocity, raw))?;
    if !velocity.is_finite() {
        return Err(format!("velocity must be finite, got '{}'", raw));
    }
    Ok(ScriptedSample {
        at: Duration::from_millis(at),
        velocity,
    })
}

/// State reported for one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub at: f64,
    pub rate: f64,
    pub time: f64,
    pub total_time: f64,
    pub current_index: Option<usize>,
    pub positions: Vec<ItemPosition>,
}

/// Drive the configured marquee at a fixed frame rate.
///
/// Samples are turned into scroll positions so they travel the same path as
/// real input: tracker, channel, controller.
pub fn simulate(config: &AppConfig, args: &SimulateArgs) -> Vec<FrameReport> {
    let mut marquee = Marquee::new(build_configured_loop(config));
    let mut samples = args.samples.clone();
    samples.sort_by_key(|s| s.at);

    let mut tracker = if config.controller.enabled {
        let (mut tracker, subscription) = subscribe(ScrollRegion::unbounded());
        tracker.observe(0.0, Duration::ZERO);
        marquee.attach(subscription, config.controller.options());
        Some(tracker)
    } else {
        if !samples.is_empty() {
            warn!("Controller disabled in config, scroll samples are ignored");
        }
        None
    };

    let fps = args.fps.max(1);
    let dt = Duration::from_secs_f64(1.0 / f64::from(fps));
    let frames = (args.seconds.max(0.0) * f64::from(fps)).round() as usize;
    let every = args.every.max(1);

    let mut position = 0.0;
    let mut last_at = Duration::ZERO;
    let mut pending = samples.into_iter().peekable();
    let mut reports = Vec::new();

    for frame in 1..=frames {
        let now = dt.mul_f64(frame as f64);

        while let Some(sample) = pending.next_if(|s| s.at <= now) {
            if let Some(tracker) = tracker.as_mut() {
                // zero spacing would read as zero velocity
                let at = sample.at.max(last_at + Duration::from_millis(1));
                position += sample.velocity * (at - last_at).as_secs_f64();
                tracker.observe(position, at);
                last_at = at;
            }
        }

        marquee.frame(dt);

        if frame % every == 0 || frame == frames {
            let handle = marquee.handle();
            reports.push(FrameReport {
                frame,
                at: now.as_secs_f64(),
                rate: handle.rate(),
                time: handle.time(),
                total_time: handle.total_time(),
                current_index: handle.current_index(),
                positions: handle.positions(),
            });
        }
    }

    info!(frames, fps, reports = reports.len(), "Simulation finished");
    reports
}

pub fn run(config: &AppConfig, args: &SimulateArgs) -> Result<()> {
    let reports = simulate(config, args);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("  {:>6} {:>8} {:>8} {:>9} {:>5}", "frame", "at (s)", "rate", "time", "item");
    for r in &reports {
        let item = r
            .current_index
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>6} {:>8.3} {:>+8.3} {:>9.3} {:>5}",
            r.frame, r.at, r.rate, r.time, item
        );
    }

    Ok(())
}
