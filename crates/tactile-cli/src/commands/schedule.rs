use anyhow::Result;
use serde::Serialize;

use tactile_core::marquee::ItemSchedule;
use tactile_core::AppConfig;

use super::build_configured_loop;

#[derive(Debug, Serialize)]
struct ScheduleReport<'a> {
    total_width: f64,
    duration: f64,
    pixels_per_second: f64,
    items: Vec<ScheduledItem<'a>>,
}

#[derive(Debug, Serialize)]
struct ScheduledItem<'a> {
    text: &'a str,
    width: f64,
    #[serde(flatten)]
    schedule: &'a ItemSchedule,
}

pub fn run(config: &AppConfig, json: bool) -> Result<()> {
    let handle = build_configured_loop(config);

    if handle.is_empty() {
        println!("No marquee items configured.");
        println!("\nAdd some under [marquee] in:");
        println!("  {}", AppConfig::config_path().display());
        return Ok(());
    }

    let report = ScheduleReport {
        total_width: handle.total_width(),
        duration: handle.duration(),
        pixels_per_second: handle.pixels_per_second(),
        items: handle
            .schedule()
            .iter()
            .zip(handle.items())
            .zip(&config.marquee.items)
            .map(|((schedule, item), text)| ScheduledItem {
                text,
                width: item.width,
                schedule,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Loop: {} items, {:.0}px per cycle, {:.3}s at {:.0}px/s\n",
        report.items.len(),
        report.total_width,
        report.duration,
        report.pixels_per_second
    );
    println!(
        "  {:<8} {:<20} {:>8} {:>9} {:>9} {:>15} {:>15}",
        "label", "text", "width", "to start", "to loop", "forward (s)", "wrap (s)"
    );
    for item in &report.items {
        let s = item.schedule;
        println!(
            "  {:<8} {:<20} {:>8.1} {:>9.1} {:>9.1} {:>7.3}..{:<6.3} {:>7.3}..{:<6.3}",
            s.label,
            item.text,
            item.width,
            s.distance_to_start,
            s.distance_to_loop,
            s.forward.start,
            s.forward.start + s.forward.duration,
            s.wrap.start,
            s.wrap.start + s.wrap.duration,
        );
    }

    Ok(())
}
