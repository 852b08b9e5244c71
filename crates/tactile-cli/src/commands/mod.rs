pub mod config;
pub mod run;
pub mod schedule;
pub mod simulate;

use tactile_core::engine::FrameEngine;
use tactile_core::marquee::{build_loop, LoopHandle, Measurement};
use tactile_core::AppConfig;

/// Build the configured items as a single row, one column per cell
pub fn build_configured_loop(config: &AppConfig) -> LoopHandle {
    let cell = config.ui.cell_width_px;
    let row = Measurement::row(
        config
            .marquee
            .items
            .iter()
            .map(|label| tactile_tui::rail::label_width_px(label, cell)),
        config.marquee.gap,
    );
    build_loop(&mut FrameEngine, &row, &config.marquee.loop_config())
}
