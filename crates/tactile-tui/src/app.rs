use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use tactile_core::engine::{FrameEngine, TimelineEvent};
use tactile_core::marquee::{
    build_loop, subscribe, LoopHandle, Marquee, ScrollRegion, ScrollTracker,
};
use tactile_core::AppConfig;

use crate::input::Action;
use crate::rail::{column_of, compose_line, fill_viewport, measure_labels};
use crate::theme::Theme;

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    marquee: Marquee,
    tracker: Option<ScrollTracker>,
    labels: Vec<String>,
    viewport_cols: u16,
    viewport_rows: u16,
    /// Simulated page scroll offset in pixels
    pub scroll_position: f64,
    started: Instant,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, cols: u16, rows: u16) -> Self {
        let labels = Self::labels_for(&config, cols);
        let marquee = Self::build_marquee(&config, &labels);

        let mut app = Self {
            config,
            theme: Theme::default(),
            marquee,
            tracker: None,
            labels,
            viewport_cols: cols,
            viewport_rows: rows,
            scroll_position: 0.0,
            started: Instant::now(),
            should_quit: false,
            status_message: None,
        };
        if app.config.controller.enabled {
            app.attach_at(Duration::ZERO);
        }
        info!(
            items = app.labels.len(),
            total_width = app.marquee.handle().total_width(),
            duration = app.marquee.handle().duration(),
            "Marquee built"
        );
        app
    }

    fn labels_for(config: &AppConfig, cols: u16) -> Vec<String> {
        let cell = config.ui.cell_width_px;
        fill_viewport(
            &config.marquee.items,
            cell,
            config.marquee.gap,
            f64::from(cols) * cell,
        )
    }

    fn build_marquee(config: &AppConfig, labels: &[String]) -> Marquee {
        Marquee::new(Self::build_handle(config, labels))
    }

    fn build_handle(config: &AppConfig, labels: &[String]) -> LoopHandle {
        let row = measure_labels(labels, config.ui.cell_width_px, config.marquee.gap);
        build_loop(&mut FrameEngine, &row, &config.marquee.loop_config())
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn attach_at(&mut self, at: Duration) {
        let region = ScrollRegion::new(0.0, self.config.ui.page_height);
        let (mut tracker, subscription) = subscribe(region);
        tracker.observe(self.scroll_position, at);
        self.marquee
            .attach(subscription, self.config.controller.options());
        self.tracker = Some(tracker);
    }

    fn detach(&mut self) {
        self.marquee.detach();
        self.tracker = None;
    }

    pub fn marquee(&self) -> &Marquee {
        &self.marquee
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn viewport_cols(&self) -> u16 {
        self.viewport_cols
    }

    pub fn is_attached(&self) -> bool {
        self.marquee.is_attached()
    }

    /// Scrolled share of the page, 0..=1
    pub fn page_progress(&self) -> f64 {
        (self.scroll_position / self.config.ui.page_height).clamp(0.0, 1.0)
    }

    /// Rebuild the rail for a new terminal size.
    ///
    /// The loop is rebuilt from scratch, keeping its rate and pause state.
    /// The scroll reaction carries over untouched, including a pending decay.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport_rows = rows;
        if cols == self.viewport_cols {
            return;
        }

        self.viewport_cols = cols;
        self.labels = Self::labels_for(&self.config, cols);
        let mut handle = Self::build_handle(&self.config, &self.labels);

        let old = self.marquee.handle();
        handle.set_rate(old.rate());
        if old.is_paused() {
            handle.pause();
        }
        self.marquee.replace_handle(handle);
        debug!(cols, rows, items = self.labels.len(), "Rail rebuilt after resize");
    }

    /// Scroll the page by `lines`, feeding the scroll signal
    pub fn scroll_by(&mut self, lines: f64) {
        self.scroll_at(lines, self.now());
    }

    pub fn scroll_at(&mut self, lines: f64, at: Duration) {
        let max = self.config.ui.page_height;
        self.scroll_position =
            (self.scroll_position + lines * self.config.ui.scroll_step).clamp(0.0, max);
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.observe(self.scroll_position, at);
        }
    }

    pub fn scroll_half_page_down(&mut self) {
        let lines = f64::from((self.viewport_rows / 2).max(1));
        self.scroll_by(lines);
    }

    pub fn scroll_half_page_up(&mut self) {
        let lines = f64::from((self.viewport_rows / 2).max(1));
        self.scroll_by(-lines);
    }

    /// Advance one frame
    pub fn on_frame(&mut self, dt: Duration) {
        if let Some(TimelineEvent::Complete) = self.marquee.frame(dt) {
            self.set_status("Loop finished");
        }
    }

    pub fn toggle_controller(&mut self) {
        if self.marquee.is_attached() {
            self.detach();
            self.set_status("Scroll reaction off");
        } else {
            self.attach_at(self.now());
            self.set_status("Scroll reaction on");
        }
    }

    /// Flip the rail direction; while attached the controller owns the write
    pub fn reverse(&mut self) {
        self.marquee.reverse();
    }

    pub fn toggle_pause(&mut self) {
        let handle = self.marquee.handle_mut();
        if handle.is_paused() {
            handle.resume();
            self.clear_status();
        } else {
            handle.pause();
            self.set_status("Paused");
        }
    }

    pub fn next_item(&mut self) {
        self.marquee.handle_mut().next();
    }

    pub fn previous_item(&mut self) {
        self.marquee.handle_mut().previous();
    }

    /// The visible rail, one character per column
    pub fn rail_line(&self) -> String {
        let cell = self.config.ui.cell_width_px;
        let positions = self.marquee.handle().positions();
        let entries = positions.iter().filter_map(|pos| {
            self.labels
                .get(pos.index)
                .map(|label| (column_of(pos.left, cell), label.as_str()))
        });
        compose_line(entries, usize::from(self.viewport_cols))
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Scroll(lines) => self.scroll_by(lines),
            Action::ScrollHalfPageDown => self.scroll_half_page_down(),
            Action::ScrollHalfPageUp => self.scroll_half_page_up(),
            Action::Reverse => self.reverse(),
            Action::ToggleController => self.toggle_controller(),
            Action::TogglePause => self.toggle_pause(),
            Action::NextItem => self.next_item(),
            Action::PrevItem => self.previous_item(),
            Action::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn app(cols: u16) -> App {
        App::new(Arc::new(AppConfig::default()), cols, 24)
    }

    #[test]
    fn test_labels_cover_viewport() {
        // one pass of the default items is 1600px, 100 columns
        assert_eq!(app(80).labels().len(), 6);
        assert_eq!(app(200).labels().len(), 18);
    }

    #[test]
    fn test_scroll_speeds_up_rail() {
        let mut app = app(80);
        assert!(app.is_attached());

        // 24px in 125ms is 192px/s
        app.scroll_at(1.0, ms(125));
        app.on_frame(ms(16));
        let rate = app.marquee().handle().rate();
        assert!((rate - 3.42).abs() < 1e-9, "rate = {}", rate);

        app.scroll_at(-1.0, ms(250));
        app.on_frame(ms(16));
        assert!(app.marquee().handle().is_reversed());
    }

    #[test]
    fn test_scroll_is_clamped_to_page() {
        let mut app = app(80);
        app.scroll_at(-5.0, ms(10));
        assert_eq!(app.scroll_position, 0.0);
        app.scroll_at(1_000.0, ms(20));
        assert_eq!(app.scroll_position, app.config.ui.page_height);
        assert_eq!(app.page_progress(), 1.0);
    }

    #[test]
    fn test_toggle_controller_detaches() {
        let mut app = app(80);
        app.handle_action(Action::ToggleController);
        assert!(!app.is_attached());

        // scrolling no longer changes the rate
        app.scroll_at(3.0, ms(50));
        app.on_frame(ms(16));
        assert_eq!(app.marquee().handle().rate(), 1.0);

        app.handle_action(Action::ToggleController);
        assert!(app.is_attached());
    }

    #[test]
    fn test_resize_keeps_rate_and_pause() {
        let mut app = app(80);
        app.handle_action(Action::Reverse);
        app.handle_action(Action::TogglePause);
        app.resize(200, 30);

        assert_eq!(app.labels().len(), 18);
        assert_eq!(app.marquee().handle().rate(), -1.0);
        assert!(app.marquee().handle().is_paused());
        assert!(app.is_attached());
    }

    #[test]
    fn test_resize_during_boost_still_relaxes() {
        let mut app = app(80);
        // 120px in 125ms is 960px/s
        app.scroll_at(5.0, ms(125));
        app.on_frame(ms(16));
        let boosted = app.marquee().handle().rate();
        assert!((boosted - 11.1).abs() < 1e-9, "rate = {}", boosted);

        app.resize(200, 30);
        assert_eq!(app.marquee().handle().rate(), boosted);

        for _ in 0..200 {
            app.on_frame(ms(16));
        }
        assert_eq!(app.marquee().handle().rate(), 1.5);

        // scrolling after the rebuild still reaches the controller
        app.scroll_at(-1.0, ms(4000));
        app.on_frame(ms(16));
        assert!(app.marquee().handle().is_reversed());
    }

    #[test]
    fn test_reverse_while_boosted_never_stops() {
        let mut app = app(80);
        app.scroll_at(5.0, ms(125));
        app.on_frame(ms(16));
        app.handle_action(Action::Reverse);
        assert!(app.marquee().handle().is_reversed());

        for _ in 0..60 {
            app.on_frame(ms(16));
            let rate = app.marquee().handle().rate();
            assert!(rate <= -1.5 + 1e-12, "rate = {}", rate);
        }
        assert_eq!(app.marquee().handle().rate(), -1.5);
    }

    #[test]
    fn test_rail_line_fills_viewport() {
        let mut app = app(80);
        let line = app.rail_line();
        assert_eq!(line.chars().count(), 80);
        assert!(line.starts_with("Tactile Poetry"));

        // one second at rate 1 moves the rail 150px, about 9 columns
        app.on_frame(ms(1000));
        let line = app.rail_line();
        assert!(line.starts_with("oetry"), "line = {:?}", line);
    }

    #[test]
    fn test_next_item_moves_marker() {
        let mut app = app(80);
        assert_eq!(app.marquee().handle().current_index(), Some(0));
        app.handle_action(Action::NextItem);
        assert_eq!(app.marquee().handle().current_index(), Some(1));
        app.handle_action(Action::PrevItem);
        app.handle_action(Action::PrevItem);
        assert_eq!(app.marquee().handle().current_index(), Some(5));
    }

    #[test]
    fn test_quit() {
        let mut app = app(80);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
