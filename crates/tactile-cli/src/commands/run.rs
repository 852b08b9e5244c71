use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::info;

use tactile_core::AppConfig;
use tactile_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, Action},
    widgets::{RailWidget, StatusBarWidget},
};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Tactile"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = main_loop(&mut terminal, config);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn main_loop<B: Backend>(terminal: &mut Terminal<B>, config: Arc<AppConfig>) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config.clone(), size.width, size.height);
    let event_handler = EventHandler::new(config.ui.frame_interval());
    info!(
        fps = config.ui.animation_fps,
        frame_ms = event_handler.frame_interval().as_millis() as u64,
        "Marquee started"
    );

    let mut last_frame = Instant::now();

    loop {
        // Advance by real elapsed time so slow frames do not slow the rail
        let now = Instant::now();
        app.on_frame(now - last_frame);
        last_frame = now;

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: rail + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(area);

            RailWidget::render(frame, main_layout[0], &app);
            StatusBarWidget::render(frame, main_layout[1], &app);
        })?;

        if let Some(event) = event_handler.next()? {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key);
                    if !matches!(action, Action::None | Action::TogglePause) {
                        app.clear_status();
                    }
                    app.handle_action(action);
                }
                AppEvent::Wheel(notches) => {
                    app.handle_action(Action::Scroll(f64::from(notches)));
                }
                AppEvent::Resize(width, height) => {
                    app.resize(width, height);
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("Marquee stopped");
    Ok(())
}
