use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let handle = app.marquee().handle();

        let direction_str = if handle.is_reversed() { "<<" } else { ">>" };
        let state_str = if handle.is_paused() {
            "PAUSED"
        } else if app.is_attached() {
            "REACTIVE"
        } else {
            "FIXED"
        };
        let decay_str = match app.marquee().controller() {
            Some(c) if c.is_decaying() => " | relaxing",
            Some(c) if c.has_pending_decay() => " | boosted",
            _ => "",
        };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            format!(
                " {} | {} {:+.2}x | Items: {} | t {:.2}/{:.2}s{}",
                state_str,
                direction_str,
                handle.rate(),
                handle.len(),
                handle.time(),
                handle.duration(),
                decay_str
            )
        };

        let help_hint = " q:quit j/k:scroll r:reverse a:react n/p:item ";
        let padding_len = area
            .width
            .saturating_sub(status_text.len() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
