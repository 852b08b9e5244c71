use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;

/// The marquee rail, vertically centered, with the page gauge below it
pub struct RailWidget;

impl RailWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let handle = app.marquee().handle();
        let edge_color = if handle.is_reversed() {
            theme.backward
        } else {
            theme.forward
        };

        let rail = Paragraph::new(Line::from(Span::styled(
            app.rail_line(),
            Style::default()
                .fg(theme.rail)
                .bg(theme.bg0)
                .add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::BOTTOM)
                .border_style(Style::default().fg(edge_color)),
        );
        frame.render_widget(rail, chunks[1]);

        let caption = match handle.current_index().and_then(|i| app.labels().get(i)) {
            Some(label) => format!("{}  ·  {:.2}x", label, handle.rate()),
            None => "nothing to show".to_string(),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(caption, Style::default().fg(theme.grey1)))
                .alignment(Alignment::Center),
            chunks[2],
        );

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.accent).bg(theme.bg2))
            .ratio(app.page_progress())
            .label(format!("page {:>3.0}%", app.page_progress() * 100.0));
        frame.render_widget(gauge, chunks[4]);
    }
}
