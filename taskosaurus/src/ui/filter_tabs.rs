//! Filter selector with per-filter counts.

use ratatui::{Frame, layout::Rect, text::Line, widgets::Tabs};

use taskosaurus_proto::filter::FilterMode;

use super::theme;
use crate::app::App;

/// Render `All | Active | Completed` with the current filter highlighted.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.tasks.active_count();
    let completed = app.tasks.completed_count();

    let titles = FilterMode::ALL.iter().map(|mode| {
        let count = match mode {
            FilterMode::All => active + completed,
            FilterMode::Active => active,
            FilterMode::Completed => completed,
        };
        Line::from(format!("{} ({count})", mode.label()))
    });
    let selected = FilterMode::ALL
        .iter()
        .position(|&m| m == app.tasks.filter())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(theme::dimmed())
        .highlight_style(theme::highlighted())
        .divider(" | ");
    frame.render_widget(tabs, area);
}
