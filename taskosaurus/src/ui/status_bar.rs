//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, PanelFocus};
use crate::client::NoticeLevel;

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.tasks.editing_id().is_some() {
        "Enter: save | Esc: cancel"
    } else {
        match app.focus {
            PanelFocus::Input => "Enter: add | Tab: tasks | Esc: quit",
            PanelFocus::List => {
                "Space: toggle | e: edit | d: delete | c: clear done | a/o/x: filter | Tab: input"
            }
        }
    };

    let dot_color = if app.tasks.has_pending() {
        theme::WARNING
    } else {
        theme::SUCCESS
    };

    let mut spans = vec![
        Span::styled(
            concat!("Taskosaurus v", env!("CARGO_PKG_VERSION")),
            theme::bold(),
        ),
        Span::raw(" | "),
        Span::styled("\u{25cf}", theme::normal().fg(dot_color)),
        Span::raw(format!(" {}", app.backend_label)),
        Span::raw(" | "),
    ];
    match app.tasks.notice() {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => theme::SUCCESS,
                NoticeLevel::Error => theme::ERROR,
            };
            spans.push(Span::styled(notice.text.as_str(), theme::normal().fg(color)));
        }
        None => spans.push(Span::styled(help_text, theme::dimmed())),
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
