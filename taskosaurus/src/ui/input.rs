//! New-task input box rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the input box and place the terminal cursor in it when focused.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == PanelFocus::Input && app.tasks.editing_id().is_none();

    let block = Block::default()
        .title(Span::styled("What needs to be done?", theme::bold()))
        .borders(Borders::ALL)
        .border_style(theme::border(focused));

    let paragraph = Paragraph::new(app.input.as_str())
        .style(theme::normal())
        .block(block);
    frame.render_widget(paragraph, area);

    if focused {
        let offset = u16::try_from(app.cursor_position).unwrap_or(u16::MAX);
        let max_x = area.x + area.width.saturating_sub(2);
        frame.set_cursor_position((
            area.x.saturating_add(1).saturating_add(offset).min(max_x),
            area.y + 1,
        ));
    }
}
