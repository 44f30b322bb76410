//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use taskosaurus_proto::filter::FilterMode;
use taskosaurus_proto::task::Task;

use super::theme;
use crate::app::{App, PanelFocus};
use crate::client::{EditState, LoadState};

/// Render the visible tasks, or a placeholder while loading or when empty.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == PanelFocus::List || app.tasks.editing_id().is_some();
    let title = format!(
        "Tasks ({} left{})",
        app.tasks.active_count(),
        if app.tasks.clear_in_progress() {
            ", clearing"
        } else {
            ""
        }
    );
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::border(focused));

    let visible = app.tasks.visible_tasks();
    if visible.is_empty() {
        let placeholder = match app.tasks.load_state() {
            LoadState::Loading => Line::styled("Loading tasks...", theme::pending()),
            LoadState::Failed(e) => Line::styled(
                format!("Could not load tasks: {e}"),
                theme::normal().fg(theme::ERROR),
            ),
            LoadState::Idle | LoadState::Ready => Line::styled(
                match app.tasks.filter() {
                    FilterMode::All => "Nothing to do. Add a task above.",
                    FilterMode::Active => "No active tasks.",
                    FilterMode::Completed => "No completed tasks.",
                },
                theme::dimmed(),
            ),
        };
        frame.render_widget(Paragraph::new(placeholder).block(block), area);
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|task| task_item(app, task)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(if focused {
            theme::selected()
        } else {
            theme::bold()
        })
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn task_item<'a>(app: &'a App, task: &'a Task) -> ListItem<'a> {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };

    if let EditState::Editing { id, buffer } = app.tasks.edit_state()
        && id == &task.id
    {
        return ListItem::new(Line::from(vec![
            Span::styled(checkbox, theme::normal()),
            Span::raw(" "),
            Span::styled(format!("{buffer}\u{258f}"), theme::editing()),
        ]));
    }

    let style = if task.completed {
        theme::completed()
    } else {
        theme::normal()
    };
    let mut spans = vec![
        Span::styled(checkbox, style),
        Span::raw(" "),
        Span::styled(task.text.as_str(), style),
    ];
    if app.tasks.is_pending(&task.id) {
        spans.push(Span::styled(" \u{22ef}", theme::pending()));
    }
    ListItem::new(Line::from(spans))
}
