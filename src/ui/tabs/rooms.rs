use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::auth::Role;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_room_list(frame, app, chunks[0]);
    render_room_detail(frame, app, chunks[1]);
}

fn render_room_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .rooms
        .iter()
        .enumerate()
        .map(|(i, room)| {
            let line = Line::from(vec![
                Span::raw(format!(
                    "{:<8} {:<14} {:>10.2}  ",
                    truncate(&room.room_number, 8),
                    truncate(&room.room_type, 14),
                    room.price,
                )),
                Span::styled(
                    room.status.display_name(),
                    styles::room_status_style(room.status),
                ),
            ]);

            let style = if i == app.rooms_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Rooms ({}) ", app.rooms.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.rooms_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_room_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.rooms.get(app.rooms_selection);

    let (title, content) = match selected {
        Some(room) => {
            let title = format!(" Room {} ", room.room_number);

            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Type:     ", styles::highlight_style()),
                    Span::raw(room.room_type.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Price:    ", styles::highlight_style()),
                    Span::raw(format!("{:.2} / night", room.price)),
                ]),
                Line::from(vec![
                    Span::styled("Status:   ", styles::highlight_style()),
                    Span::styled(
                        room.status.display_name(),
                        styles::room_status_style(room.status),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Features: ", styles::highlight_style()),
                    Span::raw(room.features_display()),
                ]),
            ];

            let is_admin = app
                .session
                .identity()
                .map(|i| i.role == Role::Admin)
                .unwrap_or(false);
            if is_admin {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Press ", styles::muted_style()),
                    Span::styled("m", styles::help_key_style()),
                    Span::styled(" to toggle maintenance", styles::muted_style()),
                ]));
            }

            (title, lines)
        }
        None => (
            " No Room Selected ".to_string(),
            vec![Line::from(Span::styled(
                "No rooms loaded",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        // Back the cut off to a char boundary so multibyte text cannot panic
        let mut end = max_len.saturating_sub(3);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 8), "short");
        assert_eq!(truncate("a very long room type", 8), "a ver...");
        // 9 two-byte chars, cut would land mid-char without the boundary walk
        assert_eq!(truncate("ééééééééé", 8), "éé...");
    }
}
