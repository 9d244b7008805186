use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let active_style = if user.is_active {
                styles::success_style()
            } else {
                styles::error_style()
            };

            let line = Line::from(vec![
                Span::raw(format!(
                    "{:<16} {:<24} {:<12}  ",
                    truncate(&user.username, 16),
                    truncate(&user.name, 24),
                    user.role.display_name(),
                )),
                Span::styled(user.status_display(), active_style),
            ]);

            let style = if i == app.users_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Users ({}) ", app.users.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.users_selection));

    frame.render_stateful_widget(list, area, &mut state);
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
    fn truncate_handles_multibyte_display_names() {
        assert_eq!(truncate("Søren Kierkegaard", 10), "Søren K...");
        assert_eq!(truncate("ùùùùùùùùù", 8), "ùù...");
    }
}
