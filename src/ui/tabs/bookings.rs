use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_booking_list(frame, app, chunks[0]);
    render_booking_detail(frame, app, chunks[1]);
}

fn render_booking_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .bookings
        .iter()
        .enumerate()
        .map(|(i, booking)| {
            let line = Line::from(vec![
                Span::raw(format!(
                    "{:<20} {:<23}  ",
                    truncate(&booking.customer_name, 20),
                    booking.stay_display(),
                )),
                Span::styled(
                    booking.status.display_name(),
                    styles::booking_status_style(booking.status),
                ),
            ]);

            let style = if i == app.bookings_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Bookings ({}) ", app.bookings.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.bookings_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_booking_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.bookings.get(app.bookings_selection);

    let (title, content) = match selected {
        Some(booking) => {
            let title = format!(" {} ", booking.customer_name);

            // Resolve the room number from the loaded rooms, if present
            let room_label = app
                .rooms
                .iter()
                .find(|r| r.id.as_deref() == Some(booking.room_id.as_str()))
                .map(|r| format!("Room {}", r.room_number))
                .unwrap_or_else(|| booking.room_id.clone());

            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Room:     ", styles::highlight_style()),
                    Span::raw(room_label),
                ]),
                Line::from(vec![
                    Span::styled("Stay:     ", styles::highlight_style()),
                    Span::raw(format!(
                        "{} ({} nights)",
                        booking.stay_display(),
                        booking.nights()
                    )),
                ]),
                Line::from(vec![
                    Span::styled("Guests:   ", styles::highlight_style()),
                    Span::raw(booking.number_of_guests.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Total:    ", styles::highlight_style()),
                    Span::raw(format!("{:.2}", booking.total_price)),
                ]),
                Line::from(vec![
                    Span::styled("Status:   ", styles::highlight_style()),
                    Span::styled(
                        booking.status.display_name(),
                        styles::booking_status_style(booking.status),
                    ),
                ]),
            ];

            if let Some(ref phone) = booking.customer_phone {
                lines.push(Line::from(vec![
                    Span::styled("Phone:    ", styles::highlight_style()),
                    Span::raw(phone.clone()),
                ]));
            }

            if let Some(ref requests) = booking.special_requests {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Special requests:",
                    styles::highlight_style(),
                )));
                lines.push(Line::from(format!("  {}", requests)));
            }

            (title, lines)
        }
        None => (
            " No Booking Selected ".to_string(),
            vec![Line::from(Span::styled(
                "No bookings loaded",
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
    fn truncate_handles_multibyte_customer_names() {
        assert_eq!(truncate("José", 20), "José");
        assert_eq!(truncate("Ariadna Müller-Østergård", 10), "Ariadna...");
        assert_eq!(truncate("ñññññññññ", 8), "ññ...");
    }
}
