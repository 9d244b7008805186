use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    // The identity comes from the session token; the rest of the profile is
    // fetched from /users/me and may still be loading.
    if let Some(identity) = app.session.identity() {
        lines.push(Line::from(vec![
            Span::styled("Username: ", styles::highlight_style()),
            Span::raw(identity.username.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Role:     ", styles::highlight_style()),
            Span::raw(identity.role.display_name()),
        ]));
    }

    match app.profile {
        Some(ref profile) => {
            lines.push(Line::from(vec![
                Span::styled("Name:     ", styles::highlight_style()),
                Span::raw(profile.name.clone()),
            ]));
            if let Some(ref email) = profile.email {
                lines.push(Line::from(vec![
                    Span::styled("Email:    ", styles::highlight_style()),
                    Span::raw(email.clone()),
                ]));
            }
            if let Some(ref phone) = profile.phone {
                lines.push(Line::from(vec![
                    Span::styled("Phone:    ", styles::highlight_style()),
                    Span::raw(phone.clone()),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled("Account:  ", styles::highlight_style()),
                Span::raw(profile.status_display()),
            ]));
        }
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Loading profile...",
                styles::muted_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Press ", styles::muted_style()),
        Span::styled("p", styles::help_key_style()),
        Span::styled(" to change your password", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
