use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};
use crate::auth::Access;

use super::styles;
use super::tabs::{bookings, profile, rooms, users};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::ChangingPassword) {
        render_password_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  StayDesk";

    // Identity readout on the right edge
    let identity_text = match app.session.identity() {
        Some(identity) => format!(
            "{} ({})  [?] Help",
            identity.username,
            identity.role.display_name()
        ),
        None => "Not signed in  [?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + identity_text.len() as u16 + 4)
                as usize,
        )),
        Span::styled(identity_text, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        ("[1] Rooms", Tab::Rooms),
        ("[2] Bookings", Tab::Bookings),
        ("[3] Users", Tab::Users),
        ("[4] Profile", Tab::Profile),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, tab)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }

        // Tabs the current role cannot open are shown dimmed; selecting one
        // still routes through the guard, which lands on the unauthorized
        // view rather than hiding the rule.
        let accessible = matches!(
            tab.guard().evaluate(&app.session),
            Access::Granted | Access::Loading
        );

        let style = if *tab == app.current_tab {
            styles::tab_style(true)
        } else if accessible {
            Style::default().fg(ratatui::style::Color::White)
        } else {
            styles::muted_style()
        };
        spans.push(Span::styled(*label, style));
    }

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab.guard().evaluate(&app.session) {
        Access::Loading => render_loading(frame, area),
        Access::DeniedUnauthenticated => render_signed_out(frame, area),
        Access::DeniedWrongRole => render_unauthorized(frame, app, area),
        Access::Granted => match app.current_tab {
            Tab::Rooms => rooms::render(frame, app, area),
            Tab::Bookings => bookings::render(frame, app, area),
            Tab::Users => users::render(frame, app, area),
            Tab::Profile => profile::render(frame, app, area),
        },
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(Line::from(Span::styled(
        "  Restoring session...",
        styles::muted_style(),
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

fn render_signed_out(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(Line::from(Span::styled(
        "  Sign in to view this data",
        styles::muted_style(),
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

fn render_unauthorized(frame: &mut Frame, app: &App, area: Rect) {
    let role = app
        .session
        .identity()
        .map(|i| i.role.display_name())
        .unwrap_or("unknown");

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Access denied",
            styles::error_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "  Your role ({}) does not have access to the {} view.",
                role,
                app.current_tab.title()
            ),
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("1-4", styles::help_key_style()),
            Span::styled(" to switch to an allowed view, or ", styles::muted_style()),
            Span::styled("x", styles::help_key_style()),
            Span::styled(" to sign out.", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Unauthorized ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [x] sign out | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        String::from(" Ready ")
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(52, 22, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            "    ╔═╗╔╦╗╔═╗╦ ╦╔╦╗╔═╗╔═╗╦╔═",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "    ╚═╗ ║ ╠═╣╚╦╝ ║║║╣ ╚═╗╠╩╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "    ╚═╝ ╩ ╩ ╩ ╩ ═╩╝╚═╝╚═╝╩ ╩",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("          version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-4       ", styles::help_key_style()),
            Span::styled("Switch tabs", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", styles::help_key_style()),
            Span::styled("Prev/next tab", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", styles::help_key_style()),
            Span::styled("Navigate list", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  u         ", styles::help_key_style()),
            Span::styled("Refresh data from server", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  m         ", styles::help_key_style()),
            Span::styled("Toggle room maintenance (admin)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  p         ", styles::help_key_style()),
            Span::styled("Change password (Profile tab)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  x         ", styles::help_key_style()),
            Span::styled("Sign out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(46, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];

    lines.push(Line::from(Span::styled(
        "         ╔═╗╔╦╗╔═╗╦ ╦╔╦╗╔═╗╔═╗╦╔═",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "         ╚═╗ ║ ╠═╣╚╦╝ ║║║╣ ╚═╗╠╩╗",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "         ╚═╝ ╩ ╩ ╩ ╩ ═╩╝╚═╝╚═╝╩ ╩",
        styles::title_style(),
    )));
    lines.push(Line::from(""));

    // Username field
    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let username_display = format!("{:<16}", app.login_username);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(format!("{}{}", username_display, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Password field (masked)
    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.len().min(16));
    let password_display = format!("{:<16}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Login button
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    if button_focused {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled(" ▶ Sign in ◀ ", button_style),
            Span::raw("]"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled("   Sign in   ", button_style),
            Span::raw("]"),
        ]));
    }

    // Error message
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_password_overlay(frame: &mut Frame, app: &App) {
    let height = if app.password_error.is_some() { 10 } else { 8 };
    let area = centered_rect_fixed(46, height, frame.area());

    frame.render_widget(Clear, area);

    let masked: String = "*".repeat(app.new_password.len().min(16));
    let display = format!("{:<16}", masked);

    let mut lines = vec![
        Line::from(Span::styled(
            "  Change password",
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("New password: [", styles::muted_style()),
            Span::styled(format!("{}▌", display), styles::selected_style()),
            Span::styled("]", styles::muted_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("Enter", styles::help_key_style()),
            Span::styled(" to save, ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    if let Some(ref error) = app.password_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 9, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "         ╔═╗╔╦╗╔═╗╦ ╦╔╦╗╔═╗╔═╗╦╔═",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "         ╚═╗ ║ ╠═╣╚╦╝ ║║║╣ ╚═╗╠╩╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "         ╚═╝ ╩ ╩ ╩ ╩ ═╩╝╚═╝╚═╝╩ ╩",
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
