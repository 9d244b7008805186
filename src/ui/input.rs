//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, LoginFocus, Tab};
use crate::auth::Role;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle password change overlay
    if matches!(app.state, AppState::ChangingPassword) {
        return handle_password_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => app.select_tab(Tab::Rooms),
        KeyCode::Char('2') => app.select_tab(Tab::Bookings),
        KeyCode::Char('3') => app.select_tab(Tab::Users),
        KeyCode::Char('4') => app.select_tab(Tab::Profile),
        KeyCode::Left => {
            let tab = app.current_tab.prev();
            app.select_tab(tab);
        }
        KeyCode::Right => {
            let tab = app.current_tab.next();
            app.select_tab(tab);
        }
        KeyCode::Up => move_selection(app, -1),
        KeyCode::Down => move_selection(app, 1),
        KeyCode::Char('u') => {
            app.refresh_current();
        }
        KeyCode::Char('x') => {
            app.logout();
        }
        KeyCode::Char('m') => {
            // Maintenance toggle is an admin action on the Rooms tab
            let is_admin = app
                .session
                .identity()
                .map(|i| i.role == Role::Admin)
                .unwrap_or(false);
            if app.current_tab == Tab::Rooms && is_admin {
                app.toggle_room_maintenance();
            }
        }
        KeyCode::Char('p') => {
            if app.current_tab == Tab::Profile && app.is_authenticated() {
                app.start_password_change();
            }
        }
        _ => {}
    }

    Ok(false)
}

/// Move the list selection on the current tab, clamped to the list bounds.
fn move_selection(app: &mut App, delta: i64) {
    let (selection, len) = match app.current_tab {
        Tab::Rooms => (&mut app.rooms_selection, app.rooms.len()),
        Tab::Bookings => (&mut app.bookings_selection, app.bookings.len()),
        Tab::Users => (&mut app.users_selection, app.users.len()),
        Tab::Profile => return,
    };

    if len == 0 {
        *selection = 0;
        return;
    }

    let new = (*selection as i64 + delta).clamp(0, len as i64 - 1);
    *selection = new as usize;
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Only an authenticated user can dismiss the login form; with no
            // session there is nothing to go back to.
            if app.is_authenticated() {
                app.state = AppState::Normal;
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                // Failure keeps the form open with the error shown
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(&app.login_username) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(&app.login_password) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }

    Ok(false)
}

async fn handle_password_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.new_password.clear();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.submit_password_change().await?;
        }
        KeyCode::Backspace => {
            app.new_password.pop();
        }
        KeyCode::Char(c) => {
            if can_add_password_char(&app.new_password) {
                app.new_password.push(c);
            }
        }
        _ => {}
    }

    Ok(false)
}
