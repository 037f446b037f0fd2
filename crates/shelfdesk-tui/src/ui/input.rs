//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, FormItem, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Alerts block everything until dismissed
    if !app.alerts.is_empty() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')) {
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

    handle_normal_input(app, key);
    Ok(false)
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    // Keys that work regardless of focus
    match key.code {
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
            return;
        }
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
            return;
        }
        KeyCode::Left => {
            app.select_tab(app.current_tab.prev());
            return;
        }
        KeyCode::Right => {
            app.select_tab(app.current_tab.next());
            return;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.focus_next();
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.focus_prev();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_result_down(PAGE_SCROLL_SIZE);
            return;
        }
        KeyCode::PageUp => {
            app.scroll_result_up(PAGE_SCROLL_SIZE);
            return;
        }
        _ => {}
    }

    match app.focused_item() {
        Some(FormItem::Field(field)) => match key.code {
            KeyCode::Enter => app.focus_next(),
            KeyCode::Backspace => app.pop_char(field),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.clear_field(field)
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.push_char(field, c)
            }
            _ => {}
        },
        Some(FormItem::Button(action)) => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.dispatch(action),
            KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
            KeyCode::Char('?') => app.state = AppState::ShowingHelp,
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                if let Some(tab) = Tab::ALL.get(index) {
                    app.select_tab(*tab);
                }
            }
            _ => {}
        },
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Action, FieldId};
    use shelfdesk_core::{Config, SessionClient};

    fn test_app() -> App {
        let client = SessionClient::new("http://127.0.0.1:9/api").expect("client");
        App::with_client(Config::default(), client)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, key(code)).await.expect("input")
    }

    #[tokio::test]
    async fn test_typing_into_focused_field() {
        let mut app = test_app();
        app.select_tab(Tab::Loans);
        for c in "42x".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Backspace).await;
        assert_eq!(app.field(FieldId::LoanId), "42");

        // 'q' is text while a field has focus
        press(&mut app, KeyCode::Char('q')).await;
        assert_eq!(app.field(FieldId::LoanId), "42q");
        assert_eq!(app.state, AppState::Normal);

        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        handle_input(&mut app, ctrl_u).await.expect("input");
        assert_eq!(app.field(FieldId::LoanId), "");
    }

    #[tokio::test]
    async fn test_enter_advances_through_fields() {
        let mut app = test_app();
        assert_eq!(app.focused_field(), Some(FieldId::Email));
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.focused_field(), Some(FieldId::Password));
        press(&mut app, KeyCode::Up).await;
        assert_eq!(app.focused_field(), Some(FieldId::Email));
    }

    #[tokio::test]
    async fn test_digits_switch_tabs_only_on_buttons() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3')).await;
        assert_eq!(app.current_tab, Tab::Session);

        app.select_tab(Tab::Notifications);
        assert!(matches!(app.focused_item(), Some(FormItem::Button(_))));
        press(&mut app, KeyCode::Char('2')).await;
        assert_eq!(app.current_tab, Tab::Books);
    }

    #[tokio::test]
    async fn test_arrows_cycle_tabs() {
        let mut app = test_app();
        press(&mut app, KeyCode::Left).await;
        assert_eq!(app.current_tab, Tab::Notifications);
        press(&mut app, KeyCode::Right).await;
        assert_eq!(app.current_tab, Tab::Session);
    }

    #[tokio::test]
    async fn test_enter_on_button_dispatches() {
        let mut app = test_app();
        app.select_tab(Tab::Notifications);
        assert_eq!(app.focused_item(), Some(FormItem::Button(Action::DueReminders)));
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.in_flight, 1);
    }

    #[tokio::test]
    async fn test_alert_blocks_until_dismissed() {
        let mut app = test_app();
        app.alerts.push_back("Please log in first!".to_string());

        press(&mut app, KeyCode::Right).await;
        assert_eq!(app.current_tab, Tab::Session);

        press(&mut app, KeyCode::Enter).await;
        assert!(app.alerts.is_empty());
        press(&mut app, KeyCode::Right).await;
        assert_eq!(app.current_tab, Tab::Books);
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let mut app = test_app();
        assert!(!press(&mut app, KeyCode::Esc).await);
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')).await);
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Esc).await;
        assert!(press(&mut app, KeyCode::Char('y')).await);
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_help_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::F(1)).await;
        assert_eq!(app.state, AppState::ShowingHelp);
        // Typing is ignored while help is open
        press(&mut app, KeyCode::Char('x')).await;
        assert_eq!(app.field(FieldId::Email), "");
        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state, AppState::Normal);
    }
}
