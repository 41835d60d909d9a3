//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, LoadState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Status messages last until the next key
    app.clear_status();

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return false;
    }

    if matches!(app.state, AppState::EditingPageSize) {
        handle_page_size_input(app, key);
        return false;
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        KeyCode::Char('r') => app.retry_load(),
        KeyCode::Char('u') => app.refresh(),
        _ => {}
    }

    // The rest only makes sense with a list to browse
    if app.load_state != LoadState::Ready {
        return false;
    }

    match key.code {
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Esc => {
            if !app.view.search_text.is_empty() {
                app.set_search("");
            }
        }
        KeyCode::Char('c') => app.next_city(),
        KeyCode::Char('C') => app.prev_city(),
        KeyCode::Char('f') => app.toggle_favourites_only(),
        KeyCode::Char('n') => app.start_page_size_edit(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected_favourite(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => app.next_page(),
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => app.prev_page(),
        KeyCode::Home => app.first_page(),
        KeyCode::End => app.last_page(),
        _ => {}
    }
    false
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.set_search("");
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
}

fn handle_page_size_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.page_size_input.clear();
        }
        KeyCode::Enter => {
            app.apply_page_size();
        }
        KeyCode::Backspace => {
            app.page_size_input.pop();
        }
        KeyCode::Char(c) => app.push_page_size_digit(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankbranch_core::models::{BankRecord, City};
    use bankbranch_core::Config;
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready_app(dir: &TempDir) -> App {
        let records: Vec<BankRecord> = (0..15)
            .map(|i| BankRecord {
                ifsc: format!("M{:03}", i),
                bank_id: i,
                branch: format!("BRANCH {}", i),
                address: "LINK ROAD".to_string(),
                city: "Mumbai".to_string(),
                district: "MUMBAI".to_string(),
                state: "MAHARASHTRA".to_string(),
                bank_name: "TEST BANK".to_string(),
                favourite: false,
            })
            .collect();
        bankbranch_core::CacheManager::new(dir.path().to_path_buf())
            .unwrap()
            .save_branches(&records)
            .unwrap();

        let config = Config::default()
            .with_env_overrides(None, Some(dir.path().display().to_string()));
        let mut app = App::new(config).unwrap();
        app.start_load();
        app
    }

    #[test]
    fn test_quit_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = ready_app(&dir);

        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q')));
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_search_mode_captures_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = ready_app(&dir);

        handle_input(&mut app, key(KeyCode::Char('/')));
        for c in "branch 1".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        // 'q' and 'c' are text here, not commands
        assert_eq!(app.state, AppState::Searching);
        assert_eq!(app.view.search_text, "branch 1");
        assert_eq!(app.view.city_filter, City::Mumbai);

        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Normal);
        // BRANCH 1 and BRANCH 10..14
        assert_eq!(app.projection().total_matches, 6);

        handle_input(&mut app, key(KeyCode::Esc));
        assert!(app.view.search_text.is_empty());
    }

    #[test]
    fn test_favourite_and_filter_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = ready_app(&dir);

        handle_input(&mut app, key(KeyCode::Down));
        handle_input(&mut app, key(KeyCode::Char(' ')));
        assert!(app.store.get(1).unwrap().favourite);

        handle_input(&mut app, key(KeyCode::Char('f')));
        assert!(app.view.favourites_only);
        assert_eq!(app.projection().total_matches, 1);

        handle_input(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.view.city_filter, City::Delhi);
        handle_input(&mut app, key(KeyCode::Char('C')));
        assert_eq!(app.view.city_filter, City::Mumbai);
    }

    #[test]
    fn test_page_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = ready_app(&dir);

        handle_input(&mut app, key(KeyCode::Right));
        assert_eq!(app.view.active_page, 2);
        handle_input(&mut app, key(KeyCode::Right));
        assert_eq!(app.view.active_page, 2);
        handle_input(&mut app, key(KeyCode::Home));
        assert_eq!(app.view.active_page, 1);

        handle_input(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::EditingPageSize);
        handle_input(&mut app, key(KeyCode::Backspace));
        handle_input(&mut app, key(KeyCode::Backspace));
        handle_input(&mut app, key(KeyCode::Char('4')));
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.view.items_per_page, 4);
        handle_input(&mut app, key(KeyCode::End));
        assert_eq!(app.view.active_page, 4);
    }

    #[test]
    fn test_status_message_cleared_by_next_key() {
        let dir = TempDir::new().unwrap();
        let mut app = ready_app(&dir);

        handle_input(&mut app, key(KeyCode::Char('n')));
        app.page_size_input.clear();
        handle_input(&mut app, key(KeyCode::Enter));
        assert!(app.status_message.is_some());
        assert_eq!(app.state, AppState::EditingPageSize);

        handle_input(&mut app, key(KeyCode::Char('5')));
        assert!(app.status_message.is_none());
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.view.items_per_page, 5);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_browse_keys_ignored_until_loaded() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("branches.json"), "garbage").unwrap();
        let config = Config::default()
            .with_env_overrides(None, Some(dir.path().display().to_string()));
        let mut app = App::new(config).unwrap();
        app.start_load();
        assert!(matches!(app.load_state, LoadState::Failed(_)));

        handle_input(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.state, AppState::Normal);
        handle_input(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::ShowingHelp);
    }
}
