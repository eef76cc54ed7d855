use crate::app::types::{App, InputMode, Phase};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        match self.phase {
            // Any key dismisses the error screen.
            Phase::Failed(_) => self.quit(),
            Phase::Connecting => {}
            Phase::Listing => match self.input_mode {
                InputMode::Normal => self.handle_normal_key(key),
                InputMode::Search => self.handle_search_key(key),
            },
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => {
                if self.list.filter().is_empty() {
                    self.quit();
                } else {
                    self.clear_search();
                }
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Char('/') => self.enter_search_mode(),
            KeyCode::Char('j') | KeyCode::Down => self.list.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.list.select_previous(),
            KeyCode::PageDown => self.list.page_down(),
            KeyCode::PageUp => self.list.page_up(),
            KeyCode::Char('g') | KeyCode::Home => self.list.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.list.select_last(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.clear_search(),
            KeyCode::Enter => self.activate(),
            KeyCode::Backspace => self.list.pop_filter_char(),
            KeyCode::Down => self.list.select_next(),
            KeyCode::Up => self.list.select_previous(),
            KeyCode::PageDown => self.list.page_down(),
            KeyCode::PageUp => self.list.page_up(),
            KeyCode::Char(c) => self.list.push_filter_char(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{App, InputMode, Outcome, Phase};
    use crate::models::HostRecord;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn host(name: &str) -> HostRecord {
        HostRecord {
            name: name.to_string(),
            hostname: name.to_string(),
            user: "alice".to_string(),
            port: "22".to_string(),
            identity_file: "/home/alice/.ssh/id_rsa".to_string(),
        }
    }

    fn app(program: &str) -> App {
        App::new(vec![host("web"), host("db"), host("cache")], program)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn quit_without_selection() {
        let mut app = app("sh");
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
        assert_eq!(app.outcome(), Outcome::Quit);
    }

    #[test]
    fn ctrl_c_quits_from_search() {
        let mut app = app("sh");
        press(&mut app, KeyCode::Char('/'));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.list.filter(), "");
    }

    #[cfg(unix)]
    #[test]
    fn enter_connects_to_highlighted_host() {
        let mut app = app("sh");
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        assert!(app.should_quit);
        assert!(app.is_connecting());
        assert_eq!(app.outcome(), Outcome::Connect(host("db")));
    }

    #[cfg(unix)]
    #[test]
    fn activation_while_connecting_is_ignored() {
        let mut app = app("sh");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.selected_host, Some(host("web")));
    }

    #[cfg(unix)]
    #[test]
    fn search_filters_then_connects() {
        let mut app = app("sh");
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Search);
        type_text(&mut app, "CA");
        assert_eq!(app.list.visible_len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.outcome(), Outcome::Connect(host("cache")));
    }

    #[test]
    fn search_without_matches_ignores_enter() {
        let mut app = app("sh");
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "nomatch");
        press(&mut app, KeyCode::Enter);

        assert!(!app.should_quit);
        assert_eq!(app.phase, Phase::Listing);
        assert_eq!(app.list.hosts().len(), 3);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.list.visible_len(), 3);
    }

    #[test]
    fn missing_program_shows_error_then_quits() {
        let mut app = app("definitely-not-a-real-program-xyz");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.phase, Phase::Failed(_)));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('x'));
        assert!(app.should_quit);
        assert!(matches!(app.outcome(), Outcome::Failed(msg) if msg.contains("not found")));
    }

    #[test]
    fn resize_recomputes_page_size() {
        let mut app = app("sh");
        app.on_resize(80, 27);
        assert_eq!(app.list.page_size(), 10);
        app.on_resize(80, 3);
        assert_eq!(app.list.page_size(), 1);
    }
}
