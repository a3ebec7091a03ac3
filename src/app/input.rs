//! Input handling for the application.
//!
//! Handles key events for the normal and editing modes.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::ui::Tab;

use super::{App, InputMode};

impl App {
    /// Handles a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Editing => self.handle_editing_key(key),
        }
    }

    /// Handles keys in normal mode.
    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(tab) = Tab::from_digit(c) {
                    self.set_tab(tab);
                }
            }
            KeyCode::Tab => self.set_tab(self.tab().next()),
            KeyCode::BackTab => self.set_tab(self.tab().previous()),
            KeyCode::Char('/') => self.begin_editing(),
            KeyCode::Char('n') => self.load_more(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('s') => self.sync(),
            KeyCode::Char('h') => {
                self.check_health();
                self.set_status("Checking API health");
            }
            KeyCode::Char('e') => self.clear_error(),
            KeyCode::Esc => self.clear_filter(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-10),
            KeyCode::PageDown => self.scroll_by(10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll[self.tab.index()] = 0,
            _ => {}
        }
    }

    /// Handles keys while editing the input line.
    fn handle_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => {
                self.edit_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => self.edit_buffer.push(c),
            _ => {}
        }
    }

    /// Starts editing the active tab's filter or query.
    fn begin_editing(&mut self) {
        if self.tab == Tab::Dashboard {
            return;
        }
        self.edit_buffer = self.filter_for(self.tab).to_string();
        self.input_mode = InputMode::Editing;
    }

    /// Commits the edit buffer.
    fn submit_input(&mut self) {
        self.input_mode = InputMode::Normal;
        let text = std::mem::take(&mut self.edit_buffer);

        if self.tab == Tab::Search {
            self.search(&text);
            return;
        }

        if let Some(filter) = self.filter_mut(self.tab) {
            *filter = text.trim().to_string();
        }
        self.apply_filter();
    }

    /// Clears the active tab's filter and reloads the unfiltered page.
    fn clear_filter(&mut self) {
        let had_filter = self
            .filter_mut(self.tab)
            .map(|filter| {
                let had = !filter.is_empty();
                filter.clear();
                had
            })
            .unwrap_or(false);
        if had_filter && self.tab != Tab::Search {
            self.apply_filter();
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        let slot = &mut self.scroll[self.tab.index()];
        *slot = slot.saturating_add_signed(delta);
    }
}
