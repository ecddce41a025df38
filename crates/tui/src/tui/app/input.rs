use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{App, ConfirmChoice, FormField, InputMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NormalAction {
    Quit,
    EnterAdd,
    EnterEdit,
    EnterSearch,
    ClearSearch,
    ToggleCompleted,
    Delete,
    Refresh,
    ToggleTheme,
    ShowHelp,
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    NextTab,
    PrevTab,
}

impl NormalAction {
    fn from_event(key: &KeyEvent) -> Option<Self> {
        if matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('a') => Some(Self::EnterAdd),
            KeyCode::Char('e') | KeyCode::Enter => Some(Self::EnterEdit),
            KeyCode::Char('/') => Some(Self::EnterSearch),
            KeyCode::Char('c') => Some(Self::ClearSearch),
            KeyCode::Char(' ') | KeyCode::Char('d') => Some(Self::ToggleCompleted),
            KeyCode::Char('x') | KeyCode::Delete => Some(Self::Delete),
            KeyCode::Char('r') => Some(Self::Refresh),
            KeyCode::Char('t') => Some(Self::ToggleTheme),
            KeyCode::Char('h') | KeyCode::Char('?') => Some(Self::ShowHelp),
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Home | KeyCode::Char('g') => Some(Self::SelectFirst),
            KeyCode::End | KeyCode::Char('G') => Some(Self::SelectLast),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => Some(Self::NextTab),
            KeyCode::BackTab | KeyCode::Left => Some(Self::PrevTab),
            _ => None,
        }
    }
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Add | InputMode::Edit => self.handle_form_mode(key),
            InputMode::Search => self.handle_search_mode(key),
            InputMode::Help => self.handle_help_mode(key),
            InputMode::ConfirmDelete => self.handle_confirm_delete_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if let Some(action) = NormalAction::from_event(&key) {
            self.execute_normal_action(action);
        }
    }

    fn execute_normal_action(&mut self, action: NormalAction) {
        match action {
            NormalAction::Quit => self.should_quit = true,
            NormalAction::EnterAdd => self.begin_add(),
            NormalAction::EnterEdit => self.begin_edit(),
            NormalAction::EnterSearch => self.begin_search(),
            NormalAction::ClearSearch => {
                self.clear_search();
                self.set_status_info("Search cleared");
            }
            NormalAction::ToggleCompleted => self.toggle_selected(),
            NormalAction::Delete => self.prompt_delete(),
            NormalAction::Refresh => self.reload(),
            NormalAction::ToggleTheme => self.toggle_theme(),
            NormalAction::ShowHelp => self.show_help(),
            NormalAction::SelectNext => self.select_next(),
            NormalAction::SelectPrev => self.select_prev(),
            NormalAction::SelectFirst => self.select_first(),
            NormalAction::SelectLast => self.select_last(),
            NormalAction::NextTab => self.next_status_tab(),
            NormalAction::PrevTab => self.prev_status_tab(),
        }
    }

    fn handle_form_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.close_form();
                self.status = None;
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.form.switch_focus()
            }
            KeyCode::Backspace => self.form.focused_mut().backspace(),
            KeyCode::Delete => self.form.focused_mut().delete_char(),
            KeyCode::Left => self.form.focused_mut().move_left(),
            KeyCode::Right => self.form.focused_mut().move_right(),
            KeyCode::Home => self.form.focused_mut().move_home(),
            KeyCode::End => self.form.focused_mut().move_end(),
            KeyCode::Char(ch) => {
                if !self.form.focused_mut().insert_char(ch) {
                    let (field, limit) = match self.form.focus {
                        FormField::Title => ("Title", self.form.title.max_chars()),
                        FormField::Description => {
                            ("Description", self.form.description.max_chars())
                        }
                    };
                    self.set_status_error(format!("{field} is limited to {limit} characters"));
                }
            }
            _ => {}
        }
    }

    fn handle_search_mode(&mut self, key: KeyEvent) {
        let changed = match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.status = None;
                false
            }
            KeyCode::Backspace => {
                self.search.backspace();
                true
            }
            KeyCode::Delete => {
                self.search.delete_char();
                true
            }
            KeyCode::Left => {
                self.search.move_left();
                false
            }
            KeyCode::Right => {
                self.search.move_right();
                false
            }
            KeyCode::Char(ch) => self.search.insert_char(ch),
            _ => false,
        };
        if changed {
            self.apply_search();
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('h') | KeyCode::Char('q')
        ) {
            self.input_mode = InputMode::Normal;
            self.status = None;
        }
    }

    fn handle_confirm_delete_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.confirm_choice = self.confirm_choice.toggle();
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => self.perform_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.cancel_delete(),
            KeyCode::Enter => match self.confirm_choice {
                ConfirmChoice::Yes => self.perform_delete(),
                ConfirmChoice::No => self.cancel_delete(),
            },
            _ => {}
        }
    }
}
