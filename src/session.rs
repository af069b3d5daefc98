// session.rs

use std::path::{Path, PathBuf};

use crate::error::{EvalError, HistoryError};
use crate::eval::{evaluate, format_number};
use crate::expression::Expression;
use crate::history::{HistoryEntry, HistoryManager, HistoryView};
use crate::storage::Storage;

pub const ERROR_TEXT: &str = "Error";

/// Presentation surface the session writes to but does not own.
pub trait Display {
    fn show_expression(&mut self, text: &str);
    fn show_result(&mut self, text: &str);
    fn show_history(&mut self, view: &HistoryView);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Idle,
    HasExpression,
    HasResult,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action { Clear, Back, Equals, Percent }

/// An on-screen key: either a symbol it types or an action it performs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Button {
    Value(String),
    Action(Action),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Input {
    Append(String),
    Percent,
    Evaluate,
    Backspace,
    ClearAll,
}

impl Input {
    /// Maps a physical key name. Unhandled keys yield `None`.
    pub fn from_key(key: &str) -> Option<Input> {
        match key {
            "Enter" => Some(Input::Evaluate),
            "Backspace" => Some(Input::Backspace),
            "Escape" => Some(Input::ClearAll),
            k if k.len() == 1 && k.chars().all(|c| c.is_ascii_digit() || ".+-*/()%".contains(c)) => {
                Some(Input::Append(k.to_string()))
            }
            _ => None,
        }
    }

    pub fn from_button(button: &Button) -> Input {
        match button {
            Button::Value(v) => Input::Append(v.clone()),
            Button::Action(Action::Clear) => Input::ClearAll,
            Button::Action(Action::Back) => Input::Backspace,
            Button::Action(Action::Equals) => Input::Evaluate,
            Button::Action(Action::Percent) => Input::Percent,
        }
    }
}

/// Everything one interactive calculator needs: the expression buffer,
/// the history store, and the surface both are shown on.
pub struct Session<S: Storage, D: Display> {
    expression: Expression,
    history: HistoryManager<S>,
    display: D,
    state: State,
    history_visible: bool,
}

impl<S: Storage, D: Display> Session<S, D> {
    pub fn new(storage: S, display: D, history_visible: bool) -> Self {
        let mut session = Self {
            expression: Expression::new(),
            history: HistoryManager::new(storage),
            display,
            state: State::Idle,
            history_visible,
        };
        session.set_expression("");
        session.set_result("");
        session.render_history();
        session
    }

    pub fn into_parts(self) -> (S, D) {
        (self.history.into_storage(), self.display)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn history(&self) -> &HistoryManager<S> {
        &self.history
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn history_visible(&self) -> bool {
        self.history_visible
    }

    fn set_expression(&mut self, text: &str) {
        self.expression.set(text);
        self.display.show_expression(self.expression.display_text());
    }

    fn set_result(&mut self, text: &str) {
        self.expression.set_result(text);
        self.display.show_result(text);
    }

    fn settle_state(&mut self) {
        self.state = if self.expression.is_empty() { State::Idle } else { State::HasExpression };
    }

    pub fn dispatch(&mut self, input: Input) {
        match input {
            Input::Append(token) => {
                let text = format!("{}{}", self.expression.text(), token);
                self.set_expression(&text);
                self.set_result("");
                self.settle_state();
            }
            Input::Percent => {
                let text = format!("{}%", self.expression.text());
                self.set_expression(&text);
                self.settle_state();
            }
            Input::Backspace => {
                let mut text = self.expression.text().to_string();
                text.pop();
                self.set_expression(&text);
                self.settle_state();
            }
            Input::ClearAll => {
                self.set_expression("");
                self.set_result("");
                self.state = State::Idle;
            }
            Input::Evaluate => {
                if let Err(e) = self.evaluate() {
                    log::debug!("evaluation failed, showing {ERROR_TEXT}: {e}");
                }
            }
        }
    }

    pub fn press_key(&mut self, key: &str) -> bool {
        match Input::from_key(key) {
            Some(input) => {
                self.dispatch(input);
                true
            }
            None => false,
        }
    }

    pub fn press_button(&mut self, button: &Button) {
        self.dispatch(Input::from_button(button));
    }

    /// Evaluates the current expression. On success the result is shown,
    /// recorded, and becomes the new expression so it can be chained.
    /// Returns `Ok(None)` when there is nothing to evaluate.
    pub fn evaluate(&mut self) -> Result<Option<String>, EvalError> {
        if self.expression.is_empty() {
            return Ok(None);
        }
        let source = self.expression.text().to_string();
        match evaluate(&source) {
            Ok(value) => {
                let result = format_number(value);
                self.set_result(&result);
                self.record(HistoryEntry::now(source, result.clone()));
                self.set_expression(&result);
                self.state = State::HasResult;
                Ok(Some(result))
            }
            Err(e) => {
                self.set_result(ERROR_TEXT);
                log::warn!("{} evaluating {:?}: {}", e.kind(), source, e);
                Err(e)
            }
        }
    }

    fn record(&mut self, entry: HistoryEntry) {
        self.history.record(entry);
        self.render_history();
    }

    pub fn render_history(&mut self) -> HistoryView {
        let view = self.history.render();
        if self.history_visible {
            self.display.show_history(&view);
        }
        view
    }

    pub fn toggle_history(&mut self) -> bool {
        self.history_visible = !self.history_visible;
        if self.history_visible {
            self.render_history();
        }
        self.history_visible
    }

    /// Loads a history entry by its index in the latest rendered view.
    pub fn use_entry(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.entry(index) else {
            return false;
        };
        self.set_expression(&entry.expression);
        self.set_result(&entry.result);
        self.state = State::HasResult;
        true
    }

    pub fn clear_history<F>(&mut self, confirm: F) -> Result<bool, HistoryError>
    where
        F: FnOnce(&str) -> bool,
    {
        let cleared = self.history.clear(confirm)?;
        if cleared {
            self.render_history();
        }
        Ok(cleared)
    }

    pub fn export_history(&self, dir: &Path) -> Result<PathBuf, HistoryError> {
        self.history.export_to(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HISTORY_KEY, HISTORY_LIMIT};
    use crate::storage::MemoryStorage;

    #[derive(Default)]
    struct RecordingDisplay {
        expression: String,
        result: String,
        views: Vec<HistoryView>,
    }

    impl Display for RecordingDisplay {
        fn show_expression(&mut self, text: &str) {
            self.expression = text.to_string();
        }
        fn show_result(&mut self, text: &str) {
            self.result = text.to_string();
        }
        fn show_history(&mut self, view: &HistoryView) {
            self.views.push(view.clone());
        }
    }

    fn session() -> Session<MemoryStorage, RecordingDisplay> {
        Session::new(MemoryStorage::new(), RecordingDisplay::default(), true)
    }

    fn type_keys(s: &mut Session<MemoryStorage, RecordingDisplay>, keys: &str) {
        for ch in keys.chars() {
            assert!(s.press_key(&ch.to_string()), "key {ch}");
        }
    }

    #[test]
    fn starts_idle_with_zero_placeholder() {
        let s = session();
        assert_eq!(s.state(), State::Idle);
        assert_eq!(s.display().expression, "0");
        assert_eq!(s.display().result, "");
        assert_eq!(s.display().views, vec![HistoryView::Empty]);
    }

    #[test]
    fn evaluate_records_and_chains() {
        let mut s = session();
        type_keys(&mut s, "2+3");
        assert_eq!(s.state(), State::HasExpression);
        assert!(s.press_key("Enter"));
        assert_eq!(s.state(), State::HasResult);
        assert_eq!(s.display().result, "5");
        assert_eq!(s.expression().text(), "5");

        type_keys(&mut s, "*4");
        assert_eq!(s.state(), State::HasExpression);
        assert_eq!(s.display().result, "");
        s.press_key("Enter");
        assert_eq!(s.display().result, "20");

        let stored = s.history().load().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].expression, "5*4");
        assert_eq!(stored[0].result, "20");
        assert_eq!(stored[1].expression, "2+3");
        assert_eq!(s.display().views.last().map(HistoryView::len), Some(2));
    }

    #[test]
    fn failed_evaluation_shows_error_and_keeps_expression() {
        let mut s = session();
        type_keys(&mut s, "5/0");
        assert!(matches!(s.evaluate(), Err(EvalError::MathError(_))));
        assert_eq!(s.display().result, ERROR_TEXT);
        assert_eq!(s.expression().text(), "5/0");
        assert_eq!(s.state(), State::HasExpression);
        assert!(s.history().load().unwrap().is_empty());

        s.press_key("Backspace");
        s.press_key("Backspace");
        type_keys(&mut s, "*");
        s.press_key("Enter");
        assert_eq!(s.display().result, ERROR_TEXT);
    }

    #[test]
    fn empty_evaluate_is_noop() {
        let mut s = session();
        assert_eq!(s.evaluate(), Ok(None));
        assert_eq!(s.display().result, "");
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut s = session();
        assert!(!s.press_key("a"));
        assert!(!s.press_key("Shift"));
        assert!(!s.press_key(" "));
        assert_eq!(s.expression().text(), "");
    }

    #[test]
    fn backspace_and_escape() {
        let mut s = session();
        s.press_key("Backspace");
        assert_eq!(s.state(), State::Idle);
        type_keys(&mut s, "12");
        s.press_key("Backspace");
        assert_eq!(s.expression().text(), "1");
        s.press_key("Backspace");
        assert_eq!(s.state(), State::Idle);
        assert_eq!(s.display().expression, "0");
        type_keys(&mut s, "9");
        s.press_key("Enter");
        s.press_key("Escape");
        assert_eq!(s.expression().text(), "");
        assert_eq!(s.display().result, "");
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn buttons_and_keys_share_semantics() {
        let mut by_key = session();
        let mut by_button = session();
        type_keys(&mut by_key, "50+50%");
        by_key.press_key("Enter");
        for v in ["5", "0", "+", "5", "0"] {
            by_button.press_button(&Button::Value(v.to_string()));
        }
        by_button.press_button(&Button::Action(Action::Percent));
        by_button.press_button(&Button::Action(Action::Equals));
        assert_eq!(by_key.display().result, "50.5");
        assert_eq!(by_button.display().result, "50.5");
        assert_eq!(by_key.expression(), by_button.expression());

        by_button.press_button(&Button::Action(Action::Back));
        assert_eq!(by_button.expression().text(), "50.");
        by_button.press_button(&Button::Action(Action::Clear));
        assert_eq!(by_button.state(), State::Idle);
    }

    #[test]
    fn percent_button_keeps_result_but_typing_clears_it() {
        let mut s = session();
        type_keys(&mut s, "8");
        s.press_key("Enter");
        s.dispatch(Input::Percent);
        assert_eq!(s.display().result, "8");
        assert_eq!(s.expression().text(), "8%");
        s.press_key("%");
        assert_eq!(s.display().result, "");
    }

    #[test]
    fn use_entry_reloads_expression_and_result() {
        let mut s = session();
        type_keys(&mut s, "1+1");
        s.press_key("Enter");
        type_keys(&mut s, "+1");
        s.press_key("Enter");
        s.press_key("Escape");

        assert!(s.use_entry(1));
        assert_eq!(s.expression().text(), "1+1");
        assert_eq!(s.display().expression, "1+1");
        assert_eq!(s.display().result, "2");
        assert_eq!(s.state(), State::HasResult);
        assert!(!s.use_entry(5));
    }

    #[test]
    fn clear_history_needs_confirmation() {
        let mut s = session();
        type_keys(&mut s, "2*2");
        s.press_key("Enter");
        assert!(!s.clear_history(|_| false).unwrap());
        assert_eq!(s.history().load().unwrap().len(), 1);
        assert!(s.clear_history(|_| true).unwrap());
        assert_eq!(s.display().views.last(), Some(&HistoryView::Empty));
        assert!(s.history().storage().get_item(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn hidden_panel_is_not_rendered_until_toggled() {
        let mut s = Session::new(MemoryStorage::new(), RecordingDisplay::default(), false);
        type_keys(&mut s, "3");
        s.press_key("Enter");
        assert!(s.display().views.is_empty());
        assert!(s.toggle_history());
        assert_eq!(s.display().views.len(), 1);
        assert!(!s.toggle_history());
    }

    #[test]
    fn storage_failure_does_not_interrupt() {
        let mut s = Session::new(MemoryStorage::with_quota(16), RecordingDisplay::default(), true);
        type_keys(&mut s, "6*7");
        s.press_key("Enter");
        assert_eq!(s.display().result, "42");
        assert_eq!(s.expression().text(), "42");
        assert!(s.history().load().unwrap().is_empty());
    }

    #[test]
    fn history_survives_session_teardown() {
        let mut s = session();
        for _ in 0..(HISTORY_LIMIT + 3) {
            type_keys(&mut s, "+1");
            s.press_key("Enter");
        }
        let (storage, _) = s.into_parts();
        let again = Session::new(storage, RecordingDisplay::default(), true);
        let stored = again.history().load().unwrap();
        assert_eq!(stored.len(), HISTORY_LIMIT);
        assert_eq!(stored[0].result, (HISTORY_LIMIT + 3).to_string());
    }
}
