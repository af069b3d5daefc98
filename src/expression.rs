// expression.rs

/// The in-progress input and the last shown result.
///
/// An empty expression is distinct from a literal `0`; only the display
/// text collapses the two.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Expression {
    text: String,
    result: String,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn display_text(&self) -> &str {
        if self.text.is_empty() { "0" } else { &self.text }
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn append(&mut self, token: &str) {
        self.text.push_str(token);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn set_result(&mut self, result: impl Into<String>) {
        self.result = result.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.result.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_displays_zero_but_stays_empty() {
        let mut e = Expression::new();
        assert_eq!(e.display_text(), "0");
        assert_eq!(e.text(), "");
        e.set("0");
        assert_eq!(e.display_text(), "0");
        assert_eq!(e.text(), "0");
        assert!(!e.is_empty());
    }

    #[test]
    fn append_and_backspace() {
        let mut e = Expression::new();
        e.append("1");
        e.append("+");
        e.append("(");
        assert_eq!(e.text(), "1+(");
        e.backspace();
        assert_eq!(e.text(), "1+");
        e.backspace();
        e.backspace();
        e.backspace();
        assert_eq!(e.text(), "");
    }

    #[test]
    fn clear_resets_result_too() {
        let mut e = Expression::new();
        e.set("2*3");
        e.set_result("6");
        e.clear();
        assert_eq!(e, Expression::new());
    }
}
