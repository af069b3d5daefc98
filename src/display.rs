// display.rs

use std::io::{self, Write};

use chrono::{Local, TimeZone};

use crate::history::{HistoryView, EMPTY_PLACEHOLDER};
use crate::session::Display;

fn writeln_ignore_broken_pipe<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    match writeln!(w, "{s}").and_then(|_| w.flush()) {
        Err(ref e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

pub fn format_time(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

/// Lines of the history panel; numbering is 1-based.
pub fn history_lines(view: &HistoryView) -> Vec<String> {
    match view {
        HistoryView::Empty => vec![EMPTY_PLACEHOLDER.to_string()],
        HistoryView::Entries(items) => items
            .iter()
            .map(|h| format!("{:>5}  {}  = {}  [{}]", h.index + 1, h.expression, h.result, format_time(h.time)))
            .collect(),
    }
}

/// Line-oriented surface: the history panel prints as soon as it changes,
/// the expression/result pair only when `present` is called.
pub struct TerminalDisplay<W: Write> {
    out: W,
    expression: String,
    result: String,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, expression: String::new(), result: String::new() }
    }

    pub fn present(&mut self) {
        let line = if self.result.is_empty() {
            self.expression.clone()
        } else {
            format!("= {}", self.result)
        };
        self.line(&line);
    }

    pub fn line(&mut self, s: &str) {
        if let Err(e) = writeln_ignore_broken_pipe(&mut self.out, s) {
            log::warn!("cannot write to terminal: {e}");
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn show_expression(&mut self, text: &str) {
        self.expression = text.to_string();
    }

    fn show_result(&mut self, text: &str) {
        self.result = text.to_string();
    }

    fn show_history(&mut self, view: &HistoryView) {
        for line in history_lines(view) {
            self.line(&line);
        }
    }
}
