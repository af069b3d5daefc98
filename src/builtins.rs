// builtins.rs

use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::display::TerminalDisplay;
use crate::session::{Display, Session};
use crate::storage::Storage;

pub const COMMANDS: [(&str, &str); 9] = [
    (":back", "delete the last character"),
    (":clear", "clear the expression and result"),
    (":history", "show or hide the history panel"),
    (":list", "print the history once"),
    (":use", "N  load history entry N"),
    (":clear-history", "delete all history (asks first)"),
    (":export", "[DIR]  write calculator_history.json"),
    (":help", "show this help"),
    (":quit", "leave"),
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    /// The command printed what it had to say.
    Continue,
    /// Expression or result changed; show them.
    Refresh,
    Quit,
}

pub fn run_builtin<S, W, F>(
    line: &str,
    session: &mut Session<S, TerminalDisplay<W>>,
    config: &Config,
    confirm: F,
) -> Flow
where
    S: Storage,
    W: Write,
    F: FnOnce(&str) -> bool,
{
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&command) = tokens.first() else {
        return Flow::Continue;
    };
    match command {
        ":quit" | ":exit" => Flow::Quit,
        ":back" => {
            session.press_key("Backspace");
            Flow::Refresh
        }
        ":clear" => {
            session.press_key("Escape");
            Flow::Refresh
        }
        ":history" => {
            if !session.toggle_history() {
                session.display_mut().line("history hidden");
            }
            Flow::Continue
        }
        ":list" => {
            let view = session.history().render();
            session.display_mut().show_history(&view);
            Flow::Continue
        }
        ":use" => {
            let index = tokens.get(1).and_then(|s| s.parse::<usize>().ok()).filter(|n| *n > 0);
            match index {
                Some(n) if session.use_entry(n - 1) => Flow::Refresh,
                Some(n) => {
                    session.display_mut().line(&format!("use: no history entry {n}"));
                    Flow::Continue
                }
                None => {
                    session.display_mut().line("use: expected an entry number");
                    Flow::Continue
                }
            }
        }
        ":clear-history" => {
            match session.clear_history(confirm) {
                Ok(true) => session.display_mut().line("history cleared"),
                Ok(false) => {}
                Err(e) => {
                    log::warn!("{e}");
                    session.display_mut().line("history: cannot clear");
                }
            }
            Flow::Continue
        }
        ":export" => {
            let dir = tokens.get(1).map(PathBuf::from).unwrap_or_else(|| config.export_dir.clone());
            let message = match session.export_history(&dir) {
                Ok(path) => format!("exported to {}", path.display()),
                Err(e) => format!("export: {e}"),
            };
            session.display_mut().line(&message);
            Flow::Continue
        }
        ":help" => {
            for (name, help) in COMMANDS {
                session.display_mut().line(&format!("{name:<16}{help}"));
            }
            session.display_mut().line("anything else is typed into the calculator; Enter evaluates");
            Flow::Continue
        }
        other => {
            session.display_mut().line(&format!("{other}: unknown command"));
            Flow::Continue
        }
    }
}
