// repl.rs

use std::io::Write;

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Editor};

use crate::builtins::{run_builtin, Flow};
use crate::completion::CommandCompleter;
use crate::config::Config;
use crate::display::TerminalDisplay;
use crate::session::{Input, Session};
use crate::storage::Storage;

/// Appends a typed line to the expression as is, then presses Enter.
/// Characters outside the calculator's alphabet are left for `evaluate`
/// to reject.
pub fn feed_line<S: Storage, W: Write>(session: &mut Session<S, TerminalDisplay<W>>, line: &str) {
    let typed = line.trim_end_matches(['\r', '\n']);
    if !typed.is_empty() {
        session.dispatch(Input::Append(typed.to_string()));
    }
    session.press_key("Enter");
}

fn confirm(rl: &mut Editor<CommandCompleter, DefaultHistory>, prompt: &str) -> bool {
    match rl.readline(&format!("{prompt} [y/N] ")) {
        Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

pub fn start_repl<S: Storage>(config: &Config, storage: S) -> anyhow::Result<()> {
    let rl_config = rustyline::Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();
    let mut rl: Editor<CommandCompleter, DefaultHistory> =
        Editor::with_config(rl_config).context("cannot set up line editor")?;
    rl.set_helper(Some(CommandCompleter::new()));

    let mut session = Session::new(storage, TerminalDisplay::new(std::io::stdout()), config.show_history);
    session.display_mut().line("histcalc: type an expression, Enter to evaluate, :help for commands");
    loop {
        let readline = rl.readline(&config.prompt);
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = rl.add_history_entry(trimmed);
                }
                if trimmed.starts_with(':') {
                    let flow = run_builtin(trimmed, &mut session, config, |prompt| confirm(&mut rl, prompt));
                    match flow {
                        Flow::Quit => break,
                        Flow::Refresh => session.display_mut().present(),
                        Flow::Continue => {}
                    }
                } else {
                    feed_line(&mut session, &line);
                    session.display_mut().present();
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                return Err(err).context("reading input");
            }
        }
    }
    Ok(())
}
