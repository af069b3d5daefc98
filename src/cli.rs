// cli.rs

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::display::TerminalDisplay;
use crate::eval::{evaluate, format_number};
use crate::history::HistoryManager;
use crate::repl::start_repl;
use crate::session::{Display, Input, Session, ERROR_TEXT};
use crate::storage::{FileStorage, Storage};

#[derive(Debug, Parser)]
#[command(name = "histcalc", version, about = "Arithmetic calculator with a persistent history")]
pub struct Cli {
    /// Config file (default: <config dir>/histcalc/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Directory holding the history store
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate an expression and print the result
    Eval {
        /// Do not add the calculation to the history
        #[arg(long)]
        no_record: bool,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, allow_negative_numbers = true)]
        expr: Vec<String>,
    },
    /// Inspect or manage the saved history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    List,
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    Export {
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

/// Evaluates one expression; `Err` carries the text printed on failure.
pub fn eval_once<S: Storage, W: Write>(
    session: &mut Session<S, TerminalDisplay<W>>,
    expr: &str,
) -> Result<String, String> {
    session.dispatch(Input::Append(expr.to_string()));
    match session.evaluate() {
        Ok(Some(result)) => Ok(result),
        Ok(None) | Err(_) => Err(ERROR_TEXT.to_string()),
    }
}

fn ask(prompt: &str) -> bool {
    let Ok(mut rl) = rustyline::DefaultEditor::new() else {
        return false;
    };
    match rl.readline(&format!("{prompt} [y/N] ")) {
        Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Runs the parsed command line and returns the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let storage = FileStorage::new(&config.data_dir);
    log::info!("history store: {}", storage.dir().display());

    match cli.command {
        None => {
            start_repl(&config, storage)?;
            Ok(0)
        }
        Some(Command::Eval { no_record, expr }) => {
            let expr = expr.join(" ");
            let outcome = if no_record {
                evaluate(&expr).map(format_number).map_err(|e| {
                    log::warn!("{} evaluating {:?}: {}", e.kind(), expr, e);
                    ERROR_TEXT.to_string()
                })
            } else {
                let mut session = Session::new(storage, TerminalDisplay::new(std::io::stdout()), false);
                eval_once(&mut session, &expr)
            };
            match outcome {
                Ok(result) => {
                    println!("{result}");
                    Ok(0)
                }
                Err(text) => {
                    println!("{text}");
                    Ok(1)
                }
            }
        }
        Some(Command::History { action }) => {
            let mut history = HistoryManager::new(storage);
            match action {
                HistoryCommand::List => {
                    TerminalDisplay::new(std::io::stdout()).show_history(&history.render());
                }
                HistoryCommand::Clear { yes } => {
                    let cleared = history.clear(|prompt| yes || ask(prompt))?;
                    if cleared {
                        println!("history cleared");
                    }
                }
                HistoryCommand::Export { dir } => {
                    let dir = dir.unwrap_or(config.export_dir);
                    let path = history
                        .export_to(&dir)
                        .with_context(|| format!("exporting history to {}", dir.display()))?;
                    println!("{}", path.display());
                }
            }
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn parses_eval_with_negative_literal() {
        let cli = Cli::try_parse_from(["histcalc", "eval", "-5", "+", "3"]).unwrap();
        match cli.command {
            Some(Command::Eval { no_record, expr }) => {
                assert!(!no_record);
                assert_eq!(expr.join(" "), "-5 + 3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_history_subcommands() {
        let cli = Cli::try_parse_from(["histcalc", "--data-dir", "/tmp/x", "history", "clear", "--yes"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Some(Command::History { action: HistoryCommand::Clear { yes: true } })));
        assert!(Cli::try_parse_from(["histcalc", "eval"]).is_err());
    }

    #[test]
    fn eval_once_records_success_only() {
        let mut session = Session::new(MemoryStorage::new(), TerminalDisplay::new(Vec::new()), false);
        assert_eq!(eval_once(&mut session, "-5 + 3"), Ok("-2".to_string()));
        session.dispatch(Input::ClearAll);
        assert_eq!(eval_once(&mut session, "alert(1)"), Err("Error".to_string()));
        session.dispatch(Input::ClearAll);
        assert_eq!(eval_once(&mut session, ""), Err("Error".to_string()));
        assert_eq!(session.history().load().unwrap().len(), 1);
    }
}
