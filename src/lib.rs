//! Arithmetic calculator with a capped, persisted calculation history.
//!
//! Expressions are checked against a character whitelist, `N%` literals are
//! rewritten to `(N/100)`, and the result is computed by a small
//! recursive-descent parser over `+ - * /` and parentheses. Every successful
//! evaluation is prepended to a history of at most 200 entries, stored as one
//! JSON document under the `calc_history` key.

pub mod builtins;
pub mod cli;
pub mod completion;
pub mod config;
pub mod display;
pub mod error;
pub mod eval;
pub mod expression;
pub mod history;
pub mod parser;
pub mod repl;
pub mod session;
pub mod storage;
