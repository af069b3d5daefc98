// eval.rs

use std::sync::OnceLock;

use regex::Regex;

use crate::error::EvalError;
use crate::parser::{tokenize, Parser};

pub fn is_whitelisted(ch: char) -> bool {
    ch.is_ascii_digit() || "+-*/().%".contains(ch) || ch.is_whitespace()
}

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([0-9.]+)%").expect("percent pattern is valid"))
}

/// Rewrites every `N%` into `(N/100)`. Only a bare literal directly before
/// the `%` is affected; `(2+3)%` is left untouched.
pub fn rewrite_percent(input: &str) -> String {
    percent_pattern().replace_all(input, "(${1}/100)").into_owned()
}

/// Evaluates a calculator expression. Pure: no history, no display.
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    if input.trim().is_empty() {
        return Err(EvalError::syntax("empty expression"));
    }
    if let Some(bad) = input.chars().find(|c| !is_whitelisted(*c)) {
        return Err(EvalError::InvalidCharacter(bad));
    }
    let rewritten = rewrite_percent(input);
    let tree = Parser::new(tokenize(&rewritten)?).parse()?;
    let value = tree.eval();
    if !value.is_finite() {
        return Err(EvalError::MathError(value));
    }
    Ok(value)
}

/// Formats a result the way it is shown and stored: shortest round-trip
/// digits, exponent form outside `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{value:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        value.to_string()
    }
}
