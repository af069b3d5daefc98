// parser.rs

use crate::error::EvalError;

const MAX_DEPTH: usize = 256;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Open,
    Close,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp { Add, Sub, Mul, Div }

#[derive(Clone, PartialEq, Debug)]
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    /// `first op1 x1 op2 x2 ...`, folded left to right. Operator runs stay
    /// flat so tree depth only grows with parentheses and unary signs.
    Chain(Box<Expr>, Vec<(BinOp, Expr)>),
}

impl Expr {
    pub fn eval(&self) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Neg(inner) => -inner.eval(),
            Expr::Chain(first, rest) => rest.iter().fold(first.eval(), |acc, (op, rhs)| {
                let b = rhs.eval();
                match op {
                    BinOp::Add => acc + b,
                    BinOp::Sub => acc - b,
                    BinOp::Mul => acc * b,
                    BinOp::Div => acc / b,
                }
            }),
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                literal.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        literal.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(parse_literal(&literal)?));
            }
            '+' | '-' => {
                // `++` and `--` are increment/decrement in the host grammar, never arithmetic
                if chars.peek() == Some(&ch) {
                    return Err(EvalError::syntax(format!("unexpected '{ch}{ch}'")));
                }
                tokens.push(if ch == '+' { Token::Plus } else { Token::Minus });
            }
            '*' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '%' => tokens.push(Token::Percent),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_whitespace() => {}
            other => return Err(EvalError::InvalidCharacter(other)),
        }
    }
    Ok(tokens)
}

fn parse_literal(literal: &str) -> Result<f64, EvalError> {
    if literal.matches('.').count() > 1 || literal == "." {
        return Err(EvalError::syntax(format!("invalid number '{literal}'")));
    }
    literal
        .parse::<f64>()
        .map_err(|_| EvalError::syntax(format!("invalid number '{literal}'")))
}

/// Recursive-descent parser over the closed token set.
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary)*
/// unary   := ('+' | '-') unary | primary
/// primary := number | '(' expr ')'
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    pub fn parse(mut self) -> Result<Expr, EvalError> {
        if self.tokens.is_empty() {
            return Err(EvalError::syntax("empty expression"));
        }
        let expr = self.expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(tok) => Err(unexpected(tok)),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let first = self.term()?;
        let mut rest = Vec::new();
        while let Some(tok @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let op = if tok == Token::Plus { BinOp::Add } else { BinOp::Sub };
            rest.push((op, self.term()?));
        }
        Ok(chain(first, rest))
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        while let Some(tok @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let op = if tok == Token::Star { BinOp::Mul } else { BinOp::Div };
            rest.push((op, self.unary()?));
        }
        Ok(chain(first, rest))
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                let inner = self.nested(Self::unary)?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Open) => {
                let inner = self.nested(Self::expr)?;
                match self.bump() {
                    Some(Token::Close) => Ok(inner),
                    Some(tok) => Err(unexpected(tok)),
                    None => Err(EvalError::syntax("missing ')'")),
                }
            }
            Some(tok) => Err(unexpected(tok)),
            None => Err(EvalError::syntax("unexpected end of expression")),
        }
    }

    fn nested(&mut self, rule: fn(&mut Self) -> Result<Expr, EvalError>) -> Result<Expr, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::syntax("expression nested too deeply"));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

fn chain(first: Expr, rest: Vec<(BinOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain(Box::new(first), rest)
    }
}

fn unexpected(tok: Token) -> EvalError {
    let text = match tok {
        Token::Number(n) => n.to_string(),
        Token::Plus => "+".into(),
        Token::Minus => "-".into(),
        Token::Star => "*".into(),
        Token::Slash => "/".into(),
        Token::Percent => "%".into(),
        Token::Open => "(".into(),
        Token::Close => ")".into(),
    };
    EvalError::syntax(format!("unexpected '{text}'"))
}
