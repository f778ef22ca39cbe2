//! Value formulas: small arithmetic expressions over the raw value `x`.
//!
//! Elements may transform the incoming data-point value before display
//! (`x * 9 / 5 + 32`). The editor only needs to know whether a formula is
//! well formed, which it checks by evaluating it with `x = 1`.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?
//! primary := number | 'x' | '(' expr ')'
//! ```

#[cfg(test)]
#[path = "formula_test.rs"]
mod formula_test;

/// Formula parse or evaluation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number at position {pos}")]
    InvalidNumber { pos: usize },
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("unexpected token at position {pos}")]
    UnexpectedToken { pos: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
    #[error("formula nested deeper than {MAX_FORMULA_DEPTH} levels")]
    TooDeep,
}

/// Nesting limit for parentheses, signs and exponents.
pub const MAX_FORMULA_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    X,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut out = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let tok = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber { pos: start })?;
                out.push((Token::Num(n), start));
                continue;
            }
            'x' | 'X' => Token::X,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(FormulaError::UnexpectedChar { ch: other, pos: i }),
        };
        out.push((tok, i));
        i += 1;
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
    x: f64,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let tok = self.tokens.get(self.pos).copied();
        self.pos += 1;
        tok
    }

    fn expr(&mut self) -> Result<f64, FormulaError> {
        let mut acc = self.term()?;
        while let Some(tok @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if tok == Token::Plus { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut acc = self.unary()?;
        while let Some(tok @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = match tok {
                Token::Star => acc * rhs,
                _ if rhs == 0.0 => return Err(FormulaError::DivisionByZero),
                Token::Slash => acc / rhs,
                _ => acc % rhs,
            };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, FormulaError> {
        // Every recursive path passes through here.
        if self.depth >= MAX_FORMULA_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        self.depth += 1;
        let value = self.unary_inner();
        self.depth -= 1;
        value
    }

    fn unary_inner(&mut self) -> Result<f64, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, FormulaError> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            let exp = self.unary()?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, FormulaError> {
        match self.next() {
            Some((Token::Num(n), _)) => Ok(n),
            Some((Token::X, _)) => Ok(self.x),
            Some((Token::LParen, _)) => {
                let v = self.expr()?;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(v),
                    Some((_, pos)) => Err(FormulaError::UnexpectedToken { pos }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((_, pos)) => Err(FormulaError::UnexpectedToken { pos }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

/// Evaluate `formula` for the value `x`. An empty formula yields `x`.
///
/// # Errors
///
/// Returns [`FormulaError`] for syntax errors, excessive nesting, division
/// by zero and non-finite results.
pub fn calculate_formula(formula: &str, x: f64) -> Result<f64, FormulaError> {
    let tokens = tokenize(formula)?;
    if tokens.is_empty() {
        return Ok(x);
    }
    let mut parser = Parser { tokens, pos: 0, depth: 0, x };
    let value = parser.expr()?;
    if let Some(&(_, pos)) = parser.tokens.get(parser.pos) {
        return Err(FormulaError::UnexpectedToken { pos });
    }
    if !value.is_finite() {
        return Err(FormulaError::NotFinite);
    }
    Ok(value)
}

/// Whether `formula` is well formed, judged by evaluating it with `x = 1`.
#[must_use]
pub fn is_valid_formula(formula: &str) -> bool {
    calculate_formula(formula, 1.0).is_ok()
}
