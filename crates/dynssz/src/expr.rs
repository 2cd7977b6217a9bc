//! Arithmetic over spec value names, as used in dynamic size tags.
//!
//! Supports integer literals, identifiers, `+ - * /` and parentheses with the
//! usual precedence.  All arithmetic is checked `u64`.

use crate::errors::TagError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Token<'a> {
    Num(u64),
    Ident(&'a str),
    Op(u8),
    Open,
    Close,
}

/// Evaluates `expr`, resolving identifiers with `lookup`.
///
/// Returns `Ok(None)` if any identifier is unknown.
pub(crate) fn eval(
    expr: &str,
    lookup: &dyn Fn(&str) -> Option<u64>,
) -> Result<Option<u64>, TagError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        expr,
        tokens: &tokens,
        pos: 0,
        lookup,
    };

    let value = parser.sum()?;
    if parser.pos != tokens.len() {
        return Err(invalid(expr, "trailing input"));
    }

    Ok(value)
}

fn invalid(expr: &str, reason: &'static str) -> TagError {
    TagError::InvalidExpression {
        expr: expr.to_owned(),
        reason,
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token<'_>>, TagError> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' => i += 1,
            b'+' | b'-' | b'*' | b'/' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            b'(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            b')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let n = expr[start..i]
                    .parse()
                    .map_err(|_| TagError::Overflow(expr.to_owned()))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(Token::Ident(&expr[start..i]));
            }
            _ => return Err(invalid(expr, "unexpected character")),
        }
    }

    Ok(tokens)
}

struct Parser<'e, 't> {
    expr: &'e str,
    tokens: &'t [Token<'e>],
    pos: usize,
    lookup: &'t dyn Fn(&str) -> Option<u64>,
}

impl<'e> Parser<'e, '_> {
    fn peek(&self) -> Option<Token<'e>> {
        self.tokens.get(self.pos).copied()
    }

    fn sum(&mut self) -> Result<Option<u64>, TagError> {
        let mut acc = self.product()?;
        while let Some(Token::Op(op @ (b'+' | b'-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.product()?;
            acc = self.apply(op, acc, rhs)?;
        }
        Ok(acc)
    }

    fn product(&mut self) -> Result<Option<u64>, TagError> {
        let mut acc = self.operand()?;
        while let Some(Token::Op(op @ (b'*' | b'/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.operand()?;
            acc = self.apply(op, acc, rhs)?;
        }
        Ok(acc)
    }

    fn operand(&mut self) -> Result<Option<u64>, TagError> {
        let tok = self.peek().ok_or_else(|| invalid(self.expr, "expected operand"))?;
        self.pos += 1;
        match tok {
            Token::Num(n) => Ok(Some(n)),
            Token::Ident(name) => Ok((self.lookup)(name)),
            Token::Open => {
                let v = self.sum()?;
                if self.peek() != Some(Token::Close) {
                    return Err(invalid(self.expr, "unclosed parenthesis"));
                }
                self.pos += 1;
                Ok(v)
            }
            Token::Op(_) | Token::Close => Err(invalid(self.expr, "expected operand")),
        }
    }

    fn apply(&self, op: u8, a: Option<u64>, b: Option<u64>) -> Result<Option<u64>, TagError> {
        let (Some(a), Some(b)) = (a, b) else {
            return Ok(None);
        };

        let overflow = || TagError::Overflow(self.expr.to_owned());
        let v = match op {
            b'+' => a.checked_add(b).ok_or_else(overflow)?,
            b'-' => a.checked_sub(b).ok_or_else(overflow)?,
            b'*' => a.checked_mul(b).ok_or_else(overflow)?,
            _ => {
                if b == 0 {
                    return Err(TagError::DivisionByZero(self.expr.to_owned()));
                }
                a / b
            }
        };
        Ok(Some(v))
    }
}
