//! Expression evaluator behind the scientific calculator.
//!
//! Supports `+ - * / ^`, unary signs, postfix `!` (factorial) and `%`
//! (percent), parentheses, the constants `pi` and `e`, and the functions
//! `sin cos tan asin acos atan sqrt ln log abs exp`. `^` binds tighter than a
//! leading minus and is right-associative, so `-2^2` is `-4` and `2^3^2` is
//! `512`.

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::{Chars, FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    #[default]
    Degrees,
    Radians,
}

impl FromStr for AngleMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deg" | "degrees" => Ok(AngleMode::Degrees),
            "rad" | "radians" => Ok(AngleMode::Radians),
            _ => Err(anyhow!("Invalid angle mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

fn read_number(first: char, chars: &mut Peekable<Chars>) -> Result<f64> {
    let mut text = String::from(first);
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else if (c == 'e' || c == 'E') && !text.contains(['e', 'E']) {
            // Only treat `e` as an exponent when digits follow, so `2e` is
            // not swallowed when someone means 2 × e.
            let mut lookahead = chars.clone();
            lookahead.next();
            let next = lookahead.next();
            let signed_digit = matches!(next, Some('+') | Some('-'))
                && lookahead.next().is_some_and(|d| d.is_ascii_digit());
            if next.is_some_and(|d| d.is_ascii_digit()) || signed_digit {
                text.push(c);
                chars.next();
                if let Some(&sign) = chars.peek().filter(|s| **s == '+' || **s == '-') {
                    text.push(sign);
                    chars.next();
                }
            } else {
                break;
            }
        } else {
            break;
        }
    }
    text.parse()
        .map_err(|_| anyhow!("Invalid number: {text}"))
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '0'..='9' | '.' => tokens.push(Token::Number(read_number(c, &mut chars)?)),
            'a'..='z' | 'A'..='Z' | 'π' => {
                let mut name = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name.to_lowercase()));
            }
            '+' | '-' | '*' | '/' | '^' | '!' | '%' => tokens.push(Token::Op(c)),
            '×' => tokens.push(Token::Op('*')),
            '÷' => tokens.push(Token::Op('/')),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            other => bail!("Unexpected character '{other}'"),
        }
    }
    Ok(tokens)
}

/// Deepest run of nested parentheses, function calls and signs accepted.
const MAX_NESTING: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    mode: AngleMode,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<F>(&mut self, parse: F) -> Result<f64>
    where
        F: FnOnce(&mut Self) -> Result<f64>,
    {
        if self.depth >= MAX_NESTING {
            bail!("Expression is nested too deeply");
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn expression(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/']) {
            let rhs = self.unary()?;
            value = if op == '*' {
                value * rhs
            } else {
                if rhs == 0.0 {
                    bail!("Division by zero");
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64> {
        match self.eat_op(&['+', '-']) {
            Some('-') => Ok(-self.nested(Self::unary)?),
            Some(_) => self.nested(Self::unary),
            None => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64> {
        let base = self.postfix()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.nested(Self::unary)?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<f64> {
        let mut value = self.primary()?;
        while let Some(op) = self.eat_op(&['!', '%']) {
            value = match op {
                '!' => factorial(value)?,
                _ => value / 100.0,
            };
        }
        Ok(value)
    }

    fn primary(&mut self) -> Result<f64> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.nested(Self::expression)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => bail!("Missing closing parenthesis"),
                }
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" | "π" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ => {
                    if self.next() != Some(Token::LParen) {
                        bail!("Expected '(' after {name}");
                    }
                    let arg = self.nested(Self::expression)?;
                    if self.next() != Some(Token::RParen) {
                        bail!("Missing closing parenthesis after {name}");
                    }
                    self.apply(&name, arg)
                }
            },
            Some(token) => bail!("Unexpected token {token:?}"),
            None => bail!("Unexpected end of expression"),
        }
    }

    fn to_radians(&self, x: f64) -> f64 {
        match self.mode {
            AngleMode::Degrees => x.to_radians(),
            AngleMode::Radians => x,
        }
    }

    fn from_radians(&self, x: f64) -> f64 {
        match self.mode {
            AngleMode::Degrees => x.to_degrees(),
            AngleMode::Radians => x,
        }
    }

    fn apply(&self, name: &str, x: f64) -> Result<f64> {
        let value = match name {
            "sin" => snap(self.to_radians(x).sin()),
            "cos" => snap(self.to_radians(x).cos()),
            "tan" => {
                let cos = snap(self.to_radians(x).cos());
                if cos == 0.0 {
                    bail!("tan is undefined at {x}");
                }
                snap(self.to_radians(x).sin()) / cos
            }
            "asin" | "acos" if !(-1.0..=1.0).contains(&x) => {
                bail!("{name} is only defined between -1 and 1")
            }
            "asin" => self.from_radians(x.asin()),
            "acos" => self.from_radians(x.acos()),
            "atan" => self.from_radians(x.atan()),
            "sqrt" if x < 0.0 => bail!("Square root of a negative number"),
            "sqrt" => x.sqrt(),
            "ln" | "log" if x <= 0.0 => bail!("{name} is only defined for positive numbers"),
            "ln" => x.ln(),
            "log" => x.log10(),
            "abs" => x.abs(),
            "exp" => x.exp(),
            _ => bail!("Unknown function: {name}"),
        };
        Ok(value)
    }
}

/// Clears floating noise so that e.g. `sin(180)` in degrees is exactly 0.
fn snap(x: f64) -> f64 {
    if x.abs() < 1e-12 { 0.0 } else { x }
}

fn factorial(x: f64) -> Result<f64> {
    if x < 0.0 || x.fract() != 0.0 {
        bail!("Factorial needs a non-negative whole number");
    }
    if x > 170.0 {
        bail!("Factorial is too large");
    }
    Ok((1..=x as u64).map(|n| n as f64).product())
}

pub fn evaluate(expression: &str, mode: AngleMode) -> Result<f64> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        bail!("Expression must not be blank");
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        mode,
        depth: 0,
    };
    let value = parser.expression()?;
    if let Some(token) = parser.peek() {
        bail!("Unexpected token {token:?}");
    }
    if !value.is_finite() {
        bail!("Result is not a finite number");
    }
    Ok(value)
}
