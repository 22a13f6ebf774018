//! Numeric evaluation of attribute text.
//!
//! Typed attribute readers hand the raw attribute value to an [`Evaluate`] implementation,
//! so attributes may hold arithmetic expressions rather than plain literals.
//! [`Calculator`] is the built-in implementation.

/// Errors produced while evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The expression contains no tokens
    #[error("Empty expression")]
    Empty,

    /// A character that cannot start a token
    #[error("Unexpected character `{0}` at offset {1}")]
    UnexpectedChar(char, usize),

    /// A token in a position where it is not allowed
    #[error("Unexpected token `{0}`")]
    UnexpectedToken(String),

    /// The expression ended before it was complete
    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    /// A name that is neither a constant nor a function
    #[error("Unknown identifier `{0}`")]
    UnknownIdentifier(String),

    /// A malformed numeric literal
    #[error("Invalid number `{0}`")]
    InvalidNumber(String),

    /// Parentheses, calls or signs nested deeper than the evaluator allows
    #[error("Expression nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Converts text into a number.
pub trait Evaluate {
    /// Evaluates `expression`.
    ///
    /// # Errors
    /// Returns an error if the expression is malformed.
    fn evaluate(&self, expression: &str) -> Result<f64, EvalError>;
}

/// Arithmetic expression evaluator.
///
/// Supported grammar:
///
/// ```text
/// expr    := term (("+" | "-") term)*
/// term    := unary (("*" | "/" | "%") unary)*
/// unary   := ("-" | "+") unary
///          | power
/// power   := primary ("^" unary)?
/// primary := NUMBER
///          | IDENT              // pi, e, inf, nan
///          | IDENT "(" expr ")" // abs, sqrt, exp, ln, log, sin, cos, tan, floor, ceil, round
///          | "(" expr ")"
/// ```
///
/// Numbers are decimal (`12`, `1.5`, `2e-3`), hexadecimal (`0xFF`) or binary (`0b101`).
/// `^` binds tighter than a leading sign and groups to the right, so `-2 ^ 2` is `-4` and `2 ^ 3 ^ 2` is `512`.
/// Nesting is limited to 128 levels.
///
/// # Example
/// ```rust
/// use xmlentity::{Calculator, Evaluate};
///
/// assert_eq!(Calculator.evaluate("0x000000FF").unwrap(), 255.0);
/// assert_eq!(Calculator.evaluate("2 * (3 + 4) ^ 2").unwrap(), 98.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calculator;
impl Evaluate for Calculator {
    fn evaluate(&self, expression: &str) -> Result<f64, EvalError> {
        let tokens = tokenize(expression)?;
        if tokens.is_empty() {
            return Err(EvalError::Empty);
        }

        let mut parser = ExprParser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let value = parser.parse_expr()?;

        // All tokens must be consumed for a valid expression.
        match parser.next() {
            None => Ok(value),
            Some(token) => Err(EvalError::UnexpectedToken(token.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Caret => write!(f, "^"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_digit() || ch == '.' {
            let mut end = start;
            let mut prev = ch;
            while let Some(&(i, c)) = chars.peek() {
                let exponent_sign = (c == '+' || c == '-')
                    && matches!(prev, 'e' | 'E')
                    && !input[start..i].starts_with("0x")
                    && !input[start..i].starts_with("0X");
                if !(c.is_ascii_alphanumeric() || c == '.' || exponent_sign) {
                    break;
                }
                end = i + c.len_utf8();
                prev = c;
                chars.next();
            }

            tokens.push(Token::Number(parse_number(&input[start..end])?));
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !(c.is_alphanumeric() || c == '_') {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }

            tokens.push(Token::Ident(input[start..end].to_ascii_lowercase()));
            continue;
        }

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ => return Err(EvalError::UnexpectedChar(ch, start)),
        };
        tokens.push(token);
        chars.next();
    }

    Ok(tokens)
}

#[allow(clippy::cast_precision_loss)]
fn parse_number(text: &str) -> Result<f64, EvalError> {
    let invalid = || EvalError::InvalidNumber(text.to_string());

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };

    match radix {
        Some(radix) => u64::from_str_radix(&text[2..], radix)
            .map(|n| n as f64)
            .map_err(|_| invalid()),
        None => text.parse::<f64>().map_err(|_| invalid()),
    }
}

/// Maximum nesting of parentheses, function calls, signs and exponents in an expression.
const MAX_NESTING: usize = 128;

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}
impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.parse_term()?;

        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    value += self.parse_term()?;
                }
                Some(Token::Minus) => {
                    self.next();
                    value -= self.parse_term()?;
                }
                _ => break,
            }
        }

        Ok(value)
    }

    fn parse_term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.parse_unary()?;

        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    value *= self.parse_unary()?;
                }
                Some(Token::Slash) => {
                    self.next();
                    value /= self.parse_unary()?;
                }
                Some(Token::Percent) => {
                    self.next();
                    value %= self.parse_unary()?;
                }
                _ => break,
            }
        }

        Ok(value)
    }

    /// Reads a signed operand, tracking how deeply operands are nested.
    fn parse_unary(&mut self) -> Result<f64, EvalError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(EvalError::TooDeep(MAX_NESTING));
        }

        let value = match self.peek() {
            Some(Token::Minus) => {
                self.next();
                self.parse_unary().map(|value| -value)
            }
            Some(Token::Plus) => {
                self.next();
                self.parse_unary()
            }
            _ => self.parse_power(),
        };

        self.depth -= 1;
        value
    }

    fn parse_power(&mut self) -> Result<f64, EvalError> {
        let base = self.parse_primary()?;

        if matches!(self.peek(), Some(Token::Caret)) {
            self.next();
            let exponent = self.parse_unary()?;
            return Ok(base.powf(exponent));
        }

        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<f64, EvalError> {
        let token = self.next().cloned().ok_or(EvalError::UnexpectedEnd)?;

        match token {
            Token::Number(n) => Ok(n),
            Token::LParen => {
                let value = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(value)
            }
            Token::Ident(name) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.next();
                    let argument = self.parse_expr()?;
                    self.expect_rparen()?;
                    return call(&name, argument);
                }

                constant(&name)
            }
            token => Err(EvalError::UnexpectedToken(token.to_string())),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), EvalError> {
        match self.next() {
            Some(Token::RParen) => Ok(()),
            Some(token) => Err(EvalError::UnexpectedToken(token.to_string())),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

fn constant(name: &str) -> Result<f64, EvalError> {
    match name {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        "inf" => Ok(f64::INFINITY),
        "nan" => Ok(f64::NAN),
        _ => Err(EvalError::UnknownIdentifier(name.to_string())),
    }
}

fn call(name: &str, argument: f64) -> Result<f64, EvalError> {
    let function: fn(f64) -> f64 = match name {
        "abs" => f64::abs,
        "sqrt" => f64::sqrt,
        "exp" => f64::exp,
        "ln" => f64::ln,
        "log" => f64::log10,
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        "round" => f64::round,
        _ => return Err(EvalError::UnknownIdentifier(name.to_string())),
    };
    Ok(function(argument))
}
