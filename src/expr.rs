//! Restricted expression evaluation for prompt fields.
//!
//! Prompt specs carry string expressions for `default`, `when`, `filter`,
//! and `validate`. Instead of a general evaluation sandbox the grammar is
//! deliberately closed:
//!
//! - literals: `'str'`, `"str"`, numbers, `true`, `false`, `null`
//! - path lookups into the bindings: `options.name`, `answers.db`, `input`
//! - comparisons: `==` `!=` `<` `<=` `>` `>=`
//! - logic: `&&` `||` `!`, with value semantics (`a || b` yields `a` when
//!   truthy, else `b`), so `input != '' || 'Name is required'` evaluates to
//!   `true` or the message string
//! - `+` concatenates two strings or adds two numbers
//! - parentheses
//!
//! Prompt schemas and templates are trusted, author-controlled content; the
//! closed grammar bounds what they can do, it is not a security boundary
//! against hostile input.

use serde_json::{Number, Value};

use crate::error::{Error, Result};

/// Evaluate an expression against a bindings object. The bindings' top-level
/// keys become the resolvable identifiers.
pub fn evaluate(expr: &str, bindings: &Value) -> Result<Value> {
    parse(expr)
        .and_then(|ast| eval(&ast, bindings))
        .map_err(|reason| Error::Evaluation {
            expr: expr.to_string(),
            reason,
        })
}

/// JavaScript-style truthiness: `null`, `false`, `0`, and `""` are falsy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

type EvalResult<T> = std::result::Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Path(Vec<String>),
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Add,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Op(BinaryOp),
    Bang,
    Dot,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> EvalResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Add));
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinaryOp::Eq));
                } else {
                    return Err("single '=' is not an operator, use '=='".into());
                }
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinaryOp::Ne));
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '<' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinaryOp::Le));
                } else {
                    tokens.push(Token::Op(BinaryOp::Lt));
                }
            }
            '>' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinaryOp::Ge));
                } else {
                    tokens.push(Token::Op(BinaryOp::Gt));
                }
            }
            '&' => {
                chars.next();
                if chars.next_if_eq(&'&').is_some() {
                    tokens.push(Token::Op(BinaryOp::And));
                } else {
                    return Err("single '&' is not an operator, use '&&'".into());
                }
            }
            '|' => {
                chars.next();
                if chars.next_if_eq(&'|').is_some() {
                    tokens.push(Token::Op(BinaryOp::Or));
                } else {
                    return Err("single '|' is not an operator, use '||'".into());
                }
            }
            '\'' | '"' => {
                tokens.push(Token::Str(read_string(&mut chars, c)?));
            }
            c if c.is_ascii_digit() => {
                tokens.push(Token::Num(read_number(&mut chars)?));
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(tokens)
}

fn read_string(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
) -> EvalResult<String> {
    chars.next(); // opening quote
    let mut out = String::new();
    loop {
        match chars.next() {
            Some(c) if c == quote => return Ok(out),
            Some('\\') => match chars.next() {
                Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                Some('n') => out.push('\n'),
                Some(c) => return Err(format!("unknown escape '\\{c}'")),
                None => return Err("unterminated string literal".into()),
            },
            Some(c) => out.push(c),
            None => return Err("unterminated string literal".into()),
        }
    }
}

fn read_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> EvalResult<f64> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    text.parse::<f64>()
        .map_err(|_| format!("invalid number '{text}'"))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn parse(input: &str) -> EvalResult<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".into());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(format!("unexpected trailing {tok:?}")),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_op(&mut self, ops: &[BinaryOp]) -> Option<BinaryOp> {
        if let Some(Token::Op(op)) = self.peek() {
            if ops.contains(op) {
                let op = *op;
                self.pos += 1;
                return Some(op);
            }
        }
        None
    }

    fn or_expr(&mut self) -> EvalResult<Expr> {
        let mut left = self.and_expr()?;
        while self.eat_op(&[BinaryOp::Or]).is_some() {
            let right = self.and_expr()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> EvalResult<Expr> {
        let mut left = self.equality()?;
        while self.eat_op(&[BinaryOp::And]).is_some() {
            let right = self.equality()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> EvalResult<Expr> {
        let left = self.comparison()?;
        if let Some(op) = self.eat_op(&[BinaryOp::Eq, BinaryOp::Ne]) {
            let right = self.comparison()?;
            return Ok(Expr::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> EvalResult<Expr> {
        let left = self.additive()?;
        if let Some(op) = self.eat_op(&[BinaryOp::Lt, BinaryOp::Le, BinaryOp::Gt, BinaryOp::Ge]) {
            let right = self.additive()?;
            return Ok(Expr::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn additive(&mut self) -> EvalResult<Expr> {
        let mut left = self.unary()?;
        while self.eat_op(&[BinaryOp::Add]).is_some() {
            let right = self.unary()?;
            left = Expr::Binary(BinaryOp::Add, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> EvalResult<Expr> {
        if matches!(self.peek(), Some(Token::Bang)) {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> EvalResult<Expr> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::Num(n)) => Ok(Expr::Literal(number_value(n))),
            Some(Token::Ident(head)) => match head.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "null" => Ok(Expr::Literal(Value::Null)),
                _ => {
                    let mut segments = vec![head];
                    while matches!(self.peek(), Some(Token::Dot)) {
                        self.pos += 1;
                        match self.advance() {
                            Some(Token::Ident(seg)) => segments.push(seg),
                            other => {
                                return Err(format!("expected identifier after '.', got {other:?}"))
                            }
                        }
                    }
                    Ok(Expr::Path(segments))
                }
            },
            Some(Token::LParen) => {
                let expr = self.or_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err("expected ')'".into()),
                }
            }
            other => Err(format!("expected a value, got {other:?}")),
        }
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn eval(expr: &Expr, bindings: &Value) -> EvalResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(segments) => resolve_path(segments, bindings),
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval(inner, bindings)?))),
        Expr::Binary(op, left, right) => eval_binary(*op, left, right, bindings),
    }
}

fn resolve_path(segments: &[String], bindings: &Value) -> EvalResult<Value> {
    let head = &segments[0];
    let mut current = match bindings.get(head.as_str()) {
        Some(value) => value.clone(),
        None => return Err(format!("undefined binding '{head}'")),
    };

    // Missing trailing segments resolve to null rather than erroring, so
    // `options.description == null` works before the option exists.
    for segment in &segments[1..] {
        current = current.get(segment.as_str()).cloned().unwrap_or(Value::Null);
    }

    Ok(current)
}

fn eval_binary(op: BinaryOp, left: &Expr, right: &Expr, bindings: &Value) -> EvalResult<Value> {
    // Logic operators short-circuit with value semantics.
    match op {
        BinaryOp::And => {
            let lhs = eval(left, bindings)?;
            return if truthy(&lhs) { eval(right, bindings) } else { Ok(lhs) };
        }
        BinaryOp::Or => {
            let lhs = eval(left, bindings)?;
            return if truthy(&lhs) { Ok(lhs) } else { eval(right, bindings) };
        }
        _ => {}
    }

    let lhs = eval(left, bindings)?;
    let rhs = eval(right, bindings)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (a, b) = match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(format!(
                        "cannot order {} and {} with '{}'",
                        crate::context::type_name(&lhs),
                        crate::context::type_name(&rhs),
                        op.symbol()
                    ))
                }
            };
            Ok(Value::Bool(match op {
                BinaryOp::Lt => a < b,
                BinaryOp::Le => a <= b,
                BinaryOp::Gt => a > b,
                BinaryOp::Ge => a >= b,
                _ => unreachable!(),
            }))
        }
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            (Value::Number(_), Value::Number(_)) => {
                let sum = lhs.as_f64().unwrap_or_default() + rhs.as_f64().unwrap_or_default();
                Ok(number_value(sum))
            }
            _ => Err(format!(
                "cannot add {} and {}",
                crate::context::type_name(&lhs),
                crate::context::type_name(&rhs)
            )),
        },
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        // 1 and 1.0 are the same number even if serde_json disagrees
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}
