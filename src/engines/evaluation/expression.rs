//! Parser for objective functions written as text in one free variable `x`.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | 'x' | constant | call | '(' expr ')'
//! call    := ident '(' expr (',' expr)* ')'
//! ```

use crate::error::{Result, SweepError};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable,
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Round,
    Sgn,
    Mod,
    Pow,
    Min,
    Max,
    Log,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "ln" => Function::Ln,
            "log10" => Function::Log10,
            "log2" => Function::Log2,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "sgn" => Function::Sgn,
            "mod" => Function::Mod,
            "pow" => Function::Pow,
            "min" => Function::Min,
            "max" => Function::Max,
            "log" => Function::Log,
            _ => return None,
        };
        Some(function)
    }

    fn arity(self) -> usize {
        match self {
            Function::Mod | Function::Pow | Function::Min | Function::Max | Function::Log => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Function::Sin => args[0].sin(),
            Function::Cos => args[0].cos(),
            Function::Tan => args[0].tan(),
            Function::Asin => args[0].asin(),
            Function::Acos => args[0].acos(),
            Function::Atan => args[0].atan(),
            Function::Sinh => args[0].sinh(),
            Function::Cosh => args[0].cosh(),
            Function::Tanh => args[0].tanh(),
            Function::Exp => args[0].exp(),
            Function::Ln => args[0].ln(),
            Function::Log10 => args[0].log10(),
            Function::Log2 => args[0].log2(),
            Function::Sqrt => args[0].sqrt(),
            Function::Abs => args[0].abs(),
            Function::Floor => args[0].floor(),
            Function::Ceil => args[0].ceil(),
            Function::Round => args[0].round(),
            Function::Sgn => {
                if args[0] == 0.0 {
                    0.0
                } else {
                    args[0].signum()
                }
            }
            // Truncated remainder: the result carries the dividend's sign.
            Function::Mod => args[0] % args[1],
            Function::Pow => args[0].powf(args[1]),
            Function::Min => args[0].min(args[1]),
            Function::Max => args[0].max(args[1]),
            Function::Log => args[1].log(args[0]),
        }
    }
}

impl Expr {
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Number(v) => *v,
            Expr::Variable => x,
            Expr::Neg(inner) => -inner.eval(x),
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (lhs.eval(x), rhs.eval(x));
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Pow => l.powf(r),
                }
            }
            Expr::Call { function, args } => {
                let values: Vec<f64> = args.iter().map(|arg| arg.eval(x)).collect();
                function.apply(&values)
            }
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
    Caret,
    LParen,
    RParen,
    Comma,
}

fn parse_error(position: usize, message: impl Into<String>) -> SweepError {
    SweepError::ExpressionParse {
        position,
        message: message.into(),
    }
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let token = match c {
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'^' => Token::Caret,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b'0'..=b'9' | b'.' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                    pos += 1;
                }
                // Optional exponent, only consumed when digits follow.
                if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
                    let mut look = pos + 1;
                    if look < bytes.len() && (bytes[look] == b'+' || bytes[look] == b'-') {
                        look += 1;
                    }
                    if look < bytes.len() && bytes[look].is_ascii_digit() {
                        pos = look;
                        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                            pos += 1;
                        }
                    }
                }
                let text = &source[start..pos];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| parse_error(start, format!("invalid number '{}'", text)))?;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
                tokens.push((start, Token::Ident(source[start..pos].to_ascii_lowercase())));
                continue;
            }
            other => {
                return Err(parse_error(
                    start,
                    format!("unexpected character '{}'", other as char),
                ))
            }
        };
        tokens.push((start, token));
        pos += 1;
    }

    Ok(tokens)
}

/// Deepest nesting of parentheses, calls and prefix operators accepted.
pub const MAX_NESTING: usize = 256;

/// Longest expression accepted, in tokens.
pub const MAX_TOKENS: usize = 4096;

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(_, t)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|(p, _)| *p)
            .unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(_, t)| t.clone());
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        let position = self.position();
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(parse_error(position, format!("expected {}, found {:?}", what, token))),
            None => Err(parse_error(position, format!("expected {}, found end of input", what))),
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // Every recursive path goes through here.
    fn unary(&mut self) -> Result<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(parse_error(self.position(), "expression nested too deeply"));
        }
        self.depth += 1;
        let result = self.unary_inner();
        self.depth -= 1;
        result
    }

    fn unary_inner(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.cursor += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.cursor += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.cursor += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr> {
        let position = self.position();
        match self.next() {
            Some(Token::Number(v)) => Ok(Expr::Number(v)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.identifier(name, position),
            Some(token) => Err(parse_error(position, format!("unexpected token {:?}", token))),
            None => Err(parse_error(position, "unexpected end of input")),
        }
    }

    fn identifier(&mut self, name: String, position: usize) -> Result<Expr> {
        if let Some(Token::LParen) = self.peek() {
            let function = Function::lookup(&name)
                .ok_or_else(|| parse_error(position, format!("unknown function '{}'", name)))?;
            self.cursor += 1;

            let mut args = vec![self.expr()?];
            while let Some(Token::Comma) = self.peek() {
                self.cursor += 1;
                args.push(self.expr()?);
            }
            self.expect(Token::RParen, "')'")?;

            if args.len() != function.arity() {
                return Err(parse_error(
                    position,
                    format!(
                        "function '{}' takes {} argument(s), got {}",
                        name,
                        function.arity(),
                        args.len()
                    ),
                ));
            }
            return Ok(Expr::Call { function, args });
        }

        match name.as_str() {
            "x" => Ok(Expr::Variable),
            "pi" => Ok(Expr::Number(std::f64::consts::PI)),
            "e" => Ok(Expr::Number(std::f64::consts::E)),
            _ => Err(parse_error(position, format!("unknown identifier '{}'", name))),
        }
    }
}

/// Parses `source` into an expression tree.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(parse_error(0, "empty expression"));
    }
    if tokens.len() > MAX_TOKENS {
        return Err(parse_error(
            tokens[MAX_TOKENS].0,
            format!("expression longer than {} tokens", MAX_TOKENS),
        ));
    }

    let mut parser = Parser {
        tokens,
        cursor: 0,
        end: source.len(),
        depth: 0,
    };
    let expr = parser.expr()?;

    if parser.cursor < parser.tokens.len() {
        let position = parser.position();
        return Err(parse_error(
            position,
            format!("unexpected trailing input {:?}", parser.tokens[parser.cursor].1),
        ));
    }

    Ok(expr)
}
