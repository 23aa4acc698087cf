//! Formula expression parsing.
//!
//! Formulas are tokenized and then parsed by precedence climbing into an
//! [`Expr`] tree. The grammar covers what [`BasicEngine`](super::BasicEngine)
//! evaluates:
//!
//! ```text
//! expr     := unary (binop unary)*
//! unary    := ('-' | '+') unary | primary
//! primary  := number | string | TRUE | FALSE | '(' expr ')'
//!           | name '(' [expr (',' expr)*] ')'
//!           | cell [':' cell] | label
//! ```

use thiserror::Error;

use crate::reference::{CellRange, CellReference, LabelName};

/// Deepest expression tree, and deepest bracket nesting, a formula may have.
pub const MAX_DEPTH: usize = 256;

/// A parsed formula expression.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Boolean(bool),
    Cell(CellReference),
    Range(CellRange),
    Label(LabelName),
    /// An identifier that is neither a cell, a label nor a function.
    Name(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// Infix operators.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Concat,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    /// Binding strength and whether the operator groups to the right.
    fn precedence(self) -> (u8, bool) {
        match self {
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => (1, false),
            BinaryOp::Concat => (2, false),
            BinaryOp::Add | BinaryOp::Subtract => (3, false),
            BinaryOp::Multiply | BinaryOp::Divide => (4, false),
            BinaryOp::Power => (5, true),
        }
    }
}

/// A formula that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at {position}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Character offset into the formula.
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
    Comma,
    Colon,
}

/// Parses the expression part of a formula, without the leading `=`.
///
/// # Examples
///
/// ```
/// use tabulon_persistence::engine::{parse_expression, Expr};
///
/// let expr = parse_expression("1 + 2").unwrap();
/// assert!(matches!(expr, Expr::Binary { .. }));
/// assert!(parse_expression("1 +").is_err());
/// ```
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        nesting: 0,
    };
    let (expr, _) = parser.parse_binary(0)?;
    if parser.position < parser.tokens.len() {
        return Err(ParseError::new("unexpected trailing input", parser.position));
    }
    Ok(expr)
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse()
                    .map_err(|_| ParseError::new(format!("invalid number {text:?}"), start))?;
                tokens.push(Token::Number(number));
            }
            '"' => {
                let start = i;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(ParseError::new("unterminated string", start)),
                        Some('"') if chars.get(i + 1) == Some(&'"') => {
                            text.push('"');
                            i += 2;
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some(other) => {
                            text.push(*other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Text(text));
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '_' | '.' | '$'))
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '(' | ')' | ',' | ':' => {
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    _ => Token::Colon,
                });
                i += 1;
            }
            '<' | '>' => {
                let next = chars.get(i + 1).copied();
                let (op, width) = match (c, next) {
                    ('<', Some('=')) => (BinaryOp::LessEqual, 2),
                    ('<', Some('>')) => (BinaryOp::NotEqual, 2),
                    ('<', _) => (BinaryOp::Less, 1),
                    (_, Some('=')) => (BinaryOp::GreaterEqual, 2),
                    _ => (BinaryOp::Greater, 1),
                };
                tokens.push(Token::Op(op));
                i += width;
            }
            '+' | '-' | '*' | '/' | '^' | '&' | '=' => {
                tokens.push(Token::Op(match c {
                    '+' => BinaryOp::Add,
                    '-' => BinaryOp::Subtract,
                    '*' => BinaryOp::Multiply,
                    '/' => BinaryOp::Divide,
                    '^' => BinaryOp::Power,
                    '&' => BinaryOp::Concat,
                    _ => BinaryOp::Equal,
                }));
                i += 1;
            }
            other => {
                return Err(ParseError::new(format!("unexpected character {other:?}"), i));
            }
        }
    }

    Ok(tokens)
}

/// An expression together with the depth of its tree.
type Parsed = (Expr, usize);

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            _ => Err(ParseError::new(
                format!("expected {expected:?}"),
                self.position,
            )),
        }
    }

    fn too_deep(&self) -> ParseError {
        ParseError::new(
            format!("formula nests deeper than {MAX_DEPTH} levels"),
            self.position,
        )
    }

    fn node(&self, expr: Expr, depth: usize) -> Result<Parsed, ParseError> {
        if depth > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok((expr, depth))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Parsed, ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(self.too_deep());
        }
        let parsed = self.parse_operators(min_precedence);
        self.nesting -= 1;
        parsed
    }

    fn parse_operators(&mut self, min_precedence: u8) -> Result<Parsed, ParseError> {
        let (mut left, mut depth) = self.parse_unary()?;

        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            let (precedence, right_assoc) = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.position += 1;

            let next_min = if right_assoc {
                precedence
            } else {
                precedence + 1
            };
            let (right, right_depth) = self.parse_binary(next_min)?;
            (left, depth) = self.node(
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                depth.max(right_depth) + 1,
            )?;
        }

        Ok((left, depth))
    }

    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        let mut negations = 0usize;
        loop {
            match self.peek() {
                Some(Token::Op(BinaryOp::Subtract)) => negations += 1,
                Some(Token::Op(BinaryOp::Add)) => {}
                _ => break,
            }
            self.position += 1;
        }

        let (mut expr, mut depth) = self.parse_primary()?;
        for _ in 0..negations {
            (expr, depth) = self.node(Expr::Negate(Box::new(expr)), depth + 1)?;
        }
        Ok((expr, depth))
    }

    fn parse_primary(&mut self) -> Result<Parsed, ParseError> {
        let position = self.position;
        match self.next() {
            Some(Token::Number(n)) => Ok((Expr::Number(n), 1)),
            Some(Token::Text(text)) => Ok((Expr::Text(text), 1)),
            Some(Token::LParen) => {
                let parsed = self.parse_binary(0)?;
                self.expect(Token::RParen)?;
                Ok(parsed)
            }
            Some(Token::Ident(name)) => self.parse_identifier(name),
            Some(token) => Err(ParseError::new(format!("unexpected {token:?}"), position)),
            None => Err(ParseError::new("unexpected end of formula", position)),
        }
    }

    fn parse_identifier(&mut self, name: String) -> Result<Parsed, ParseError> {
        if self.peek() == Some(&Token::LParen) {
            self.position += 1;
            let (args, depth) = self.parse_arguments()?;
            return self.node(
                Expr::Call {
                    name: name.to_ascii_uppercase(),
                    args,
                },
                depth + 1,
            );
        }

        if name.eq_ignore_ascii_case("TRUE") {
            return Ok((Expr::Boolean(true), 1));
        }
        if name.eq_ignore_ascii_case("FALSE") {
            return Ok((Expr::Boolean(false), 1));
        }

        if let Some(cell) = CellReference::try_parse(&name) {
            if self.peek() != Some(&Token::Colon) {
                return Ok((Expr::Cell(cell), 1));
            }
            self.position += 1;
            let position = self.position;
            return match self.next() {
                Some(Token::Ident(end)) => CellReference::try_parse(&end)
                    .map(|end| (Expr::Range(CellRange::new(cell, end)), 1))
                    .ok_or_else(|| ParseError::new(format!("invalid range end {end:?}"), position)),
                _ => Err(ParseError::new("expected range end", position)),
            };
        }

        let expr = LabelName::parse(&name)
            .map(Expr::Label)
            .unwrap_or(Expr::Name(name));
        Ok((expr, 1))
    }

    /// Parses call arguments, returning them with the depth of the deepest.
    fn parse_arguments(&mut self) -> Result<(Vec<Expr>, usize), ParseError> {
        let mut args = Vec::new();
        let mut depth = 0;
        if self.peek() == Some(&Token::RParen) {
            self.position += 1;
            return Ok((args, depth));
        }

        loop {
            let (arg, arg_depth) = self.parse_binary(0)?;
            args.push(arg);
            depth = depth.max(arg_depth);
            let position = self.position;
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok((args, depth)),
                _ => return Err(ParseError::new("expected ',' or ')'", position)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> CellReference {
        CellReference::parse(text).unwrap()
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_expression("1+2*3").unwrap(),
            binary(
                BinaryOp::Add,
                Expr::Number(1.0),
                binary(BinaryOp::Multiply, Expr::Number(2.0), Expr::Number(3.0))
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse_expression("2^3^2").unwrap(),
            binary(
                BinaryOp::Power,
                Expr::Number(2.0),
                binary(BinaryOp::Power, Expr::Number(3.0), Expr::Number(2.0))
            )
        );
    }

    #[test]
    fn test_references_and_labels() {
        assert_eq!(parse_expression("$B$2").unwrap(), Expr::Cell(cell("B2")));
        assert_eq!(
            parse_expression("A1:B3").unwrap(),
            Expr::Range(CellRange::new(cell("A1"), cell("B3")))
        );
        assert_eq!(
            parse_expression("Total").unwrap(),
            Expr::Label(LabelName::parse("Total").unwrap())
        );
    }

    #[test]
    fn test_function_calls() {
        let expr = parse_expression("sum(A1:A3, 4)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "SUM");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {other:?}"),
        }
        assert_eq!(
            parse_expression("NOW()").unwrap(),
            Expr::Call {
                name: "NOW".to_string(),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_strings_and_comparisons() {
        assert_eq!(
            parse_expression(r#""say ""hi""" & "!""#).unwrap(),
            binary(
                BinaryOp::Concat,
                Expr::Text("say \"hi\"".to_string()),
                Expr::Text("!".to_string())
            )
        );
        assert!(matches!(
            parse_expression("A1<>2").unwrap(),
            Expr::Binary {
                op: BinaryOp::NotEqual,
                ..
            }
        ));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(
            parse_expression("-A1").unwrap(),
            Expr::Negate(Box::new(Expr::Cell(cell("A1"))))
        );
    }

    #[test]
    fn test_deep_bracket_nesting_is_rejected() {
        let text = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let err = parse_expression(&text).unwrap_err();
        assert!(err.message.contains("nests deeper"), "{err}");

        let shallow = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_expression(&shallow).unwrap(), Expr::Number(1.0));
    }

    #[test]
    fn test_deep_trees_are_rejected() {
        let long_sum = vec!["1"; 20_000].join("+");
        assert!(parse_expression(&long_sum).is_err());

        let nested_calls = format!("{}1{}", "ABS(".repeat(5_000), ")".repeat(5_000));
        assert!(parse_expression(&nested_calls).is_err());

        let negations = format!("{}1", "-".repeat(5_000));
        assert!(parse_expression(&negations).is_err());

        let signs = format!("{}1", "+".repeat(5_000));
        assert_eq!(parse_expression(&signs).unwrap(), Expr::Number(1.0));

        let terms = vec!["A1"; 200].join("+");
        assert!(parse_expression(&terms).is_ok());
    }

    #[test]
    fn test_parse_errors() {
        for text in ["", "1+", "(1", "1 2", "\"open", "A1:", "SUM(1,", "#"] {
            assert!(parse_expression(text).is_err(), "{text:?}");
        }
    }
}
