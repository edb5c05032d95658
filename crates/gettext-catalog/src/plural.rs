//! Plural-form selection from `Plural-Forms` headers
//!
//! Catalog headers carry a C expression over the single variable `n`, e.g.
//! `nplurals=3; plural=((n==1) ? 0 : (n>=2 && n<=4 ? 1 : 2));`. The expression
//! is tokenized and parsed into an [`Expr`] tree by a precedence-climbing
//! parser, then evaluated with checked arithmetic. Nothing in the header is
//! ever executed as code.
//!
//! ### Grammar (C precedence, lowest first)
//! - `c ? a : b` (right associative)
//! - `||`, `&&`
//! - `==`, `!=`
//! - `<`, `<=`, `>`, `>=`
//! - `+`, `-`
//! - `*`, `/`, `%`
//! - unary `!`, `-`, `+`
//! - integer literals, `n`, parentheses

use thiserror::Error;

/// Maximum accepted expression length in bytes.
const MAX_EXPRESSION_BYTES: usize = 4096;
/// Maximum nesting depth of parentheses, unary operators and conditionals.
const MAX_NESTING: usize = 64;

/// Errors raised while parsing or evaluating a plural expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluralError {
    /// The header has no `plural=` clause
    #[error("missing 'plural=' clause in '{0}'")]
    MissingPlural(String),

    /// The expression was empty
    #[error("empty plural expression")]
    EmptyExpression,

    /// The expression exceeded the size limit
    #[error("plural expression exceeds {max_bytes} bytes")]
    InputTooLarge {
        /// Size limit
        max_bytes: usize,
    },

    /// A character outside the grammar was found
    #[error("unexpected character '{found}' at byte {position}")]
    UnexpectedChar {
        /// Offending character
        found: char,
        /// Byte offset
        position: usize,
    },

    /// A token appeared where another was required
    #[error("expected {expected} at byte {position}, found '{found}'")]
    UnexpectedToken {
        /// What the parser needed
        expected: &'static str,
        /// Token text found instead
        found: String,
        /// Byte offset
        position: usize,
    },

    /// The input ended early
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd {
        /// What the parser needed
        expected: &'static str,
    },

    /// A literal did not fit into a signed 64-bit integer
    #[error("invalid number '{raw}' at byte {position}")]
    InvalidNumber {
        /// Literal text
        raw: String,
        /// Byte offset
        position: usize,
    },

    /// The expression nests deeper than allowed
    #[error("plural expression nests deeper than {max_depth} levels")]
    NestingTooDeep {
        /// Depth limit
        max_depth: usize,
    },

    /// Division or remainder by zero during evaluation
    #[error("division by zero")]
    DivisionByZero,

    /// Checked arithmetic overflowed
    #[error("arithmetic overflow")]
    Overflow,

    /// The expression produced a negative plural index
    #[error("negative plural index {0}")]
    NegativeIndex(i64),
}

/// Binary operators of the plural grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
}

impl BinaryOp {
    const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne => 3,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Rem => 6,
        }
    }
}

/// Unary operators of the plural grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
}

/// Parsed plural expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// The quantity `n`
    N,
    /// Integer literal
    Literal(i64),
    /// Unary operation
    Unary(UnaryOp, Box<Expr>),
    /// Binary operation
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `cond ? then : otherwise`
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parses a bare expression such as `(n != 1)`.
    pub fn parse(input: &str) -> Result<Self, PluralError> {
        if input.len() > MAX_EXPRESSION_BYTES {
            return Err(PluralError::InputTooLarge {
                max_bytes: MAX_EXPRESSION_BYTES,
            });
        }

        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(PluralError::EmptyExpression);
        }

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_conditional()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(PluralError::UnexpectedToken {
                expected: "end of expression",
                found: token.kind.to_string(),
                position: token.position,
            }),
        }
    }

    /// Evaluates the expression for the quantity `n`.
    pub fn eval(&self, n: i64) -> Result<i64, PluralError> {
        match self {
            Self::N => Ok(n),
            Self::Literal(value) => Ok(*value),
            Self::Unary(op, operand) => {
                let value = operand.eval(n)?;
                match op {
                    UnaryOp::Not => Ok(i64::from(value == 0)),
                    UnaryOp::Neg => value.checked_neg().ok_or(PluralError::Overflow),
                    UnaryOp::Plus => Ok(value),
                }
            }
            Self::Binary(BinaryOp::And, lhs, rhs) => {
                Ok(i64::from(lhs.eval(n)? != 0 && rhs.eval(n)? != 0))
            }
            Self::Binary(BinaryOp::Or, lhs, rhs) => {
                Ok(i64::from(lhs.eval(n)? != 0 || rhs.eval(n)? != 0))
            }
            Self::Binary(op, lhs, rhs) => apply(*op, lhs.eval(n)?, rhs.eval(n)?),
            Self::Conditional(cond, then, otherwise) => {
                if cond.eval(n)? != 0 {
                    then.eval(n)
                } else {
                    otherwise.eval(n)
                }
            }
        }
    }
}

fn apply(op: BinaryOp, lhs: i64, rhs: i64) -> Result<i64, PluralError> {
    match op {
        BinaryOp::Eq => Ok(i64::from(lhs == rhs)),
        BinaryOp::Ne => Ok(i64::from(lhs != rhs)),
        BinaryOp::Lt => Ok(i64::from(lhs < rhs)),
        BinaryOp::Le => Ok(i64::from(lhs <= rhs)),
        BinaryOp::Gt => Ok(i64::from(lhs > rhs)),
        BinaryOp::Ge => Ok(i64::from(lhs >= rhs)),
        BinaryOp::Add => lhs.checked_add(rhs).ok_or(PluralError::Overflow),
        BinaryOp::Sub => lhs.checked_sub(rhs).ok_or(PluralError::Overflow),
        BinaryOp::Mul => lhs.checked_mul(rhs).ok_or(PluralError::Overflow),
        BinaryOp::Div | BinaryOp::Rem if rhs == 0 => Err(PluralError::DivisionByZero),
        BinaryOp::Div => lhs.checked_div(rhs).ok_or(PluralError::Overflow),
        BinaryOp::Rem => lhs.checked_rem(rhs).ok_or(PluralError::Overflow),
        BinaryOp::And => Ok(i64::from(lhs != 0 && rhs != 0)),
        BinaryOp::Or => Ok(i64::from(lhs != 0 || rhs != 0)),
    }
}

/// A parsed `Plural-Forms` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralForms {
    nplurals: Option<usize>,
    expression: Expr,
}

impl PluralForms {
    /// Parses `nplurals=K; plural=<expr>;`.
    pub fn parse(header: &str) -> Result<Self, PluralError> {
        let mut nplurals = None;
        let mut expression = None;

        for clause in header.split(';') {
            let Some((key, value)) = clause.split_once('=') else {
                continue;
            };
            match key.trim() {
                "nplurals" => nplurals = value.trim().parse().ok(),
                "plural" => expression = Some(Expr::parse(value)?),
                _ => {}
            }
        }

        let expression = expression.ok_or_else(|| PluralError::MissingPlural(header.to_string()))?;
        Ok(Self {
            nplurals,
            expression,
        })
    }

    /// Declared number of plural forms, when present and numeric.
    pub const fn nplurals(&self) -> Option<usize> {
        self.nplurals
    }

    /// Zero-based plural index for the quantity `n`.
    pub fn index(&self, n: u64) -> Result<usize, PluralError> {
        let n = i64::try_from(n).map_err(|_| PluralError::Overflow)?;
        let value = self.expression.eval(n)?;
        usize::try_from(value).map_err(|_| PluralError::NegativeIndex(value))
    }
}

/// Evaluates a `Plural-Forms` header, or a bare expression, for `n`.
pub fn evaluate(expression: &str, n: u64) -> Result<usize, PluralError> {
    if expression.contains("plural=") || expression.contains("plural =") {
        PluralForms::parse(expression)?.index(n)
    } else {
        PluralForms {
            nplurals: None,
            expression: Expr::parse(expression)?,
        }
        .index(n)
    }
}

/// Reads the number after `nplurals=` without parsing the expression.
pub fn declared_nplurals(header: &str) -> Option<usize> {
    let rest = &header[header.find("nplurals=")? + "nplurals=".len()..];
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Number(i64),
    N,
    LParen,
    RParen,
    Question,
    Colon,
    Not,
    Op(BinaryOp),
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Number(value) => return write!(f, "{value}"),
            Self::N => "n",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Question => "?",
            Self::Colon => ":",
            Self::Not => "!",
            Self::Op(op) => match op {
                BinaryOp::Or => "||",
                BinaryOp::And => "&&",
                BinaryOp::Eq => "==",
                BinaryOp::Ne => "!=",
                BinaryOp::Lt => "<",
                BinaryOp::Le => "<=",
                BinaryOp::Gt => ">",
                BinaryOp::Ge => ">=",
                BinaryOp::Add => "+",
                BinaryOp::Sub => "-",
                BinaryOp::Mul => "*",
                BinaryOp::Div => "/",
                BinaryOp::Rem => "%",
            },
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, PluralError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let next = bytes.get(pos + 1).copied();
        let (kind, width) = match (byte, next) {
            (b'0'..=b'9', _) => {
                let end = bytes[pos..]
                    .iter()
                    .position(|b| !b.is_ascii_digit())
                    .map_or(bytes.len(), |offset| pos + offset);
                let raw = &input[pos..end];
                let value = raw.parse().map_err(|_| PluralError::InvalidNumber {
                    raw: raw.to_string(),
                    position: pos,
                })?;
                (TokenKind::Number(value), end - pos)
            }
            (b'n', _) => (TokenKind::N, 1),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'?', _) => (TokenKind::Question, 1),
            (b':', _) => (TokenKind::Colon, 1),
            (b'|', Some(b'|')) => (TokenKind::Op(BinaryOp::Or), 2),
            (b'&', Some(b'&')) => (TokenKind::Op(BinaryOp::And), 2),
            (b'=', Some(b'=')) => (TokenKind::Op(BinaryOp::Eq), 2),
            (b'!', Some(b'=')) => (TokenKind::Op(BinaryOp::Ne), 2),
            (b'<', Some(b'=')) => (TokenKind::Op(BinaryOp::Le), 2),
            (b'>', Some(b'=')) => (TokenKind::Op(BinaryOp::Ge), 2),
            (b'!', _) => (TokenKind::Not, 1),
            (b'<', _) => (TokenKind::Op(BinaryOp::Lt), 1),
            (b'>', _) => (TokenKind::Op(BinaryOp::Gt), 1),
            (b'+', _) => (TokenKind::Op(BinaryOp::Add), 1),
            (b'-', _) => (TokenKind::Op(BinaryOp::Sub), 1),
            (b'*', _) => (TokenKind::Op(BinaryOp::Mul), 1),
            (b'/', _) => (TokenKind::Op(BinaryOp::Div), 1),
            (b'%', _) => (TokenKind::Op(BinaryOp::Rem), 1),
            _ => {
                let found = input[pos..].chars().next().unwrap_or('\u{fffd}');
                return Err(PluralError::UnexpectedChar {
                    found,
                    position: pos,
                });
            }
        };

        tokens.push(Token {
            kind,
            position: pos,
        });
        pos += width;
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self, expected: &'static str) -> Result<&'a Token, PluralError> {
        let tokens: &'a [Token] = self.tokens;
        let token = tokens
            .get(self.pos)
            .ok_or(PluralError::UnexpectedEnd { expected })?;
        self.pos += 1;
        Ok(token)
    }

    fn descend(&mut self) -> Result<(), PluralError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(PluralError::NestingTooDeep {
                max_depth: MAX_NESTING,
            });
        }
        Ok(())
    }

    fn parse_conditional(&mut self) -> Result<Expr, PluralError> {
        self.descend()?;
        let condition = self.parse_binary(1)?;

        let expr = if matches!(self.peek(), Some(Token { kind: TokenKind::Question, .. })) {
            self.pos += 1;
            let then = self.parse_conditional()?;
            let colon = self.next("':'")?;
            if colon.kind != TokenKind::Colon {
                return Err(PluralError::UnexpectedToken {
                    expected: "':'",
                    found: colon.kind.to_string(),
                    position: colon.position,
                });
            }
            let otherwise = self.parse_conditional()?;
            Expr::Conditional(Box::new(condition), Box::new(then), Box::new(otherwise))
        } else {
            condition
        };

        self.depth -= 1;
        Ok(expr)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, PluralError> {
        let mut lhs = self.parse_unary()?;

        while let Some(Token {
            kind: TokenKind::Op(op),
            ..
        }) = self.peek()
        {
            let op = *op;
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_binary(op.precedence() + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, PluralError> {
        let op = match self.peek().map(|token| &token.kind) {
            Some(TokenKind::Not) => Some(UnaryOp::Not),
            Some(TokenKind::Op(BinaryOp::Sub)) => Some(UnaryOp::Neg),
            Some(TokenKind::Op(BinaryOp::Add)) => Some(UnaryOp::Plus),
            _ => None,
        };

        let Some(op) = op else {
            return self.parse_primary();
        };

        self.pos += 1;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> Result<Expr, PluralError> {
        let token = self.next("a number, 'n' or '('")?;
        match &token.kind {
            TokenKind::Number(value) => Ok(Expr::Literal(*value)),
            TokenKind::N => Ok(Expr::N),
            TokenKind::LParen => {
                let inner = self.parse_conditional()?;
                let close = self.next("')'")?;
                if close.kind == TokenKind::RParen {
                    Ok(inner)
                } else {
                    Err(PluralError::UnexpectedToken {
                        expected: "')'",
                        found: close.kind.to_string(),
                        position: close.position,
                    })
                }
            }
            other => Err(PluralError::UnexpectedToken {
                expected: "a number, 'n' or '('",
                found: other.to_string(),
                position: token.position,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SLAVIC: &str = "nplurals=3; plural=((n==1) ? 0 : (n>=2 && n<=4 ? 1 : 2));";

    #[test]
    fn test_slavic_header() {
        let forms = PluralForms::parse(SLAVIC).unwrap();
        assert_eq!(forms.nplurals(), Some(3));
        let expected = [(0, 2), (1, 0), (2, 1), (3, 1), (4, 1), (5, 2), (6, 2), (100, 2)];
        for (n, index) in expected {
            assert_eq!(forms.index(n).unwrap(), index, "n = {n}");
        }
    }

    #[test]
    fn test_compact_slavic_header() {
        let header = "nplurals=3; plural=((n==1)?0:(n>=2&&n<=4?1:2));";
        let results: Vec<usize> = [0, 1, 2, 3, 4, 5, 6, 100]
            .into_iter()
            .map(|n| evaluate(header, n).unwrap())
            .collect();
        assert_eq!(results, [2, 0, 1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_germanic_header() {
        let header = "nplurals=2; plural=(n != 1);";
        assert_eq!(evaluate(header, 1).unwrap(), 0);
        assert_eq!(evaluate(header, 0).unwrap(), 1);
        assert_eq!(evaluate(header, 5).unwrap(), 1);
    }

    #[test]
    fn test_bare_expression() {
        assert_eq!(evaluate("n > 1", 2).unwrap(), 1);
        assert_eq!(evaluate("0", 42).unwrap(), 0);
    }

    #[test]
    fn test_ternary_is_right_associative() {
        let expr = Expr::parse("n == 0 ? 0 : n == 1 ? 1 : 2").unwrap();
        assert_eq!(expr.eval(0).unwrap(), 0);
        assert_eq!(expr.eval(1).unwrap(), 1);
        assert_eq!(expr.eval(7).unwrap(), 2);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(Expr::parse("1 + 2 * 3").unwrap().eval(0).unwrap(), 7);
        assert_eq!(Expr::parse("(1 + 2) * 3").unwrap().eval(0).unwrap(), 9);
        assert_eq!(Expr::parse("10 - 4 - 3").unwrap().eval(0).unwrap(), 3);
        assert_eq!(Expr::parse("1 || 0 && 0").unwrap().eval(0).unwrap(), 1);
        assert_eq!(Expr::parse("2 < 3 == 1").unwrap().eval(0).unwrap(), 1);
        assert_eq!(Expr::parse("!n").unwrap().eval(0).unwrap(), 1);
        assert_eq!(Expr::parse("-n + 3").unwrap().eval(1).unwrap(), 2);
    }

    #[test]
    fn test_untaken_branch_is_not_evaluated() {
        let expr = Expr::parse("n == 0 ? 0 : 10 / n").unwrap();
        assert_eq!(expr.eval(0).unwrap(), 0);
        let expr = Expr::parse("n != 0 && 10 % n == 0").unwrap();
        assert_eq!(expr.eval(0).unwrap(), 0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("n / 0", 1), Err(PluralError::DivisionByZero));
        assert_eq!(evaluate("n % 0", 1), Err(PluralError::DivisionByZero));
    }

    #[test]
    fn test_negative_index() {
        assert_eq!(evaluate("0 - 1", 1), Err(PluralError::NegativeIndex(-1)));
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(matches!(
            Expr::parse("n ==").unwrap_err(),
            PluralError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            Expr::parse("(n == 1").unwrap_err(),
            PluralError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            Expr::parse("n == 1)").unwrap_err(),
            PluralError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            Expr::parse("n ? 1").unwrap_err(),
            PluralError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            Expr::parse("system(n)").unwrap_err(),
            PluralError::UnexpectedChar { found: 's', .. }
        ));
        assert!(matches!(
            Expr::parse("n = 1").unwrap_err(),
            PluralError::UnexpectedChar { found: '=', .. }
        ));
        assert_eq!(Expr::parse("   ").unwrap_err(), PluralError::EmptyExpression);
        assert!(matches!(
            Expr::parse("99999999999999999999").unwrap_err(),
            PluralError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn test_missing_plural_clause() {
        assert!(matches!(
            PluralForms::parse("nplurals=2;"),
            Err(PluralError::MissingPlural(_))
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}n{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(
            Expr::parse(&deep).unwrap_err(),
            PluralError::NestingTooDeep {
                max_depth: MAX_NESTING
            }
        );
    }

    #[test]
    fn test_declared_nplurals() {
        assert_eq!(declared_nplurals(SLAVIC), Some(3));
        assert_eq!(declared_nplurals("nplurals=2; plural=(n!=1 ;"), Some(2));
        assert_eq!(declared_nplurals("plural=n!=1;"), None);
    }

    proptest! {
        #[test]
        fn prop_slavic_matches_direct_arithmetic(n in 0u64..100_000) {
            let expected = if n == 1 { 0 } else if (2..=4).contains(&n) { 1 } else { 2 };
            prop_assert_eq!(evaluate(SLAVIC, n).unwrap(), expected);
        }

        #[test]
        fn prop_polish_matches_direct_arithmetic(n in 0u64..100_000) {
            let header = "nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);";
            let expected = if n == 1 {
                0
            } else if (2..=4).contains(&(n % 10)) && !(10..20).contains(&(n % 100)) {
                1
            } else {
                2
            };
            prop_assert_eq!(evaluate(header, n).unwrap(), expected);
        }

        #[test]
        fn prop_never_panics_on_arbitrary_input(input in "[ n0-9()?:!=<>&|+*/%-]{0,40}", n in 0u64..1000) {
            let _ = evaluate(&input, n);
        }
    }
}
