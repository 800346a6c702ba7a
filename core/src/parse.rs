//! The condition grammar: tokenizer and parser.
//!
//! ```text
//! condition := e | clause ( "&&" clause )*
//! clause    := field op literal
//! field     := Amount | Currency | Method | CardFunding | CardCountry
//!            | Region | RiskScore | "metadata." key
//! op        := == | != | > | < | >= | <=
//! literal   := number | bare word | 'quoted' | "quoted"
//! ```
//!
//! Everything that can be rejected is rejected here, at rule creation
//! time: unknown fields and operators, ordering operators on text fields,
//! non-numeric literals for numeric fields, literals outside an enumerated
//! field's domain, and oversized input. A condition that parses evaluates
//! totally forever after.
//!
//! Parsing also canonicalizes: field keywords to their PascalCase
//! spelling, enumerated literals to their domain spelling (`usd` to `USD`,
//! `QRIS` to `qr`), country codes to uppercase. The canonical form is what
//! [`Condition`]'s `Display` emits, so parse-display of a canonical string
//! is the identity.

use crate::condition::{Clause, CmpOp, Condition, Literal};
use crate::context::{CardFunding, CountryCode, Currency, PaymentMethod, Region};
use crate::error::ValidationError;
use crate::field::{Field, ValueKind};
use crate::{MAX_CLAUSES, MAX_CONDITION_LENGTH};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Parse a condition string. Empty or whitespace-only input is the
/// catch-all condition.
pub(crate) fn parse_condition(input: &str) -> Result<Condition, ValidationError> {
    if input.len() > MAX_CONDITION_LENGTH {
        return Err(ValidationError::ConditionTooLong {
            len: input.len(),
            max: MAX_CONDITION_LENGTH,
        });
    }

    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    if tokens.is_empty() {
        return Ok(Condition::always());
    }

    let end = input.len();
    let mut iter = tokens.into_iter();
    let mut clauses = Vec::new();
    loop {
        clauses.push(parse_clause(&mut iter, end)?);
        match iter.next() {
            None => break,
            Some((_, Token::And)) => {}
            Some((at, token)) => {
                return Err(syntax(at, format!("expected `&&`, found {token}")));
            }
        }
    }
    if clauses.len() > MAX_CLAUSES {
        return Err(ValidationError::TooManyClauses {
            count: clauses.len(),
            max: MAX_CLAUSES,
        });
    }
    Ok(Condition::from_clauses(clauses))
}

/// Whether `s` would lex as a single bare identifier. Decides if a text
/// literal can be displayed unquoted.
pub(crate) fn lexes_as_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn syntax(at: usize, message: impl Into<String>) -> ValidationError {
    ValidationError::Syntax {
        at,
        message: message.into(),
    }
}

fn parse_clause(
    iter: &mut std::vec::IntoIter<(usize, Token)>,
    end: usize,
) -> Result<Clause, ValidationError> {
    let field = match iter.next() {
        Some((_, Token::Ident(name))) => name.parse::<Field>()?,
        Some((at, token)) => {
            return Err(syntax(at, format!("expected a field name, found {token}")));
        }
        None => return Err(syntax(end, "expected a field name")),
    };

    let op = match iter.next() {
        Some((_, Token::Op(op))) => op,
        Some((at, token)) => {
            return Err(syntax(
                at,
                format!("expected a comparison operator, found {token}"),
            ));
        }
        None => return Err(syntax(end, "expected a comparison operator")),
    };
    if op.is_ordering() && field.kind() == ValueKind::Text {
        return Err(ValidationError::NumericOperatorOnText { field, op });
    }

    let literal = match iter.next() {
        Some((at, token)) => literal_for(&field, at, token)?,
        None => return Err(syntax(end, "expected a literal value")),
    };

    Ok(Clause::new(field, op, literal))
}

fn literal_for(field: &Field, at: usize, token: Token) -> Result<Literal, ValidationError> {
    match field.kind() {
        ValueKind::Number => match token {
            Token::Number(n) => Ok(Literal::Number(n)),
            Token::Ident(s) | Token::Quoted(s) => Err(ValidationError::ExpectedNumber {
                field: field.clone(),
                value: s,
            }),
            Token::Op(_) | Token::And => {
                Err(syntax(at, format!("expected a literal value, found {token}")))
            }
        },
        ValueKind::Text => {
            let raw = match token {
                Token::Ident(s) | Token::Quoted(s) => s,
                // A metadata entry may hold digits; compare them as text.
                Token::Number(n) => n.to_string(),
                Token::Op(_) | Token::And => {
                    return Err(syntax(at, format!("expected a literal value, found {token}")));
                }
            };
            canonical_text(field, raw)
        }
    }
}

/// Normalize a text literal into its field's canonical spelling, rejecting
/// values outside a closed domain.
fn canonical_text(field: &Field, raw: String) -> Result<Literal, ValidationError> {
    let unknown = |value: String| ValidationError::UnknownValue {
        field: field.clone(),
        value,
    };
    let canonical = match field {
        Field::Currency => match raw.parse::<Currency>() {
            Ok(v) => v.to_string(),
            Err(_) => return Err(unknown(raw)),
        },
        Field::Method => match raw.parse::<PaymentMethod>() {
            Ok(v) => v.to_string(),
            Err(_) => return Err(unknown(raw)),
        },
        Field::CardFunding => match raw.parse::<CardFunding>() {
            Ok(v) => v.to_string(),
            Err(_) => return Err(unknown(raw)),
        },
        Field::Region => match raw.parse::<Region>() {
            Ok(v) => v.to_string(),
            Err(_) => return Err(unknown(raw)),
        },
        Field::CardCountry => match CountryCode::new(&raw) {
            Ok(v) => v.to_string(),
            Err(_) => return Err(unknown(raw)),
        },
        // Free-form: kept verbatim, compared case-sensitively.
        Field::Metadata(_) => raw,
        // Numeric fields take the other arm of literal_for.
        Field::Amount | Field::RiskScore => raw,
    };
    Ok(Literal::Text(canonical))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tokenizer
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(Decimal),
    Quoted(String),
    Op(CmpOp),
    And,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "`{s}`"),
            Self::Number(n) => write!(f, "`{n}`"),
            Self::Quoted(s) => write!(f, "'{s}'"),
            Self::Op(op) => write!(f, "`{op}`"),
            Self::And => f.write_str("`&&`"),
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn next_token(&mut self) -> Result<Option<(usize, Token)>, ValidationError> {
        self.skip_whitespace();
        let at = self.pos;
        let rest = self.rest();
        let Some(first) = rest.chars().next() else {
            return Ok(None);
        };

        match first {
            '&' => {
                if rest.starts_with("&&") {
                    self.pos += 2;
                    Ok(Some((at, Token::And)))
                } else {
                    Err(syntax(at, "expected `&&`"))
                }
            }
            '=' | '!' | '<' | '>' => {
                if let Some(two) = rest.get(..2) {
                    if let Ok(op) = two.parse::<CmpOp>() {
                        self.pos += 2;
                        return Ok(Some((at, Token::Op(op))));
                    }
                }
                if let Ok(op) = rest[..1].parse::<CmpOp>() {
                    self.pos += 1;
                    return Ok(Some((at, Token::Op(op))));
                }
                // A run of operator characters that is not in the set,
                // e.g. a lone `=` or `!`.
                let run: String = rest
                    .chars()
                    .take_while(|c| matches!(c, '=' | '!' | '<' | '>'))
                    .collect();
                Err(ValidationError::UnknownOperator(run))
            }
            quote @ ('\'' | '"') => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(close) => {
                        self.pos += 1 + close + 1;
                        Ok(Some((at, Token::Quoted(body[..close].to_string()))))
                    }
                    None => Err(syntax(at, "unterminated string literal")),
                }
            }
            c if c.is_ascii_digit() || (c == '-' && starts_with_digit(&rest[1..])) => {
                let sign = usize::from(c == '-');
                let digits = rest[sign..]
                    .chars()
                    .take_while(|ch| ch.is_ascii_digit() || *ch == '.')
                    .count();
                let text = &rest[..sign + digits];
                match Decimal::from_str(text) {
                    Ok(n) => {
                        self.pos += text.len();
                        Ok(Some((at, Token::Number(n))))
                    }
                    Err(_) => Err(syntax(at, format!("invalid number `{text}`"))),
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let len = rest
                    .chars()
                    .take_while(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
                    .count();
                self.pos += len;
                Ok(Some((at, Token::Ident(rest[..len].to_string()))))
            }
            other => Err(syntax(at, format!("unexpected character `{other}`"))),
        }
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}
