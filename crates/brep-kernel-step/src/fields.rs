//! Declarative decoding of record parameters.
//!
//! A schema is a `const` slice of [`Field`] descriptors mirroring the shape of
//! an entity's parameter list. [`decode`] runs the descriptors in order over
//! one lexer and concatenates what they produce into a flat [`Fields`] tuple,
//! which is then read back front to back with typed accessors.
//!
//! ```text
//! EDGE_CURVE('', #10, #11, #12, .T.)
//!   Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Reference, Reference, Logical])
//!   -> [Reference(10), Reference(11), Reference(12), Logical(true)]
//! ```

use crate::error::StepError;
use crate::lexer::{LexError, Lexer, Token};

/// One field descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    /// Any text token (keyword, string, enumeration).
    Text,
    /// Non-negative integral number.
    Integer,
    /// Number.
    Real,
    /// `.T.` or `.F.`.
    Logical,
    /// `#n`; anything else (`$`, `*`) decodes as unset.
    Reference,
    /// `(x, y, z)`.
    Triple,
    /// `( item, ... )`; a missing `(` yields an empty list.
    List(&'static Field),
    /// `( ( item, ... ), ... )`; rows end at the first non-`(` token.
    Matrix(&'static Field),
    /// `( fields... )`, flattened into the enclosing tuple.
    Group(&'static [Field]),
    /// Consume the fields without producing values.
    Skip(&'static [Field]),
}

/// One decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text as written, markers included.
    Text(String),
    /// Integer.
    Integer(usize),
    /// Real number.
    Real(f64),
    /// Boolean.
    Logical(bool),
    /// Reference id, `None` when unset.
    Reference(Option<u64>),
    /// Three numbers.
    Triple([f64; 3]),
    /// List or matrix row contents.
    List(Vec<Value>),
}

impl Value {
    fn describe(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Logical(_) => "logical",
            Value::Reference(_) => "reference",
            Value::Triple(_) => "triple",
            Value::List(_) => "list",
        }
    }
}

/// Decode `schema` from the lexer's current position.
///
/// Errors carry `entity_id` so a caller can locate the record.
pub fn decode(lexer: &mut Lexer<'_>, schema: &[Field], entity_id: u64) -> Result<Fields, StepError> {
    let mut decoder = Decoder { lexer, entity_id };
    let mut values = Vec::new();
    for field in schema {
        decoder.field(field, false, &mut values)?;
    }
    Ok(Fields {
        entity_id,
        values: values.into_iter(),
    })
}

struct Decoder<'l, 'a> {
    lexer: &'l mut Lexer<'a>,
    entity_id: u64,
}

impl<'a> Decoder<'_, 'a> {
    fn lex_error(&self, e: LexError) -> StepError {
        StepError::syntax(self.entity_id, e.to_string())
    }

    fn next(&mut self) -> Result<Token<'a>, StepError> {
        match self.lexer.advance() {
            Ok(Token::Absent) => Err(StepError::syntax(self.entity_id, "unexpected end of record")),
            Ok(token) => Ok(token),
            Err(e) => Err(self.lex_error(e)),
        }
    }

    fn peek(&self) -> Result<Token<'a>, StepError> {
        self.lexer.peek().map_err(|e| self.lex_error(e))
    }

    fn expect(&mut self, punct: &str) -> Result<(), StepError> {
        let token = self.next()?;
        if token.is(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{punct}'"), token))
        }
    }

    fn unexpected(&self, expected: &str, found: Token<'_>) -> StepError {
        let found = match found {
            Token::Absent => "end of record".to_string(),
            Token::Text(t) => format!("'{t}'"),
            Token::Number(n) => n.to_string(),
        };
        StepError::syntax(self.entity_id, format!("expected {expected}, found {found}"))
    }

    fn number(&mut self, expected: &str) -> Result<f64, StepError> {
        match self.next()? {
            Token::Number(n) => Ok(n),
            other => Err(self.unexpected(expected, other)),
        }
    }

    /// Decode one field. `lenient` scalars accept any single token.
    fn field(&mut self, field: &Field, lenient: bool, out: &mut Vec<Value>) -> Result<(), StepError> {
        match field {
            Field::Text | Field::Integer | Field::Real | Field::Logical if lenient => {
                self.next()?;
            }
            Field::Text => match self.next()? {
                Token::Text(t) => out.push(Value::Text(t.to_string())),
                other => return Err(self.unexpected("text", other)),
            },
            Field::Integer => {
                let n = self.number("integer")?;
                if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
                    return Err(StepError::syntax(self.entity_id, format!("expected integer, found {n}")));
                }
                out.push(Value::Integer(n as usize));
            }
            Field::Real => out.push(Value::Real(self.number("number")?)),
            Field::Logical => match self.next()? {
                t if t.is(".T.") => out.push(Value::Logical(true)),
                t if t.is(".F.") => out.push(Value::Logical(false)),
                other => return Err(self.unexpected(".T. or .F.", other)),
            },
            Field::Reference => {
                let id = if self.next()?.is("#") {
                    let n = self.number("entity id")?;
                    if n < 0.0 || n.fract() != 0.0 {
                        return Err(StepError::syntax(self.entity_id, format!("invalid entity id {n}")));
                    }
                    Some(n as u64)
                } else {
                    None
                };
                out.push(Value::Reference(id));
            }
            Field::Triple => {
                self.expect("(")?;
                let x = self.number("number")?;
                let y = self.number("number")?;
                let z = self.number("number")?;
                self.expect(")")?;
                out.push(Value::Triple([x, y, z]));
            }
            Field::List(item) => {
                let items = if self.next()?.is("(") {
                    self.items(item, lenient)?
                } else {
                    Vec::new()
                };
                out.push(Value::List(items));
            }
            Field::Matrix(item) => {
                let mut rows = Vec::new();
                if self.next()?.is("(") {
                    loop {
                        let token = self.next()?;
                        if token.is("(") {
                            let row = self.items(item, lenient)?;
                            if row.is_empty() {
                                return Err(StepError::syntax(self.entity_id, "empty matrix row"));
                            }
                            rows.push(Value::List(row));
                        } else if token.is(")") {
                            break;
                        } else {
                            return Err(self.unexpected("'(' or ')'", token));
                        }
                    }
                }
                out.push(Value::List(rows));
            }
            Field::Group(fields) => {
                self.expect("(")?;
                for f in fields.iter() {
                    self.field(f, lenient, out)?;
                }
                self.expect(")")?;
            }
            Field::Skip(fields) => {
                let mut scratch = Vec::new();
                for f in fields.iter() {
                    self.field(f, true, &mut scratch)?;
                }
            }
        }
        Ok(())
    }

    /// Items after an opening `(`, through the closing `)`.
    fn items(&mut self, item: &Field, lenient: bool) -> Result<Vec<Value>, StepError> {
        let mut items = Vec::new();
        loop {
            match self.peek()? {
                t if t.is(")") => {
                    self.next()?;
                    return Ok(items);
                }
                Token::Absent => {
                    return Err(StepError::syntax(self.entity_id, "unterminated list"));
                }
                _ => self.field(item, lenient, &mut items)?,
            }
        }
    }
}

/// A decoded tuple, consumed front to back.
#[derive(Debug)]
pub struct Fields {
    entity_id: u64,
    values: std::vec::IntoIter<Value>,
}

fn mismatch(entity_id: u64, expected: &str, found: Option<&Value>) -> StepError {
    let found = found.map_or("nothing", Value::describe);
    StepError::syntax(entity_id, format!("expected {expected} field, decoded {found}"))
}

fn list_of<T>(
    entity_id: u64,
    value: Value,
    expected: &str,
    mut item: impl FnMut(Value) -> Result<T, StepError>,
) -> Result<Vec<T>, StepError> {
    match value {
        Value::List(items) => items.into_iter().map(&mut item).collect(),
        other => Err(mismatch(entity_id, expected, Some(&other))),
    }
}

impl Fields {
    /// Id of the decoded record.
    pub fn entity_id(&self) -> u64 {
        self.entity_id
    }

    /// Values not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn take(&mut self) -> Option<Value> {
        self.values.next()
    }

    /// Take a text value.
    pub fn text(&mut self) -> Result<String, StepError> {
        match self.take() {
            Some(Value::Text(t)) => Ok(t),
            other => Err(mismatch(self.entity_id, "text", other.as_ref())),
        }
    }

    /// Take an integer.
    pub fn integer(&mut self) -> Result<usize, StepError> {
        match self.take() {
            Some(Value::Integer(n)) => Ok(n),
            other => Err(mismatch(self.entity_id, "integer", other.as_ref())),
        }
    }

    /// Take a real number.
    pub fn real(&mut self) -> Result<f64, StepError> {
        match self.take() {
            Some(Value::Real(x)) => Ok(x),
            other => Err(mismatch(self.entity_id, "real", other.as_ref())),
        }
    }

    /// Take a boolean.
    pub fn logical(&mut self) -> Result<bool, StepError> {
        match self.take() {
            Some(Value::Logical(b)) => Ok(b),
            other => Err(mismatch(self.entity_id, "logical", other.as_ref())),
        }
    }

    /// Take a reference that may be unset.
    pub fn reference(&mut self) -> Result<Option<u64>, StepError> {
        match self.take() {
            Some(Value::Reference(id)) => Ok(id),
            other => Err(mismatch(self.entity_id, "reference", other.as_ref())),
        }
    }

    /// Take a reference that must be set.
    pub fn required(&mut self) -> Result<u64, StepError> {
        let entity_id = self.entity_id;
        self.reference()?
            .ok_or(StepError::UnsetReference { entity_id })
    }

    /// Take a triple.
    pub fn triple(&mut self) -> Result<[f64; 3], StepError> {
        match self.take() {
            Some(Value::Triple(t)) => Ok(t),
            other => Err(mismatch(self.entity_id, "triple", other.as_ref())),
        }
    }

    fn list(&mut self, expected: &str) -> Result<Value, StepError> {
        self.take()
            .ok_or_else(|| mismatch(self.entity_id, expected, None))
    }

    /// Take a list of required references.
    pub fn references(&mut self) -> Result<Vec<u64>, StepError> {
        let id = self.entity_id;
        let value = self.list("reference list")?;
        list_of(id, value, "reference list", |v| match v {
            Value::Reference(Some(r)) => Ok(r),
            Value::Reference(None) => Err(StepError::UnsetReference { entity_id: id }),
            other => Err(mismatch(id, "reference", Some(&other))),
        })
    }

    /// Take a list of integers.
    pub fn integers(&mut self) -> Result<Vec<usize>, StepError> {
        let id = self.entity_id;
        let value = self.list("integer list")?;
        list_of(id, value, "integer list", |v| match v {
            Value::Integer(n) => Ok(n),
            other => Err(mismatch(id, "integer", Some(&other))),
        })
    }

    /// Take a list of reals.
    pub fn reals(&mut self) -> Result<Vec<f64>, StepError> {
        let id = self.entity_id;
        let value = self.list("real list")?;
        list_of(id, value, "real list", |v| match v {
            Value::Real(x) => Ok(x),
            other => Err(mismatch(id, "real", Some(&other))),
        })
    }

    /// Take a matrix of required references.
    pub fn reference_grid(&mut self) -> Result<Vec<Vec<u64>>, StepError> {
        let id = self.entity_id;
        let value = self.list("reference matrix")?;
        list_of(id, value, "reference matrix", |row| {
            list_of(id, row, "reference row", |v| match v {
                Value::Reference(Some(r)) => Ok(r),
                Value::Reference(None) => Err(StepError::UnsetReference { entity_id: id }),
                other => Err(mismatch(id, "reference", Some(&other))),
            })
        })
    }

    /// Take a matrix of reals.
    pub fn real_grid(&mut self) -> Result<Vec<Vec<f64>>, StepError> {
        let id = self.entity_id;
        let value = self.list("real matrix")?;
        list_of(id, value, "real matrix", |row| {
            list_of(id, row, "real row", |v| match v {
                Value::Real(x) => Ok(x),
                other => Err(mismatch(id, "real", Some(&other))),
            })
        })
    }

    /// All remaining values.
    pub fn into_values(self) -> Vec<Value> {
        self.values.collect()
    }
}
