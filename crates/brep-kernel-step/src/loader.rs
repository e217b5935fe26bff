//! DATA section loader.
//!
//! Splits the file into `;`-terminated statements, finds the `DATA` section
//! and keeps the records whose keyword the classifier supports, keyed by id.

use std::collections::BTreeMap;
use std::io::Read;

use tracing::{debug, warn};

use crate::entities::is_supported;
use crate::error::StepError;
use crate::fields::{decode, Field, Fields};
use crate::lexer::{Lexer, Token};

/// One `#id = BODY;` record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Entity id.
    pub id: u64,
    /// Leading keyword of the body; `(` for complex entities.
    pub keyword: String,
    /// Everything after `=`, keyword included.
    pub body: String,
    /// Line (1-indexed) where the record starts.
    pub line: usize,
}

impl Record {
    /// A lexer positioned at the start of the body.
    pub fn lexer(&self) -> Lexer<'_> {
        Lexer::new(&self.body)
    }

    /// Decode the body against a schema.
    pub fn decode(&self, schema: &[Field]) -> Result<Fields, StepError> {
        decode(&mut self.lexer(), schema, self.id)
    }
}

/// Supported records of a file, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct RecordMap {
    records: BTreeMap<u64, Record>,
}

impl RecordMap {
    /// Record with the given id.
    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Whether a record with this id was kept.
    pub fn contains(&self, id: u64) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of kept records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were kept.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Insert a record, failing on a repeated id.
    pub fn insert(&mut self, record: Record) -> Result<(), StepError> {
        if self.records.contains_key(&record.id) {
            return Err(StepError::DuplicateEntity(record.id));
        }
        self.records.insert(record.id, record);
        Ok(())
    }
}

/// Read a whole stream and load its DATA section.
pub fn load_records(mut reader: impl Read) -> Result<RecordMap, StepError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_str(&String::from_utf8_lossy(&bytes))
}

/// Load the DATA section of a file held in memory.
pub fn load_str(text: &str) -> Result<RecordMap, StepError> {
    let mut map = RecordMap::default();
    let mut in_data = false;
    let mut terminated = false;
    let mut dropped = 0usize;

    for statement in Statements::new(text) {
        let body = statement.text.trim();
        if !in_data {
            in_data = body == "DATA";
            continue;
        }
        if body == "ENDSEC" || body == "END-ISO-10303-21" {
            terminated = true;
            break;
        }
        if body.is_empty() {
            continue;
        }
        match parse_record(body, statement.line)? {
            Some(record) => map.insert(record)?,
            None => dropped += 1,
        }
    }

    if !in_data {
        warn!("no DATA section found");
    } else if !terminated {
        warn!("DATA section ended without ENDSEC");
    }
    debug!(kept = map.len(), dropped, terminated, "loaded DATA section");
    Ok(map)
}

/// Parse one statement; `None` when its keyword is not supported.
fn parse_record(text: &str, line: usize) -> Result<Option<Record>, StepError> {
    let (head, body) = text
        .split_once('=')
        .ok_or_else(|| StepError::record(line, format!("expected '=' in `{}`", preview(text))))?;
    let start = head
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| StepError::record(line, format!("no entity id in `{}`", preview(text))))?;
    let digits = head[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(head.len(), |n| start + n);
    let id: u64 = head[start..digits]
        .parse()
        .map_err(|_| StepError::record(line, format!("entity id `{}` out of range", &head[start..digits])))?;
    let body = body.trim();

    let keyword = match Lexer::new(body).advance() {
        Ok(Token::Text(k)) => k,
        _ => return Ok(None),
    };
    if !is_supported(keyword) {
        return Ok(None);
    }
    Ok(Some(Record {
        id,
        keyword: keyword.to_string(),
        body: body.to_string(),
        line,
    }))
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(40) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

struct Statement {
    line: usize,
    text: String,
}

/// `;`-terminated statements with `/* */` comments removed.
///
/// `;` and `/*` inside `'...'` strings are literal.
struct Statements<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Statements<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
        }
    }
}

impl Iterator for Statements<'_> {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        let bytes = self.bytes;
        let mut buf = Vec::new();
        let mut start_line = None;
        let mut in_string = false;

        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b == b'\n' {
                self.line += 1;
            }
            if in_string {
                in_string = b != b'\'';
            } else if b == b'/' && bytes.get(self.pos + 1) == Some(&b'*') {
                self.pos += 2;
                while self.pos < bytes.len() && !bytes[self.pos..].starts_with(b"*/") {
                    if bytes[self.pos] == b'\n' {
                        self.line += 1;
                    }
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(bytes.len());
                continue;
            } else if b == b';' {
                self.pos += 1;
                return Some(Statement {
                    line: start_line.unwrap_or(self.line),
                    text: String::from_utf8_lossy(&buf).into_owned(),
                });
            } else if b == b'\'' {
                in_string = true;
            }
            if start_line.is_none() && !b.is_ascii_whitespace() {
                start_line = Some(self.line);
            }
            buf.push(b);
            self.pos += 1;
        }

        // trailing text without a terminator
        start_line.map(|line| Statement {
            line,
            text: String::from_utf8_lossy(&buf).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('demo; with semicolon'),'2;1');
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (0., 0., 0.));
/* a comment; with a semicolon */
#2=DIRECTION('',(0.,0.,1.));
#3 = PRESENTATION_STYLE('x');
#4 = PRODUCT('a;b', 'c', '', (#5));
#10 = ( BOUNDED_CURVE() B_SPLINE_CURVE(1, (#1, #1), .UNSPECIFIED., .F., .F.) );
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_load_filters_unsupported() {
        let map = load_str(SAMPLE).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(1).unwrap().keyword, "CARTESIAN_POINT");
        assert_eq!(map.get(2).unwrap().body, "DIRECTION('',(0.,0.,1.))");
        assert!(!map.contains(3));
        assert!(!map.contains(4));
        assert_eq!(map.get(10).unwrap().keyword, "(");
    }

    #[test]
    fn test_record_lines() {
        let map = load_str(SAMPLE).unwrap();
        assert_eq!(map.get(1).unwrap().line, 6);
        assert_eq!(map.get(2).unwrap().line, 8);
    }

    #[test]
    fn test_ids_in_order() {
        let map = load_str(SAMPLE).unwrap();
        let ids: Vec<u64> = map.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[test]
    fn test_missing_endsec_stops_at_end_of_input() {
        let text = "DATA;\n#1 = VERTEX_POINT('', #2);\n#2 = CARTESIAN_POINT('', (1., 2., 3.));\n";
        let map = load_str(text).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_records_after_endsec_ignored() {
        let text = "DATA;\n#1 = VERTEX_POINT('', #2);\nENDSEC;\n#2 = CARTESIAN_POINT('', (1., 2., 3.));\n";
        let map = load_str(text).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_no_data_section() {
        let map = load_str("ISO-10303-21;\nHEADER;\nENDSEC;\n").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let err = load_str("DATA;\n#1 = LINE('', #2, #3);\n\n#x = LINE('', #2, #3);\nENDSEC;\n").unwrap_err();
        match err {
            StepError::Record { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_equals_is_an_error() {
        let err = load_str("DATA;\n#7 LINE('', #2, #3);\nENDSEC;\n").unwrap_err();
        assert!(matches!(err, StepError::Record { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_id() {
        let err = load_str("DATA;\n#7 = PLANE('', #1);\n#7 = PLANE('', #2);\nENDSEC;\n").unwrap_err();
        assert!(matches!(err, StepError::DuplicateEntity(7)));
    }

    #[test]
    fn test_load_records_from_reader() {
        let map = load_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(map.len(), 3);
    }
}
