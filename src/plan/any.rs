//! Dynamic-any procedure: decodes a destination of unknown shape by
//! peeking the first non-whitespace byte and dispatching.

use std::any::TypeId;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::cache::PlanCache;
use crate::error::DecodeError;
use crate::op::DecodeOp;
use crate::plan::boolean::BoolProcedure;
use crate::plan::map::{cursor_of_brace_end, expect_open_brace, scan_entry_key};
use crate::plan::number::scan_literal;
use crate::plan::string::EscapedString;
use crate::plan::Procedure;
use crate::report::PlanReport;
use crate::scan::skip_ws;

/// A JSON value of statically unknown shape, closing the open question
/// (e) left by the source engine's `interface{}` "any" slot (Design Notes
/// §9(e)): every JSON value shape gets a real, typed variant instead of
/// undefined behavior for numeric/boolean array and map elements.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    Null,
    Bool(bool),
    PosInt(u64),
    NegInt(i64),
    Float(f64),
    String(String),
    Array(Vec<AnyValue>),
    Object(BTreeMap<String, AnyValue>),
}

impl Default for AnyValue {
    fn default() -> Self {
        AnyValue::Null
    }
}

/// Peeks the first non-whitespace byte at the cursor and delegates to the
/// matching leaf/container logic, matching spec.md §4.8's dispatch table.
/// Recurses into itself for array elements and object values — there is no
/// separate "list-of-any"/"map-of-any" procedure type in this crate, since
/// `AnyProcedure` already is one.
#[derive(Debug, Default)]
pub struct AnyProcedure;

impl AnyProcedure {
    pub fn build(_cache: &Arc<PlanCache>) -> Arc<dyn Procedure<AnyValue>> {
        Arc::new(AnyProcedure)
    }
}

impl Procedure<AnyValue> for AnyProcedure {
    fn decode(&self, op: &DecodeOp, cursor: usize, dest: &mut AnyValue) -> Result<usize, DecodeError> {
        let at = skip_ws(op.input, cursor);
        match op.byte_at(at) {
            Some(b'{') => {
                let mut cursor = expect_open_brace(op.input, at)?;
                let mut map = BTreeMap::new();
                loop {
                    match scan_entry_key(op.input, cursor)? {
                        None => {
                            *dest = AnyValue::Object(map);
                            return Ok(cursor_of_brace_end(op.input, cursor));
                        }
                        Some((key, after_colon)) => {
                            let mut value = AnyValue::default();
                            cursor = self.decode(op, after_colon, &mut value)?;
                            map.insert(key, value);
                        }
                    }
                }
            }
            Some(b'[') => {
                let mut cursor = at + 1;
                let mut list = Vec::new();
                loop {
                    let el_at = skip_ws(op.input, cursor);
                    match op.byte_at(el_at) {
                        Some(b']') => {
                            *dest = AnyValue::Array(list);
                            return Ok(el_at + 1);
                        }
                        None => return Err(DecodeError::NoBracket(el_at)),
                        _ => {}
                    }
                    let mut value = AnyValue::default();
                    cursor = self.decode(op, el_at, &mut value)?;
                    list.push(value);
                }
            }
            Some(b'"') => {
                let mut s = String::new();
                let next = EscapedString.decode(op, at, &mut s)?;
                *dest = AnyValue::String(s);
                Ok(next)
            }
            Some(b't') | Some(b'f') => {
                let mut b = false;
                let next = BoolProcedure.decode(op, at, &mut b)?;
                *dest = AnyValue::Bool(b);
                Ok(next)
            }
            Some(b'n') => {
                let next = expect_null(op.input, at)?;
                *dest = AnyValue::Null;
                Ok(next)
            }
            Some(b) if b.is_ascii_digit() || *b == b'-' => {
                let (text, next) = scan_literal(op.input, at)?;
                *dest = classify_number(text, at)?;
                Ok(next)
            }
            Some(_) => Err(DecodeError::NotImplemented),
            None => Err(DecodeError::UnexpectedEof(at)),
        }
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let at = skip_ws(op.input, cursor);
        match op.byte_at(at) {
            Some(b'{') => {
                let mut cursor = expect_open_brace(op.input, at)?;
                loop {
                    match scan_entry_key(op.input, cursor)? {
                        None => return Ok(cursor_of_brace_end(op.input, cursor)),
                        Some((_, after_colon)) => cursor = self.skip(op, after_colon)?,
                    }
                }
            }
            Some(b'[') => {
                let mut cursor = at + 1;
                loop {
                    let el_at = skip_ws(op.input, cursor);
                    match op.byte_at(el_at) {
                        Some(b']') => return Ok(el_at + 1),
                        None => return Err(DecodeError::NoBracket(el_at)),
                        _ => {}
                    }
                    cursor = self.skip(op, el_at)?;
                }
            }
            Some(b'"') => EscapedString.skip(op, at),
            Some(b't') | Some(b'f') => BoolProcedure.skip(op, at),
            Some(b'n') => expect_null(op.input, at),
            Some(b) if b.is_ascii_digit() || *b == b'-' => {
                let (_, next) = scan_literal(op.input, at)?;
                Ok(next)
            }
            Some(_) => Err(DecodeError::NotImplemented),
            None => Err(DecodeError::UnexpectedEof(at)),
        }
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, _seen: &mut HashSet<TypeId>) {
        report.push(depth, "any");
    }
}

fn expect_null(input: &[u8], at: usize) -> Result<usize, DecodeError> {
    if input.get(at..).is_some_and(|rest| rest.starts_with(b"null")) {
        Ok(at + 4)
    } else {
        // No literal recognized by the dynamic-any dispatcher matches here;
        // there is no dedicated error name for "unrecognized any-slot
        // literal" in spec.md's list, so this reuses the engine-limit
        // category.
        Err(DecodeError::NotImplemented)
    }
}

fn classify_number(text: &str, at: usize) -> Result<AnyValue, DecodeError> {
    if text.contains(['.', 'e', 'E']) {
        return text
            .parse::<f64>()
            .map(AnyValue::Float)
            .map_err(|_| DecodeError::MalformedNumber(at));
    }
    if text.starts_with('-') {
        return text
            .parse::<i64>()
            .map(AnyValue::NegInt)
            .map_err(|_| DecodeError::MalformedNumber(at));
    }
    text.parse::<u64>()
        .map(AnyValue::PosInt)
        .map_err(|_| DecodeError::MalformedNumber(at))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> AnyValue {
        let op = DecodeOp::alloc(input);
        let mut dest = AnyValue::default();
        AnyProcedure.decode(&op, 0, &mut dest).unwrap();
        dest
    }

    #[test]
    fn decodes_object() {
        let value = decode(br#"{"a": 1, "b": "x"}"#);
        match value {
            AnyValue::Object(map) => {
                assert_eq!(map.get("a"), Some(&AnyValue::PosInt(1)));
                assert_eq!(map.get("b"), Some(&AnyValue::String("x".to_string())));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn decodes_array_of_mixed_types() {
        let value = decode(br#"[1, "two", true, null, -3.5]"#);
        assert_eq!(
            value,
            AnyValue::Array(vec![
                AnyValue::PosInt(1),
                AnyValue::String("two".to_string()),
                AnyValue::Bool(true),
                AnyValue::Null,
                AnyValue::Float(-3.5),
            ])
        );
    }

    #[test]
    fn classifies_negative_integers_distinctly_from_floats() {
        assert_eq!(decode(b"-7"), AnyValue::NegInt(-7));
        assert_eq!(decode(b"7"), AnyValue::PosInt(7));
    }

    #[test]
    fn skip_consumes_same_bytes_as_decode() {
        let input = br#"{"a": [1, 2, {"b": "c"}]} trailer"#;
        let decode_next = {
            let op = DecodeOp::alloc(input);
            let mut dest = AnyValue::default();
            AnyProcedure.decode(&op, 0, &mut dest).unwrap()
        };
        let skip_next = {
            let op = DecodeOp::skip(input);
            AnyProcedure.skip(&op, 0).unwrap()
        };
        assert_eq!(decode_next, skip_next);
    }
}
