//! Map procedures: `StringMapProcedure` (the `{string ↦ string}` fast
//! path) and `GenericMapProcedure<V>` (any `Decodable` value type).

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use crate::cache::LazyProcedure;
use crate::decodable::Decodable;
use crate::error::DecodeError;
use crate::op::DecodeOp;
use crate::plan::string::{scan_key, EscapedString};
use crate::plan::Procedure;
use crate::report::PlanReport;
use crate::scan::skip_ws;

const DEFAULT_MAP_CAPACITY: usize = 4;

pub(crate) fn expect_open_brace(input: &[u8], cursor: usize) -> Result<usize, DecodeError> {
    let at = skip_ws(input, cursor);
    match input.get(at) {
        Some(b'{') => Ok(at + 1),
        _ => Err(DecodeError::NoBraceOpen(at)),
    }
}

fn expect_colon(input: &[u8], cursor: usize) -> Result<usize, DecodeError> {
    let at = skip_ws(input, cursor);
    match input.get(at) {
        Some(b':') => Ok(at + 1),
        _ => Err(DecodeError::NoColon(at)),
    }
}

/// Fast path for `HashMap<String, String>`: keys and values are both
/// decoded directly (key via raw scan, value via [`EscapedString`])
/// without going through the plan cache for either.
#[derive(Debug, Default)]
pub struct StringMapProcedure;

impl Procedure<HashMap<String, String>> for StringMapProcedure {
    fn decode(
        &self,
        op: &DecodeOp,
        cursor: usize,
        dest: &mut HashMap<String, String>,
    ) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_brace(op.input, cursor)?;
        loop {
            match scan_entry_key(op.input, cursor)? {
                None => return Ok(cursor_of_brace_end(op.input, cursor)),
                Some((key, after_colon)) => {
                    let mut value = String::new();
                    cursor = EscapedString.decode(op, after_colon, &mut value)?;
                    if dest.is_empty() {
                        dest.reserve(DEFAULT_MAP_CAPACITY);
                    }
                    dest.insert(key, value);
                }
            }
        }
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_brace(op.input, cursor)?;
        loop {
            match scan_entry_key(op.input, cursor)? {
                None => return Ok(cursor_of_brace_end(op.input, cursor)),
                Some((_, after_colon)) => {
                    cursor = EscapedString.skip(op, after_colon)?;
                }
            }
        }
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, _seen: &mut HashSet<TypeId>) {
        report.push(depth, "map<string, string> (fast path)");
    }
}

/// General map procedure: values are decoded through `V`'s memoized
/// stored procedure.
pub struct GenericMapProcedure<V: Decodable> {
    value: LazyProcedure<V>,
}

impl<V: Decodable> GenericMapProcedure<V> {
    pub fn new(value: LazyProcedure<V>) -> Self {
        GenericMapProcedure { value }
    }
}

impl<V: Decodable> Procedure<crate::decodable::GenericMap<V>> for GenericMapProcedure<V> {
    fn decode(
        &self,
        op: &DecodeOp,
        cursor: usize,
        dest: &mut crate::decodable::GenericMap<V>,
    ) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_brace(op.input, cursor)?;
        let value_procedure = self.value.get();
        loop {
            match scan_entry_key(op.input, cursor)? {
                None => return Ok(cursor_of_brace_end(op.input, cursor)),
                Some((key, after_colon)) => {
                    let mut value = V::default();
                    cursor = value_procedure.decode(op, after_colon, &mut value)?;
                    if dest.0.is_empty() {
                        dest.0.reserve(DEFAULT_MAP_CAPACITY);
                    }
                    dest.0.insert(key, value);
                }
            }
        }
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_brace(op.input, cursor)?;
        let value_procedure = self.value.get();
        loop {
            match scan_entry_key(op.input, cursor)? {
                None => return Ok(cursor_of_brace_end(op.input, cursor)),
                Some((_, after_colon)) => {
                    cursor = value_procedure.skip(op, after_colon)?;
                }
            }
        }
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, seen: &mut HashSet<TypeId>) {
        report.push(depth, "map<string, V>");
        self.value.get().report_plan(report, depth + 1, seen);
    }
}

/// Scans one `"key":` pair, or detects `}` first (spec.md §4.5(a)): returns
/// `None` when the raw-string key scan raises `UnexpectedMapEnd`, which is
/// this protocol's literal end-of-container signal.
pub(crate) fn scan_entry_key(
    input: &[u8],
    cursor: usize,
) -> Result<Option<(String, usize)>, DecodeError> {
    match scan_key(input, cursor) {
        Ok((start, end, after_quote)) => {
            let key = std::str::from_utf8(&input[start..end])
                .unwrap_or_default()
                .to_owned();
            let after_colon = expect_colon(input, after_quote)?;
            Ok(Some((key, after_colon)))
        }
        Err(DecodeError::UnexpectedMapEnd(_)) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Given the cursor at which `scan_entry_key` detected `}` (its leading
/// whitespace already skipped by `expect_quote_or_container_end`), returns
/// the cursor just past that `}`.
pub(crate) fn cursor_of_brace_end(input: &[u8], cursor: usize) -> usize {
    let at = skip_ws(input, cursor);
    debug_assert_eq!(input.get(at), Some(&b'}'));
    at + 1
}
