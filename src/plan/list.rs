//! List procedure: decodes `[ ... ]` into a `Vec<T>`.

use std::any::TypeId;
use std::collections::HashSet;

use crate::cache::LazyProcedure;
use crate::decodable::Decodable;
use crate::error::DecodeError;
use crate::op::DecodeOp;
use crate::plan::Procedure;
use crate::report::PlanReport;
use crate::scan::skip_ws;

/// Decodes a JSON array into `Vec<T>`.
///
/// `Vec<T>`'s own doubling growth plays the role of spec.md's arena
/// (pre-sized to four elements, grown ×5/3) — see the growth-strategy
/// equivalence note in the data model; nothing here pre-sizes or
/// re-slices, `push` is sufficient.
///
/// Where spec.md lets the child procedure signal end-of-container by
/// returning `UnexpectedListEnd` (the trick `plan::map`/`plan::object` use,
/// via `scan_key`, because their children always start by scanning a
/// quoted key), this procedure peeks for `]` directly before each element:
/// list elements are arbitrary `Decodable` types, not always
/// string-shaped, so there is no single child call every element type
/// funnels through that could raise the container-end signal uniformly.
pub struct ListProcedure<T: Decodable> {
    element: LazyProcedure<T>,
}

impl<T: Decodable> ListProcedure<T> {
    pub fn new(element: LazyProcedure<T>) -> Self {
        ListProcedure { element }
    }
}

impl<T: Decodable> Procedure<Vec<T>> for ListProcedure<T> {
    fn decode(&self, op: &DecodeOp, cursor: usize, dest: &mut Vec<T>) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_bracket(op.input, cursor)?;
        if !op.append_slices {
            dest.clear();
        }
        let element = self.element.get();
        loop {
            let at = skip_ws(op.input, cursor);
            match op.byte_at(at) {
                Some(b']') => return Ok(at + 1),
                None => return Err(DecodeError::NoBracket(at)),
                _ => {}
            }
            let mut value = T::default();
            cursor = element.decode(op, at, &mut value)?;
            dest.push(value);
        }
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_bracket(op.input, cursor)?;
        let element = self.element.get();
        loop {
            let at = skip_ws(op.input, cursor);
            match op.byte_at(at) {
                Some(b']') => return Ok(at + 1),
                None => return Err(DecodeError::NoBracket(at)),
                _ => {}
            }
            cursor = element.skip(op, at)?;
        }
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, seen: &mut HashSet<TypeId>) {
        report.push(depth, "list");
        self.element.get().report_plan(report, depth + 1, seen);
    }
}

fn expect_open_bracket(input: &[u8], cursor: usize) -> Result<usize, DecodeError> {
    let at = skip_ws(input, cursor);
    match input.get(at) {
        Some(b'[') => Ok(at + 1),
        Some(_) => Err(DecodeError::NoBracketOpen(at)),
        None => Err(DecodeError::NoBracketOpen(at)),
    }
}
