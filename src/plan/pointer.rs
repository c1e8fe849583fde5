//! Pointer/Nullable procedure: decodes into `Option<Box<T>>`, allocating
//! the boxed value on demand.

use std::any::TypeId;
use std::collections::HashSet;

use crate::cache::LazyProcedure;
use crate::decodable::Decodable;
use crate::error::DecodeError;
use crate::op::DecodeOp;
use crate::plan::Procedure;
use crate::report::PlanReport;
use crate::scan::skip_ws;

/// Wraps `T`'s stored procedure to decode into `Option<Box<T>>`.
///
/// Per Design Notes §9(c), this crate *does* recognize the JSON literal
/// `null` (gated behind [`crate::config::EngineConfig::recognize_null`],
/// default on) and leaves the destination `None`; the source engine never
/// checks for `null` and would attempt to decode it as a value of `T`. With
/// recognition off, behavior matches the source: any destination is always
/// allocated and delegated to.
pub struct NullableProcedure<T: Decodable> {
    inner: LazyProcedure<T>,
}

impl<T: Decodable> NullableProcedure<T> {
    pub fn new(inner: LazyProcedure<T>) -> Self {
        NullableProcedure { inner }
    }
}

impl<T: Decodable> Procedure<Option<Box<T>>> for NullableProcedure<T> {
    fn decode(
        &self,
        op: &DecodeOp,
        cursor: usize,
        dest: &mut Option<Box<T>>,
    ) -> Result<usize, DecodeError> {
        if op.recognize_null {
            if let Some(next) = try_consume_null(op.input, cursor) {
                *dest = None;
                return Ok(next);
            }
        }
        if dest.is_none() {
            *dest = Some(Box::new(T::default()));
        }
        let boxed = dest.as_mut().expect("just ensured Some");
        self.inner.get().decode(op, cursor, boxed.as_mut())
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        if op.recognize_null {
            if let Some(next) = try_consume_null(op.input, cursor) {
                return Ok(next);
            }
        }
        self.inner.get().skip(op, cursor)
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, seen: &mut HashSet<TypeId>) {
        report.push(depth, "nullable");
        self.inner.get().report_plan(report, depth + 1, seen);
    }
}

fn try_consume_null(input: &[u8], cursor: usize) -> Option<usize> {
    let at = skip_ws(input, cursor);
    if input.get(at..)?.starts_with(b"null") {
        Some(at + 4)
    } else {
        None
    }
}
