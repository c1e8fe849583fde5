//! Boolean procedure: JSON `true`/`false` literals.
//!
//! Not part of the source engine's procedure set (it never decodes any
//! literal) but required for `AnyProcedure`'s `t`/`f` dispatch to have
//! somewhere to delegate for the `any` slot, and a natural leaf for a
//! struct field declared `bool`.

use std::any::TypeId;
use std::collections::HashSet;

use crate::error::DecodeError;
use crate::op::DecodeOp;
use crate::plan::Procedure;
use crate::report::PlanReport;
use crate::scan::skip_ws;

#[derive(Debug, Default)]
pub struct BoolProcedure;

impl Procedure<bool> for BoolProcedure {
    fn decode(&self, op: &DecodeOp, cursor: usize, dest: &mut bool) -> Result<usize, DecodeError> {
        let (value, next) = scan_literal(op.input, cursor)?;
        *dest = value;
        Ok(next)
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let (_, next) = scan_literal(op.input, cursor)?;
        Ok(next)
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, _seen: &mut HashSet<TypeId>) {
        report.push(depth, "bool");
    }
}

fn scan_literal(input: &[u8], cursor: usize) -> Result<(bool, usize), DecodeError> {
    let start = skip_ws(input, cursor);
    let rest = input.get(start..).unwrap_or(&[]);
    if rest.starts_with(b"true") {
        Ok((true, start + 4))
    } else if rest.starts_with(b"false") {
        Ok((false, start + 5))
    } else if rest.is_empty() {
        Err(DecodeError::UnexpectedEof(start))
    } else {
        Err(DecodeError::MalformedNumber(start))
    }
}
