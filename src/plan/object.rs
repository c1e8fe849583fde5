//! Object (struct) procedure: dispatches JSON keys to field procedures by
//! a sorted keyset, a binary search, and an offset-indexed lookup table.

use std::any::TypeId;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::decodable::Decodable;
use crate::error::DecodeError;
use crate::op::DecodeOp;
use crate::plan::any::AnyProcedure;
use crate::plan::map::{cursor_of_brace_end, expect_open_brace, scan_entry_key};
use crate::plan::{FieldDescriptor, Procedure};
use crate::report::PlanReport;

/// One field of `T`: an accessor closure paired with the field's own
/// stored procedure, both erased to operate purely in terms of `T` so a
/// struct's fields — each of a different Rust type — can live in one
/// `Vec`.
pub struct FieldEntry<T> {
    name: &'static str,
    decode: Box<dyn Fn(&DecodeOp, usize, &mut T) -> Result<usize, DecodeError> + Send + Sync>,
    skip: Box<dyn Fn(&DecodeOp, usize) -> Result<usize, DecodeError> + Send + Sync>,
    report: Box<dyn Fn(&mut PlanReport, usize, &mut HashSet<TypeId>) + Send + Sync>,
}

/// Builds a [`FieldEntry`] for a field of type `F` inside `T`, given its
/// declared name, `F`'s memoized procedure, and an accessor closure
/// (typically `|t: &mut T| &mut t.field`, generated by
/// [`crate::decodable_struct!`]).
pub fn field_entry<T, F: Decodable>(
    name: &'static str,
    procedure: Arc<dyn Procedure<F>>,
    accessor: impl Fn(&mut T) -> &mut F + Send + Sync + 'static,
) -> FieldEntry<T> {
    let decode_procedure = procedure.clone();
    let skip_procedure = procedure.clone();
    let report_procedure = procedure;
    FieldEntry {
        name,
        decode: Box::new(move |op, cursor, dest| {
            decode_procedure.decode(op, cursor, accessor(dest))
        }),
        skip: Box::new(move |op, cursor| skip_procedure.skip(op, cursor)),
        report: Box::new(move |report, depth, seen| {
            report_procedure.report_plan(report, depth, seen)
        }),
    }
}

/// A sorted-keyset dispatch table over `T`'s fields, exactly spec.md §4.7:
/// three descriptors per field (declared, lowercase, uppercase alias) are
/// sorted lexicographically by key bytes for binary search, and a second,
/// offset-indexed sparse array gives constant-time lookup from a matched
/// descriptor's offset to its field entry. Unmatched keys fall back to
/// [`AnyProcedure`] run in forced `Skip` mode.
///
/// Colliding aliases (two fields whose lowercase/uppercase forms produce
/// the same key bytes) are deduplicated at construction time, last
/// field-declaration wins (I5) — rather than keeping duplicate descriptor
/// entries and relying on binary-search tie-break order, which spec.md
/// leaves only loosely specified ("the leftmost, which is deterministic
/// given stable sort"). Deduplicating up front removes the ambiguity
/// entirely: at decode time there is at most one descriptor per key text.
pub struct ObjectProcedure<T: Decodable> {
    descriptors: Vec<FieldDescriptor>,
    offsets: Vec<Option<usize>>,
    fields: Vec<FieldEntry<T>>,
    fallback: Arc<dyn Procedure<crate::plan::any::AnyValue>>,
}

impl<T: Decodable> ObjectProcedure<T> {
    /// `fields`: one `(declared_name, byte_offset, entry)` triple per
    /// struct field, in declaration order.
    pub fn build(fields: Vec<(&'static str, usize, FieldEntry<T>)>) -> Self {
        let mut alias_map: BTreeMap<Box<[u8]>, (usize, usize, bool)> = BTreeMap::new();
        let mut entries = Vec::with_capacity(fields.len());
        let mut max_offset = 0usize;

        for (name, offset, entry) in fields {
            let field_index = entries.len();
            max_offset = max_offset.max(offset);
            for (alias, natural) in [
                (name.as_bytes().to_vec(), true),
                (name.to_ascii_lowercase().into_bytes(), false),
                (name.to_ascii_uppercase().into_bytes(), false),
            ] {
                alias_map.insert(alias.into_boxed_slice(), (offset, field_index, natural));
            }
            entries.push(entry);
        }

        let mut offsets = vec![None; max_offset + 1];
        let mut descriptors = Vec::with_capacity(alias_map.len());
        for (key, (offset, field_index, natural)) in alias_map {
            offsets[offset] = Some(field_index);
            descriptors.push(FieldDescriptor::new(key, offset, natural));
        }

        ObjectProcedure {
            descriptors,
            offsets,
            fields: entries,
            fallback: Arc::new(AnyProcedure),
        }
    }

    fn lookup(&self, key: &[u8]) -> Option<&FieldEntry<T>> {
        let index = self
            .descriptors
            .binary_search_by(|descriptor| descriptor.key.as_ref().cmp(key))
            .ok()?;
        let offset = self.descriptors[index].offset;
        self.offsets[offset].map(|field_index| &self.fields[field_index])
    }
}

impl<T: Decodable> Procedure<T> for ObjectProcedure<T> {
    fn decode(&self, op: &DecodeOp, cursor: usize, dest: &mut T) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_brace(op.input, cursor)?;
        loop {
            match scan_entry_key(op.input, cursor)? {
                None => return Ok(cursor_of_brace_end(op.input, cursor)),
                Some((key, after_colon)) => match self.lookup(key.as_bytes()) {
                    Some(field) => cursor = (field.decode)(op, after_colon, dest)?,
                    None => cursor = self.fallback.skip(&op.as_skip(), after_colon)?,
                },
            }
        }
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let mut cursor = expect_open_brace(op.input, cursor)?;
        loop {
            match scan_entry_key(op.input, cursor)? {
                None => return Ok(cursor_of_brace_end(op.input, cursor)),
                Some((key, after_colon)) => match self.lookup(key.as_bytes()) {
                    Some(field) => cursor = (field.skip)(op, after_colon)?,
                    None => cursor = self.fallback.skip(&op.as_skip(), after_colon)?,
                },
            }
        }
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, seen: &mut HashSet<TypeId>) {
        // A struct can only reach itself again through another object
        // procedure for the same destination type (Rust forces the
        // indirection — `Option<Box<Self>>`, `Vec<Self>`, a map of `Self`
        // — so the type graph it built from is always finite, but the
        // *report* walk, unlike decode, isn't bounded by input and would
        // otherwise recurse forever). Render a back-reference instead of
        // descending again once a type is already in progress.
        if !seen.insert(TypeId::of::<T>()) {
            report.push(depth, "object (see above, recursive)");
            return;
        }
        report.push(depth, "object");
        for field in &self.fields {
            report.push(depth + 1, format!("field \"{}\":", field.name));
            (field.report)(report, depth + 2, seen);
        }
        seen.remove(&TypeId::of::<T>());
    }
}
