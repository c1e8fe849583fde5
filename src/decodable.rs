//! `Decodable`: the compile-time stand-in for runtime type reflection.
//!
//! Rust has no runtime type introspection, so the plan compiler's "describe
//! this type's structural kind" step (spec.md §4.9) is realized as trait
//! resolution instead: every decodable type implements `Decodable`, and
//! `build_procedure` is where that type says which [`Procedure`] shape it
//! needs (string, list, map, pointer, struct, ...). Leaf and container
//! types implement it by hand, below; user structs get an impl generated by
//! [`crate::decodable_struct!`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{LazyProcedure, PlanCache};
use crate::plan::any::AnyValue;
use crate::plan::list::ListProcedure;
use crate::plan::map::{GenericMapProcedure, StringMapProcedure};
use crate::plan::number::NumberProcedure;
use crate::plan::pointer::NullableProcedure;
use crate::plan::string::EscapedString;
use crate::plan::Procedure;

/// A type the plan compiler can build a stored procedure for.
///
/// `Default` is load-bearing (see [`crate::plan::Procedure`]): it is what
/// lets a list, map, or pointer procedure hand a brand-new element a real
/// `&mut Self` scratch value to decode into.
pub trait Decodable: Default + Send + Sync + 'static {
    /// Builds this type's stored procedure. May recursively call
    /// `cache.describe::<U>()` for element/field/key types, but must not do
    /// so for `Self` itself — recursive references to `Self` (e.g. inside
    /// `Option<Box<Self>>`) go through [`LazyProcedure`] instead, so cyclic
    /// type graphs never deadlock.
    fn build_procedure(cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>>
    where
        Self: Sized;
}

impl Decodable for String {
    fn build_procedure(_cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
        Arc::new(EscapedString)
    }
}

impl Decodable for bool {
    fn build_procedure(_cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
        Arc::new(crate::plan::boolean::BoolProcedure)
    }
}

macro_rules! impl_decodable_numeric {
    ($($t:ty),+) => {
        $(
            impl Decodable for $t {
                fn build_procedure(_cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
                    Arc::new(NumberProcedure::<$t>::default())
                }
            }
        )+
    };
}

impl_decodable_numeric!(i64, u64, f64);

impl<T: Decodable> Decodable for Vec<T> {
    fn build_procedure(cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
        Arc::new(ListProcedure::new(LazyProcedure::new(cache.clone())))
    }
}

impl Decodable for HashMap<String, String> {
    fn build_procedure(_cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
        Arc::new(StringMapProcedure)
    }
}

/// Marker newtype selecting the generic map procedure for value types other
/// than `String`.
///
/// Rust's coherence rules forbid a blanket `impl<V: Decodable> Decodable for
/// HashMap<String, V>` alongside the `HashMap<String, String>` impl above
/// (they would overlap for `V = String`), so the fast string-to-string path
/// and the generic path are selected by distinct concrete types; callers
/// that need a heterogeneous-valued map field declare it as
/// `GenericMap<V>` rather than `HashMap<String, V>` directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericMap<V>(pub HashMap<String, V>);

impl<V: Decodable> Decodable for GenericMap<V> {
    fn build_procedure(cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
        Arc::new(GenericMapProcedure::new(LazyProcedure::new(cache.clone())))
    }
}

impl<T: Decodable> Decodable for Option<Box<T>> {
    fn build_procedure(cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
        Arc::new(NullableProcedure::new(LazyProcedure::new(cache.clone())))
    }
}

impl Decodable for AnyValue {
    fn build_procedure(cache: &Arc<PlanCache>) -> Arc<dyn Procedure<Self>> {
        crate::plan::any::AnyProcedure::build(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::DecodeOp;

    #[test]
    fn string_decodable_round_trips_through_cache() {
        let cache = PlanCache::new();
        let procedure = cache.describe::<String>();
        let mut dest = String::new();
        let op = DecodeOp::alloc(br#""ok""#);
        procedure.decode(&op, 0, &mut dest).unwrap();
        assert_eq!(dest, "ok");
    }

    #[test]
    fn vec_decodable_builds_list_procedure() {
        let cache = PlanCache::new();
        let procedure = cache.describe::<Vec<i64>>();
        let mut dest = Vec::new();
        let op = DecodeOp::alloc(b"[1, 2, 3]");
        procedure.decode(&op, 0, &mut dest).unwrap();
        assert_eq!(dest, vec![1, 2, 3]);
    }
}
