//! `decodable_struct!`: generates a [`crate::decodable::Decodable`] impl
//! for a user struct from a concise field list, standing in for the
//! runtime reflection a garbage-collected host language gets for free.

/// Implements [`crate::decodable::Decodable`] for an existing struct.
///
/// ```
/// use decode_plan::decodable_struct;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// decodable_struct! {
///     Point { x: i64, y: i64 }
/// }
///
/// let mut dest = Point::default();
/// decode_plan::unmarshal(br#"{"x": 1, "y": 2}"#, &mut dest).unwrap();
/// assert_eq!(dest, Point { x: 1, y: 2 });
/// ```
///
/// The target struct must itself implement `Default` (the trait bound
/// [`crate::decodable::Decodable`] carries) — derive it, or provide one by
/// hand for types whose "empty" value isn't all-zero.
#[macro_export]
macro_rules! decodable_struct {
    ($ty:ident { $($field:ident: $field_ty:ty),+ $(,)? }) => {
        impl $crate::decodable::Decodable for $ty {
            fn build_procedure(
                cache: &std::sync::Arc<$crate::cache::PlanCache>,
            ) -> std::sync::Arc<dyn $crate::plan::Procedure<Self>> {
                std::sync::Arc::new($crate::plan::object::ObjectProcedure::build(vec![
                    $(
                        (
                            stringify!($field),
                            std::mem::offset_of!($ty, $field),
                            $crate::plan::object::field_entry::<$ty, $field_ty>(
                                stringify!($field),
                                cache.describe::<$field_ty>(),
                                |dest: &mut $ty| &mut dest.$field,
                            ),
                        ),
                    )+
                ]))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, Default, PartialEq)]
    struct Address {
        city: String,
        zip: String,
    }

    decodable_struct! {
        Address { city: String, zip: String }
    }

    #[test]
    fn generated_impl_decodes_struct() {
        let mut dest = Address::default();
        crate::unmarshal(br#"{"city": "Boston", "zip": "02134"}"#, &mut dest).unwrap();
        assert_eq!(
            dest,
            Address {
                city: "Boston".to_string(),
                zip: "02134".to_string()
            }
        );
    }
}
