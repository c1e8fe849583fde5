//! A reflective JSON decoder driven by a cached, per-type decode plan of
//! composable stored procedures.
//!
//! Decoding a type's JSON shape is driven by a tree of small
//! [`plan::Procedure`] values — one per type-shape (string, list, map,
//! pointer, struct, ...) — built once per destination type by
//! [`cache::PlanCache::describe`] and memoized forever after. Applying the
//! plan never re-inspects the destination's type; the plan itself already
//! knows, byte for byte, what to do.
//!
//! # Decode a struct
//!
//! ```
//! use decode_plan::decodable_struct;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! decodable_struct! {
//!     Point { x: i64, y: i64 }
//! }
//!
//! let mut point = Point::default();
//! decode_plan::unmarshal(br#"{"x": 10, "y": -3}"#, &mut point).unwrap();
//! assert_eq!(point, Point { x: 10, y: -3 });
//! ```
//!
//! # Inspect a plan
//!
//! ```
//! use decode_plan::report_plan;
//!
//! let report = report_plan::<Vec<String>>();
//! assert!(report.to_string().contains("list"));
//! ```
//!
//! # Custom engine configuration
//!
//! ```
//! use decode_plan::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig {
//!     append_slices: true,
//!     ..EngineConfig::default()
//! });
//!
//! let mut tags = vec!["existing".to_string()];
//! engine.unmarshal(br#"["new"]"#, &mut tags).unwrap();
//! assert_eq!(tags, vec!["existing", "new"]);
//! ```

pub mod cache;
pub mod config;
pub mod decodable;
pub mod engine;
pub mod error;
#[macro_use]
pub mod macros;
pub mod op;
pub mod plan;
pub mod report;
pub mod scan;
pub mod warmup;

pub use cache::PlanCache;
pub use config::EngineConfig;
pub use decodable::{Decodable, GenericMap};
pub use engine::{report_plan, unmarshal, Engine};
pub use error::DecodeError;
pub use op::{DecodeOp, Mode};
pub use plan::any::AnyValue;
pub use plan::Procedure;
pub use report::PlanReport;
