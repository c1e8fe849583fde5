//! Engine-wide configuration flags.
//!
//! Unlike the source engine's process-wide globals, these are captured as
//! plain immutable fields on [`crate::Engine`] at construction time — Design
//! Notes §9's "make flags immutable configuration values" recommendation —
//! so two `Engine`s in the same process can run with different settings.

/// Configuration flags for an [`crate::Engine`].
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Emit a `tracing` event from each procedure as it runs. Purely
    /// diagnostic; has no effect on decoded output.
    pub verbose: bool,

    /// When true, `unmarshal` resolves (and, if enabled, warms) the plan
    /// but skips the real decode. Used to separate plan-compilation cost
    /// from decode cost in benchmarks.
    pub dry_run: bool,

    /// Enable the warmup pool: a background worker pre-scans the input
    /// buffer in `Skip` mode while the real decode runs.
    pub look_ahead: bool,

    /// When true, decoding into an already-populated `Vec` appends new
    /// elements; when false (default), the existing contents are cleared
    /// first.
    pub append_slices: bool,

    /// When true, the JSON literal `null` leaves an `Option<Box<T>>`
    /// destination `None` instead of allocating a default `T` and
    /// decoding into it. Default `true`; set `false` to reproduce the
    /// source engine's always-allocate behavior.
    pub recognize_null: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            verbose: false,
            dry_run: false,
            look_ahead: false,
            append_slices: false,
            recognize_null: true,
        }
    }
}
