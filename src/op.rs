//! The per-call decode context threaded through every procedure.

use crate::config::EngineConfig;

/// Which of the two things a procedure call is doing: constructing a value,
/// or just finding out how many bytes it occupies.
///
/// `Skip` is a performance hint produced by cache warmup and by the object
/// procedure's unmatched-key fallback — it must consume exactly the same
/// bytes and raise exactly the same errors as `Alloc`, just without handing
/// any procedure a destination to write through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Construct values into the caller-supplied destination.
    Alloc,
    /// Discard everything; only cursor advancement and errors matter.
    Skip,
}

/// Immutable context passed to every [`crate::plan::Procedure`] call: the
/// whole input buffer, which mode the top-level call is running in, and the
/// subset of [`EngineConfig`] that individual procedures need to consult
/// mid-decode (`append_slices`, `recognize_null`) — since a plan is cached
/// per type and shared across `Engine`s, these travel with the call rather
/// than being baked into the procedure.
///
/// `input` is the entire buffer, not a subslice — procedures navigate by
/// cursor offset into it rather than by re-slicing, so a single `DecodeOp`
/// can be shared (by reference) across an arbitrarily deep call chain
/// without reallocating.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOp<'buf> {
    pub input: &'buf [u8],
    pub mode: Mode,
    pub append_slices: bool,
    pub recognize_null: bool,
}

impl<'buf> DecodeOp<'buf> {
    /// Builds an `Alloc`-mode op over `input` using `config`'s flags.
    pub fn alloc(input: &'buf [u8]) -> Self {
        DecodeOp::with_config(input, Mode::Alloc, &EngineConfig::default())
    }

    /// Builds a `Skip`-mode op over `input` with default flags.
    pub fn skip(input: &'buf [u8]) -> Self {
        DecodeOp::with_config(input, Mode::Skip, &EngineConfig::default())
    }

    /// Builds an op over `input` in `mode`, carrying the relevant flags
    /// from `config`.
    pub fn with_config(input: &'buf [u8], mode: Mode, config: &EngineConfig) -> Self {
        DecodeOp {
            input,
            mode,
            append_slices: config.append_slices,
            recognize_null: config.recognize_null,
        }
    }

    /// Returns a copy of this op with the mode forced to `Skip`, keeping the
    /// same input buffer and flags. Used by the object procedure to run an
    /// unmatched key's value through its fallback procedure regardless of
    /// the parent call's own mode.
    pub fn as_skip(&self) -> Self {
        DecodeOp {
            mode: Mode::Skip,
            ..*self
        }
    }

    /// Reads the byte at `cursor`, or `None` past the end of the buffer.
    /// Every procedure navigates through this rather than slicing
    /// `op.input` directly, so a single bounds check stays in one place.
    pub fn byte_at(&self, cursor: usize) -> Option<u8> {
        self.input.get(cursor).copied()
    }
}
