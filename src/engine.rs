//! The public entrypoint: resolves a plan, optionally warms it, and runs
//! the real decode.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::cache::PlanCache;
use crate::config::EngineConfig;
use crate::decodable::Decodable;
use crate::error::DecodeError;
use crate::op::{DecodeOp, Mode};
use crate::plan::Procedure;
use crate::report::PlanReport;
use crate::warmup::{CompletionGuard, CompletionSignal, WarmupPool};

/// Owns a plan cache, a warmup pool, and a fixed [`EngineConfig`].
///
/// The source engine's configuration flags are process-wide globals; this
/// crate instead captures them at construction (Design Notes §9's "make
/// flags immutable configuration values"), so two `Engine`s in the same
/// process — say, one with `look_ahead` on for production traffic and one
/// with `dry_run` on for a benchmark harness — don't interfere.
pub struct Engine {
    config: EngineConfig,
    cache: Arc<PlanCache>,
    warmup: Arc<WarmupPool>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            config,
            cache: PlanCache::new(),
            warmup: WarmupPool::new(),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Parses `bytes` and populates `dest` in place, driven by `T`'s
    /// memoized decode plan.
    ///
    /// If `look_ahead` is enabled, a `Skip`-mode scan of `bytes` is
    /// enqueued to the warmup pool before the real decode runs, and this
    /// call blocks on its completion signal after the real decode returns
    /// (spec.md §4.10) — unless the warmup channel was full, in which case
    /// warmup is silently skipped for this call. If `dry_run` is enabled,
    /// the plan is resolved (and optionally warmed) but the real decode is
    /// skipped entirely, leaving `dest` untouched.
    pub fn unmarshal<T: Decodable>(&self, bytes: &[u8], dest: &mut T) -> Result<(), DecodeError> {
        let procedure = self.cache.describe::<T>();

        if self.config.verbose {
            trace!(bytes = bytes.len(), "resolved decode plan");
        }

        let completion = if self.config.look_ahead {
            self.spawn_warmup(bytes, procedure.clone())
        } else {
            None
        };

        let result = if self.config.dry_run {
            Ok(0)
        } else {
            let op = DecodeOp::with_config(bytes, Mode::Alloc, &self.config);
            procedure.decode(&op, 0, dest)
        };

        if let Some(signal) = completion {
            signal.wait();
        }

        result.map(|_| ())
    }

    /// Renders `T`'s decode plan without decoding anything.
    pub fn report_plan<T: Decodable>(&self) -> PlanReport {
        let procedure = self.cache.describe::<T>();
        let mut report = PlanReport::new();
        procedure.report_plan(&mut report, 0, &mut HashSet::new());
        report
    }

    fn spawn_warmup<T: Decodable>(
        &self,
        bytes: &[u8],
        procedure: Arc<dyn Procedure<T>>,
    ) -> Option<Arc<CompletionSignal>> {
        let signal = Arc::new(CompletionSignal::new());
        let signal_for_job = signal.clone();
        let config = self.config;

        // SAFETY: `unmarshal` waits on `signal` before returning whenever
        // this job was accepted, so `bytes` remains valid for the job's
        // entire execution despite the 'static cast — the real borrow
        // outlives every use the job makes of it.
        let bytes: &'static [u8] = unsafe { std::mem::transmute(bytes) };

        let job: Box<dyn FnOnce() + Send> = Box::new(move || {
            // Marks `signal_for_job` done on every exit path, including a
            // panic unwinding out of `skip` — see `CompletionGuard`.
            let _guard = CompletionGuard::new(signal_for_job);
            let op = DecodeOp::with_config(bytes, Mode::Skip, &config);
            let _ = procedure.skip(&op, 0);
        });

        if self.warmup.try_warm(job) {
            Some(signal)
        } else {
            None
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineConfig::default())
    }
}

static DEFAULT_ENGINE: OnceLock<Engine> = OnceLock::new();

fn default_engine() -> &'static Engine {
    DEFAULT_ENGINE.get_or_init(Engine::default)
}

/// Parses `bytes` into `dest` using a process-wide default [`Engine`].
/// Equivalent to `Engine::default().unmarshal(bytes, dest)`, provided for
/// callers that don't need a custom [`EngineConfig`].
pub fn unmarshal<T: Decodable>(bytes: &[u8], dest: &mut T) -> Result<(), DecodeError> {
    default_engine().unmarshal(bytes, dest)
}

/// Renders `T`'s decode plan using the process-wide default [`Engine`].
pub fn report_plan<T: Decodable>() -> PlanReport {
    default_engine().report_plan::<T>()
}
