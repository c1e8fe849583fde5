//! The process-wide (or per-`Engine`) plan cache: memoizes one stored
//! procedure per destination type and coordinates concurrent first-touch
//! compilation, including of cyclic type graphs.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, OnceLock};

use crate::decodable::Decodable;
use crate::plan::Procedure;

/// A per-type condition used to coordinate concurrent first-touch builds.
/// `true` once the build has finished (successfully or not) and the
/// corresponding entry has been moved from `pending` to `published`.
struct PendingEntry {
    done: Mutex<bool>,
    condvar: Condvar,
}

impl PendingEntry {
    fn new() -> Self {
        PendingEntry {
            done: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn wait_until_done(&self) {
        let mut done = self.done.lock().unwrap();
        while !*done {
            done = self.condvar.wait(done).unwrap();
        }
    }

    fn mark_done(&self) {
        *self.done.lock().unwrap() = true;
        self.condvar.notify_all();
    }
}

/// Maps a destination type to its (memoized, immutable once published)
/// stored procedure.
///
/// `describe::<T>()` implements double-checked insertion exactly per the
/// source engine's plan compiler: fast-path cache hit, else publish a
/// pending entry for this `TypeId` *before* recursing into
/// `T::build_procedure`, so a cyclic type graph (e.g. a struct containing
/// `Option<Box<Self>>`) never causes the building thread to wait on its own
/// pending entry — it simply never re-enters `describe::<T>()` for the type
/// it is already building. Other threads that observe the pending entry
/// first do wait.
#[derive(Default)]
pub struct PlanCache {
    // Each entry is a `Box<dyn Any>` wrapping a concrete, `Sized`
    // `Arc<dyn Procedure<T>>` — `Any` cannot name an unsized trait object
    // directly, so the `Arc` (a thin, sized fat-pointer handle) is itself
    // the thing downcast against.
    published: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    pending: Mutex<HashMap<TypeId, Arc<PendingEntry>>>,
}

impl PlanCache {
    pub fn new() -> Arc<Self> {
        Arc::new(PlanCache::default())
    }

    /// Returns the memoized procedure for `T`, building and publishing it
    /// if this is the first time `T` has been observed by this cache.
    pub fn describe<T: Decodable>(self: &Arc<Self>) -> Arc<dyn Procedure<T>> {
        let type_id = TypeId::of::<T>();

        if let Some(procedure) = self.lookup::<T>(type_id) {
            return procedure;
        }

        let pending = {
            let mut pending_table = self.pending.lock().unwrap();
            if let Some(existing) = pending_table.get(&type_id).cloned() {
                drop(pending_table);
                existing.wait_until_done();
                return self
                    .lookup::<T>(type_id)
                    .expect("publisher marked pending entry done without publishing");
            }
            let entry = Arc::new(PendingEntry::new());
            pending_table.insert(type_id, entry.clone());
            entry
        };

        let procedure: Arc<dyn Procedure<T>> = T::build_procedure(self);

        self.published
            .lock()
            .unwrap()
            .insert(type_id, Box::new(procedure.clone()));
        self.pending.lock().unwrap().remove(&type_id);
        pending.mark_done();

        procedure
    }

    fn lookup<T: Decodable>(&self, type_id: TypeId) -> Option<Arc<dyn Procedure<T>>> {
        let published = self.published.lock().unwrap();
        published.get(&type_id).map(|boxed| {
            boxed
                .downcast_ref::<Arc<dyn Procedure<T>>>()
                .unwrap_or_else(|| unreachable!("TypeId collision in plan cache"))
                .clone()
        })
    }
}

/// Defers resolving an element/value/inner procedure until the first real
/// `decode`/`skip` call, rather than during `build_procedure` itself.
///
/// This is what makes cyclic type graphs safe: `ListProcedure<T>`,
/// `GenericMapProcedure<V>`, and `NullableProcedure<T>` all hold a
/// `LazyProcedure<T>` for their element/value/inner type instead of calling
/// `cache.describe::<T>()` eagerly while *they themselves* are still being
/// built (which, for `Option<Box<Self>>`, would mean `describe::<Self>()`
/// recursing into itself before its own pending entry's procedure exists).
/// By the time any actual decode call reaches this wrapper, the top-level
/// `describe::<Root>()` that triggered construction has necessarily
/// finished publishing everything, so the lazy resolution always succeeds
/// without blocking.
pub struct LazyProcedure<T: Decodable> {
    cache: Arc<PlanCache>,
    resolved: OnceLock<Arc<dyn Procedure<T>>>,
}

impl<T: Decodable> LazyProcedure<T> {
    pub fn new(cache: Arc<PlanCache>) -> Self {
        LazyProcedure {
            cache,
            resolved: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &Arc<dyn Procedure<T>> {
        self.resolved.get_or_init(|| self.cache.describe::<T>())
    }
}
