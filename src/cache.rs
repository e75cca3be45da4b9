//! Two-level shape cache keyed by target class, then interface.
//!
//! ## Key Components
//!
//! - [`ShapeCache`]: owns every shape ever generated by its factory and
//!   guarantees at most one shape per (class, interface) pair.
//! - [`CacheMetrics`]: atomic hit/miss/generation/purge counters, snapshot
//!   on demand.
//!
//! ## Concurrency
//!
//! Reads take a shared `parking_lot::RwLock`; a miss upgrades to the write
//! lock, re-checks, and generates while holding it. Racing first-callers for
//! the same pair therefore block until the winner publishes, then share its
//! shape — redundant generation cannot happen. Generation is expected to be
//! fast and free of external blocking, so holding the lock across it is the
//! simpler correct choice.
//!
//! ## Weak association
//!
//! The outer level holds a `Weak<ClassMetadata>` per class and no strong
//! reference, so the cache never extends a class's lifetime. Entries whose
//! class has been dropped are swept opportunistically whenever a new class
//! entry is inserted, and eagerly via [`ShapeCache::purge`]. Compiled types
//! are owned by the process-wide registry and effectively live forever;
//! sweeping only ever reclaims runtime-defined classes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::class::{ClassId, ClassMetadata};
use crate::descriptor::{InterfaceDescriptor, InterfaceId};
use crate::emit::AdapterShape;
use crate::error::GenerateError;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Point-in-time snapshot of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Resolves served from the read fast path.
    pub hits: u64,
    /// Resolves that left the fast path (some may still have been satisfied
    /// by a racing winner under the write lock).
    pub misses: u64,
    /// Shapes actually generated and published.
    pub generations: u64,
    /// Dead class entries removed by sweeps.
    pub purged: u64,
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    generations: AtomicU64,
    purged: AtomicU64,
}

impl CacheCounters {
    fn snapshot(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
        }
    }

    fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_generation(&self) {
        self.generations.fetch_add(1, Ordering::Relaxed);
    }

    fn add_purged(&self, n: u64) {
        self.purged.fetch_add(n, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// ShapeCache
// ---------------------------------------------------------------------------

/// Per-class cache line: the weak class association plus its shapes.
struct ClassShapes {
    class: Weak<ClassMetadata>,
    shapes: FxHashMap<InterfaceId, Arc<AdapterShape>>,
}

/// Two-level mapping from (class, interface) to generated shapes.
pub(crate) struct ShapeCache {
    map: RwLock<FxHashMap<ClassId, ClassShapes>>,
    metrics: CacheCounters,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(FxHashMap::default()),
            metrics: CacheCounters::default(),
        }
    }

    /// Returns the shape for (class, interface), generating and publishing
    /// it on first request.
    ///
    /// `generate` runs under the write lock, so at most one generation ever
    /// happens per pair; a failed generation publishes nothing.
    pub fn resolve(
        &self,
        class: &Arc<ClassMetadata>,
        interface: &Arc<InterfaceDescriptor>,
        generate: impl FnOnce() -> Result<Arc<AdapterShape>, GenerateError>,
    ) -> Result<Arc<AdapterShape>, GenerateError> {
        {
            let map = self.map.read();
            if let Some(entry) = map.get(&class.id()) {
                if let Some(shape) = entry.shapes.get(&interface.id()) {
                    self.metrics.inc_hit();
                    return Ok(Arc::clone(shape));
                }
            }
        }
        self.metrics.inc_miss();

        let mut map = self.map.write();
        if let Some(entry) = map.get(&class.id()) {
            if let Some(shape) = entry.shapes.get(&interface.id()) {
                // A racing caller generated while we waited for the lock.
                return Ok(Arc::clone(shape));
            }
        }

        let shape = generate()?;
        self.metrics.inc_generation();

        let new_class = !map.contains_key(&class.id());
        map.entry(class.id())
            .or_insert_with(|| ClassShapes {
                class: Arc::downgrade(class),
                shapes: FxHashMap::default(),
            })
            .shapes
            .insert(interface.id(), Arc::clone(&shape));

        if new_class {
            let removed = Self::sweep(&mut map);
            self.metrics.add_purged(removed as u64);
        }
        Ok(shape)
    }

    /// Drops every entry whose class has been dropped. Returns the number of
    /// class entries removed.
    pub fn purge(&self) -> usize {
        let removed = Self::sweep(&mut self.map.write());
        self.metrics.add_purged(removed as u64);
        removed
    }

    /// Number of class entries currently cached, dead or alive.
    pub fn class_count(&self) -> usize {
        self.map.read().len()
    }

    /// Whether a shape is cached for this exact pair.
    pub fn contains(&self, class: ClassId, interface: InterfaceId) -> bool {
        self.map
            .read()
            .get(&class)
            .is_some_and(|entry| entry.shapes.contains_key(&interface))
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.snapshot()
    }

    fn sweep(map: &mut FxHashMap<ClassId, ClassShapes>) -> usize {
        let before = map.len();
        map.retain(|_, entry| entry.class.strong_count() > 0);
        before - map.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
