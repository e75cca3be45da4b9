//! The box factory: the public entry point for creating adapters.
//!
//! ## Key Components
//!
//! - [`FallbackPolicy`]: what a generated method does when the target class
//!   has no matching method. Fixed at factory construction and applied
//!   uniformly to every adapter the factory generates.
//! - [`BoxFactory`]: resolves (class, interface) pairs through the shape
//!   cache, generating at most once per pair, then binds the shared shape to
//!   the caller's object.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Mutex;
//! use boxkit::prelude::*;
//!
//! struct Label {
//!     text: Mutex<String>,
//! }
//!
//! impl Describe for Label {
//!     fn class_name() -> &'static str {
//!         "Label"
//!     }
//!
//!     fn describe(builder: ClassBuilder<Self>) -> ClassBuilder<Self> {
//!         builder
//!             .method("get_text", &[], ValueType::Str, |label: &Label, _args| {
//!                 Ok(Value::str(label.text.lock().unwrap().clone()))
//!             })
//!             .method(
//!                 "set_text",
//!                 &[ValueType::Str],
//!                 ValueType::Unit,
//!                 |label: &Label, args: Args| {
//!                     *label.text.lock().unwrap() = args.str_at(0)?.to_owned();
//!                     Ok(Value::Unit)
//!                 },
//!             )
//!     }
//! }
//! boxkit::impl_reflect!(Label);
//!
//! let factory = BoxFactory::new(FallbackPolicy::ThrowOnUnmatched);
//! let interface = InterfaceDescriptor::builder("TextObject")
//!     .method("get_text", &[], ValueType::Str)
//!     .method("set_text", &[ValueType::Str], ValueType::Unit)
//!     .finish();
//!
//! let label = Label { text: Mutex::new("Hello".into()) };
//! let boxed = factory.create_box(&interface, &label).unwrap();
//!
//! let get = interface.slot("get_text").unwrap();
//! let set = interface.slot("set_text").unwrap();
//! assert_eq!(boxed.call(get, Args::none()).unwrap(), Value::str("Hello"));
//! boxed.call(set, Args::from(vec![Value::str("World")])).unwrap();
//!
//! // The box and the original object share one target.
//! assert_eq!(*label.text.lock().unwrap(), "World");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::adapter::BoxHandle;
use crate::cache::{CacheMetrics, ShapeCache};
use crate::class::{ClassMetadata, Reflect};
use crate::descriptor::InterfaceDescriptor;
use crate::emit::{AdapterShape, EmitBackend, TableBackend};
use crate::error::GenerateError;
use crate::generator;

// ---------------------------------------------------------------------------
// FallbackPolicy
// ---------------------------------------------------------------------------

/// Behavior of generated methods whose interface declaration has no matching
/// method on the target class.
///
/// Process-wide per factory: chosen at construction, immutable afterwards,
/// and baked into every shape the factory generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Unmatched methods raise [`UnmatchedMethod`](crate::error::UnmatchedMethod)
    /// when called.
    ThrowOnUnmatched,
    /// Unmatched methods return the zero/empty value of their declared
    /// return type: no-op for unit, null for reference kinds, and the
    /// correct-width zero for each numeric kind. The wrapped object is never
    /// touched.
    DefaultValueOnUnmatched,
}

// ---------------------------------------------------------------------------
// BoxFactory
// ---------------------------------------------------------------------------

/// Creates boxes: lightweight adapters that implement an interface by
/// forwarding to a wrapped object.
///
/// Matching and shape generation happen once per (class, interface) pair for
/// the factory's lifetime; every later `create_box` for the same pair reuses
/// the cached shape, paying only the O(1) bind cost.
pub struct BoxFactory {
    policy: FallbackPolicy,
    backend: Arc<dyn EmitBackend>,
    cache: ShapeCache,
}

impl BoxFactory {
    /// Creates a factory using the default table-building backend.
    pub fn new(policy: FallbackPolicy) -> Self {
        Self::with_backend(policy, Arc::new(TableBackend))
    }

    /// Creates a factory with a custom emission backend.
    pub fn with_backend(policy: FallbackPolicy, backend: Arc<dyn EmitBackend>) -> Self {
        Self {
            policy,
            backend,
            cache: ShapeCache::new(),
        }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Boxes `target` behind `interface`.
    ///
    /// Resolves the target's class, fetches or generates the shape for the
    /// (class, interface) pair, and binds it to the object. Generation
    /// failures surface here; they are terminal for the request and nothing
    /// is cached.
    pub fn create_box<'a>(
        &self,
        interface: &Arc<InterfaceDescriptor>,
        target: &'a dyn Reflect,
    ) -> Result<BoxHandle<'a>, GenerateError> {
        let class = target.class();
        let shape = self.resolve(&class, interface)?;
        Ok(shape.instantiate(target))
    }

    /// Returns the shape for (class, interface), generating it at most once.
    ///
    /// Racing first-callers for the same pair block until the winner
    /// publishes, then share its shape.
    pub fn resolve(
        &self,
        class: &Arc<ClassMetadata>,
        interface: &Arc<InterfaceDescriptor>,
    ) -> Result<Arc<AdapterShape>, GenerateError> {
        self.cache.resolve(class, interface, || {
            generator::generate(class, interface, self.policy, self.backend.as_ref())
        })
    }

    /// Drops cache entries for classes that no longer exist. Returns the
    /// number of class entries removed.
    pub fn purge(&self) -> usize {
        self.cache.purge()
    }

    /// Number of target classes with cached shapes, dead or alive.
    pub fn cached_classes(&self) -> usize {
        self.cache.class_count()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }
}

impl fmt::Debug for BoxFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxFactory")
            .field("policy", &self.policy)
            .field("cached_classes", &self.cached_classes())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
