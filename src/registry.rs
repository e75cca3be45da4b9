//! Process-wide registry of class metadata for compiled types.
//!
//! [`Describe`] types get their method table built exactly once per process
//! and shared from then on; the registry is the strong owner of that
//! metadata, which is why cache eviction only ever matters for runtime-
//! defined classes (a compiled type's `TypeId` is never reclaimed).

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::class::{ClassBuilder, ClassMetadata, Describe};

static CLASSES: OnceLock<RwLock<FxHashMap<TypeId, Arc<ClassMetadata>>>> = OnceLock::new();

fn classes() -> &'static RwLock<FxHashMap<TypeId, Arc<ClassMetadata>>> {
    CLASSES.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Returns the memoized class metadata for `T`, building it on first use.
///
/// Concurrent first calls may race to build, but exactly one table is
/// published; later callers share it.
pub fn class_of<T: Describe>() -> Arc<ClassMetadata> {
    let type_id = TypeId::of::<T>();
    if let Some(class) = classes().read().get(&type_id) {
        return Arc::clone(class);
    }
    let built = T::describe(ClassBuilder::<T>::for_type(T::class_name())).finish();
    Arc::clone(classes().write().entry(type_id).or_insert(built))
}
