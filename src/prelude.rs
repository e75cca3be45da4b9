//! Flat re-exports of the types most callers need.

pub use crate::adapter::BoxHandle;
pub use crate::cache::CacheMetrics;
pub use crate::class::{
    ClassBuilder, ClassId, ClassMetadata, Describe, DynObject, Invoker, MethodDef, Reflect,
};
pub use crate::descriptor::{
    InterfaceBuilder, InterfaceDescriptor, InterfaceId, MethodSlot, MethodSpec, SignatureKey,
};
pub use crate::emit::{AdapterShape, AdapterSpec, BindingOp, EmitBackend, TableBackend};
pub use crate::error::{CallError, EmitError, GenerateError, UnmatchedMethod};
pub use crate::factory::{BoxFactory, FallbackPolicy};
pub use crate::registry::class_of;
pub use crate::value::{Args, Value, ValueType};
