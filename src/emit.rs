//! The code emission boundary: from binding decisions to callable shapes.
//!
//! Runtime bytecode emission in the original design becomes table
//! construction here: a generated adapter type is an [`AdapterShape`], one
//! precompiled body per interface method, and "loading" it is publishing the
//! shape into the cache.
//!
//! ## Key Components
//!
//! - [`BindingOp`]: one forward-or-fallback instruction in a specification.
//! - [`AdapterSpec`]: the full specification handed to a backend — the
//!   interface, the target class identity, and one op per interface method
//!   in declaration order.
//! - [`EmitBackend`]: the narrow backend contract. Emission must be
//!   deterministic for a given specification; a rejection surfaces as
//!   [`EmitError`] and propagates to the caller unswallowed.
//! - [`TableBackend`]: the default backend. Compiles each op into a
//!   [`AdapterShape`] body: the forward thunk as-is, a prebuilt
//!   [`UnmatchedMethod`] for `Throw`, and the precomputed zero value for
//!   `Default` — so calls never recompute any of this.
//!
//! ## Dispatch cost
//!
//! | Body      | Per-call work                      |
//! |-----------|------------------------------------|
//! | `Forward` | one indirect call into the invoker |
//! | `Throw`   | clone of the prebuilt error        |
//! | `Default` | clone of the precomputed zero      |

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::adapter::BoxHandle;
use crate::class::{ClassId, Invoker, Reflect};
use crate::descriptor::{InterfaceDescriptor, MethodSlot};
use crate::error::{CallError, EmitError, UnmatchedMethod};
use crate::value::{Args, Value, ValueType};

// ---------------------------------------------------------------------------
// Specification
// ---------------------------------------------------------------------------

/// One forward-or-fallback instruction for a single interface method.
pub enum BindingOp {
    /// Forward to the matched target method.
    Forward(Invoker),
    /// Raise [`UnmatchedMethod`] on every call.
    Throw,
    /// Return the zero value of the declared return type on every call,
    /// without touching the wrapped object.
    Default(ValueType),
}

impl fmt::Debug for BindingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingOp::Forward(_) => f.write_str("Forward(..)"),
            BindingOp::Throw => f.write_str("Throw"),
            BindingOp::Default(t) => f.debug_tuple("Default").field(t).finish(),
        }
    }
}

/// Specification of one adapter type, handed to an emission backend.
///
/// `ops` is parallel to `interface.methods()`: one instruction per declared
/// method, in declaration order.
#[derive(Debug)]
pub struct AdapterSpec {
    pub interface: Arc<InterfaceDescriptor>,
    pub class_id: ClassId,
    pub class_name: Arc<str>,
    pub ops: Vec<BindingOp>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Materializes a callable adapter shape from a specification.
///
/// Backends must be deterministic: the same specification always yields a
/// shape with the same behavior. A backend that rejects a specification
/// returns [`EmitError`]; the factory propagates it instead of caching
/// anything.
pub trait EmitBackend: Send + Sync {
    fn emit(&self, spec: AdapterSpec) -> Result<Arc<AdapterShape>, EmitError>;
}

/// Default emission backend: compiles the op sequence into a function table.
#[derive(Debug, Default)]
pub struct TableBackend;

impl EmitBackend for TableBackend {
    fn emit(&self, spec: AdapterSpec) -> Result<Arc<AdapterShape>, EmitError> {
        let AdapterSpec {
            interface,
            class_id,
            class_name,
            ops,
        } = spec;

        if ops.len() != interface.method_count() {
            return Err(EmitError::new(
                interface.name_arc(),
                class_name,
                format!(
                    "specification has {} ops for {} interface methods",
                    ops.len(),
                    interface.method_count()
                ),
            ));
        }

        let methods: Box<[BoundMethod]> = ops
            .into_iter()
            .zip(interface.methods())
            .map(|(op, spec)| match op {
                BindingOp::Forward(invoker) => BoundMethod::Forward(invoker),
                BindingOp::Throw => BoundMethod::Throw(UnmatchedMethod::new(
                    interface.name_arc(),
                    spec.key().name_arc(),
                )),
                BindingOp::Default(ret) => BoundMethod::Default(ret.zero()),
            })
            .collect();

        Ok(Arc::new(AdapterShape {
            interface,
            class_id,
            class_name,
            methods,
        }))
    }
}

// ---------------------------------------------------------------------------
// AdapterShape
// ---------------------------------------------------------------------------

/// Compiled body for one interface method.
enum BoundMethod {
    Forward(Invoker),
    Throw(UnmatchedMethod),
    Default(Value),
}

/// A generated adapter type: one compiled body per interface method.
///
/// Shapes are immutable after emission and shared via `Arc`; the cache
/// guarantees at most one shape exists per (class, interface) pair. A shape
/// holds the target class's name and id but no strong reference to its
/// metadata, so it never keeps a dynamic class alive.
pub struct AdapterShape {
    interface: Arc<InterfaceDescriptor>,
    class_id: ClassId,
    class_name: Arc<str>,
    methods: Box<[BoundMethod]>,
}

impl AdapterShape {
    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        &self.interface
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Whether the method at `slot` forwards to a real target method (as
    /// opposed to a fallback body).
    pub fn forwards(&self, slot: MethodSlot) -> bool {
        matches!(self.methods[slot.index()], BoundMethod::Forward(_))
    }

    /// Binds this shape to one target object.
    ///
    /// Does no matching work: construction cost is independent of the
    /// interface's method count. The handle borrows the target; the shape
    /// stays shared.
    pub fn instantiate<'a>(self: &Arc<Self>, target: &'a dyn Reflect) -> BoxHandle<'a> {
        debug_assert_eq!(
            target.class().id(),
            self.class_id,
            "target class does not match the shape's class"
        );
        BoxHandle::new(Arc::clone(self), target.as_any())
    }

    pub(crate) fn dispatch(
        &self,
        slot: MethodSlot,
        target: &dyn Any,
        args: Args,
    ) -> Result<Value, CallError> {
        match &self.methods[slot.index()] {
            BoundMethod::Forward(invoker) => invoker(target, args),
            BoundMethod::Throw(unmatched) => Err(CallError::Unmatched(unmatched.clone())),
            BoundMethod::Default(zero) => Ok(zero.clone()),
        }
    }
}

impl fmt::Debug for AdapterShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterShape")
            .field("interface", &self.interface.name())
            .field("class", &self.class_name)
            .field("methods", &self.methods.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
