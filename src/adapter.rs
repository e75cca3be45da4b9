//! Box handles: one adapter instance bound to one target object.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{InterfaceDescriptor, MethodSlot};
use crate::emit::AdapterShape;
use crate::error::CallError;
use crate::value::{Args, Value};

/// A box: an instance of a generated adapter bound to a single target.
///
/// The handle borrows its target for `'a`; the wrapped object's lifetime is
/// otherwise independent and is never mutated by the box itself. Every call
/// is a single indexed dispatch through the shared [`AdapterShape`] with no
/// lookup and no synchronization.
pub struct BoxHandle<'a> {
    shape: Arc<AdapterShape>,
    target: &'a dyn Any,
}

impl<'a> BoxHandle<'a> {
    pub(crate) fn new(shape: Arc<AdapterShape>, target: &'a dyn Any) -> Self {
        Self { shape, target }
    }

    /// The generated adapter type this handle instantiates.
    pub fn shape(&self) -> &Arc<AdapterShape> {
        &self.shape
    }

    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        self.shape.interface()
    }

    /// The erased receiver this box forwards to.
    pub fn target(&self) -> &'a dyn Any {
        self.target
    }

    /// Calls the interface method at `slot`.
    ///
    /// `slot` must come from this handle's own interface descriptor; an
    /// out-of-range slot panics.
    pub fn call(&self, slot: MethodSlot, args: Args) -> Result<Value, CallError> {
        self.shape.dispatch(slot, self.target, args)
    }
}

impl fmt::Debug for BoxHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxHandle")
            .field("interface", &self.shape.interface().name())
            .field("class", &self.shape.class_name())
            .finish()
    }
}
