//! Interface descriptors: the target shape a box implements.
//!
//! ## Key Components
//!
//! - [`SignatureKey`]: exact method identity (name + ordered parameter types
//!   + return type). Matching against a target class uses this key and
//!   nothing else: no coercion, no overload resolution, and declared
//!   checked-failure names never participate.
//! - [`MethodSpec`]: one interface method, a `SignatureKey` plus its declared
//!   checked-failure names (metadata only).
//! - [`InterfaceDescriptor`]: ordered method set with a process-unique
//!   [`InterfaceId`] used as the inner cache key.
//! - [`MethodSlot`]: stable index of a method within its descriptor, so boxed
//!   calls dispatch by position instead of name.
//!
//! Descriptors are built with [`InterfaceDescriptor::builder`]. Structural
//! validation is deferred to adapter generation so that an impure descriptor
//! surfaces as `GenerateError::InvalidInterface` from the resolve path.
//!
//! ## Example Usage
//!
//! ```
//! use boxkit::descriptor::InterfaceDescriptor;
//! use boxkit::value::ValueType;
//!
//! let interface = InterfaceDescriptor::builder("TextObject")
//!     .method("get_text", &[], ValueType::Str)
//!     .method("set_text", &[ValueType::Str], ValueType::Unit)
//!     .finish();
//!
//! assert_eq!(interface.method_count(), 2);
//! let slot = interface.slot("set_text").unwrap();
//! assert_eq!(slot.index(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::value::ValueType;

static NEXT_INTERFACE_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Process-unique identity of an interface descriptor.
///
/// Allocated once per built descriptor. Two descriptors never share an id,
/// even when structurally identical, so each descriptor gets its own cache
/// line per target class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId(u64);

/// Position of a method within its interface descriptor.
///
/// Obtained from [`InterfaceDescriptor::slot`] once at setup time; boxed
/// calls then dispatch by slot with no name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSlot(usize);

impl MethodSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// SignatureKey
// ---------------------------------------------------------------------------

/// Exact method identity: name plus full signature.
///
/// Two methods sharing a name but differing in parameter types or return
/// type have distinct keys and never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    name: Arc<str>,
    params: Box<[ValueType]>,
    ret: ValueType,
}

impl SignatureKey {
    pub fn new(name: impl Into<Arc<str>>, params: &[ValueType], ret: ValueType) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            ret,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn ret(&self) -> ValueType {
        self.ret
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}

// ---------------------------------------------------------------------------
// MethodSpec
// ---------------------------------------------------------------------------

/// One method declared on an interface.
///
/// The declared checked-failure names are carried for documentation and
/// diagnostics; they are deliberately excluded from matching, which compares
/// name, parameter types, and return type only.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    key: SignatureKey,
    throws: Box<[Arc<str>]>,
}

impl MethodSpec {
    pub fn key(&self) -> &SignatureKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn params(&self) -> &[ValueType] {
        self.key.params()
    }

    pub fn ret(&self) -> ValueType {
        self.key.ret()
    }

    /// Declared checked-failure names, in declaration order.
    pub fn throws(&self) -> &[Arc<str>] {
        &self.throws
    }
}

// ---------------------------------------------------------------------------
// InterfaceDescriptor
// ---------------------------------------------------------------------------

/// Identity and ordered method set of a target interface.
#[derive(Debug)]
pub struct InterfaceDescriptor {
    id: InterfaceId,
    name: Arc<str>,
    methods: Box<[MethodSpec]>,
}

impl InterfaceDescriptor {
    /// Starts building a descriptor with the given interface name.
    pub fn builder(name: impl Into<Arc<str>>) -> InterfaceBuilder {
        InterfaceBuilder {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Methods in declaration order; slot indices refer to this order.
    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Slot of the first method named `name`, if any.
    ///
    /// When a name is overloaded this returns the earliest declaration; use
    /// [`slot_of`](Self::slot_of) to pick a specific overload.
    pub fn slot(&self, name: &str) -> Option<MethodSlot> {
        self.methods
            .iter()
            .position(|m| m.name() == name)
            .map(MethodSlot)
    }

    /// Slot of the method with exactly this signature, if any.
    pub fn slot_of(&self, key: &SignatureKey) -> Option<MethodSlot> {
        self.methods
            .iter()
            .position(|m| m.key() == key)
            .map(MethodSlot)
    }
}

/// Builder for [`InterfaceDescriptor`].
///
/// `finish` always succeeds; purity validation happens at generation time so
/// invalid descriptors fail on the resolve path, not here.
#[derive(Debug)]
pub struct InterfaceBuilder {
    name: Arc<str>,
    methods: Vec<MethodSpec>,
}

impl InterfaceBuilder {
    /// Declares a method with no checked failures.
    pub fn method(self, name: impl Into<Arc<str>>, params: &[ValueType], ret: ValueType) -> Self {
        self.method_throws(name, params, ret, &[])
    }

    /// Declares a method along with the names of its checked failures.
    pub fn method_throws(
        mut self,
        name: impl Into<Arc<str>>,
        params: &[ValueType],
        ret: ValueType,
        throws: &[&str],
    ) -> Self {
        self.methods.push(MethodSpec {
            key: SignatureKey::new(name, params, ret),
            throws: throws.iter().map(|t| Arc::from(*t)).collect(),
        });
        self
    }

    /// Seals the descriptor and assigns its process-unique id.
    pub fn finish(self) -> Arc<InterfaceDescriptor> {
        Arc::new(InterfaceDescriptor {
            id: InterfaceId(NEXT_INTERFACE_ID.fetch_add(1, Ordering::Relaxed)),
            name: self.name,
            methods: self.methods.into_boxed_slice(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_per_descriptor() {
        let a = InterfaceDescriptor::builder("A").finish();
        let b = InterfaceDescriptor::builder("A").finish();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn slots_follow_declaration_order() {
        let iface = InterfaceDescriptor::builder("Pair")
            .method("first", &[], ValueType::Int)
            .method("second", &[], ValueType::Int)
            .finish();
        assert_eq!(iface.slot("first").unwrap().index(), 0);
        assert_eq!(iface.slot("second").unwrap().index(), 1);
        assert!(iface.slot("third").is_none());
    }

    #[test]
    fn slot_of_distinguishes_overloads() {
        let iface = InterfaceDescriptor::builder("Overloaded")
            .method("get", &[], ValueType::Int)
            .method("get", &[ValueType::Int], ValueType::Int)
            .finish();
        let by_name = iface.slot("get").unwrap();
        assert_eq!(by_name.index(), 0);
        let narrow = SignatureKey::new("get", &[ValueType::Int], ValueType::Int);
        assert_eq!(iface.slot_of(&narrow).unwrap().index(), 1);
    }

    #[test]
    fn signature_keys_compare_exactly() {
        let a = SignatureKey::new("m", &[ValueType::Int], ValueType::Unit);
        let b = SignatureKey::new("m", &[ValueType::Long], ValueType::Unit);
        let c = SignatureKey::new("m", &[ValueType::Int], ValueType::Int);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, SignatureKey::new("m", &[ValueType::Int], ValueType::Unit));
    }

    #[test]
    fn throws_are_metadata_not_identity() {
        let iface = InterfaceDescriptor::builder("Files")
            .method_throws("read", &[], ValueType::Str, &["IoError"])
            .finish();
        let spec = &iface.methods()[0];
        assert_eq!(spec.throws().len(), 1);
        assert_eq!(&*spec.throws()[0], "IoError");
        // The key itself is unaffected by the declaration.
        assert_eq!(*spec.key(), SignatureKey::new("read", &[], ValueType::Str));
    }
}
