//! Target class metadata: the introspection side of box generation.
//!
//! ## Key Components
//!
//! - [`ClassMetadata`]: a target type's identity plus its callable method
//!   table, indexed by exact [`SignatureKey`]. This is everything the
//!   generator ever asks about a concrete type.
//! - [`ClassBuilder`]: typed registration of methods; each body is a closure
//!   over `&T` that gets erased into an [`Invoker`] thunk.
//! - [`Describe`]: compile-time description of a boxable Rust type, memoized
//!   process-wide by [`class_of`](crate::registry::class_of).
//! - [`Reflect`]: the runtime view the factory consumes — an object's class
//!   plus its erased receiver.
//! - [`DynObject`]: an instance of a runtime-defined class. Dynamic classes
//!   carry a fresh [`ClassId`] per definition, so dropping the last strong
//!   reference to one makes its cache entries reclaimable.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Mutex;
//! use boxkit::class::{ClassBuilder, Describe, Reflect};
//! use boxkit::value::{Args, Value, ValueType};
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
//! let label = Label { text: Mutex::new("Hello".into()) };
//! let class = label.class();
//! assert_eq!(class.name(), "Label");
//! assert_eq!(class.method_count(), 2);
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::descriptor::SignatureKey;
use crate::error::CallError;
use crate::value::{Args, Value, ValueType};

static NEXT_DYNAMIC_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identity of a target class, the outer cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassId {
    /// A compiled Rust type, identified by its `TypeId`.
    Static(TypeId),
    /// A runtime-defined class, identified by a process-unique id.
    Dynamic(u64),
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

/// Erased method body: receives the target's erased receiver and the
/// positional arguments, returns the method's value or failure.
pub type Invoker = Arc<dyn Fn(&dyn Any, Args) -> Result<Value, CallError> + Send + Sync>;

/// A callable method on a target class.
pub struct MethodDef {
    key: SignatureKey,
    invoker: Invoker,
}

impl MethodDef {
    pub fn key(&self) -> &SignatureKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Invokes the method on an erased receiver.
    ///
    /// `target` must be the receiver produced by [`Reflect::as_any`] on an
    /// object of this method's class.
    pub fn call(&self, target: &dyn Any, args: Args) -> Result<Value, CallError> {
        (self.invoker)(target, args)
    }

    pub(crate) fn invoker(&self) -> &Invoker {
        &self.invoker
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef").field("key", &self.key).finish()
    }
}

// ---------------------------------------------------------------------------
// ClassMetadata
// ---------------------------------------------------------------------------

/// Identity and method table of a target class.
///
/// The table is indexed by exact signature key, so overloaded names are
/// distinct entries. Metadata is immutable once built; the box cache holds
/// it only weakly.
pub struct ClassMetadata {
    id: ClassId,
    name: Arc<str>,
    receiver: TypeId,
    methods: Box<[MethodDef]>,
    by_key: FxHashMap<SignatureKey, usize>,
}

impl ClassMetadata {
    /// Starts a runtime-defined class over receiver state `T`, with a fresh
    /// dynamic identity.
    pub fn define<T: Any>(name: impl Into<Arc<str>>) -> ClassBuilder<T> {
        ClassBuilder {
            id: ClassId::Dynamic(NEXT_DYNAMIC_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            methods: Vec::new(),
            _receiver: PhantomData,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// `TypeId` of the receiver type the invokers expect.
    pub fn receiver_type(&self) -> TypeId {
        self.receiver
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    /// Probes the method table by exact signature key.
    pub fn method(&self, key: &SignatureKey) -> Option<&MethodDef> {
        self.by_key.get(key).map(|&i| &self.methods[i])
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Typed builder for a class method table.
///
/// `T` is the receiver type every method body sees; the builder erases each
/// body into an [`Invoker`] that downcasts the receiver back to `&T`.
pub struct ClassBuilder<T> {
    id: ClassId,
    name: Arc<str>,
    methods: Vec<MethodDef>,
    _receiver: PhantomData<fn(&T)>,
}

impl<T: Any> ClassBuilder<T> {
    pub(crate) fn for_type(name: impl Into<Arc<str>>) -> Self {
        ClassBuilder {
            id: ClassId::Static(TypeId::of::<T>()),
            name: name.into(),
            methods: Vec::new(),
            _receiver: PhantomData,
        }
    }

    /// Registers a method. Re-registering an identical signature replaces
    /// the earlier entry; a same-named method with a different signature is
    /// a separate entry.
    pub fn method(
        mut self,
        name: impl Into<Arc<str>>,
        params: &[ValueType],
        ret: ValueType,
        body: impl Fn(&T, Args) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        let invoker: Invoker = Arc::new(move |target: &dyn Any, args: Args| {
            let target = target
                .downcast_ref::<T>()
                .expect("invoker called with a receiver of the wrong class");
            body(target, args)
        });
        self.methods.push(MethodDef {
            key: SignatureKey::new(name, params, ret),
            invoker,
        });
        self
    }

    /// Seals the table and builds the signature index.
    pub fn finish(self) -> Arc<ClassMetadata> {
        let by_key = self
            .methods
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key.clone(), i))
            .collect();
        Arc::new(ClassMetadata {
            id: self.id,
            name: self.name,
            receiver: TypeId::of::<T>(),
            methods: self.methods.into_boxed_slice(),
            by_key,
        })
    }
}

impl<T> fmt::Debug for ClassBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("methods", &self.methods.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Compile-time description of a boxable Rust type.
///
/// The description is built once per process and memoized by
/// [`class_of`](crate::registry::class_of); implementors only list their
/// methods. Pair with [`impl_reflect!`](crate::impl_reflect) to make the
/// type usable as a box target.
pub trait Describe: Any {
    /// Class name reported in metadata and diagnostics.
    fn class_name() -> &'static str
    where
        Self: Sized;

    /// Registers the type's callable methods.
    fn describe(builder: ClassBuilder<Self>) -> ClassBuilder<Self>
    where
        Self: Sized;
}

/// Runtime view of a boxable object: its class plus an erased receiver.
///
/// The factory resolves `class()` once per request (and generates once per
/// class/interface pair); `as_any()` is the receiver forwarded into method
/// invokers on every call.
pub trait Reflect: Any {
    /// Class metadata for this object's runtime type.
    fn class(&self) -> Arc<ClassMetadata>;

    /// Erased receiver handed to method invokers.
    fn as_any(&self) -> &dyn Any;
}

/// Implements [`Reflect`] for a [`Describe`] type via the process-wide class
/// registry. A blanket impl is ruled out by coherence, so each boxable type
/// opts in explicitly.
#[macro_export]
macro_rules! impl_reflect {
    ($ty:ty) => {
        impl $crate::class::Reflect for $ty {
            fn class(&self) -> ::std::sync::Arc<$crate::class::ClassMetadata> {
                $crate::registry::class_of::<$ty>()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

// ---------------------------------------------------------------------------
// DynObject
// ---------------------------------------------------------------------------

/// An instance of a runtime-defined class: shared class metadata plus erased
/// receiver state.
pub struct DynObject {
    class: Arc<ClassMetadata>,
    state: Box<dyn Any + Send + Sync>,
}

impl DynObject {
    /// Binds `state` to a class built by [`ClassMetadata::define`].
    ///
    /// # Panics
    ///
    /// Panics if `T` is not the receiver type the class was defined over;
    /// invokers downcast the receiver and must never see a foreign state
    /// type.
    pub fn new<T: Any + Send + Sync>(class: Arc<ClassMetadata>, state: T) -> Self {
        assert_eq!(
            class.receiver_type(),
            TypeId::of::<T>(),
            "state type does not match the receiver type of class `{}`",
            class.name()
        );
        Self {
            class,
            state: Box::new(state),
        }
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynObject")
            .field("class", &self.class.name())
            .finish()
    }
}

impl Reflect for DynObject {
    fn class(&self) -> Arc<ClassMetadata> {
        Arc::clone(&self.class)
    }

    fn as_any(&self) -> &dyn Any {
        &*self.state
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
