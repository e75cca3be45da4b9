//! Dynamic values crossing the adapter boundary.
//!
//! ## Key Components
//!
//! - [`Value`]: the runtime value passed into and out of boxed calls. Each
//!   numeric width is a distinct variant; `Null` is the empty reference.
//! - [`ValueType`]: runtime type tag used in method signatures.
//!   [`ValueType::zero`] produces the zero/empty value the
//!   `DefaultValueOnUnmatched` fallback returns, one representation per kind.
//! - [`Args`]: positional argument pack handed to method invokers, with typed
//!   accessors that fail with [`CallError::Argument`] on a mismatch.
//!
//! ## Example Usage
//!
//! ```
//! use boxkit::value::{Args, Value, ValueType};
//!
//! // Each return kind has its own zero.
//! assert_eq!(ValueType::Int.zero(), Value::Int(0));
//! assert_eq!(ValueType::Double.zero(), Value::Double(0.0));
//! assert_eq!(ValueType::Str.zero(), Value::Null);
//!
//! // Typed argument access.
//! let args = Args::from(vec![Value::str("hello"), Value::Long(7)]);
//! assert_eq!(args.str_at(0).unwrap(), "hello");
//! assert_eq!(args.long_at(1).unwrap(), 7);
//! assert!(args.int_at(1).is_err());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::CallError;

// ---------------------------------------------------------------------------
// ValueType
// ---------------------------------------------------------------------------

/// Runtime type tag for parameters and return values.
///
/// Signature matching is exact: `Int` and `Long` never match each other, and
/// `Object` tags match only when the underlying `TypeId` is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value (a `void` return).
    Unit,
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    Str,
    /// An opaque reference type, identified by its `TypeId`.
    Object(TypeId),
}

impl ValueType {
    /// Tag for an opaque reference to a `T`.
    pub fn object<T: Any>() -> Self {
        ValueType::Object(TypeId::of::<T>())
    }

    /// The zero/empty value for this type.
    ///
    /// This is what an unmatched method returns under the
    /// `DefaultValueOnUnmatched` fallback: no-op for `Unit`, `Null` for
    /// reference kinds, and the correct-width zero for each numeric kind.
    pub fn zero(self) -> Value {
        match self {
            ValueType::Unit => Value::Unit,
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Long => Value::Long(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Double => Value::Double(0.0),
            ValueType::Str | ValueType::Object(_) => Value::Null,
        }
    }

    /// Short human-readable name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Unit => "unit",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Str => "str",
            ValueType::Object(_) => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A dynamic value passed across a box boundary.
///
/// `Null` stands for the absent reference; it is the default for `Str` and
/// `Object` returns when a method falls back. Object payloads are shared via
/// `Arc` and compared by pointer identity.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Unit,
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Builds a `Str` value.
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Builds an `Object` value wrapping `payload`.
    pub fn object<T: Any + Send + Sync>(payload: T) -> Self {
        Value::Object(Arc::new(payload))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Downcasts an `Object` payload to a concrete `T`.
    pub fn downcast_object<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Object(obj) => Arc::clone(obj).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => "str",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("Unit"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Long(n) => f.debug_tuple("Long").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Object(_) => f.write_str("Object(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

/// Positional argument pack for a boxed call.
///
/// Invokers read arguments with the typed accessors; a wrong kind or a
/// missing position yields [`CallError::Argument`] rather than a panic.
#[derive(Debug, Default)]
pub struct Args(Vec<Value>);

impl Args {
    /// An empty argument pack.
    pub fn none() -> Self {
        Args(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the value at `index`.
    pub fn value_at(&self, index: usize) -> Result<&Value, CallError> {
        self.0
            .get(index)
            .ok_or_else(|| CallError::argument(index, "value", "missing"))
    }

    /// Moves the value at `index` out of the pack, leaving `Unit` behind.
    pub fn take_at(&mut self, index: usize) -> Result<Value, CallError> {
        match self.0.get_mut(index) {
            Some(slot) => Ok(std::mem::take(slot)),
            None => Err(CallError::argument(index, "value", "missing")),
        }
    }

    pub fn bool_at(&self, index: usize) -> Result<bool, CallError> {
        let value = self.value_at(index)?;
        value
            .as_bool()
            .ok_or_else(|| CallError::argument(index, "bool", value.kind_name()))
    }

    pub fn int_at(&self, index: usize) -> Result<i32, CallError> {
        let value = self.value_at(index)?;
        value
            .as_int()
            .ok_or_else(|| CallError::argument(index, "int", value.kind_name()))
    }

    pub fn long_at(&self, index: usize) -> Result<i64, CallError> {
        let value = self.value_at(index)?;
        value
            .as_long()
            .ok_or_else(|| CallError::argument(index, "long", value.kind_name()))
    }

    pub fn float_at(&self, index: usize) -> Result<f32, CallError> {
        let value = self.value_at(index)?;
        value
            .as_float()
            .ok_or_else(|| CallError::argument(index, "float", value.kind_name()))
    }

    pub fn double_at(&self, index: usize) -> Result<f64, CallError> {
        let value = self.value_at(index)?;
        value
            .as_double()
            .ok_or_else(|| CallError::argument(index, "double", value.kind_name()))
    }

    pub fn str_at(&self, index: usize) -> Result<&str, CallError> {
        let value = self.value_at(index)?;
        value
            .as_str()
            .ok_or_else(|| CallError::argument(index, "str", value.kind_name()))
    }

    /// Downcasts the `Object` argument at `index` to a concrete `T`.
    pub fn object_at<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, CallError> {
        let value = self.value_at(index)?;
        value
            .downcast_object::<T>()
            .ok_or_else(|| CallError::argument(index, "object", value.kind_name()))
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args(values)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
