//! Error types for the boxkit library.
//!
//! ## Key Components
//!
//! - [`UnmatchedMethod`]: raised at call time, only under the
//!   `ThrowOnUnmatched` fallback, when an interface method has no structural
//!   counterpart on the target class. Never raised for generation failures.
//! - [`CallError`]: everything a boxed call can fail with — the unmatched
//!   fallback, the forwarded-to method's own error (propagated with its
//!   identity intact), or an argument mismatch inside an invoker.
//! - [`GenerateError`]: surfaced synchronously from the resolve path when the
//!   interface fails purity validation or the emission backend rejects the
//!   adapter specification. Never retried, never swallowed.

use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// UnmatchedMethod
// ---------------------------------------------------------------------------

/// Error raised when a boxed call hits an interface method with no matching
/// method on the target class.
///
/// Only produced by adapters generated under `FallbackPolicy::ThrowOnUnmatched`;
/// under `DefaultValueOnUnmatched` the same call returns the zero value of the
/// declared return type instead. Carries just enough to identify the absent
/// forwarding target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedMethod {
    interface: Arc<str>,
    method: Arc<str>,
}

impl UnmatchedMethod {
    pub(crate) fn new(interface: Arc<str>, method: Arc<str>) -> Self {
        Self { interface, method }
    }

    /// Name of the interface the box implements.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Name of the interface method with no forwarding target.
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for UnmatchedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no matching target method for `{}::{}`",
            self.interface, self.method
        )
    }
}

impl std::error::Error for UnmatchedMethod {}

// ---------------------------------------------------------------------------
// CallError
// ---------------------------------------------------------------------------

/// Error returned by a boxed call.
#[derive(Debug)]
pub enum CallError {
    /// The interface method has no forwarding target and the box was
    /// generated under `ThrowOnUnmatched`.
    Unmatched(UnmatchedMethod),
    /// The forwarded-to method failed with its own error. The original error
    /// is carried unmodified and can be recovered via `downcast_ref`.
    Failure(Box<dyn std::error::Error + Send + Sync>),
    /// An argument did not have the kind the invoker expected.
    Argument {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },
}

impl CallError {
    /// Wraps a target method's own error for propagation through the box.
    pub fn failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        CallError::Failure(Box::new(err))
    }

    pub(crate) fn argument(index: usize, expected: &'static str, got: &'static str) -> Self {
        CallError::Argument {
            index,
            expected,
            got,
        }
    }

    /// Returns the unmatched-method payload, if that is what this error is.
    pub fn as_unmatched(&self) -> Option<&UnmatchedMethod> {
        match self {
            CallError::Unmatched(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Unmatched(u) => u.fmt(f),
            CallError::Failure(e) => write!(f, "target method failed: {}", e),
            CallError::Argument {
                index,
                expected,
                got,
            } => write!(f, "argument {}: expected {}, got {}", index, expected, got),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::Failure(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<UnmatchedMethod> for CallError {
    fn from(err: UnmatchedMethod) -> Self {
        CallError::Unmatched(err)
    }
}

// ---------------------------------------------------------------------------
// EmitError
// ---------------------------------------------------------------------------

/// Error returned when an emission backend rejects an adapter specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitError {
    interface: Arc<str>,
    class: Arc<str>,
    reason: String,
}

impl EmitError {
    /// Creates a new `EmitError` for the given (interface, class) pair.
    pub fn new(
        interface: impl Into<Arc<str>>,
        class: impl Into<Arc<str>>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            interface: interface.into(),
            class: class.into(),
            reason: reason.into(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "emission rejected for adapter `{}` over `{}`: {}",
            self.interface, self.class, self.reason
        )
    }
}

impl std::error::Error for EmitError {}

// ---------------------------------------------------------------------------
// GenerateError
// ---------------------------------------------------------------------------

/// Error surfaced from the resolve path when adapter generation fails.
///
/// Generation failures are terminal for the request: nothing is stored in the
/// cache and the caller sees the error directly.
#[derive(Debug)]
pub enum GenerateError {
    /// The interface descriptor failed purity validation. Checked before any
    /// emission is attempted.
    InvalidInterface { interface: Arc<str>, reason: String },
    /// The emission backend rejected the adapter specification.
    Emit(EmitError),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::InvalidInterface { interface, reason } => {
                write!(
                    f,
                    "interface `{}` is not a pure method interface: {}",
                    interface, reason
                )
            }
            GenerateError::Emit(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Emit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EmitError> for GenerateError {
    fn from(err: EmitError) -> Self {
        GenerateError::Emit(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- UnmatchedMethod --------------------------------------------------

    #[test]
    fn unmatched_display_names_interface_and_method() {
        let err = UnmatchedMethod::new("TextObject".into(), "get_text".into());
        assert_eq!(
            err.to_string(),
            "no matching target method for `TextObject::get_text`"
        );
    }

    #[test]
    fn unmatched_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<UnmatchedMethod>();
    }

    // -- CallError --------------------------------------------------------

    #[test]
    fn call_error_preserves_target_failure_identity() {
        let parse_err = "nope".parse::<i32>().unwrap_err();
        let expected = parse_err.clone();
        let err = CallError::failure(parse_err);
        match err {
            CallError::Failure(inner) => {
                let recovered = inner.downcast_ref::<std::num::ParseIntError>().unwrap();
                assert_eq!(*recovered, expected);
            }
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[test]
    fn call_error_failure_exposes_source() {
        let err = CallError::failure("oops".parse::<i32>().unwrap_err());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn call_error_argument_display() {
        let err = CallError::argument(2, "str", "long");
        assert_eq!(err.to_string(), "argument 2: expected str, got long");
    }

    #[test]
    fn as_unmatched_filters_variants() {
        let unmatched: CallError = UnmatchedMethod::new("I".into(), "m".into()).into();
        assert!(unmatched.as_unmatched().is_some());
        assert!(CallError::argument(0, "str", "int").as_unmatched().is_none());
    }

    // -- GenerateError ----------------------------------------------------

    #[test]
    fn generate_error_from_emit_keeps_source() {
        let emit = EmitError::new("I", "C", "bad op count");
        let err: GenerateError = emit.clone().into();
        assert!(err.to_string().contains("bad op count"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_interface_display() {
        let err = GenerateError::InvalidInterface {
            interface: "Shape".into(),
            reason: "duplicate method `area`".into(),
        };
        assert!(err.to_string().contains("Shape"));
        assert!(err.to_string().contains("duplicate method"));
    }
}
