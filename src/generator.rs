//! Adapter generation: method matching plus emission.
//!
//! Matching runs exactly once per (class, interface) pair, on the cache miss
//! path. Each interface method's exact signature key probes the class method
//! table; a hit becomes a forward op, a miss becomes the configured fallback
//! op. Declared checked-failure names are deliberately ignored: matching
//! compares name, parameter types, and return type only.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::class::ClassMetadata;
use crate::descriptor::InterfaceDescriptor;
use crate::emit::{AdapterShape, AdapterSpec, BindingOp, EmitBackend};
use crate::error::GenerateError;
use crate::factory::FallbackPolicy;

/// Computes the binding for `interface` over `class` and emits its shape.
///
/// Fails with `InvalidInterface` before any emission is attempted, or with
/// the backend's `EmitError`; both propagate to the caller unswallowed.
pub(crate) fn generate(
    class: &ClassMetadata,
    interface: &Arc<InterfaceDescriptor>,
    policy: FallbackPolicy,
    backend: &dyn EmitBackend,
) -> Result<Arc<AdapterShape>, GenerateError> {
    validate(interface)?;

    let mut ops = Vec::with_capacity(interface.method_count());
    for spec in interface.methods() {
        let op = match class.method(spec.key()) {
            Some(def) => BindingOp::Forward(Arc::clone(def.invoker())),
            None => match policy {
                FallbackPolicy::ThrowOnUnmatched => BindingOp::Throw,
                FallbackPolicy::DefaultValueOnUnmatched => BindingOp::Default(spec.ret()),
            },
        };
        ops.push(op);
    }

    let spec = AdapterSpec {
        interface: Arc::clone(interface),
        class_id: class.id(),
        class_name: class.name_arc(),
        ops,
    };
    backend.emit(spec).map_err(GenerateError::from)
}

/// Purity validation: the descriptor must name itself and its methods, and
/// must not declare the same exact signature twice.
fn validate(interface: &InterfaceDescriptor) -> Result<(), GenerateError> {
    let invalid = |reason: String| GenerateError::InvalidInterface {
        interface: interface.name_arc(),
        reason,
    };

    if interface.name().is_empty() {
        return Err(invalid("interface name is empty".to_string()));
    }
    let mut seen = FxHashSet::default();
    for spec in interface.methods() {
        if spec.name().is_empty() {
            return Err(invalid("method with an empty name".to_string()));
        }
        if !seen.insert(spec.key().clone()) {
            return Err(invalid(format!("duplicate method `{}`", spec.name())));
        }
    }
    Ok(())
}
