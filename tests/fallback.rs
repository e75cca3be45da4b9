// ==============================================
// FALLBACK TESTS (integration)
// ==============================================
//
// Interface methods with no structural counterpart on the target bind to the
// factory's fallback: a distinguished error under ThrowOnUnmatched, or the
// zero value of the declared return type under DefaultValueOnUnmatched.
// Each return kind gets its own zero; a single generic zero is wrong for
// several of them.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use boxkit::prelude::*;

#[derive(Default)]
struct Sparse {
    calls: AtomicU32,
}

impl Describe for Sparse {
    fn class_name() -> &'static str {
        "Sparse"
    }

    fn describe(builder: ClassBuilder<Self>) -> ClassBuilder<Self> {
        builder.method("present", &[], ValueType::Int, |sparse: &Sparse, _args| {
            sparse.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Int(7))
        })
    }
}
boxkit::impl_reflect!(Sparse);

fn wide_interface() -> Arc<InterfaceDescriptor> {
    InterfaceDescriptor::builder("Wide")
        .method("present", &[], ValueType::Int)
        .method("quantity", &[], ValueType::Int)
        .method("total", &[], ValueType::Long)
        .method("scale", &[], ValueType::Float)
        .method("ratio", &[], ValueType::Double)
        .method("label", &[], ValueType::Str)
        .method("flag", &[], ValueType::Bool)
        .method("reset", &[], ValueType::Unit)
        .finish()
}

#[test]
fn default_policy_returns_width_specific_zeros() {
    let factory = BoxFactory::new(FallbackPolicy::DefaultValueOnUnmatched);
    let interface = wide_interface();
    let sparse = Sparse::default();
    let boxed = factory.create_box(&interface, &sparse).unwrap();

    let call = |name: &str| boxed.call(interface.slot(name).unwrap(), Args::none()).unwrap();

    assert_eq!(call("quantity"), Value::Int(0));
    assert_eq!(call("total"), Value::Long(0));
    assert_eq!(call("scale"), Value::Float(0.0));
    assert_eq!(call("ratio"), Value::Double(0.0));
    assert_eq!(call("label"), Value::Null);
    assert_eq!(call("flag"), Value::Bool(false));
    assert_eq!(call("reset"), Value::Unit);

    // The zeros really are distinct representations, not one generic zero.
    assert_ne!(call("quantity"), Value::Long(0));
    assert_ne!(call("scale"), Value::Double(0.0));
    assert_ne!(call("label"), Value::Unit);
}

#[test]
fn default_fallback_never_touches_the_target() {
    let factory = BoxFactory::new(FallbackPolicy::DefaultValueOnUnmatched);
    let interface = wide_interface();
    let sparse = Sparse::default();
    let boxed = factory.create_box(&interface, &sparse).unwrap();

    for name in ["quantity", "total", "scale", "ratio", "label", "flag", "reset"] {
        boxed
            .call(interface.slot(name).unwrap(), Args::none())
            .unwrap();
    }
    assert_eq!(sparse.calls.load(Ordering::SeqCst), 0);

    // The matched method still forwards.
    let present = interface.slot("present").unwrap();
    assert_eq!(boxed.call(present, Args::none()).unwrap(), Value::Int(7));
    assert_eq!(sparse.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn throw_policy_raises_unmatched_at_call_time() {
    let factory = BoxFactory::new(FallbackPolicy::ThrowOnUnmatched);
    let interface = wide_interface();
    let sparse = Sparse::default();

    // Absences do not fail generation; the box is created fine.
    let boxed = factory.create_box(&interface, &sparse).unwrap();

    let quantity = interface.slot("quantity").unwrap();
    let err = boxed.call(quantity, Args::none()).unwrap_err();
    let unmatched = err.as_unmatched().expect("expected UnmatchedMethod");
    assert_eq!(unmatched.interface(), "Wide");
    assert_eq!(unmatched.method(), "quantity");

    // Matched methods are unaffected by the policy.
    let present = interface.slot("present").unwrap();
    assert_eq!(boxed.call(present, Args::none()).unwrap(), Value::Int(7));
}

#[test]
fn near_miss_signatures_fall_back() {
    // Same name, different return width: not a match under exact keying.
    let factory = BoxFactory::new(FallbackPolicy::DefaultValueOnUnmatched);
    let interface = InterfaceDescriptor::builder("NearMiss")
        .method("present", &[], ValueType::Long)
        .finish();
    let sparse = Sparse::default();
    let boxed = factory.create_box(&interface, &sparse).unwrap();

    let present = interface.slot("present").unwrap();
    assert_eq!(boxed.call(present, Args::none()).unwrap(), Value::Long(0));
    assert_eq!(sparse.calls.load(Ordering::SeqCst), 0);
}
