// ==============================================
// FORWARDING TESTS (integration)
// ==============================================
//
// A box over an object with matching methods must behave like the object
// itself: calls forward positionally, mutations are visible through both
// views, and a target method's own error reaches the caller unmodified.

use std::sync::Mutex;

use boxkit::prelude::*;

struct Label {
    text: Mutex<String>,
}

impl Label {
    fn new(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_owned()),
        }
    }

    fn text(&self) -> String {
        self.text.lock().unwrap().clone()
    }
}

impl Describe for Label {
    fn class_name() -> &'static str {
        "Label"
    }

    fn describe(builder: ClassBuilder<Self>) -> ClassBuilder<Self> {
        builder
            .method("get_text", &[], ValueType::Str, |label: &Label, _args| {
                Ok(Value::str(label.text()))
            })
            .method(
                "set_text",
                &[ValueType::Str],
                ValueType::Unit,
                |label: &Label, args: Args| {
                    *label.text.lock().unwrap() = args.str_at(0)?.to_owned();
                    Ok(Value::Unit)
                },
            )
            .method(
                "parse",
                &[ValueType::Str],
                ValueType::Int,
                |_label: &Label, args: Args| {
                    args.str_at(0)?
                        .parse::<i32>()
                        .map(Value::Int)
                        .map_err(CallError::failure)
                },
            )
    }
}
boxkit::impl_reflect!(Label);

fn text_interface() -> std::sync::Arc<InterfaceDescriptor> {
    InterfaceDescriptor::builder("TextObject")
        .method("get_text", &[], ValueType::Str)
        .method("set_text", &[ValueType::Str], ValueType::Unit)
        .finish()
}

#[test]
fn get_after_set_through_the_box() {
    let factory = BoxFactory::new(FallbackPolicy::ThrowOnUnmatched);
    let interface = text_interface();
    let label = Label::new("Hello");
    let boxed = factory.create_box(&interface, &label).unwrap();

    let get = interface.slot("get_text").unwrap();
    let set = interface.slot("set_text").unwrap();

    boxed
        .call(set, Args::from(vec![Value::str("World")]))
        .unwrap();
    assert_eq!(boxed.call(get, Args::none()).unwrap(), Value::str("World"));
}

#[test]
fn box_and_original_observe_one_object() {
    let factory = BoxFactory::new(FallbackPolicy::ThrowOnUnmatched);
    let interface = text_interface();
    let label = Label::new("Hello");
    let boxed = factory.create_box(&interface, &label).unwrap();

    let get = interface.slot("get_text").unwrap();
    let set = interface.slot("set_text").unwrap();

    // Mutation through the box is visible on the original...
    boxed
        .call(set, Args::from(vec![Value::str("World")]))
        .unwrap();
    assert_eq!(label.text(), "World");

    // ...and mutation on the original is visible through the box.
    *label.text.lock().unwrap() = "Again".to_owned();
    assert_eq!(boxed.call(get, Args::none()).unwrap(), Value::str("Again"));
}

#[test]
fn bindings_are_deterministic_across_wrapped_objects() {
    let factory = BoxFactory::new(FallbackPolicy::ThrowOnUnmatched);
    let interface = text_interface();
    let first = Label::new("a");
    let second = Label::new("b");

    let box_a = factory.create_box(&interface, &first).unwrap();
    let box_b = factory.create_box(&interface, &second).unwrap();

    // One generation, one shape, identical bindings.
    assert!(std::sync::Arc::ptr_eq(box_a.shape(), box_b.shape()));
    assert_eq!(factory.metrics().generations, 1);
    let get = interface.slot("get_text").unwrap();
    let set = interface.slot("set_text").unwrap();
    assert!(box_a.shape().forwards(get));
    assert!(box_a.shape().forwards(set));
}

#[test]
fn declared_failures_propagate_unmodified() {
    let factory = BoxFactory::new(FallbackPolicy::ThrowOnUnmatched);
    let interface = InterfaceDescriptor::builder("Parser")
        .method_throws("parse", &[ValueType::Str], ValueType::Int, &["ParseIntError"])
        .finish();
    let label = Label::new("");
    let boxed = factory.create_box(&interface, &label).unwrap();
    let parse = interface.slot("parse").unwrap();

    // Success path forwards the value.
    let ok = boxed
        .call(parse, Args::from(vec![Value::str("42")]))
        .unwrap();
    assert_eq!(ok, Value::Int(42));

    // Failure path carries the target's own error, identity intact.
    let err = boxed
        .call(parse, Args::from(vec![Value::str("not a number")]))
        .unwrap_err();
    let expected = "not a number".parse::<i32>().unwrap_err();
    match err {
        CallError::Failure(inner) => {
            let recovered = inner.downcast_ref::<std::num::ParseIntError>().unwrap();
            assert_eq!(*recovered, expected);
        }
        other => panic!("expected Failure, got {other:?}"),
    }
}

#[test]
fn arguments_forward_positionally() {
    struct Adder;

    impl Describe for Adder {
        fn class_name() -> &'static str {
            "Adder"
        }

        fn describe(builder: ClassBuilder<Self>) -> ClassBuilder<Self> {
            builder.method(
                "sub",
                &[ValueType::Long, ValueType::Long],
                ValueType::Long,
                |_adder: &Adder, args: Args| Ok(Value::Long(args.long_at(0)? - args.long_at(1)?)),
            )
        }
    }
    boxkit::impl_reflect!(Adder);

    let factory = BoxFactory::new(FallbackPolicy::ThrowOnUnmatched);
    let interface = InterfaceDescriptor::builder("Sub")
        .method("sub", &[ValueType::Long, ValueType::Long], ValueType::Long)
        .finish();
    let adder = Adder;
    let boxed = factory.create_box(&interface, &adder).unwrap();
    let sub = interface.slot("sub").unwrap();

    // Order matters: 10 - 3, not 3 - 10.
    let result = boxed
        .call(sub, Args::from(vec![Value::Long(10), Value::Long(3)]))
        .unwrap();
    assert_eq!(result, Value::Long(7));
}
