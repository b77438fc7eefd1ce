use interfacer_core::{
    AttributeSlots, CheckKind, DynObject, Interfaced, TypeDescriptor, TypeRegistry, Value,
};
use std::rc::Rc;

#[derive(Default)]
struct Post {
    slots: AttributeSlots,
}

impl Interfaced for Post {
    fn attribute_slots(&self) -> &AttributeSlots {
        &self.slots
    }
}

fn time_class() -> Value {
    TypeDescriptor::builder("Time")
        .static_operation("now")
        .instance_operation("to_s")
        .build()
}

#[test]
fn value_lacking_instance_capability_is_rejected() {
    let mut types = TypeRegistry::new();
    let clock = types
        .interface::<Post>()
        .declare_attribute("clock", &[".now", "#to_s"])
        .expect("declaration");

    let clockless: Value = TypeDescriptor::builder("Stopwatch")
        .static_operation("now")
        .build();
    let post = Post::default();
    let err = clock
        .set(&post, clockless)
        .expect_err("value without #to_s must be rejected");

    assert_eq!(err.attribute_name(), "clock");
    assert_eq!(err.missing_descriptors(), vec!["#to_s"]);
    assert_eq!(err.missing()[0].check_kind(), CheckKind::InstanceCapability);
    assert!(err.to_string().contains("clock"));
    assert!(err.to_string().contains("#to_s"));
    assert!(clock.get(&post).is_none());
}

#[test]
fn conforming_value_is_stored_and_read_back() {
    let mut types = TypeRegistry::new();
    let clock = types
        .interface::<Post>()
        .declare_attribute("clock", &[".now", "#to_s"])
        .expect("declaration");

    let post = Post::default();
    let time = time_class();
    clock
        .set(&post, Rc::clone(&time))
        .expect("conforming value should be accepted");

    let stored = clock.get(&post).expect("stored value");
    assert!(Rc::ptr_eq(&stored, &time));
}

#[test]
fn default_factory_result_is_returned_by_reference() {
    let mut types = TypeRegistry::new();
    let source = types
        .interface::<Post>()
        .declare_attribute_with_default("source", &[] as &[&str], || {
            let sentinel: Value = TypeDescriptor::builder("Sentinel").build();
            sentinel
        })
        .expect("declaration");

    let post = Post::default();
    let first = source.get(&post).expect("default value");
    let second = source.get(&post).expect("memoized value");
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.describe(), "Sentinel");
}

#[test]
fn generic_requirement_checks_the_concrete_value() {
    let mut types = TypeRegistry::new();
    let plugin = types
        .interface::<Post>()
        .declare_attribute("plugin", &["run"])
        .expect("declaration");

    let plugin_type = TypeDescriptor::builder("Plugin").build();
    let runner = DynObject::new(Rc::clone(&plugin_type)).with_operation("run");
    assert!(!plugin_type.has_instance_operation("run"));

    let post = Post::default();
    plugin
        .set(&post, Rc::new(runner))
        .expect("duck-typed value should be accepted");

    let idle: Value = Rc::new(DynObject::new(plugin_type));
    let err = plugin
        .set(&post, idle)
        .expect_err("value without run must be rejected");
    assert_eq!(err.missing_descriptors(), vec!["run"]);
}

#[test]
fn every_failed_requirement_is_reported_in_declaration_order() {
    let mut types = TypeRegistry::new();
    let adapter = types
        .interface::<Post>()
        .declare_attribute("json_adapter", &["parse", "#to_s", ".new", "generate"])
        .expect("declaration");

    let half = DynObject::new(TypeDescriptor::builder("HalfAdapter").build())
        .with_operation("generate");
    let err = adapter
        .set(&Post::default(), Rc::new(half))
        .expect_err("partial adapter must be rejected");

    assert_eq!(err.missing_descriptors(), vec!["parse", "#to_s", ".new"]);
    assert_eq!(
        err.to_string(),
        "attribute `json_adapter` expects [parse, #to_s, .new] to be defined"
    );
}

#[test]
fn conformance_error_serializes_its_payload() {
    let mut types = TypeRegistry::new();
    let clock = types
        .interface::<Post>()
        .declare_attribute("clock", &[".now", "#to_s"])
        .expect("declaration");

    let err = clock
        .set(&Post::default(), TypeDescriptor::builder("Empty").build())
        .expect_err("empty type must be rejected");

    let json = serde_json::to_value(&err).expect("serialize error");
    assert_eq!(json["attribute_name"], "clock");
    assert_eq!(json["missing"][0]["descriptor"], ".now");
    assert_eq!(json["missing"][0]["check_kind"], "static_capability");
    assert_eq!(json["missing"][1]["descriptor"], "#to_s");
    assert_eq!(json["missing"][1]["check_kind"], "instance_capability");
}
