//! Concrete values used by the demos.
//!
//! Each type reports its operations through `Introspect` and also carries
//! the Rust behaviour behind them, recovered with `downcast_value`.

use interfacer_core::{Introspect, TypeDescriptor};
use std::any::Any;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock type: `.now` plus `#to_s` on the times it produces.
pub struct ClockClass {
    descriptor: Rc<TypeDescriptor>,
    millis: bool,
}

impl ClockClass {
    pub fn time() -> Self {
        Self {
            descriptor: TypeDescriptor::builder("Time")
                .static_operation("now")
                .instance_operation("to_s")
                .build(),
            millis: false,
        }
    }

    pub fn date_time() -> Self {
        Self {
            descriptor: TypeDescriptor::builder("DateTime")
                .parent(Self::time().descriptor)
                .static_operation("parse")
                .build(),
            millis: true,
        }
    }

    pub fn now(&self) -> String {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        if self.millis {
            format!("{}ms since epoch", elapsed.as_millis())
        } else {
            format!("{}s since epoch", elapsed.as_secs())
        }
    }
}

impl Introspect for ClockClass {
    fn responds_to(&self, operation: &str) -> bool {
        self.descriptor.responds_to(operation)
    }

    fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        Some(&self.descriptor)
    }

    fn describe(&self) -> String {
        self.descriptor.name().to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// JSON adapter exposing `parse` and `generate`.
pub struct JsonAdapter {
    name: &'static str,
    pretty: bool,
}

impl JsonAdapter {
    pub fn compact() -> Self {
        Self {
            name: "JsonAdapter",
            pretty: false,
        }
    }

    pub fn pretty() -> Self {
        Self {
            name: "PrettyJsonAdapter",
            pretty: true,
        }
    }

    pub fn parse(&self, text: &str) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn generate(&self, value: &serde_json::Value) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

impl Introspect for JsonAdapter {
    fn responds_to(&self, operation: &str) -> bool {
        matches!(operation, "parse" | "generate" | "name")
    }

    fn describe(&self) -> String {
        self.name.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Mock post store exposing `retrieve`.
pub struct PostRepository;

impl PostRepository {
    pub fn retrieve(&self) -> &'static str {
        r#"[{"title": "Hello world!"}]"#
    }
}

impl Introspect for PostRepository {
    fn responds_to(&self, operation: &str) -> bool {
        operation == "retrieve"
    }

    fn describe(&self) -> String {
        "PostRepository".to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
