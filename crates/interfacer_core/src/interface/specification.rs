//! Interface specification for one declared attribute.
//!
//! # Invariants
//! - Requirements keep declaration order.
//! - Every requirement is evaluated on every check; failures are never
//!   short-circuited.
//! - Immutable after construction.

use crate::capability::introspect::Introspect;
use crate::capability::requirement::{parse_requirements, CapabilityRequirement, DescriptorError};

/// Ordered capability requirements of one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceSpecification {
    requirements: Vec<CapabilityRequirement>,
}

impl InterfaceSpecification {
    pub fn new(requirements: Vec<CapabilityRequirement>) -> Self {
        Self { requirements }
    }

    /// Builds a specification from declared descriptors.
    pub fn parse<S: AsRef<str>>(descriptors: &[S]) -> Result<Self, DescriptorError> {
        parse_requirements(descriptors).map(Self::new)
    }

    pub fn requirements(&self) -> &[CapabilityRequirement] {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Requirements `candidate` fails, in declaration order.
    pub fn missing_capabilities(&self, candidate: &dyn Introspect) -> Vec<CapabilityRequirement> {
        self.requirements
            .iter()
            .filter(|requirement| !requirement.is_satisfied_by(candidate))
            .cloned()
            .collect()
    }

    pub fn conforms(&self, candidate: &dyn Introspect) -> bool {
        self.missing_capabilities(candidate).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::InterfaceSpecification;
    use crate::capability::introspect::{DynObject, TypeDescriptor};

    #[test]
    fn reports_all_failures_in_declaration_order() {
        let spec = InterfaceSpecification::parse(&["#to_s", ".now", "#inspect", "name"])
            .expect("valid descriptors");
        let bare = TypeDescriptor::builder("Bare").static_operation("name").build();

        let missing = spec.missing_capabilities(&*bare);
        let descriptors: Vec<&str> = missing.iter().map(|r| r.descriptor()).collect();
        assert_eq!(descriptors, vec!["#to_s", ".now", "#inspect"]);
        assert!(!spec.conforms(&*bare));
    }

    #[test]
    fn empty_specification_accepts_anything() {
        let spec = InterfaceSpecification::default();
        let object = DynObject::new(TypeDescriptor::builder("Anything").build());
        assert!(spec.is_empty());
        assert!(spec.missing_capabilities(&object).is_empty());
        assert!(spec.conforms(&object));
    }

    #[test]
    fn conforms_matches_empty_missing_set() {
        let spec = InterfaceSpecification::parse(&[".now", "#to_s"]).expect("valid descriptors");
        let candidates = [
            TypeDescriptor::builder("Time")
                .static_operation("now")
                .instance_operation("to_s")
                .build(),
            TypeDescriptor::builder("Clockless")
                .instance_operation("to_s")
                .build(),
            TypeDescriptor::builder("Empty").build(),
        ];

        for candidate in &candidates {
            assert_eq!(
                spec.conforms(&**candidate),
                spec.missing_capabilities(&**candidate).is_empty()
            );
        }
        assert!(spec.conforms(&*candidates[0]));
    }
}
