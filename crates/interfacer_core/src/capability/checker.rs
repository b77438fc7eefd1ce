//! Check strategies for the three requirement kinds.

use crate::capability::introspect::Introspect;
use crate::capability::requirement::{CapabilityRequirement, CheckKind};

/// One check strategy: `(candidate, operation) -> supported`.
pub trait CapabilityChecker {
    fn check(&self, candidate: &dyn Introspect, operation: &str) -> bool;
}

/// `.name`: the candidate is type-like and exposes `name` on the type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticChecker;

impl CapabilityChecker for StaticChecker {
    fn check(&self, candidate: &dyn Introspect, operation: &str) -> bool {
        candidate
            .type_descriptor()
            .is_some_and(|ty| ty.has_static_operation(operation))
    }
}

/// `#name`: the candidate is type-like and its instances get `name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceChecker;

impl CapabilityChecker for InstanceChecker {
    fn check(&self, candidate: &dyn Introspect, operation: &str) -> bool {
        candidate
            .type_descriptor()
            .is_some_and(|ty| ty.has_instance_operation(operation))
    }
}

/// Bare `name`: duck-typed check on the concrete value.
#[derive(Debug, Clone, Copy, Default)]
pub struct RespondsChecker;

impl CapabilityChecker for RespondsChecker {
    fn check(&self, candidate: &dyn Introspect, operation: &str) -> bool {
        candidate.responds_to(operation)
    }
}

impl CheckKind {
    pub fn checker(self) -> &'static dyn CapabilityChecker {
        match self {
            Self::StaticCapability => &StaticChecker,
            Self::InstanceCapability => &InstanceChecker,
            Self::GenericResponds => &RespondsChecker,
        }
    }
}

impl CapabilityRequirement {
    /// Whether `candidate` satisfies this requirement.
    pub fn is_satisfied_by(&self, candidate: &dyn Introspect) -> bool {
        self.check_kind()
            .checker()
            .check(candidate, self.operation())
    }
}

#[cfg(test)]
mod tests {
    use crate::capability::introspect::{DynObject, TypeDescriptor};
    use crate::capability::requirement::CapabilityRequirement;

    #[test]
    fn static_and_instance_checks_need_a_type_like_candidate() {
        let time = TypeDescriptor::builder("Time")
            .static_operation("now")
            .instance_operation("to_s")
            .build();
        let instance = DynObject::new(time.clone()).with_operation("now");

        let now = CapabilityRequirement::parse(".now").expect("static parse");
        let to_s = CapabilityRequirement::parse("#to_s").expect("instance parse");

        assert!(now.is_satisfied_by(&*time));
        assert!(to_s.is_satisfied_by(&*time));
        assert!(!now.is_satisfied_by(&instance));
        assert!(!to_s.is_satisfied_by(&instance));
    }

    #[test]
    fn generic_check_uses_value_level_operations() {
        let time = TypeDescriptor::builder("Time")
            .static_operation("now")
            .instance_operation("to_s")
            .build();
        let instance = DynObject::new(time.clone());

        let now = CapabilityRequirement::parse("now").expect("generic parse");
        let to_s = CapabilityRequirement::parse("to_s").expect("generic parse");

        assert!(now.is_satisfied_by(&*time));
        assert!(!to_s.is_satisfied_by(&*time));
        assert!(to_s.is_satisfied_by(&instance));
        assert!(!now.is_satisfied_by(&instance));
    }
}
