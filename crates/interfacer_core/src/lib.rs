//! Runtime structural-interface checks for composed values.
//!
//! A declaring type lists the operations an attribute's value must support;
//! every assignment is checked against that list and rejected with a
//! structured [`ConformanceError`] when anything is missing.

pub mod capability;
pub mod config;
pub mod interface;
pub mod logging;
pub mod module;

pub use capability::checker::{CapabilityChecker, InstanceChecker, RespondsChecker, StaticChecker};
pub use capability::introspect::{
    downcast_value, DynObject, Introspect, TypeDescriptor, TypeDescriptorBuilder, Value,
};
pub use capability::requirement::{
    parse_requirements, CapabilityRequirement, CheckKind, DescriptorError,
};
pub use config::{InterfaceConfig, RedeclarationPolicy};
pub use interface::attribute::{Accessor, AttributeSlots, DefaultFactory, Interfaced};
pub use interface::error::{ConformanceError, DeclarationError};
pub use interface::registry::{AttributeEntry, AttributeRegistry, InterfaceCapability, TypeRegistry};
pub use interface::specification::InterfaceSpecification;
pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use module::{InMemoryModuleLoader, Module, ModuleBody, ModuleError, ModuleLoader};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
