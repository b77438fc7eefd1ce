//! Declaration policy configuration.

/// What happens when an attribute name is declared twice on one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedeclarationPolicy {
    /// Last declaration wins; existing accessors validate against it.
    #[default]
    Replace,
    /// Second declaration fails with `DeclarationError::DuplicateAttribute`.
    Reject,
}

/// Settings shared by every declaration made through one `TypeRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterfaceConfig {
    pub redeclaration: RedeclarationPolicy,
}

impl InterfaceConfig {
    /// Config that refuses redeclaration.
    pub fn strict() -> Self {
        Self::default().with_redeclaration(RedeclarationPolicy::Reject)
    }

    pub fn with_redeclaration(mut self, policy: RedeclarationPolicy) -> Self {
        self.redeclaration = policy;
        self
    }
}
