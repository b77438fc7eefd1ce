//! Declaration and assignment errors.

use crate::capability::requirement::{CapabilityRequirement, DescriptorError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Assignment rejected because the value lacks required capabilities.
///
/// Carries the unmet requirements in declaration order so callers can react
/// to exactly what is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceError {
    attribute_name: String,
    missing: Vec<CapabilityRequirement>,
}

impl ConformanceError {
    pub(crate) fn new(attribute_name: impl Into<String>, missing: Vec<CapabilityRequirement>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            missing,
        }
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub fn missing(&self) -> &[CapabilityRequirement] {
        &self.missing
    }

    /// Missing descriptors as declared, e.g. `["#to_s"]`.
    pub fn missing_descriptors(&self) -> Vec<&str> {
        self.missing.iter().map(|r| r.descriptor()).collect()
    }
}

impl Display for ConformanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "attribute `{}` expects [{}] to be defined",
            self.attribute_name,
            self.missing_descriptors().join(", ")
        )
    }
}

impl Error for ConformanceError {}

/// Attribute declaration errors. A failed declaration registers nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    InvalidAttributeName(String),
    InvalidDescriptor {
        attribute: String,
        source: DescriptorError,
    },
    DuplicateAttribute {
        type_name: &'static str,
        attribute: String,
    },
    InheritanceCycle {
        child: &'static str,
        parent: &'static str,
    },
    AlreadyInherits {
        child: &'static str,
        parent: &'static str,
    },
}

impl Display for DeclarationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAttributeName(value) => {
                write!(f, "attribute name is invalid: `{value}`")
            }
            Self::InvalidDescriptor { attribute, source } => {
                write!(f, "attribute `{attribute}` has an invalid requirement: {source}")
            }
            Self::DuplicateAttribute {
                type_name,
                attribute,
            } => write!(
                f,
                "attribute `{attribute}` is already declared on {type_name}"
            ),
            Self::InheritanceCycle { child, parent } => write!(
                f,
                "{child} cannot inherit attributes from {parent}: inheritance cycle"
            ),
            Self::AlreadyInherits { child, parent } => {
                write!(f, "{child} already inherits attributes from {parent}")
            }
        }
    }
}

impl Error for DeclarationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDescriptor { source, .. } => Some(source),
            _ => None,
        }
    }
}
