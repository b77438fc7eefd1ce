//! Capability requirement descriptors and their parser.
//!
//! # Responsibility
//! - Parse declared descriptors (`.now`, `#to_s`, `run`) into typed
//!   requirements.
//! - Reject malformed descriptors at declaration time.
//!
//! # Invariants
//! - The sentinel alone selects `CheckKind`; parsing is a pure function.
//! - `descriptor` is kept exactly as declared for diagnostics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sentinel for operations callable on the type itself.
pub const STATIC_SENTINEL: char = '.';
/// Sentinel for operations declared for instances of the type.
pub const INSTANCE_SENTINEL: char = '#';

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*[?!=]?$").expect("valid identifier regex")
});
static OPERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\[\]=?|<=>|===?|=~|<<|>>|<=|>=|!=|[+\-*/%<>!])$").expect("valid operator regex")
});

/// How one requirement is checked against a candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// `.name`: the candidate type exposes `name` itself.
    StaticCapability,
    /// `#name`: instances of the candidate type get `name`.
    InstanceCapability,
    /// `name`: the concrete candidate value currently supports `name`.
    GenericResponds,
}

/// One required capability, as declared on an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CapabilityRequirement {
    descriptor: String,
    check_kind: CheckKind,
    #[serde(skip)]
    operation_start: usize,
}

impl CapabilityRequirement {
    /// Parses one declared descriptor.
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        if descriptor.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let (check_kind, operation) = match descriptor.chars().next() {
            Some(STATIC_SENTINEL) => (CheckKind::StaticCapability, &descriptor[1..]),
            Some(INSTANCE_SENTINEL) => (CheckKind::InstanceCapability, &descriptor[1..]),
            _ => (CheckKind::GenericResponds, descriptor),
        };

        match check_kind {
            CheckKind::GenericResponds => {
                if !IDENTIFIER_RE.is_match(operation) {
                    return Err(DescriptorError::InvalidOperation(descriptor.to_string()));
                }
            }
            _ => {
                if operation.is_empty() {
                    return Err(DescriptorError::MissingOperation(descriptor.to_string()));
                }
                if !IDENTIFIER_RE.is_match(operation) && !OPERATOR_RE.is_match(operation) {
                    return Err(DescriptorError::InvalidOperation(descriptor.to_string()));
                }
            }
        }

        Ok(Self {
            descriptor: descriptor.to_string(),
            check_kind,
            operation_start: descriptor.len() - operation.len(),
        })
    }

    /// `.operation` requirement.
    pub fn static_capability(operation: &str) -> Result<Self, DescriptorError> {
        Self::parse(&format!("{STATIC_SENTINEL}{operation}"))
    }

    /// `#operation` requirement.
    pub fn instance_capability(operation: &str) -> Result<Self, DescriptorError> {
        Self::parse(&format!("{INSTANCE_SENTINEL}{operation}"))
    }

    /// Bare `operation` requirement.
    pub fn responds_to(operation: &str) -> Result<Self, DescriptorError> {
        if operation.starts_with([STATIC_SENTINEL, INSTANCE_SENTINEL]) {
            return Err(DescriptorError::InvalidOperation(operation.to_string()));
        }
        Self::parse(operation)
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn check_kind(&self) -> CheckKind {
        self.check_kind
    }

    /// Operation name without its sentinel.
    pub fn operation(&self) -> &str {
        &self.descriptor[self.operation_start..]
    }
}

impl Display for CapabilityRequirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.descriptor)
    }
}

/// Parses a whole descriptor list, stopping at the first malformed entry.
pub fn parse_requirements<S: AsRef<str>>(
    descriptors: &[S],
) -> Result<Vec<CapabilityRequirement>, DescriptorError> {
    descriptors
        .iter()
        .map(|descriptor| CapabilityRequirement::parse(descriptor.as_ref()))
        .collect()
}

/// Descriptor parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    Empty,
    MissingOperation(String),
    InvalidOperation(String),
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "capability descriptor must not be empty"),
            Self::MissingOperation(value) => {
                write!(f, "capability descriptor has no operation name: `{value}`")
            }
            Self::InvalidOperation(value) => write!(
                f,
                "capability descriptor is invalid: `{value}` (expected .name, #name or a bare identifier)"
            ),
        }
    }
}

impl Error for DescriptorError {}
