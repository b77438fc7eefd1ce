//! Attribute declaration, per-type registries, and validated accessors.
//!
//! # Responsibility
//! - Turn `declare_attribute` calls into registry entries plus accessors.
//! - Validate assignments against the specification registered at write
//!   time.
//!
//! # Invariants
//! - Declaration errors never leave a partial registry entry behind.
//! - Assignment errors never mutate the instance.

pub mod attribute;
pub mod error;
pub mod registry;
pub mod specification;
