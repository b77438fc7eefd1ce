//! Capability requirements and the introspection they run against.
//!
//! A requirement names one operation and how to look for it: on the type
//! (`.name`), on the type's instances (`#name`), or on the concrete value
//! (`name`). Checks only ever read from the candidate.

pub mod checker;
pub mod introspect;
pub mod requirement;
