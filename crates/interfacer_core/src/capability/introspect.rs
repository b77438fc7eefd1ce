//! Host introspection primitive used by conformance checks.
//!
//! # Responsibility
//! - Answer "does this value currently support operation X" for any value
//!   that can be assigned to a declared attribute.
//! - Describe type-like values (static and instance operations) so that
//!   `.name` and `#name` requirements have something to inspect.
//!
//! # Invariants
//! - `TypeDescriptor` operation sets are fixed after `build()`.
//! - `DynObject` may gain per-object operations at runtime; checks always see
//!   the current set.
//! - Operation lookups walk the parent chain; a child never hides a parent
//!   operation.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Shared handle to any value that can be assigned to an attribute.
///
/// `Rc` keeps identity observable (`Rc::ptr_eq`) so lazy defaults can be
/// compared by reference.
pub type Value = Rc<dyn Introspect>;

/// Reflection surface a candidate value exposes to the checkers.
pub trait Introspect: Any {
    /// Whether the value itself currently supports `operation`.
    fn responds_to(&self, operation: &str) -> bool;

    /// Type-level metadata when the value is type-like.
    fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        None
    }

    /// Human-readable name used in diagnostics.
    fn describe(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

impl Debug for dyn Introspect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Recovers the concrete Rust value behind an attribute value.
pub fn downcast_value<T: 'static>(value: &Value) -> Option<&T> {
    value.as_any().downcast_ref::<T>()
}

/// Type-like value: a named type with static and instance operations.
///
/// Used directly as a [`Value`] when a type itself is assigned (the
/// `time_class = Time` pattern), and as the class of [`DynObject`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    static_operations: BTreeSet<String>,
    instance_operations: BTreeSet<String>,
    parent: Option<Rc<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn builder(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            descriptor: TypeDescriptor {
                name: name.into(),
                static_operations: BTreeSet::new(),
                instance_operations: BTreeSet::new(),
                parent: None,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<TypeDescriptor>> {
        self.parent.as_ref()
    }

    /// Whether the type itself exposes `operation` (own or inherited).
    pub fn has_static_operation(&self, operation: &str) -> bool {
        self.ancestors()
            .any(|ty| ty.static_operations.contains(operation))
    }

    /// Whether instances of the type get `operation` (own or inherited).
    pub fn has_instance_operation(&self, operation: &str) -> bool {
        self.ancestors()
            .any(|ty| ty.instance_operations.contains(operation))
    }

    /// Whether `self` is `other` or inherits from it, by identity.
    ///
    /// Two separately built descriptors are distinct types even when they
    /// share a name.
    pub fn is_a(&self, other: &TypeDescriptor) -> bool {
        self.ancestors().any(|ty| std::ptr::eq(ty, other))
    }

    fn ancestors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |ty| {
            let ty: &TypeDescriptor = *ty;
            ty.parent.as_deref()
        })
    }
}

impl Introspect for TypeDescriptor {
    fn responds_to(&self, operation: &str) -> bool {
        self.has_static_operation(operation)
    }

    fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        Some(self)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builder for [`TypeDescriptor`].
#[derive(Debug, Clone)]
pub struct TypeDescriptorBuilder {
    descriptor: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    pub fn static_operation(mut self, operation: impl Into<String>) -> Self {
        self.descriptor.static_operations.insert(operation.into());
        self
    }

    pub fn instance_operation(mut self, operation: impl Into<String>) -> Self {
        self.descriptor.instance_operations.insert(operation.into());
        self
    }

    pub fn parent(mut self, parent: Rc<TypeDescriptor>) -> Self {
        self.descriptor.parent = Some(parent);
        self
    }

    pub fn build(self) -> Rc<TypeDescriptor> {
        Rc::new(self.descriptor)
    }
}

/// Instance of a [`TypeDescriptor`] that can gain operations at runtime.
///
/// Per-object operations are visible to `GenericResponds` checks only; the
/// declared type stays unchanged.
#[derive(Debug)]
pub struct DynObject {
    class: Rc<TypeDescriptor>,
    own_operations: RefCell<BTreeSet<String>>,
}

impl DynObject {
    pub fn new(class: Rc<TypeDescriptor>) -> Self {
        Self {
            class,
            own_operations: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn class(&self) -> &Rc<TypeDescriptor> {
        &self.class
    }

    /// Adds one operation to this object only.
    pub fn define_operation(&self, operation: impl Into<String>) {
        self.own_operations.borrow_mut().insert(operation.into());
    }

    pub fn with_operation(self, operation: impl Into<String>) -> Self {
        self.define_operation(operation);
        self
    }
}

impl Introspect for DynObject {
    fn responds_to(&self, operation: &str) -> bool {
        self.own_operations.borrow().contains(operation)
            || self.class.has_instance_operation(operation)
    }

    fn describe(&self) -> String {
        format!("#<{}>", self.class.name())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
