//! Generated attribute accessors and per-instance backing slots.
//!
//! # Responsibility
//! - Lazily build and memoize default values on first read.
//! - Validate every write against the specification currently registered
//!   for the attribute on the accessor's type.
//!
//! # Invariants
//! - A default factory runs at most once per instance per attribute, unless
//!   the slot is overwritten in between.
//! - Reads and writes follow the attribute's latest declaration.
//! - A rejected write leaves the slot untouched.

use crate::capability::introspect::Value;
use crate::interface::error::ConformanceError;
use crate::interface::registry::{AttributeEntry, SharedRegistry, TypeRegistry};
use crate::interface::specification::InterfaceSpecification;
use log::{debug, trace};
use std::any::type_name;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::rc::Rc;

/// Factory producing an attribute's default value.
pub type DefaultFactory = Rc<dyn Fn() -> Value>;

/// A type that can declare validated attributes.
///
/// Implementors only provide storage; declarations go through
/// [`TypeRegistry::interface`].
pub trait Interfaced: 'static {
    fn attribute_slots(&self) -> &AttributeSlots;
}

/// Backing storage for one instance's declared attributes.
#[derive(Default)]
pub struct AttributeSlots {
    values: RefCell<BTreeMap<String, Value>>,
}

impl AttributeSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, attribute: &str) -> bool {
        self.values.borrow().contains_key(attribute)
    }

    fn load(&self, attribute: &str) -> Option<Value> {
        self.values.borrow().get(attribute).cloned()
    }

    fn store(&self, attribute: &str, value: Value) {
        self.values.borrow_mut().insert(attribute.to_string(), value);
    }
}

impl Debug for AttributeSlots {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.values.borrow().iter()).finish()
    }
}

/// Getter/setter pair generated by `declare_attribute`.
///
/// The accessor holds no declaration state of its own: every read and write
/// resolves the current entry for its attribute, so a redeclaration applies
/// to accessors created before it.
pub struct Accessor<T> {
    name: Rc<str>,
    registry: SharedRegistry,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Interfaced> Accessor<T> {
    pub(crate) fn new(name: &str, registry: SharedRegistry) -> Self {
        Self {
            name: Rc::from(name),
            registry,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn entry(&self) -> Option<AttributeEntry> {
        self.registry.borrow().resolve_entry(&self.name)
    }

    /// Whether the current declaration carries a default factory.
    pub fn has_default(&self) -> bool {
        self.entry()
            .is_some_and(|entry| entry.default_factory().is_some())
    }

    /// Specification the next write will be validated against.
    ///
    /// Accessors only come from a successful declaration or `rebind`, and
    /// entries are never removed, so this is `Some` in practice.
    pub fn specification(&self) -> Option<Rc<InterfaceSpecification>> {
        self.registry.borrow().resolve(&self.name)
    }

    /// Reads the attribute, building the default on first access.
    ///
    /// Returns `None` when the slot is unset and the current declaration has
    /// no default.
    pub fn get(&self, instance: &T) -> Option<Value> {
        let slots = instance.attribute_slots();
        if let Some(value) = slots.load(&self.name) {
            return Some(value);
        }

        let factory = Rc::clone(self.entry()?.default_factory()?);
        let value = factory();
        trace!(
            "event=attribute_default_built module=interface type={} attribute={}",
            type_name::<T>(),
            self.name
        );
        slots.store(&self.name, Rc::clone(&value));
        Some(value)
    }

    /// Validates and stores `value`.
    ///
    /// # Errors
    /// - `ConformanceError` listing every unmet requirement; the stored value
    ///   is left as it was.
    pub fn set(&self, instance: &T, value: Value) -> Result<(), ConformanceError> {
        let missing = self
            .specification()
            .map(|specification| specification.missing_capabilities(&*value))
            .unwrap_or_default();
        if !missing.is_empty() {
            let err = ConformanceError::new(&*self.name, missing);
            debug!(
                "event=attribute_rejected module=interface status=error type={} attribute={} value={} missing={:?}",
                type_name::<T>(),
                self.name,
                value.describe(),
                err.missing_descriptors()
            );
            return Err(err);
        }

        instance.attribute_slots().store(&self.name, value);
        Ok(())
    }

    /// Whether the instance's slot holds a value (default or assigned).
    pub fn is_set(&self, instance: &T) -> bool {
        instance.attribute_slots().is_set(&self.name)
    }

    /// Same attribute, bound to `U`'s registry.
    ///
    /// Returns `None` when `U` neither declares nor inherits the attribute.
    pub fn rebind<U: Interfaced>(&self, types: &TypeRegistry) -> Option<Accessor<U>> {
        let registry = types.shared_registry_of::<U>()?;
        registry.borrow().resolve_entry(&self.name)?;
        Some(Accessor {
            name: Rc::clone(&self.name),
            registry,
            _marker: PhantomData,
        })
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            registry: Rc::clone(&self.registry),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for Accessor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("type", &type_name::<T>())
            .finish_non_exhaustive()
    }
}
