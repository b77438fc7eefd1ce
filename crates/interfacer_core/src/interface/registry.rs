//! Per-type attribute registries and the side table that owns them.
//!
//! # Responsibility
//! - Keep one `AttributeRegistry` per declaring type, keyed by `TypeId`.
//! - Expose `declare_attribute` through `InterfaceCapability`.
//! - Resolve attribute specifications through a type's parent chain.
//!
//! # Invariants
//! - A registry is created on the first declaration for its type (or when the
//!   type takes part in `inherit`), and lives as long as the `TypeRegistry`.
//! - Attribute names are unique per registry; a subtype's own entries never
//!   leak into its parent.
//! - A failed declaration leaves the registry unchanged.
//!
//! Registries are `Rc<RefCell<_>>`, so the whole table is confined to one
//! thread; callers that need cross-thread access must serialize it
//! themselves.

use crate::capability::introspect::Value;
use crate::capability::requirement::DescriptorError;
use crate::config::{InterfaceConfig, RedeclarationPolicy};
use crate::interface::attribute::{Accessor, DefaultFactory, Interfaced};
use crate::interface::error::DeclarationError;
use crate::interface::specification::InterfaceSpecification;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::any::{type_name, TypeId};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::rc::Rc;

static ATTRIBUTE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid attribute name regex"));

pub(crate) type SharedRegistry = Rc<RefCell<AttributeRegistry>>;

/// One declared attribute: its specification and optional default factory.
#[derive(Clone)]
pub struct AttributeEntry {
    specification: Rc<InterfaceSpecification>,
    default_factory: Option<DefaultFactory>,
}

impl AttributeEntry {
    pub fn specification(&self) -> &Rc<InterfaceSpecification> {
        &self.specification
    }

    pub fn default_factory(&self) -> Option<&DefaultFactory> {
        self.default_factory.as_ref()
    }
}

impl Debug for AttributeEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeEntry")
            .field("specification", &self.specification)
            .field("has_default", &self.default_factory.is_some())
            .finish()
    }
}

/// Attribute name to declaration mapping for one declaring type.
#[derive(Debug)]
pub struct AttributeRegistry {
    type_name: &'static str,
    entries: BTreeMap<String, AttributeEntry>,
    parent: Option<SharedRegistry>,
}

impl AttributeRegistry {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            entries: BTreeMap::new(),
            parent: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted names declared on this type only.
    pub fn attribute_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Specification declared on this type only.
    pub fn get(&self, attribute: &str) -> Option<Rc<InterfaceSpecification>> {
        self.entries
            .get(attribute)
            .map(|entry| Rc::clone(&entry.specification))
    }

    /// Specification declared on this type or the nearest ancestor.
    pub fn resolve(&self, attribute: &str) -> Option<Rc<InterfaceSpecification>> {
        self.resolve_entry(attribute)
            .map(|entry| entry.specification)
    }

    /// Full declaration from this type or the nearest ancestor.
    pub fn resolve_entry(&self, attribute: &str) -> Option<AttributeEntry> {
        if let Some(entry) = self.entries.get(attribute) {
            return Some(entry.clone());
        }
        let parent = self.parent.as_ref()?;
        let parent = parent.borrow();
        parent.resolve_entry(attribute)
    }

    /// Parent type name, if this type inherits attributes.
    pub fn parent_type_name(&self) -> Option<&'static str> {
        self.parent.as_ref().map(|parent| parent.borrow().type_name)
    }

    fn insert(
        &mut self,
        attribute: &str,
        entry: AttributeEntry,
        policy: RedeclarationPolicy,
    ) -> Result<(), DeclarationError> {
        if self.entries.contains_key(attribute) {
            if policy == RedeclarationPolicy::Reject {
                return Err(DeclarationError::DuplicateAttribute {
                    type_name: self.type_name,
                    attribute: attribute.to_string(),
                });
            }
            warn!(
                "event=attribute_redeclared module=interface status=replaced type={} attribute={}",
                self.type_name, attribute
            );
        }
        self.entries.insert(attribute.to_string(), entry);
        Ok(())
    }

    fn inherits_from(&self, candidate: &SharedRegistry) -> bool {
        match &self.parent {
            Some(parent) => {
                Rc::ptr_eq(parent, candidate) || parent.borrow().inherits_from(candidate)
            }
            None => false,
        }
    }
}

/// Side table of attribute registries keyed by declaring type.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    config: InterfaceConfig,
    registries: HashMap<TypeId, SharedRegistry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InterfaceConfig) -> Self {
        Self {
            config,
            registries: HashMap::new(),
        }
    }

    pub fn config(&self) -> InterfaceConfig {
        self.config
    }

    /// Interface capability for declaring attributes on `T`.
    pub fn interface<T: Interfaced>(&mut self) -> InterfaceCapability<'_, T> {
        InterfaceCapability {
            types: self,
            _marker: PhantomData,
        }
    }

    /// Registry of `T`, if `T` has declared or inherited anything.
    pub fn registry_of<T: Interfaced>(&self) -> Option<Ref<'_, AttributeRegistry>> {
        self.registries
            .get(&TypeId::of::<T>())
            .map(|registry| registry.borrow())
    }

    /// Number of types with a registry.
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// Makes `Child` resolve attributes it does not declare through `Parent`.
    ///
    /// Creates both registries if needed. A child can have one parent.
    pub fn inherit<Child: Interfaced, Parent: Interfaced>(
        &mut self,
    ) -> Result<(), DeclarationError> {
        let child = self.registry_for::<Child>();
        let parent = self.registry_for::<Parent>();
        let child_name = type_name::<Child>();
        let parent_name = type_name::<Parent>();

        if Rc::ptr_eq(&child, &parent) || parent.borrow().inherits_from(&child) {
            return Err(DeclarationError::InheritanceCycle {
                child: child_name,
                parent: parent_name,
            });
        }

        let mut child_registry = child.borrow_mut();
        if let Some(existing) = &child_registry.parent {
            if Rc::ptr_eq(existing, &parent) {
                return Ok(());
            }
            return Err(DeclarationError::AlreadyInherits {
                child: child_name,
                parent: existing.borrow().type_name,
            });
        }
        child_registry.parent = Some(parent);
        debug!(
            "event=attribute_inheritance module=interface status=ok child={} parent={}",
            child_name, parent_name
        );
        Ok(())
    }

    pub(crate) fn shared_registry_of<T: Interfaced>(&self) -> Option<SharedRegistry> {
        self.registries.get(&TypeId::of::<T>()).cloned()
    }

    fn registry_for<T: Interfaced>(&mut self) -> SharedRegistry {
        self.registries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Rc::new(RefCell::new(AttributeRegistry::new(type_name::<T>()))))
            .clone()
    }
}

/// Declaration surface a type acquires through [`TypeRegistry::interface`].
pub struct InterfaceCapability<'a, T> {
    types: &'a mut TypeRegistry,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Interfaced> InterfaceCapability<'_, T> {
    /// Declares an attribute without a default value.
    ///
    /// Reading the attribute before any assignment yields `None`.
    pub fn declare_attribute<S: AsRef<str>>(
        &mut self,
        name: &str,
        requirements: &[S],
    ) -> Result<Accessor<T>, DeclarationError> {
        self.declare(name, requirements, None)
    }

    /// Declares an attribute whose first read builds a default with `factory`.
    pub fn declare_attribute_with_default<S, F>(
        &mut self,
        name: &str,
        requirements: &[S],
        factory: F,
    ) -> Result<Accessor<T>, DeclarationError>
    where
        S: AsRef<str>,
        F: Fn() -> Value + 'static,
    {
        self.declare(name, requirements, Some(Rc::new(factory)))
    }

    fn declare<S: AsRef<str>>(
        &mut self,
        name: &str,
        requirements: &[S],
        default_factory: Option<DefaultFactory>,
    ) -> Result<Accessor<T>, DeclarationError> {
        if !ATTRIBUTE_NAME_RE.is_match(name) {
            return Err(DeclarationError::InvalidAttributeName(name.to_string()));
        }
        let specification = InterfaceSpecification::parse(requirements)
            .map(Rc::new)
            .map_err(|source: DescriptorError| DeclarationError::InvalidDescriptor {
                attribute: name.to_string(),
                source,
            })?;

        let requirements = specification.requirements().len();
        let has_default = default_factory.is_some();
        let entry = AttributeEntry {
            specification,
            default_factory,
        };

        let policy = self.types.config.redeclaration;
        let registry = self.types.registry_for::<T>();
        registry.borrow_mut().insert(name, entry, policy)?;

        debug!(
            "event=attribute_declared module=interface status=ok type={} attribute={} requirements={} default={}",
            type_name::<T>(),
            name,
            requirements,
            has_default
        );
        Ok(Accessor::new(name, registry))
    }
}
