//! Module loader boundary used to wire attribute values.
//!
//! # Responsibility
//! - Resolve a module by logical path and expose its exported symbols.
//! - Provide an in-memory loader whose module bodies run once and are cached.
//!
//! # Invariants
//! - A module body runs at most once until the module is unloaded.
//! - Circular imports fail instead of recursing.
//!
//! The core never depends on how a module was produced; it only validates the
//! values a caller pulls out of one.

use crate::capability::introspect::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Resolves modules by logical path.
pub trait ModuleLoader {
    fn load_module(&self, logical_path: &str) -> Result<Rc<Module>, ModuleError>;
}

/// Loaded module: a logical path plus its exported symbols.
pub struct Module {
    path: String,
    exports: BTreeMap<String, Value>,
}

impl Module {
    pub fn new(path: impl Into<String>, exports: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            path: path.into(),
            exports: exports.into_iter().collect(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exported_symbols(&self) -> &BTreeMap<String, Value> {
        &self.exports
    }

    /// One exported symbol by name.
    pub fn symbol(&self, name: &str) -> Result<Value, ModuleError> {
        self.exports
            .get(name)
            .cloned()
            .ok_or_else(|| ModuleError::MissingSymbol {
                module: self.path.clone(),
                symbol: name.to_string(),
            })
    }

    /// Several exported symbols, in the order requested.
    pub fn grab(&self, names: &[&str]) -> Result<Vec<Value>, ModuleError> {
        names.iter().map(|name| self.symbol(name)).collect()
    }
}

impl Debug for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("path", &self.path)
            .field("exports", &self.exports.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Module body: builds exports, may load other modules through the loader.
pub type ModuleBody = Box<dyn Fn(&dyn ModuleLoader) -> Result<Vec<(String, Value)>, ModuleError>>;

/// Loader over module bodies registered in process.
#[derive(Default)]
pub struct InMemoryModuleLoader {
    bodies: BTreeMap<String, ModuleBody>,
    loaded: RefCell<BTreeMap<String, Rc<Module>>>,
    loading: RefCell<BTreeSet<String>>,
}

impl InMemoryModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module body under `logical_path`.
    pub fn define<F>(&mut self, logical_path: &str, body: F) -> Result<(), ModuleError>
    where
        F: Fn(&dyn ModuleLoader) -> Result<Vec<(String, Value)>, ModuleError> + 'static,
    {
        let path = normalize_path(logical_path)?;
        if self.bodies.contains_key(&path) {
            return Err(ModuleError::DuplicateModule(path));
        }
        self.bodies.insert(path, Box::new(body));
        Ok(())
    }

    pub fn is_loaded(&self, logical_path: &str) -> bool {
        self.loaded.borrow().contains_key(logical_path.trim())
    }

    /// Drops the cached module so the next load runs its body again.
    pub fn unload(&self, logical_path: &str) -> bool {
        self.loaded.borrow_mut().remove(logical_path.trim()).is_some()
    }
}

impl ModuleLoader for InMemoryModuleLoader {
    fn load_module(&self, logical_path: &str) -> Result<Rc<Module>, ModuleError> {
        let path = normalize_path(logical_path)?;
        if let Some(module) = self.loaded.borrow().get(&path) {
            return Ok(Rc::clone(module));
        }

        let body = self
            .bodies
            .get(&path)
            .ok_or_else(|| ModuleError::UnknownModule(path.clone()))?;
        if !self.loading.borrow_mut().insert(path.clone()) {
            return Err(ModuleError::CircularImport(path));
        }

        let exports = body(self as &dyn ModuleLoader);
        self.loading.borrow_mut().remove(&path);
        let module = Rc::new(Module::new(path.clone(), exports?));

        debug!(
            "event=module_loaded module=loader status=ok path={} exports={}",
            path,
            module.exported_symbols().len()
        );
        self.loaded
            .borrow_mut()
            .insert(path, Rc::clone(&module));
        Ok(module)
    }
}

fn normalize_path(logical_path: &str) -> Result<String, ModuleError> {
    let trimmed = logical_path.trim();
    if trimmed.is_empty() {
        return Err(ModuleError::InvalidPath(logical_path.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Module loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    InvalidPath(String),
    UnknownModule(String),
    DuplicateModule(String),
    CircularImport(String),
    MissingSymbol { module: String, symbol: String },
}

impl Display for ModuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(value) => write!(f, "module path is invalid: `{value}`"),
            Self::UnknownModule(value) => write!(f, "module not found: {value}"),
            Self::DuplicateModule(value) => write!(f, "module already defined: {value}"),
            Self::CircularImport(value) => write!(f, "circular import of module: {value}"),
            Self::MissingSymbol { module, symbol } => {
                write!(f, "module {module} does not export `{symbol}`")
            }
        }
    }
}

impl Error for ModuleError {}

#[cfg(test)]
mod tests {
    use super::{InMemoryModuleLoader, ModuleError, ModuleLoader};
    use crate::capability::introspect::{TypeDescriptor, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    fn symbol(name: &str) -> (String, Value) {
        (name.to_string(), TypeDescriptor::builder(name).build())
    }

    #[test]
    fn module_body_runs_once_until_unloaded() {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let mut loader = InMemoryModuleLoader::new();
        loader
            .define("adapters/json", move |_| {
                counter.set(counter.get() + 1);
                Ok(vec![symbol("JsonAdapter")])
            })
            .expect("define module");

        let first = loader.load_module("adapters/json").expect("first load");
        let second = loader.load_module(" adapters/json ").expect("cached load");
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(runs.get(), 1);

        assert!(loader.unload("adapters/json"));
        assert!(!loader.is_loaded("adapters/json"));
        loader.load_module("adapters/json").expect("reload");
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn bodies_can_import_other_modules() {
        let mut loader = InMemoryModuleLoader::new();
        loader
            .define("external-lib/registry", |_| Ok(vec![symbol("Task")]))
            .expect("define registry");
        loader
            .define("external-lib/task_list", |modules| {
                let task = modules.load_module("external-lib/registry")?.symbol("Task")?;
                Ok(vec![("Task".to_string(), task), symbol("TaskList")])
            })
            .expect("define task list");

        let module = loader
            .load_module("external-lib/task_list")
            .expect("load task list");
        let grabbed = module.grab(&["TaskList", "Task"]).expect("grab symbols");
        assert_eq!(grabbed.len(), 2);
        assert!(loader.is_loaded("external-lib/registry"));
    }

    #[test]
    fn reports_missing_modules_symbols_and_cycles() {
        let mut loader = InMemoryModuleLoader::new();
        loader
            .define("a", |modules| {
                modules.load_module("a")?;
                Ok(vec![])
            })
            .expect("define a");
        loader
            .define("b", |_| Ok(vec![symbol("B")]))
            .expect("define b");

        assert_eq!(
            loader.load_module("a").expect_err("cycle must fail"),
            ModuleError::CircularImport("a".to_string())
        );
        assert!(!loader.is_loaded("a"));
        assert_eq!(
            loader.load_module("missing").expect_err("unknown must fail"),
            ModuleError::UnknownModule("missing".to_string())
        );
        let module = loader.load_module("b").expect("load b");
        assert!(matches!(
            module.symbol("C"),
            Err(ModuleError::MissingSymbol { .. })
        ));
        assert_eq!(
            loader
                .define("b", |_| Ok(vec![]))
                .expect_err("duplicate must fail"),
            ModuleError::DuplicateModule("b".to_string())
        );
    }
}
