//! Thread-safe registry of function descriptors.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::{RegistryError, RegistryResult};
use crate::function::{Definition, Function};

/// Internal state of the registry.
#[derive(Debug, Default)]
struct RegistryInner {
    /// Registered functions in registration order.
    functions: Vec<Arc<Function>>,

    /// Index from function name to position in `functions`.
    name_index: HashMap<String, usize>,
}

/// Registry owning every callable function by unique name.
///
/// Clones share state. Registration takes an exclusive lock, so concurrent
/// registrations of the same name cannot both succeed; lookups take a
/// shared lock and hand out `Arc<Function>`s that stay valid after the lock
/// is released.
///
/// # Example
///
/// ```
/// use nlcall::function::{Definition, Function, NativeFn, Signature};
/// use nlcall::registry::FunctionRegistry;
///
/// let registry = FunctionRegistry::new();
/// let native = NativeFn::new("no", Signature::new(), |_| Ok(vec![]));
/// let f = Function::new(native, Definition::without_parameters("no", "Nothing fits"), []).unwrap();
///
/// registry.register(f.clone()).unwrap();
/// assert!(registry.register(f).is_err());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl FunctionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_name(name: &str) -> RegistryResult<()> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Register a function.
    ///
    /// Returns the shared handle on success. An existing function with the
    /// same name is never replaced.
    pub fn register(&self, function: Function) -> RegistryResult<Arc<Function>> {
        Self::validate_name(function.name())?;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.name_index.contains_key(function.name()) {
            return Err(RegistryError::Conflict(function.name().to_string()));
        }

        let function = Arc::new(function);
        let idx = inner.functions.len();
        inner.name_index.insert(function.name().to_string(), idx);
        inner.functions.push(Arc::clone(&function));

        tracing::debug!(function = %function.name(), total = idx + 1, "registered function");
        Ok(function)
    }

    /// Find a function by name.
    pub fn find(&self, name: &str) -> Option<Arc<Function>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .name_index
            .get(name)
            .map(|&idx| Arc::clone(&inner.functions[idx]))
    }

    /// Get a function by name, returning an error if not found.
    pub fn get(&self, name: &str) -> RegistryResult<Arc<Function>> {
        self.find(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Check if a function exists.
    pub fn contains(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.name_index.contains_key(name)
    }

    /// Remove a function by name.
    ///
    /// Returns the removed function, or an error if not found. Later
    /// functions keep their relative order.
    pub fn remove(&self, name: &str) -> RegistryResult<Arc<Function>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let idx = inner
            .name_index
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let function = inner.functions.remove(idx);

        for index in inner.name_index.values_mut() {
            if *index > idx {
                *index -= 1;
            }
        }

        tracing::debug!(function = %name, "removed function");
        Ok(function)
    }

    /// All functions in registration order.
    pub fn functions(&self) -> Vec<Arc<Function>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.functions.clone()
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .functions
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> Vec<Definition> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .functions
            .iter()
            .map(|f| f.definition().clone())
            .collect()
    }

    /// OpenAI-compatible tool schemas for every function.
    pub fn to_openai_tools(&self) -> Vec<Value> {
        self.definitions()
            .iter()
            .map(Definition::to_openai_function)
            .collect()
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.functions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{NativeFn, Signature};

    fn make_fn(name: &str) -> Function {
        let native = NativeFn::new(name, Signature::new(), |_| Ok(vec![]));
        Function::new(
            native,
            Definition::without_parameters(name, format!("Description for {}", name)),
            [],
        )
        .unwrap()
    }

    #[test]
    fn test_new_registry() {
        let registry = FunctionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let registry = FunctionRegistry::new();
        registry.register(make_fn("greet")).unwrap();

        let f = registry.get("greet").unwrap();
        assert_eq!(f.name(), "greet");
        assert!(registry.contains("greet"));
        assert!(registry.find("missing").is_none());
        assert!(matches!(
            registry.get("missing"),
            Err(RegistryError::NotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_register_duplicate_keeps_original() {
        let registry = FunctionRegistry::new();
        let first = registry.register(make_fn("tool")).unwrap();

        let result = registry.register(make_fn("tool"));
        match result.unwrap_err() {
            RegistryError::Conflict(name) => assert_eq!(name, "tool"),
            other => panic!("Expected Conflict error, got {other}"),
        }
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&first, &registry.get("tool").unwrap()));
    }

    #[test]
    fn test_invalid_names() {
        let registry = FunctionRegistry::new();
        assert!(matches!(
            registry.register(make_fn("")),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(make_fn("two words")),
            Err(RegistryError::InvalidName(_))
        ));
    }

    #[test]
    fn test_registration_order() {
        let registry = FunctionRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(make_fn(name)).unwrap();
        }
        assert_eq!(registry.names(), vec!["c", "a", "b"]);

        let defs = registry.definitions();
        assert_eq!(defs[0].name, "c");

        let tools = registry.to_openai_tools();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[1]["function"]["name"], "a");
        assert_eq!(registry.functions().len(), 3);
    }

    #[test]
    fn test_remove() {
        let registry = FunctionRegistry::new();
        registry.register(make_fn("a")).unwrap();
        registry.register(make_fn("b")).unwrap();
        registry.register(make_fn("c")).unwrap();

        let removed = registry.remove("b").unwrap();
        assert_eq!(removed.name(), "b");

        assert_eq!(registry.names(), vec!["a", "c"]);
        assert!(!registry.contains("b"));
        assert_eq!(registry.get("c").unwrap().name(), "c");
        assert!(matches!(registry.remove("b"), Err(RegistryError::NotFound(_))));

        registry.register(make_fn("b")).unwrap();
        assert_eq!(registry.names(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_clone_shares_state() {
        let registry = FunctionRegistry::new();
        let clone = registry.clone();
        clone.register(make_fn("shared")).unwrap();
        assert!(registry.contains("shared"));
    }

    #[test]
    fn test_concurrent_duplicate_registration() {
        let registry = FunctionRegistry::new();
        let wins: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| registry.register(make_fn("race")).is_ok()))
                .collect();
            handles
                .into_iter()
                .map(|h| usize::from(h.join().unwrap()))
                .sum()
        });
        assert_eq!(wins, 1);
        assert_eq!(registry.len(), 1);
    }
}
