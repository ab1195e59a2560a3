//! Type registry
//!
//! The original library registered its namespace into whatever global module
//! system was present. Here registration is an explicit, test-injectable
//! object: callers create a [`TypeRegistry`], seed it (optionally with the
//! built-in types), and pass it where needed. There is no process-wide
//! singleton.

use crate::class::{Members, TypeDescriptor};
use crate::types::{KeystoneError, Result};
use std::collections::HashMap;

/// A registry of named type descriptors
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Create a registry seeded with the built-in types
    ///
    /// Registers `Base` (the root) and `ModelBase` (`Base` extended with an
    /// empty member set).
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        let base = TypeDescriptor::base();
        let model_base = base.extend("ModelBase", Members::new())?;
        registry.register(base)?;
        registry.register(model_base)?;
        Ok(registry)
    }

    /// Register a type descriptor under its name
    ///
    /// # Errors
    /// [`KeystoneError::DuplicateType`] if a type with the same name is
    /// already registered.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();
        if self.types.contains_key(&name) {
            return Err(KeystoneError::DuplicateType(name));
        }
        log::debug!("Registering type '{}'", name);
        self.types.insert(name, descriptor);
        Ok(())
    }

    /// Look up a type descriptor by name
    pub fn get(&self, name: &str) -> Option<TypeDescriptor> {
        self.types.get(name).cloned()
    }

    /// All registered type names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("Base").is_none());
    }

    #[test]
    fn test_builtins() {
        let registry = TypeRegistry::with_builtins().unwrap();
        assert_eq!(registry.names(), vec!["Base", "ModelBase"]);

        let model_base = registry.get("ModelBase").unwrap();
        assert_eq!(model_base.parent().unwrap().name(), "Base");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = TypeRegistry::new();
        let base = TypeDescriptor::base();
        registry.register(base.clone()).unwrap();

        let err = registry.register(base).unwrap_err();
        assert!(matches!(err, KeystoneError::DuplicateType(name) if name == "Base"));
    }

    #[test]
    fn test_registered_type_is_usable() {
        let mut registry = TypeRegistry::with_builtins().unwrap();
        let model = registry
            .get("ModelBase")
            .unwrap()
            .extend("Model", Members::new())
            .unwrap();
        registry.register(model).unwrap();

        let fetched = registry.get("Model").unwrap();
        let instance = fetched.construct(&[]).unwrap();
        assert_eq!(instance.descriptor().name(), "Model");
    }
}
