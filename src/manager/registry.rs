//! Backend registry.
//!
//! Maps the backend names used in the `package-managers` section to
//! constructors. The registry is built once at startup and then only read.

use std::collections::HashMap;
use std::sync::Arc;

use super::{AptPackageManager, CommandShell, PackageManager, PipPackageManager};
use crate::runtime::Runtime;

/// Builds a manager from its local key and a command shell.
pub type ManagerFactory = fn(&str, CommandShell) -> Box<dyn PackageManager>;

fn apt_factory(name: &str, shell: CommandShell) -> Box<dyn PackageManager> {
    Box::new(AptPackageManager::new(name, shell))
}

fn pip_factory(name: &str, shell: CommandShell) -> Box<dyn PackageManager> {
    Box::new(PipPackageManager::new(name, shell))
}

pub struct ManagerRegistry {
    factories: HashMap<String, ManagerFactory>,
}

impl ManagerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the apt and pip backends under both their long and
    /// short names.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("AptPackageMgr", apt_factory);
        registry.register("apt", apt_factory);
        registry.register("PipPackageMgr", pip_factory);
        registry.register("pip", pip_factory);
        registry
    }

    /// Register a backend. A backend already registered under `backend` is
    /// replaced.
    pub fn register(&mut self, backend: impl Into<String>, factory: ManagerFactory) {
        self.factories.insert(backend.into(), factory);
    }

    #[cfg(test)]
    pub fn has(&self, backend: &str) -> bool {
        self.factories.contains_key(backend)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the manager for local key `name` with backend `backend`.
    /// Returns `None` when the backend is unknown.
    pub fn create(
        &self,
        backend: &str,
        name: &str,
        runtime: Arc<dyn Runtime>,
        no_root: bool,
    ) -> Option<Box<dyn PackageManager>> {
        let factory = self.factories.get(backend)?;
        Some(factory(name, CommandShell::new(runtime, no_root)))
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
