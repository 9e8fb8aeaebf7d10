//! The resolution cache.
//!
//! Each successfully resolved request is recorded under its requested name,
//! so a name is materialized at most once per resolver lifetime. Entries are
//! never invalidated individually; only full resolver teardown clears the
//! map. No lock protects the cache: resolution runs on one logical thread.

use crate::error::{ResolveError, ResolveResult};
use crate::manager::PluginHandle;
use chrono::{DateTime, Utc};
use modnest_runtime::{LoadedModule, ModuleIdentity};
use std::collections::HashMap;
use std::rc::Rc;

/// A successfully resolved dependency.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    /// When the resolution completed.
    pub resolved_at: DateTime<Utc>,

    /// The name the dependency was requested under.
    pub requested: String,

    /// Handle to the materialized module.
    pub module: Rc<LoadedModule>,

    /// Identity of the module whose resources satisfied the request.
    pub requester: ModuleIdentity,

    /// Plugins discovered in the materialized module.
    pub plugins: Vec<PluginHandle>,
}

/// Map of requested name to resolved dependency.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, ResolvedDependency>,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolution by requested name.
    pub fn get(&self, requested: &str) -> Option<&ResolvedDependency> {
        self.entries.get(requested)
    }

    /// Record a resolution under its requested name.
    ///
    /// Fails when the name is already present: a requested name must be
    /// materialized at most once per resolver lifetime.
    pub fn insert(&mut self, entry: ResolvedDependency) -> ResolveResult<()> {
        if self.entries.contains_key(&entry.requested) {
            return Err(ResolveError::AlreadyResolved(entry.requested));
        }
        self.entries.insert(entry.requested.clone(), entry);
        Ok(())
    }

    /// Number of recorded resolutions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every recorded resolution.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
