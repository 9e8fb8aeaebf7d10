//! The host's plugin directory.
//!
//! The directory is the authoritative `GUID -> registration` map for the
//! whole host process. Resolvers enforce GUID uniqueness against it before
//! scheduling activation, and remove entries from it on unload.

use crate::plugin::{PluginInstance, PluginMetadata};
use std::collections::HashMap;
use std::rc::Rc;

/// A live registration in the plugin directory.
#[derive(Debug)]
pub struct PluginRegistration {
    /// Identifying metadata of the registered plugin.
    pub metadata: PluginMetadata,

    /// Current name of the module the plugin was discovered in.
    pub module_name: String,

    /// The constructed instance. Populated one activation tick after the
    /// registration is created.
    pub instance: Option<Rc<PluginInstance>>,
}

/// Authoritative map of active plugin registrations, owned by the host.
#[derive(Debug, Default)]
pub struct PluginDirectory {
    entries: HashMap<String, PluginRegistration>,
}

impl PluginDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a GUID is registered.
    pub fn contains(&self, guid: &str) -> bool {
        self.entries.contains_key(guid)
    }

    /// Look up a registration by GUID.
    pub fn get(&self, guid: &str) -> Option<&PluginRegistration> {
        self.entries.get(guid)
    }

    /// Insert a registration, replacing any previous entry for the GUID.
    pub fn register(&mut self, registration: PluginRegistration) {
        self.entries
            .insert(registration.metadata.guid.clone(), registration);
    }

    /// Populate the instance field of an existing registration.
    ///
    /// Returns `false` when no registration exists for the GUID.
    pub fn attach_instance(&mut self, guid: &str, instance: Rc<PluginInstance>) -> bool {
        match self.entries.get_mut(guid) {
            Some(registration) => {
                registration.instance = Some(instance);
                true
            }
            None => false,
        }
    }

    /// Remove a registration by GUID. Returns whether an entry was removed.
    pub fn remove(&mut self, guid: &str) -> bool {
        self.entries.remove(guid).is_some()
    }

    /// Number of active registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered GUIDs.
    pub fn guids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
