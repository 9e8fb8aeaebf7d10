//! Plugin discovery and lifecycle management.
//!
//! Scans materialized modules for plugin-contract types, guards GUID
//! uniqueness against the host's plugin directory, schedules activation on
//! the host's deferred queue, and tracks live records so individual plugins
//! can be unloaded later.

use crate::error::ResolveResult;
use modnest_plugin_api::{
    is_plugin_type, HostContext, PluginInstance, PluginMetadata, PluginRegistration,
};
use modnest_runtime::{rewrite, LoadedModule, ModuleDescriptor, TypeDecl};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::{Rc, Weak};
use tracing::{error, info};

/// A type that could not be inspected, with the modules it was missing.
#[derive(Debug, Clone)]
pub struct TypeInspectFailure {
    /// Fully qualified name of the failed type.
    pub type_name: String,

    /// Required modules that were not loaded.
    pub missing: Vec<String>,
}

/// Record of a discovered plugin, created before activation completes so
/// unload is possible even while activation is still pending.
#[derive(Debug, Clone)]
pub struct PluginHandle {
    guid: String,
    manager: Weak<PluginManager>,
}

impl PluginHandle {
    /// The plugin's GUID.
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Unload this plugin from the manager and the host's directory.
    ///
    /// Always reports success, even when nothing was actually removed (see
    /// DESIGN.md; this mirrors the lifecycle the host relies on today).
    pub fn unload(&self) -> bool {
        match self.manager.upgrade() {
            Some(manager) => manager.unload(&self.guid),
            None => true,
        }
    }
}

/// Discovers plugin types in materialized modules and manages their
/// lifecycle.
#[derive(Debug)]
pub struct PluginManager {
    host: Rc<HostContext>,
    guids: RefCell<HashSet<String>>,
}

impl PluginManager {
    /// Create a manager bound to a host context.
    pub fn new(host: &Rc<HostContext>) -> Rc<Self> {
        Rc::new(Self {
            host: Rc::clone(host),
            guids: RefCell::new(HashSet::new()),
        })
    }

    /// Enumerate a module's types, tolerating partial failure.
    ///
    /// Types whose required modules are not loaded fail inspection; the
    /// successfully inspected subset is returned alongside the failures.
    pub fn inspect_types<'a>(
        &self,
        module: &'a LoadedModule,
    ) -> (Vec<&'a TypeDecl>, Vec<TypeInspectFailure>) {
        let mut inspected = Vec::new();
        let mut failures = Vec::new();
        for decl in module.types() {
            let missing: Vec<String> = decl
                .requires
                .iter()
                .filter(|required| !self.host.is_loaded(required))
                .cloned()
                .collect();
            if missing.is_empty() {
                inspected.push(decl);
            } else {
                failures.push(TypeInspectFailure {
                    type_name: decl.full_name.clone(),
                    missing,
                });
            }
        }
        (inspected, failures)
    }

    /// Discover plugin types in a module and schedule their activation.
    ///
    /// Inspection failures and per-type metadata or GUID problems are
    /// logged and skipped; they never abort processing of sibling types.
    pub fn load_plugins(self: &Rc<Self>, module: &Rc<LoadedModule>) -> Vec<PluginHandle> {
        info!("looking for plugins to load from module {}", module.name());

        let (inspected, failures) = self.inspect_types(module);
        for failure in &failures {
            error!(
                "type {} failed to load, missing {:?}",
                failure.type_name, failure.missing
            );
        }

        inspected
            .into_iter()
            .filter_map(|decl| self.load_plugin(decl, module))
            .collect()
    }

    /// Load a module container from disk and discover its plugins.
    ///
    /// The declared name gains a unique tag before materialization so a
    /// side-loaded file never collides with an identity already present.
    pub fn load_plugins_from_file(
        self: &Rc<Self>,
        path: &Path,
    ) -> ResolveResult<Vec<PluginHandle>> {
        let descriptor = ModuleDescriptor::from_file(path)?;
        let descriptor = rewrite::tag_identity(descriptor, rewrite::unique_tick());
        let module = self
            .host
            .insert_module(LoadedModule::materialize(descriptor))?;
        Ok(self.load_plugins(&module))
    }

    fn load_plugin(
        self: &Rc<Self>,
        decl: &TypeDecl,
        module: &Rc<LoadedModule>,
    ) -> Option<PluginHandle> {
        if !is_plugin_type(decl) {
            return None;
        }

        let metadata = match PluginMetadata::from_type(decl) {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("failed to load plugin of type {}: {}", decl.full_name, e);
                return None;
            }
        };

        if self.guids.borrow().contains(&metadata.guid)
            || self.host.directory().contains(&metadata.guid)
        {
            error!(
                "a plugin with GUID {} is already loaded, skipping {}",
                metadata.guid, decl.full_name
            );
            return None;
        }

        info!("loading {}", metadata.guid);
        self.guids.borrow_mut().insert(metadata.guid.clone());
        let guid = metadata.guid.clone();
        self.schedule(decl.clone(), metadata, Rc::clone(module));

        Some(PluginHandle {
            guid,
            manager: Rc::downgrade(self),
        })
    }

    /// Submit the deferred activation task for one plugin.
    ///
    /// The registration is created first so the instance's fields can be
    /// populated afterwards; construction failure rolls the registration
    /// back without affecting sibling plugins. An unload that happens before
    /// the task runs does not cancel it.
    fn schedule(&self, decl: TypeDecl, metadata: PluginMetadata, module: Rc<LoadedModule>) {
        let host = Rc::clone(&self.host);
        self.host.queue().defer(move || {
            info!("creating {}", metadata.guid);
            host.directory_mut().register(PluginRegistration {
                metadata: metadata.clone(),
                module_name: module.name().to_string(),
                instance: None,
            });
            match PluginInstance::construct(&decl, metadata.clone(), Rc::clone(&module)) {
                Ok(instance) => {
                    let instance = Rc::new(instance);
                    host.attach_component(Rc::clone(&instance));
                    host.directory_mut().attach_instance(&metadata.guid, instance);
                }
                Err(e) => {
                    error!(
                        "failed to activate plugin with GUID {}: {}",
                        metadata.guid, e
                    );
                    host.directory_mut().remove(&metadata.guid);
                }
            }
        });
    }

    /// Unload a plugin by GUID from the manager and the host's directory.
    ///
    /// Always reports success regardless of whether an entry was present.
    pub fn unload(&self, guid: &str) -> bool {
        let removed = self.guids.borrow_mut().remove(guid) && self.host.directory_mut().remove(guid);
        if removed {
            info!("unloading plugin {}", guid);
        }
        true
    }

    /// Unload every live plugin record.
    pub fn unload_all(&self) {
        let guids: Vec<String> = self.guids.borrow().iter().cloned().collect();
        for guid in guids {
            self.unload(&guid);
        }
    }

    /// GUIDs of currently tracked plugins.
    pub fn live_guids(&self) -> Vec<String> {
        self.guids.borrow().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modnest_plugin_api::PLUGIN_CONTRACT;
    use modnest_runtime::{ModuleIdentity, PluginDecl};

    fn plugin_type(name: &str, guid: &str) -> TypeDecl {
        TypeDecl {
            full_name: name.to_string(),
            implements: vec![PLUGIN_CONTRACT.to_string()],
            requires: vec![],
            abstract_type: false,
            plugin: Some(PluginDecl {
                guid: guid.to_string(),
                name: name.to_string(),
                version: "1.0.0".to_string(),
            }),
        }
    }

    fn module_with_types(name: &str, types: Vec<TypeDecl>) -> LoadedModule {
        let mut descriptor = ModuleDescriptor::new(ModuleIdentity::named(name));
        descriptor.types = types;
        LoadedModule::materialize(descriptor)
    }

    #[test]
    fn test_discovery_skips_non_plugin_types() {
        let host = HostContext::new();
        let manager = PluginManager::new(&host);

        let mut plain = plugin_type("M.Plain", "unused");
        plain.implements.clear();
        let module = host
            .insert_module(module_with_types(
                "M",
                vec![plain, plugin_type("M.Widget", "m.widget")],
            ))
            .unwrap();

        let handles = manager.load_plugins(&module);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].guid(), "m.widget");
    }

    #[test]
    fn test_metadata_failure_is_fatal_only_for_that_type() {
        let host = HostContext::new();
        let manager = PluginManager::new(&host);

        let mut bare = plugin_type("M.Bare", "ignored");
        bare.plugin = None;
        let module = host
            .insert_module(module_with_types(
                "M",
                vec![bare, plugin_type("M.Widget", "m.widget")],
            ))
            .unwrap();

        let handles = manager.load_plugins(&module);
        assert_eq!(handles.len(), 1);
    }

    #[test]
    fn test_inspection_failure_reports_missing_modules() {
        let host = HostContext::new();
        let manager = PluginManager::new(&host);

        let mut needy = plugin_type("M.Needy", "m.needy");
        needy.requires = vec!["Absent".to_string()];
        let module = host
            .insert_module(module_with_types(
                "M",
                vec![needy, plugin_type("M.Widget", "m.widget")],
            ))
            .unwrap();

        let (inspected, failures) = manager.inspect_types(&module);
        assert_eq!(inspected.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].missing, vec!["Absent".to_string()]);
    }

    #[test]
    fn test_activation_is_deferred() {
        let host = HostContext::new();
        let manager = PluginManager::new(&host);
        let module = host
            .insert_module(module_with_types(
                "M",
                vec![plugin_type("M.Widget", "m.widget")],
            ))
            .unwrap();

        manager.load_plugins(&module);

        // Record exists, directory entry and component do not, until a tick.
        assert!(manager.live_guids().contains(&"m.widget".to_string()));
        assert!(!host.directory().contains("m.widget"));
        assert_eq!(host.component_count(), 0);

        host.run_pending();
        assert!(host.directory().contains("m.widget"));
        assert!(host.directory().get("m.widget").unwrap().instance.is_some());
        assert_eq!(host.component_count(), 1);
    }

    #[test]
    fn test_unload_always_reports_success() {
        let host = HostContext::new();
        let manager = PluginManager::new(&host);

        assert!(manager.unload("never.registered"));
    }

    #[test]
    fn test_pending_activation_survives_unload() {
        let host = HostContext::new();
        let manager = PluginManager::new(&host);
        let module = host
            .insert_module(module_with_types(
                "M",
                vec![plugin_type("M.Widget", "m.widget")],
            ))
            .unwrap();

        let handles = manager.load_plugins(&module);
        assert!(handles[0].unload());
        assert!(manager.live_guids().is_empty());

        // The queued task still runs and registers into the unloaded slot.
        host.run_pending();
        assert!(host.directory().contains("m.widget"));
    }
}
