//! The host context.
//!
//! An explicit context object standing in for the host process: it owns the
//! table of loaded modules, the plugin directory, the component container,
//! and the deferred activation queue, and it fans "module not found"
//! notifications out to registered resolve handlers.
//!
//! The context is single-threaded by construction (`Rc`/`RefCell`);
//! triggering resolution from more than one thread is outside its contract.

use crate::directory::PluginDirectory;
use crate::error::{PluginError, PluginResult};
use crate::plugin::PluginInstance;
use crate::scheduler::ActivationQueue;
use modnest_runtime::{LoadedModule, ModuleIdentity};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// A handler consulted when the host fails to find a requested module.
pub trait ResolveHandler {
    /// Return a handle for the requested module, or `None` for no opinion.
    fn resolve(
        &self,
        request: &ModuleIdentity,
        requester: Option<&Rc<LoadedModule>>,
    ) -> Option<Rc<LoadedModule>>;
}

/// Token identifying a registered resolve handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

/// The host process's module-loading surface.
pub struct HostContext {
    modules: RefCell<HashMap<String, Rc<LoadedModule>>>,
    directory: RefCell<PluginDirectory>,
    queue: ActivationQueue,
    components: RefCell<Vec<Rc<PluginInstance>>>,
    handlers: RefCell<Vec<(HandlerId, Weak<dyn ResolveHandler>)>>,
    next_handler_id: Cell<u64>,
}

impl HostContext {
    /// Create a fresh host context.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            modules: RefCell::new(HashMap::new()),
            directory: RefCell::new(PluginDirectory::new()),
            queue: ActivationQueue::new(),
            components: RefCell::new(Vec::new()),
            handlers: RefCell::new(Vec::new()),
            next_handler_id: Cell::new(0),
        })
    }

    /// Materialize a module into the host.
    ///
    /// Fails when a module with the same name is already loaded; rewritten
    /// identities are expected to never collide.
    pub fn insert_module(&self, module: LoadedModule) -> PluginResult<Rc<LoadedModule>> {
        let name = module.name().to_string();
        let mut modules = self.modules.borrow_mut();
        if modules.contains_key(&name) {
            return Err(PluginError::ModuleCollision(name));
        }
        let handle = Rc::new(module);
        modules.insert(name, Rc::clone(&handle));
        Ok(handle)
    }

    /// Look up a loaded module by its current name.
    pub fn module(&self, name: &str) -> Option<Rc<LoadedModule>> {
        self.modules.borrow().get(name).cloned()
    }

    /// Check whether a module answering to the given simple name is loaded,
    /// matching rewritten modules by their undecorated name.
    pub fn is_loaded(&self, simple_name: &str) -> bool {
        self.modules.borrow().values().any(|module| {
            module.identity().matches_name(simple_name)
                || module
                    .identity()
                    .undecorated_name()
                    .eq_ignore_ascii_case(simple_name)
        })
    }

    /// Number of loaded modules.
    pub fn module_count(&self) -> usize {
        self.modules.borrow().len()
    }

    /// Read access to the plugin directory.
    pub fn directory(&self) -> Ref<'_, PluginDirectory> {
        self.directory.borrow()
    }

    /// Write access to the plugin directory.
    pub fn directory_mut(&self) -> RefMut<'_, PluginDirectory> {
        self.directory.borrow_mut()
    }

    /// The deferred activation queue.
    pub fn queue(&self) -> &ActivationQueue {
        &self.queue
    }

    /// Drain the activation queue. The host embedding calls this after each
    /// dispatch has returned.
    pub fn run_pending(&self) -> usize {
        self.queue.run_pending()
    }

    /// Attach a constructed plugin instance to the component container.
    pub fn attach_component(&self, instance: Rc<PluginInstance>) {
        self.components.borrow_mut().push(instance);
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.borrow().len()
    }

    /// Register a resolve handler. Handlers are consulted in registration
    /// order; a handler whose owner has been dropped is skipped and pruned.
    pub fn register_resolver(&self, handler: Weak<dyn ResolveHandler>) -> HandlerId {
        let id = HandlerId(self.next_handler_id.get());
        self.next_handler_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Remove a previously registered resolve handler.
    pub fn unregister_resolver(&self, id: HandlerId) {
        self.handlers.borrow_mut().retain(|(hid, _)| *hid != id);
    }

    /// Number of live registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers
            .borrow()
            .iter()
            .filter(|(_, handler)| handler.strong_count() > 0)
            .count()
    }

    /// Notify registered handlers that a module was not found.
    ///
    /// `request` is the raw request string; `requester` is the module the
    /// request originated from, when the host knows it. The first handler
    /// returning a handle wins; when all pass, the host's own failure
    /// behavior applies at the call site.
    pub fn resolve_missing(
        &self,
        request: &str,
        requester: Option<&Rc<LoadedModule>>,
    ) -> Option<Rc<LoadedModule>> {
        let identity = match ModuleIdentity::parse(request) {
            Ok(identity) => identity,
            Err(e) => {
                warn!("unparseable module request {:?}: {}", request, e);
                return None;
            }
        };

        self.handlers
            .borrow_mut()
            .retain(|(_, handler)| handler.strong_count() > 0);

        let live: Vec<Rc<dyn ResolveHandler>> = self
            .handlers
            .borrow()
            .iter()
            .filter_map(|(_, handler)| handler.upgrade())
            .collect();

        for handler in live {
            if let Some(module) = handler.resolve(&identity, requester) {
                return Some(module);
            }
        }
        debug!("no handler resolved {}", identity);
        None
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("modules", &self.module_count())
            .field("directory", &self.directory().len())
            .field("components", &self.component_count())
            .field("pending_activations", &self.queue.pending())
            .finish()
    }
}
