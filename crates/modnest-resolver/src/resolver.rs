//! The dependency resolver.
//!
//! Intercepts the host's "module not found" notifications and runs the
//! resolution pipeline: cache lookup, resource location in the requester,
//! identity rewriting, materialization, plugin discovery, and cache store.
//! On a clean not-found the resolver consults its ordered fallback handlers;
//! by default that list holds the back-reference chain walker.
//!
//! No internal failure crosses the hook boundary: every attempt ends in
//! either a module handle or a logged negative result.

use crate::cache::{ResolutionCache, ResolvedDependency};
use crate::chain::{ChainWalker, FallbackHandler};
use crate::error::ResolveResult;
use crate::locate::locate_resource;
use crate::manager::PluginManager;
use chrono::Utc;
use modnest_plugin_api::{HandlerId, HostContext, ResolveHandler};
use modnest_runtime::{rewrite, LoadedModule, ModuleDescriptor, ModuleIdentity};
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use tracing::{info, warn};

/// Resolves missing modules from resources embedded in loaded modules.
pub struct DependencyResolver {
    host: Rc<HostContext>,
    cache: RefCell<ResolutionCache>,
    fallbacks: RefCell<Vec<Rc<dyn FallbackHandler>>>,
    manager: Rc<PluginManager>,
    handler: Cell<Option<HandlerId>>,
    defunct: Cell<bool>,
}

impl DependencyResolver {
    /// Create a resolver and register it with the host's resolution
    /// notification channel.
    ///
    /// The default fallback list contains the back-reference chain walker.
    pub fn attach(host: &Rc<HostContext>) -> Rc<Self> {
        let resolver = Rc::new(Self {
            host: Rc::clone(host),
            cache: RefCell::new(ResolutionCache::new()),
            fallbacks: RefCell::new(vec![Rc::new(ChainWalker::new()) as Rc<dyn FallbackHandler>]),
            manager: PluginManager::new(host),
            handler: Cell::new(None),
            defunct: Cell::new(false),
        });

        let handler: Rc<dyn ResolveHandler> = Rc::clone(&resolver) as Rc<dyn ResolveHandler>;
        let id = host.register_resolver(Rc::downgrade(&handler));
        resolver.handler.set(Some(id));
        resolver
    }

    /// The host this resolver serves.
    pub fn host(&self) -> &Rc<HostContext> {
        &self.host
    }

    /// The plugin lifecycle manager owned by this resolver.
    pub fn manager(&self) -> &Rc<PluginManager> {
        &self.manager
    }

    /// Read access to the resolution cache.
    pub fn cache(&self) -> Ref<'_, ResolutionCache> {
        self.cache.borrow()
    }

    /// Append a fallback handler. Handlers run in registration order after
    /// the primary pipeline reports not-found; the first handle returned
    /// wins.
    pub fn add_fallback(&self, handler: Rc<dyn FallbackHandler>) {
        self.fallbacks.borrow_mut().push(handler);
    }

    /// Whether the resolver has been torn down.
    pub fn is_detached(&self) -> bool {
        self.defunct.get()
    }

    /// Tear the resolver down: unregister the resolution hook, unload every
    /// plugin it discovered, and drop the cache. Any resolve call after
    /// this panics.
    pub fn detach(&self) {
        if self.defunct.replace(true) {
            return;
        }
        if let Some(id) = self.handler.take() {
            self.host.unregister_resolver(id);
        }
        self.manager.unload_all();
        self.cache.borrow_mut().clear();
    }

    /// Run the resolution pipeline for one request.
    ///
    /// Returns a handle on success, `None` for no opinion. Never returns an
    /// error: internal failures are logged at the attempt boundary.
    ///
    /// # Panics
    ///
    /// Panics when called after [`DependencyResolver::detach`]; resolving
    /// through a torn-down resolver is a programmer error.
    pub fn resolve(
        &self,
        request: &ModuleIdentity,
        requester: Option<&Rc<LoadedModule>>,
    ) -> Option<Rc<LoadedModule>> {
        assert!(
            !self.defunct.get(),
            "resolve called on a detached DependencyResolver"
        );

        let Some(requester) = requester else {
            warn!("a request for {} has no requesting module", request);
            return None;
        };

        if let Some(entry) = self.cache.borrow().get(&request.name) {
            info!("request {} exists in the request map", request);
            return Some(Rc::clone(&entry.module));
        }

        match self.resolve_direct(request, requester) {
            Ok(Some(module)) => Some(module),
            Ok(None) => {
                info!(
                    "{} not found in {}, consulting fallback handlers",
                    request,
                    requester.name()
                );
                let fallbacks: Vec<_> = self.fallbacks.borrow().clone();
                for fallback in fallbacks {
                    if let Some(module) = fallback.on_not_found(self, request, requester) {
                        return Some(module);
                    }
                }
                None
            }
            Err(e) => {
                info!("request {} failed to load because {}", request, e);
                None
            }
        }
    }

    /// Resolve a request against one specific requester, without cache
    /// lookup or fallback handling.
    ///
    /// Locates a candidate resource, rewrites its identity, materializes it,
    /// discovers its plugins, and records the resolution in the cache.
    /// `Ok(None)` means the requester declared no eligible candidate.
    pub fn resolve_direct(
        &self,
        request: &ModuleIdentity,
        requester: &Rc<LoadedModule>,
    ) -> ResolveResult<Option<Rc<LoadedModule>>> {
        let Some(resource_name) = locate_resource(requester, request)? else {
            return Ok(None);
        };
        let Some(bytes) = requester.resource(&resource_name) else {
            return Ok(None);
        };

        let descriptor = ModuleDescriptor::parse(bytes)?;
        let descriptor = rewrite::decorate(descriptor, requester.name(), rewrite::unique_tick());
        info!("loading module '{}' into the host", descriptor.identity);

        let module = self
            .host
            .insert_module(LoadedModule::materialize(descriptor))?;
        let plugins = self.manager.load_plugins(&module);

        self.cache.borrow_mut().insert(ResolvedDependency {
            resolved_at: Utc::now(),
            requested: request.name.clone(),
            module: Rc::clone(&module),
            requester: requester.identity().clone(),
            plugins,
        })?;

        Ok(Some(module))
    }
}

impl ResolveHandler for DependencyResolver {
    fn resolve(
        &self,
        request: &ModuleIdentity,
        requester: Option<&Rc<LoadedModule>>,
    ) -> Option<Rc<LoadedModule>> {
        DependencyResolver::resolve(self, request, requester)
    }
}

impl Drop for DependencyResolver {
    fn drop(&mut self) {
        if !self.defunct.get() {
            self.detach();
        }
    }
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("cached", &self.cache.borrow().len())
            .field("defunct", &self.defunct.get())
            .finish()
    }
}
