//! Transitive fallback resolution.
//!
//! A module materialized through resolution records the name of the module
//! that resolved it. When a request cannot be satisfied from the requester's
//! own resources, the chain walker follows those back-references upwards and
//! retries the full pipeline against each ancestor in turn, so a dependency
//! embedded in a grandparent module stays reachable two or more hops
//! downstream.

use crate::resolver::DependencyResolver;
use modnest_runtime::{LoadedModule, ModuleIdentity};
use std::rc::Rc;
use tracing::{debug, info};

/// A handler consulted, in registration order, after the primary pipeline
/// reports not-found.
pub trait FallbackHandler {
    /// Try to satisfy a request the primary pipeline could not.
    fn on_not_found(
        &self,
        resolver: &DependencyResolver,
        request: &ModuleIdentity,
        requester: &Rc<LoadedModule>,
    ) -> Option<Rc<LoadedModule>>;
}

/// Walks back-reference chains to retry resolution against ancestors.
#[derive(Debug, Default)]
pub struct ChainWalker;

impl ChainWalker {
    /// Create a chain walker.
    pub fn new() -> Self {
        Self
    }
}

impl FallbackHandler for ChainWalker {
    fn on_not_found(
        &self,
        resolver: &DependencyResolver,
        request: &ModuleIdentity,
        requester: &Rc<LoadedModule>,
    ) -> Option<Rc<LoadedModule>> {
        let mut current = Rc::clone(requester);
        loop {
            let parent_name = current.back_reference()?.to_string();
            let Some(parent) = resolver.host().module(&parent_name) else {
                debug!("back-referenced module {} is not loaded", parent_name);
                return None;
            };

            info!(
                "request for {} from {} is retried against {}",
                request, current.name(), parent_name
            );
            match resolver.resolve_direct(request, &parent) {
                Ok(Some(module)) => {
                    info!(
                        "request for {} from {} is found in {}",
                        request, current.name(), parent_name
                    );
                    return Some(module);
                }
                Ok(None) => current = parent,
                Err(e) => {
                    info!("request for {} failed to load because {}", request, e);
                    return None;
                }
            }
        }
    }
}
