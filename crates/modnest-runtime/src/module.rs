//! Materialized modules.
//!
//! A `LoadedModule` is the immutable form a descriptor takes once it has
//! been loaded into a host. Handles to it are shared (`Rc`), so the
//! metadata can no longer be edited; any rewriting must happen on the
//! descriptor before materialization.

use crate::descriptor::{EmbeddedResource, ModuleDescriptor, TypeDecl};
use crate::embed::EmbedConfig;
use crate::identity::ModuleIdentity;

/// An immutable, materialized module.
#[derive(Debug)]
pub struct LoadedModule {
    identity: ModuleIdentity,
    resolved_by: Option<String>,
    embed: Option<EmbedConfig>,
    resources: Vec<EmbeddedResource>,
    types: Vec<TypeDecl>,
}

impl LoadedModule {
    /// Consume a descriptor and produce its materialized form.
    pub fn materialize(descriptor: ModuleDescriptor) -> Self {
        Self {
            identity: descriptor.identity,
            resolved_by: descriptor.resolved_by,
            embed: descriptor.embed,
            resources: descriptor.resources,
            types: descriptor.types,
        }
    }

    /// The module's identity.
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// The module's current name.
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Name of the module that resolved this one, if it was materialized
    /// through dependency resolution.
    pub fn back_reference(&self) -> Option<&str> {
        self.resolved_by.as_deref()
    }

    /// The embed configuration, if any.
    pub fn embed(&self) -> Option<&EmbedConfig> {
        self.embed.as_ref()
    }

    /// Names of embedded resources, in declaration order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.name.as_str())
    }

    /// Look up an embedded resource's bytes by name.
    pub fn resource(&self, name: &str) -> Option<&[u8]> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.data.as_slice())
    }

    /// Check whether a resource with the given name exists.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.iter().any(|r| r.name == name)
    }

    /// Public types declared by the module.
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }
}
