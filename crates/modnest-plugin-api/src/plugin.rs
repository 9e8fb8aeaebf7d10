//! Plugin contract and constructed plugin instances.
//!
//! A declared type is plugin-eligible when it exposes the plugin base
//! capability and carries static identifying metadata. Construction happens
//! later, on the host's deferred activation queue.

use crate::error::{PluginError, PluginResult};
use modnest_runtime::{LoadedModule, TypeDecl};
use std::rc::Rc;

/// Base capability a type must expose to be discoverable as a plugin.
pub const PLUGIN_CONTRACT: &str = "modnest.Plugin";

/// Check whether a declared type satisfies the plugin contract.
pub fn is_plugin_type(decl: &TypeDecl) -> bool {
    decl.implements.iter().any(|c| c == PLUGIN_CONTRACT)
}

/// Identifying metadata extracted from a plugin type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    /// Globally unique plugin identifier.
    pub guid: String,

    /// Human-readable name.
    pub name: String,

    /// Version string.
    pub version: String,
}

impl PluginMetadata {
    /// Extract metadata from a declared type.
    ///
    /// Fails when the type declares no metadata or an empty GUID; the
    /// failure is fatal only for that one type.
    pub fn from_type(decl: &TypeDecl) -> PluginResult<Self> {
        let plugin = decl
            .plugin
            .as_ref()
            .ok_or_else(|| PluginError::MissingMetadata(decl.full_name.clone()))?;
        if plugin.guid.is_empty() {
            return Err(PluginError::MissingMetadata(decl.full_name.clone()));
        }
        Ok(Self {
            guid: plugin.guid.clone(),
            name: plugin.name.clone(),
            version: plugin.version.clone(),
        })
    }
}

/// A constructed plugin component, attached to the host's container.
#[derive(Debug)]
pub struct PluginInstance {
    metadata: PluginMetadata,
    type_name: String,
    module: Rc<LoadedModule>,
}

impl PluginInstance {
    /// Construct a plugin instance from its declared type.
    ///
    /// Construction fails for abstract types; the caller is expected to
    /// roll back any registration it made for this instance.
    pub fn construct(
        decl: &TypeDecl,
        metadata: PluginMetadata,
        module: Rc<LoadedModule>,
    ) -> PluginResult<Self> {
        if decl.abstract_type {
            return Err(PluginError::ConstructionFailed {
                guid: metadata.guid,
                reason: format!("type {} is abstract", decl.full_name),
            });
        }
        Ok(Self {
            metadata,
            type_name: decl.full_name.clone(),
            module,
        })
    }

    /// The instance's identifying metadata.
    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    /// Fully qualified name of the type the instance was constructed from.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The module the instance lives in.
    pub fn module(&self) -> &Rc<LoadedModule> {
        &self.module
    }
}
