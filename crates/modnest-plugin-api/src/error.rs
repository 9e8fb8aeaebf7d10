//! Error types for the plugin API.

use thiserror::Error;

/// Errors that can occur while registering or constructing plugins.
#[derive(Error, Debug)]
pub enum PluginError {
    /// A type satisfies the plugin contract but carries no usable metadata.
    #[error("cannot get plugin metadata from type {0}")]
    MissingMetadata(String),

    /// A plugin with the same GUID is already registered.
    #[error("a plugin with GUID {0} is already registered")]
    GuidCollision(String),

    /// A module with the same name is already loaded in the host.
    #[error("a module named {0} is already loaded")]
    ModuleCollision(String),

    /// A plugin instance could not be constructed.
    #[error("failed to construct plugin {guid}: {reason}")]
    ConstructionFailed { guid: String, reason: String },
}

/// Result type for plugin operations.
pub type PluginResult<T> = std::result::Result<T, PluginError>;
