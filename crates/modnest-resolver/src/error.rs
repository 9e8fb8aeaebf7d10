//! Error types for the resolver.

use modnest_plugin_api::PluginError;
use modnest_runtime::RuntimeError;
use thiserror::Error;

/// Errors that can occur inside the resolution pipeline.
///
/// None of these cross the resolution hook boundary: every attempt converts
/// its failure into a log entry plus a negative result.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A name was resolved twice within one resolver lifetime.
    #[error("request {0} is already tracked in the request map")]
    AlreadyResolved(String),

    /// An explicit map entry pointed at a resource that does not exist.
    #[error("mapped resource {resource} for request {requested} is missing from {requester}")]
    MappedResourceMissing {
        requested: String,
        resource: String,
        requester: String,
    },

    /// Module metadata error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Plugin registration error.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Result type for resolution operations.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
