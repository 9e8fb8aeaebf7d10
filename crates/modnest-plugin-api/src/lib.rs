//! # modnest-plugin-api
//!
//! Plugin contract and host surface for Modnest.
//!
//! This crate provides:
//! - The plugin contract and metadata extraction from declared types
//! - The host-owned plugin directory (authoritative GUID map)
//! - The deferred activation queue
//! - The host context: loaded-module table and resolve-handler dispatch
//!
//! Everything here runs on one logical thread; the types are not `Send`,
//! and triggering resolution from multiple threads is outside the contract.

pub mod directory;
pub mod error;
pub mod host;
pub mod plugin;
pub mod scheduler;

pub use directory::{PluginDirectory, PluginRegistration};
pub use error::{PluginError, PluginResult};
pub use host::{HandlerId, HostContext, ResolveHandler};
pub use plugin::{is_plugin_type, PluginInstance, PluginMetadata, PLUGIN_CONTRACT};
pub use scheduler::ActivationQueue;
