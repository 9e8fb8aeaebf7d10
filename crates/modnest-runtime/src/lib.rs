//! # modnest-runtime
//!
//! Module metadata runtime for Modnest.
//!
//! This crate provides:
//! - The `.mnm` module container format and descriptor parsing
//! - Module identities and request-string parsing
//! - Embed configuration (resource allowlist and explicit lookup map)
//! - Pre-load identity rewriting with provenance injection
//!
//! ## Module Structure
//!
//! A module container is a magic prefix followed by a JSON body describing
//! the module's identity, its embedded resources (which may themselves be
//! module containers), and its declared public types.

pub mod descriptor;
pub mod embed;
pub mod error;
pub mod identity;
pub mod module;
pub mod rewrite;

pub use descriptor::{EmbeddedResource, ModuleDescriptor, PluginDecl, TypeDecl, MODULE_EXTENSION};
pub use embed::EmbedConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use identity::ModuleIdentity;
pub use module::LoadedModule;
