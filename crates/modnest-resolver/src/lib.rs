//! # modnest-resolver
//!
//! Embedded-module dependency resolution for Modnest.
//!
//! This crate provides:
//! - The resolution hook and pipeline (`DependencyResolver`)
//! - Resource location inside a requester's embedded resources
//! - The resolution cache (one materialization per requested name)
//! - Transitive fallback through back-reference chains
//! - Plugin discovery and lifecycle management
//!
//! ## Control Flow
//!
//! The host signals "module X requested by module Y"; the resolver checks
//! its cache, searches Y's eligible embedded resources, rewrites the
//! candidate's identity, materializes it into the host, scans it for
//! plugins, records the resolution, and returns the handle. When Y has no
//! candidate, fallback handlers run in order; the default chain walker
//! retries against the module that resolved Y, transitively.
//!
//! The whole pipeline runs synchronously inside the host's dispatch call;
//! only plugin activation is deferred, by one tick of the host's activation
//! queue.

pub mod cache;
pub mod chain;
pub mod error;
pub mod locate;
pub mod manager;
pub mod resolver;

pub use cache::{ResolutionCache, ResolvedDependency};
pub use chain::{ChainWalker, FallbackHandler};
pub use error::{ResolveError, ResolveResult};
pub use locate::locate_resource;
pub use manager::{PluginHandle, PluginManager, TypeInspectFailure};
pub use resolver::DependencyResolver;
