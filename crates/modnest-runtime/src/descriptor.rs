//! Module descriptors and the binary module container.
//!
//! A descriptor is the editable, pre-load representation of a module: its
//! identity, provenance metadata, embedded resources, and declared types.
//! The container format (`.mnm`) is a 4-byte magic followed by a JSON body:
//!
//! ```text
//! +----------------+
//! | Magic (4 bytes)|  "MNM\x01" (version 1)
//! +----------------+
//! | JSON body      |
//! +----------------+
//! ```
//!
//! A body without the magic prefix is also accepted when it parses as plain
//! JSON, which keeps hand-written development modules loadable.

use crate::embed::EmbedConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::identity::ModuleIdentity;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Magic bytes for Modnest module containers.
pub const MAGIC: &[u8; 4] = b"MNM\x01";

/// File extension for module containers, without the dot.
pub const MODULE_EXTENSION: &str = "mnm";

/// Editable, pre-load representation of a module.
///
/// A descriptor is exclusively owned for the duration of one resolution
/// attempt; since it is a plain value, it is released on every exit path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Declared identity.
    pub identity: ModuleIdentity,

    /// Name of the module that resolved this one, injected at most once at
    /// materialization time.
    #[serde(default)]
    pub resolved_by: Option<String>,

    /// Embed configuration, if this module bundles dependency modules.
    #[serde(default)]
    pub embed: Option<EmbedConfig>,

    /// Embedded resources, in declaration order.
    #[serde(default)]
    pub resources: Vec<EmbeddedResource>,

    /// Public types declared by the module.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// A named binary blob bundled inside a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedResource {
    /// Resource name, unique within the module.
    pub name: String,

    /// Raw resource bytes.
    pub data: Vec<u8>,
}

/// A public type declared by a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully qualified type name.
    pub full_name: String,

    /// Base capabilities the type exposes.
    #[serde(default)]
    pub implements: Vec<String>,

    /// Module names the type needs loaded before it can be inspected.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Whether the type is abstract. Abstract types can be enumerated but
    /// not constructed.
    #[serde(default)]
    pub abstract_type: bool,

    /// Static plugin metadata, if the type carries any.
    #[serde(default)]
    pub plugin: Option<PluginDecl>,
}

/// Static identifying metadata a plugin type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDecl {
    /// Globally unique plugin identifier.
    pub guid: String,

    /// Human-readable name.
    pub name: String,

    /// Version string.
    pub version: String,
}

impl ModuleDescriptor {
    /// Create an empty descriptor with the given identity.
    pub fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            resolved_by: None,
            embed: None,
            resources: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Parse a descriptor from container bytes.
    pub fn parse(bytes: &[u8]) -> RuntimeResult<Self> {
        if bytes.is_empty() {
            return Err(RuntimeError::MalformedModule(
                "resource is empty".to_string(),
            ));
        }

        let body = match bytes.strip_prefix(MAGIC.as_slice()) {
            Some(body) => body,
            // Development format: a bare JSON body without the magic.
            None => bytes,
        };

        let descriptor: ModuleDescriptor = serde_json::from_slice(body)
            .map_err(|e| RuntimeError::MalformedModule(format!("undecodable body: {}", e)))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Load a descriptor from a container file.
    pub fn from_file(path: &Path) -> RuntimeResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Encode the descriptor into container bytes.
    pub fn encode(&self) -> RuntimeResult<Vec<u8>> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend(serde_json::to_vec(self)?);
        Ok(bytes)
    }

    /// Look up an embedded resource by name.
    pub fn resource(&self, name: &str) -> Option<&EmbeddedResource> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Names of embedded resources, in declaration order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.name.as_str())
    }

    fn validate(&self) -> RuntimeResult<()> {
        if self.identity.name.is_empty() {
            return Err(RuntimeError::MalformedModule(
                "module name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
