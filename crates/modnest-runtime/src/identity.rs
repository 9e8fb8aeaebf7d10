//! Module identities.
//!
//! An identity is the `{name, version, public-key token}` tuple a module is
//! requested and registered under. Identities are parsed either from a
//! request string (`"Name"` or `"Name, Version=1.2.3, PublicKeyToken=abc"`)
//! or taken from a module descriptor.

use crate::error::{RuntimeError, RuntimeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a module for resolution purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleIdentity {
    /// Module name. May carry a `<...>` rewrite tag once materialized.
    pub name: String,

    /// Version string, if declared.
    #[serde(default)]
    pub version: Option<String>,

    /// Public-key token, if declared.
    #[serde(default)]
    pub public_key_token: Option<String>,
}

impl ModuleIdentity {
    /// Create an identity from a bare name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            public_key_token: None,
        }
    }

    /// Parse an identity from a request string.
    ///
    /// Accepts a bare name or a comma-separated display form such as
    /// `"Foo, Version=1.2.3, PublicKeyToken=abcdef"`. Unknown `Key=Value`
    /// fields are ignored.
    pub fn parse(request: &str) -> RuntimeResult<Self> {
        let mut parts = request.split(',');

        let name = parts
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RuntimeError::InvalidIdentity(request.to_string()))?;

        let mut identity = Self::named(name);
        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "Version" => identity.version = Some(value.trim().to_string()),
                "PublicKeyToken" => identity.public_key_token = Some(value.trim().to_string()),
                _ => {}
            }
        }
        Ok(identity)
    }

    /// Compare a declared name against this identity's name, ignoring case.
    pub fn matches_name(&self, declared: &str) -> bool {
        self.name.eq_ignore_ascii_case(declared)
    }

    /// The name with a single leading `<...>` rewrite tag stripped.
    ///
    /// Materialized dependencies carry a decorated name; this recovers the
    /// name they were originally requested under.
    pub fn undecorated_name(&self) -> &str {
        if let Some(rest) = self.name.strip_prefix('<') {
            if let Some((_, undecorated)) = rest.split_once('>') {
                return undecorated;
            }
        }
        &self.name
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, ", Version={}", version)?;
        }
        if let Some(token) = &self.public_key_token {
            write!(f, ", PublicKeyToken={}", token)?;
        }
        Ok(())
    }
}

impl FromStr for ModuleIdentity {
    type Err = RuntimeError;

    fn from_str(s: &str) -> RuntimeResult<Self> {
        Self::parse(s)
    }
}
