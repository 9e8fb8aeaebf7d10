//! Embed configuration.
//!
//! A module that bundles dependency modules as embedded resources declares an
//! `EmbedConfig` in its descriptor. The configuration is attached once at
//! build time and controls which resources are eligible dependency sources
//! and how to find them without scanning every resource.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Declares which embedded resources may be used to satisfy dependency
/// requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Optional allowlist of resource names. When present, only the listed
    /// resources are considered; when absent, every resource is eligible.
    #[serde(default)]
    pub include_resources: Option<HashSet<String>>,

    /// Optional explicit lookup map, one `"requestedName:resourceName"` line
    /// per entry.
    #[serde(default)]
    pub resource_map: Option<Vec<String>>,
}

impl EmbedConfig {
    /// Configuration with every resource eligible and no explicit map.
    pub fn open() -> Self {
        Self::default()
    }

    /// Check whether a resource passes the allowlist filter.
    pub fn allows(&self, resource: &str) -> bool {
        match &self.include_resources {
            Some(included) => included.contains(resource),
            None => true,
        }
    }

    /// Parse the explicit `requestedName -> resourceName` map.
    ///
    /// A line without exactly one `:` separator invalidates the whole map:
    /// the error is logged and the map is treated as absent.
    pub fn parsed_map(&self) -> Option<HashMap<String, String>> {
        let lines = self.resource_map.as_ref()?;

        let mut map = HashMap::new();
        for line in lines {
            match line.split_once(':') {
                Some((requested, resource)) if !resource.contains(':') => {
                    map.insert(requested.to_string(), resource.to_string());
                }
                _ => {
                    warn!("ignoring resource map with invalid entry {:?}", line);
                    return None;
                }
            }
        }
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_map(lines: &[&str]) -> EmbedConfig {
        EmbedConfig {
            include_resources: None,
            resource_map: Some(lines.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_no_allowlist_allows_everything() {
        let config = EmbedConfig::open();
        assert!(config.allows("anything.mnm"));
    }

    #[test]
    fn test_allowlist_filters() {
        let config = EmbedConfig {
            include_resources: Some(["Foo.mnm".to_string()].into_iter().collect()),
            resource_map: None,
        };
        assert!(config.allows("Foo.mnm"));
        assert!(!config.allows("Bar.mnm"));
    }

    #[test]
    fn test_parsed_map() {
        let config = config_with_map(&["Foo:Foo.mnm", "Bar:nested/Bar.mnm"]);
        let map = config.parsed_map().unwrap();
        assert_eq!(map.get("Foo").map(String::as_str), Some("Foo.mnm"));
        assert_eq!(map.get("Bar").map(String::as_str), Some("nested/Bar.mnm"));
    }

    #[test]
    fn test_map_line_without_separator_invalidates_whole_map() {
        let config = config_with_map(&["Foo:Foo.mnm", "Bar"]);
        assert!(config.parsed_map().is_none());
    }

    #[test]
    fn test_map_line_with_two_separators_invalidates_whole_map() {
        let config = config_with_map(&["Foo:Foo.mnm", "Bar:a:b"]);
        assert!(config.parsed_map().is_none());
    }

    #[test]
    fn test_absent_map() {
        let config = EmbedConfig::open();
        assert!(config.parsed_map().is_none());
    }
}
