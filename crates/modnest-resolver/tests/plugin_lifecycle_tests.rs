//! Integration tests for plugin discovery and lifecycle.
//!
//! These tests cover the full path from resolution to activation:
//! - Discovery of plugin-contract types in resolved modules
//! - Deferred activation through the host's queue
//! - GUID uniqueness against the host's plugin directory
//! - Unload by GUID and bulk teardown
//! - Activation failure rollback


use fixtures::{descriptor, embed, embedding_descriptor, plugin_type};
use modnest_plugin_api::HostContext;
use modnest_resolver::DependencyResolver;
use modnest_runtime::LoadedModule;
use tempfile::TempDir;

#[test]
fn test_plugins_in_a_resolved_module_are_activated_one_tick_later() {
    let mut foo = descriptor("Foo");
    foo.types.push(plugin_type("Foo.Widget", "foo.widget"));

    let mut root = embedding_descriptor("Root");
    embed(&mut root, "Foo.mnm", &foo);

    let host = HostContext::new();
    let root = host.insert_module(LoadedModule::materialize(root)).unwrap();
    let resolver = DependencyResolver::attach(&host);

    host.resolve_missing("Foo", Some(&root)).unwrap();

    // The record exists as soon as resolution returns; the directory entry
    // and the attached component appear after the queue is drained.
    let plugins = resolver.cache().get("Foo").unwrap().plugins.clone();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].guid(), "foo.widget");
    assert!(!host.directory().contains("foo.widget"));
    assert_eq!(host.component_count(), 0);

    assert_eq!(host.run_pending(), 1);
    assert!(host.directory().contains("foo.widget"));
    assert!(host
        .directory()
        .get("foo.widget")
        .unwrap()
        .instance
        .is_some());
    assert_eq!(host.component_count(), 1);
}

#[test]
fn test_duplicate_guid_registers_exactly_once() {
    let mut foo = descriptor("Foo");
    foo.types.push(plugin_type("Foo.First", "G1"));
    foo.types.push(plugin_type("Foo.Second", "G1"));

    let mut root = embedding_descriptor("Root");
    embed(&mut root, "Foo.mnm", &foo);

    let host = HostContext::new();
    let root = host.insert_module(LoadedModule::materialize(root)).unwrap();
    let resolver = DependencyResolver::attach(&host);

    host.resolve_missing("Foo", Some(&root)).unwrap();
    host.run_pending();

    let plugins = resolver.cache().get("Foo").unwrap().plugins.clone();
    assert_eq!(plugins.len(), 1);
    assert!(host.directory().contains("G1"));
    assert_eq!(host.directory().len(), 1);
    assert_eq!(
        host.directory().get("G1").unwrap().metadata.name,
        "Foo.First"
    );
}

#[test]
fn test_unload_removes_record_and_directory_entry() {
    let mut foo = descriptor("Foo");
    foo.types.push(plugin_type("Foo.Widget", "G1"));

    let mut root = embedding_descriptor("Root");
    embed(&mut root, "Foo.mnm", &foo);

    let host = HostContext::new();
    let root = host.insert_module(LoadedModule::materialize(root)).unwrap();
    let resolver = DependencyResolver::attach(&host);

    host.resolve_missing("Foo", Some(&root)).unwrap();
    host.run_pending();
    assert!(host.directory().contains("G1"));

    let plugins = resolver.cache().get("Foo").unwrap().plugins.clone();
    assert!(plugins[0].unload());

    assert!(resolver.manager().live_guids().is_empty());
    assert!(!host.directory().contains("G1"));

    // Unloading again still reports success.
    assert!(plugins[0].unload());
}

#[test]
fn test_activation_failure_rolls_back_only_that_plugin() {
    let mut foo = descriptor("Foo");
    let mut broken = plugin_type("Foo.Broken", "foo.broken");
    broken.abstract_type = true;
    foo.types.push(broken);
    foo.types.push(plugin_type("Foo.Widget", "foo.widget"));

    let mut root = embedding_descriptor("Root");
    embed(&mut root, "Foo.mnm", &foo);

    let host = HostContext::new();
    let root = host.insert_module(LoadedModule::materialize(root)).unwrap();
    let _resolver = DependencyResolver::attach(&host);

    host.resolve_missing("Foo", Some(&root)).unwrap();
    assert_eq!(host.run_pending(), 2);

    // The abstract type's registration was rolled back; its sibling is
    // unaffected.
    assert!(!host.directory().contains("foo.broken"));
    assert!(host.directory().contains("foo.widget"));
    assert_eq!(host.component_count(), 1);
}

#[test]
fn test_type_inspection_failure_skips_only_that_type() {
    let mut foo = descriptor("Foo");
    let mut needy = plugin_type("Foo.Needy", "foo.needy");
    needy.requires = vec!["Absent".to_string()];
    foo.types.push(needy);
    foo.types.push(plugin_type("Foo.Widget", "foo.widget"));

    let mut root = embedding_descriptor("Root");
    embed(&mut root, "Foo.mnm", &foo);

    let host = HostContext::new();
    let root = host.insert_module(LoadedModule::materialize(root)).unwrap();
    let resolver = DependencyResolver::attach(&host);

    host.resolve_missing("Foo", Some(&root)).unwrap();
    host.run_pending();

    let plugins = resolver.cache().get("Foo").unwrap().plugins.clone();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].guid(), "foo.widget");
    assert!(!host.directory().contains("foo.needy"));
}

#[test]
fn test_detach_unloads_every_discovered_plugin() {
    let mut foo = descriptor("Foo");
    foo.types.push(plugin_type("Foo.Widget", "G1"));

    let mut root = embedding_descriptor("Root");
    embed(&mut root, "Foo.mnm", &foo);

    let host = HostContext::new();
    let root = host.insert_module(LoadedModule::materialize(root)).unwrap();
    let resolver = DependencyResolver::attach(&host);

    host.resolve_missing("Foo", Some(&root)).unwrap();
    host.run_pending();
    assert!(host.directory().contains("G1"));

    resolver.detach();
    assert!(!host.directory().contains("G1"));
}

#[test]
fn test_load_plugins_from_a_module_file() {
    let mut foo = descriptor("Foo");
    foo.types.push(plugin_type("Foo.Widget", "foo.widget"));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Foo.mnm");
    std::fs::write(&path, foo.encode().unwrap()).unwrap();

    let host = HostContext::new();
    let resolver = DependencyResolver::attach(&host);

    let handles = resolver.manager().load_plugins_from_file(&path).unwrap();
    assert_eq!(handles.len(), 1);

    // The side-loaded module was materialized under a rewritten name.
    assert_eq!(host.module_count(), 1);
    assert!(host.is_loaded("Foo"));
    assert!(host.module("Foo").is_none());

    host.run_pending();
    assert!(host.directory().contains("foo.widget"));
}
