//! End-to-end walkthrough of embedded-module resolution.
//!
//! Builds a parent module that bundles a dependency (which itself bundles
//! nothing) plus a second dependency holding a plugin, then drives the
//! resolver through the host's notification channel.
//!
//! Run with: cargo run --package modnest-resolver --example embedded_chain

use modnest_plugin_api::HostContext;
use modnest_resolver::DependencyResolver;
use modnest_runtime::{
    EmbedConfig, EmbeddedResource, LoadedModule, ModuleDescriptor, ModuleIdentity, PluginDecl,
    TypeDecl,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // A dependency that carries one plugin type.
    let mut gadgets = ModuleDescriptor::new(ModuleIdentity::named("Gadgets"));
    gadgets.types.push(TypeDecl {
        full_name: "Gadgets.Sprocket".to_string(),
        implements: vec![modnest_plugin_api::PLUGIN_CONTRACT.to_string()],
        requires: vec![],
        abstract_type: false,
        plugin: Some(PluginDecl {
            guid: "demo.gadgets.sprocket".to_string(),
            name: "Sprocket".to_string(),
            version: "1.0.0".to_string(),
        }),
    });

    // A helper with no resources of its own; requests from it will have to
    // climb the back-reference chain.
    let helper = ModuleDescriptor::new(ModuleIdentity::named("Helper"));

    // The parent bundles both.
    let mut parent = ModuleDescriptor::new(ModuleIdentity::named("Parent"));
    parent.embed = Some(EmbedConfig::open());
    for (name, inner) in [("Helper.mnm", &helper), ("Gadgets.mnm", &gadgets)] {
        parent.resources.push(EmbeddedResource {
            name: name.to_string(),
            data: inner.encode().expect("descriptor encodes"),
        });
    }

    let host = HostContext::new();
    let parent = host
        .insert_module(LoadedModule::materialize(parent))
        .expect("parent module loads");
    let resolver = DependencyResolver::attach(&host);

    // Direct resolution from the parent's resources.
    let helper = host
        .resolve_missing("Helper", Some(&parent))
        .expect("Helper resolves from Parent");
    println!(
        "Helper materialized as {} (resolved by {})",
        helper.name(),
        helper.back_reference().unwrap_or("nobody")
    );

    // Helper has nothing embedded; the chain walker retries against Parent.
    let gadgets = host
        .resolve_missing("Gadgets", Some(&helper))
        .expect("Gadgets resolves via the back-reference chain");
    println!("Gadgets materialized as {}", gadgets.name());

    // Activation runs one tick later, once the host drains its queue.
    println!(
        "before the tick: {} directory entries",
        host.directory().len()
    );
    host.run_pending();
    println!(
        "after the tick:  {} directory entries, {} component(s)",
        host.directory().len(),
        host.component_count()
    );

    let plugins = resolver
        .cache()
        .get("Gadgets")
        .map(|entry| entry.plugins.clone())
        .unwrap_or_default();
    for plugin in &plugins {
        println!("unloading {} -> {}", plugin.guid(), plugin.unload());
    }

    resolver.detach();
    println!("resolver detached, directory is empty: {}", host.directory().is_empty());
}
