//! Identity rewriting for materialization.
//!
//! Dependencies loaded from embedded resources must not collide with
//! identities already present in the host, so the declared name is prefixed
//! with a process-unique tag before loading, and the resolving requester is
//! recorded as provenance metadata. Both edits are pure transforms of the
//! descriptor value.

use crate::descriptor::ModuleDescriptor;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

static LAST_TICK: AtomicI64 = AtomicI64::new(0);

/// A process-unique, strictly increasing tick.
///
/// Based on the wall clock in nanoseconds, pushed forward by one when two
/// calls land on the same instant.
pub fn unique_tick() -> i64 {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut prev = LAST_TICK.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_TICK.compare_exchange(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => prev = observed,
        }
    }
}

/// Prefix the declared name with a `<modnest_{tick}>` tag.
pub fn tag_identity(mut descriptor: ModuleDescriptor, tick: i64) -> ModuleDescriptor {
    descriptor.identity.name = format!("<modnest_{}>{}", tick, descriptor.identity.name);
    descriptor
}

/// Rewrite a descriptor for materialization by a requester.
///
/// The declared name gains a unique tag and the requester's name is injected
/// as the back-reference. A back-reference that is already present is never
/// overwritten.
pub fn decorate(descriptor: ModuleDescriptor, requester: &str, tick: i64) -> ModuleDescriptor {
    let mut descriptor = tag_identity(descriptor, tick);
    match &descriptor.resolved_by {
        None => descriptor.resolved_by = Some(requester.to_string()),
        Some(existing) => debug!(
            "module {} already records {} as its resolver",
            descriptor.identity, existing
        ),
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ModuleIdentity;

    #[test]
    fn test_ticks_are_strictly_increasing() {
        let a = unique_tick();
        let b = unique_tick();
        let c = unique_tick();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_decorate_tags_name_and_records_requester() {
        let descriptor = ModuleDescriptor::new(ModuleIdentity::named("Foo"));
        let decorated = decorate(descriptor, "Parent", 7);

        assert_eq!(decorated.identity.name, "<modnest_7>Foo");
        assert_eq!(decorated.identity.undecorated_name(), "Foo");
        assert_eq!(decorated.resolved_by.as_deref(), Some("Parent"));
    }

    #[test]
    fn test_existing_back_reference_is_kept() {
        let mut descriptor = ModuleDescriptor::new(ModuleIdentity::named("Foo"));
        descriptor.resolved_by = Some("Original".to_string());

        let decorated = decorate(descriptor, "Imposter", 8);
        assert_eq!(decorated.resolved_by.as_deref(), Some("Original"));
    }

    #[test]
    fn test_tag_identity_leaves_back_reference_alone() {
        let descriptor = ModuleDescriptor::new(ModuleIdentity::named("Foo"));
        let tagged = tag_identity(descriptor, 9);
        assert_eq!(tagged.identity.name, "<modnest_9>Foo");
        assert_eq!(tagged.resolved_by, None);
    }
}
