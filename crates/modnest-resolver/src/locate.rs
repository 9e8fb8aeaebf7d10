//! Embedded-resource location.
//!
//! Given a requester's embed configuration and a requested identity, find
//! the one resource name that should satisfy the request. The strategy order
//! is fixed, first success wins:
//!
//! 1. Explicit map hit: trusted; a mapped resource that does not exist is a
//!    resolution failure for this requester, not a fallthrough.
//! 2. Literal-name fast path: a resource named `<requestedName>.mnm` among
//!    the eligible resources is used without parsing anything.
//! 3. Scan: parse each eligible resource in declaration order and compare
//!    its declared name to the request, ignoring case. Unparseable resources
//!    are logged and skipped; name mismatches are skipped silently.

use crate::error::{ResolveError, ResolveResult};
use modnest_runtime::{LoadedModule, ModuleDescriptor, ModuleIdentity, MODULE_EXTENSION};
use tracing::warn;

/// Find the resource in `requester` that should satisfy `request`.
///
/// Returns `Ok(None)` when the requester declares no eligible candidate.
pub fn locate_resource(
    requester: &LoadedModule,
    request: &ModuleIdentity,
) -> ResolveResult<Option<String>> {
    if requester.resource_names().next().is_none() {
        return Ok(None);
    }
    let Some(embed) = requester.embed() else {
        return Ok(None);
    };

    if let Some(map) = embed.parsed_map() {
        if let Some(resource) = map.get(&request.name) {
            if requester.has_resource(resource) {
                return Ok(Some(resource.clone()));
            }
            return Err(ResolveError::MappedResourceMissing {
                requested: request.name.clone(),
                resource: resource.clone(),
                requester: requester.name().to_string(),
            });
        }
    }

    let literal = format!("{}.{}", request.name, MODULE_EXTENSION);
    if embed.allows(&literal) && requester.has_resource(&literal) {
        return Ok(Some(literal));
    }

    for name in requester.resource_names().filter(|n| embed.allows(n)) {
        let Some(bytes) = requester.resource(name) else {
            continue;
        };
        match ModuleDescriptor::parse(bytes) {
            Ok(descriptor) if request.matches_name(&descriptor.identity.name) => {
                return Ok(Some(name.to_string()));
            }
            Ok(_) => {}
            Err(e) => warn!("skipping {} because {}", name, e),
        }
    }

    Ok(None)
}
