//! C5 — Router / ResourcePath: map a URL against the resource tree,
//! per §4.5.

use crate::error::{Error, Result};
use crate::index::Index;
use crate::item::ItemId;
use crate::resource::{coerce_id, Resource};
use std::collections::HashMap;

/// One level of a matched path: which resource, which field links it to
/// its parent, and the coerced id value.
pub struct ResourcePathComponent<'a> {
    pub resource_name: String,
    pub parent_link_field: Option<String>,
    pub value: ItemId,
    pub resource: &'a Resource,
}

/// The ordered path produced by routing a URL against the Index.
pub struct ResourcePath<'a> {
    pub components: Vec<ResourcePathComponent<'a>>,
    /// The resource ultimately targeted (the last path segment, or the
    /// collection resource itself for collection-level requests).
    pub target: &'a Resource,
    /// `Some` when the URL ends in an item id (`GET /foo/{id}`);
    /// `None` for collection-level requests (`GET /foo`).
    pub item_id: Option<ItemId>,
}

impl<'a> ResourcePath<'a> {
    /// Union of `{parent-link-field → value}` across every matched
    /// level, deepest segment winning on collision (§4.5).
    pub fn values(&self) -> HashMap<String, ItemId> {
        let mut out = HashMap::new();
        for component in &self.components {
            if let Some(field) = &component.parent_link_field {
                out.insert(field.clone(), component.value.clone());
            }
        }
        out
    }
}

/// Route a URL path (already split on `/`, with empty segments removed)
/// against the Index.
///
/// Accepts segments of the form `r1/id1/r2/id2/.../rN[/idN]`. An odd
/// trailing resource segment with no id is a collection-level request;
/// a non-coercible id, or an unknown resource name, is a 404.
pub fn route<'a>(index: &'a Index, segments: &[&str]) -> Result<ResourcePath<'a>> {
    if segments.is_empty() {
        return Err(Error::NotFound("empty path".into()));
    }

    let mut components = Vec::new();
    let mut current_resource: Option<&Resource> = None;
    // The id consumed by the previous level, which is what *this* level's
    // `parent_link_field` (if any) must equal — not this level's own id.
    let mut pending_parent_id: Option<ItemId> = None;
    let mut item_id = None;
    let mut i = 0;

    while i < segments.len() {
        let name = segments[i];
        let resource = match current_resource {
            None => index.get(name),
            Some(parent) => parent.get_child(name),
        }
        .ok_or_else(|| Error::NotFound(format!("unknown resource segment {:?}", name)))?;

        i += 1;
        item_id = None;

        // Register this resource's link to its parent as soon as the
        // parent's id is known, whether or not this resource also carries
        // its own id segment: a collection-level sub-resource request
        // (`GET /parent/{p}/child`) must constrain just as much as an
        // item-level one (`GET /parent/{p}/child/{c}`).
        if let Some(parent_field) = &resource.parent_field_name {
            if let Some(parent_id) = &pending_parent_id {
                components.push(ResourcePathComponent {
                    resource_name: resource.name.clone(),
                    parent_link_field: Some(parent_field.clone()),
                    value: parent_id.clone(),
                    resource,
                });
            }
        }

        if i < segments.len() {
            let raw_id = segments[i];
            let coerced = coerce_id(resource, raw_id).ok_or_else(|| Error::NotFound("invalid id".into()))?;
            item_id = Some(coerced.clone());
            pending_parent_id = Some(coerced);
            i += 1;
        } else {
            pending_parent_id = None;
        }

        current_resource = Some(resource);
    }

    let target = current_resource.ok_or_else(|| Error::NotFound("unknown resource".into()))?;

    Ok(ResourcePath {
        components,
        target,
        item_id,
    })
}
