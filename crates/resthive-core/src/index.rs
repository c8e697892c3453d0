//! C4 — `Index`: the root set of resources, plus the `ReferenceChecker`
//! view used by validators, per §3/§4.4.

use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::schema::{ReferenceChecker, ReferencePath, Validator};
use serde_json::Value;

/// Root of the resource tree. Frozen once built (§5: "All Index
/// structures are frozen once the first request is served").
pub struct Index {
    resources: Vec<Resource>,
}

impl Index {
    pub fn new() -> Self {
        Self { resources: Vec::new() }
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Top-level resources, in insertion order (§4.4: "`GetResources()`
    /// enumerates in insertion order for stable OpenAPI output").
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Resolve a dotted resource path (`foo.sub`) to a `Resource`.
    pub fn get_path(&self, dotted: &str) -> Option<&Resource> {
        let mut segments = dotted.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.get_child(segment)?;
        }
        Some(current)
    }

    /// Validate that every `Reference` field's target resolves in this
    /// Index, failing fast at bind time (§3's invariant). Call once
    /// after the tree is fully constructed.
    pub fn bind(&self) -> Result<()> {
        for resource in &self.resources {
            bind_resource(self, resource)?;
        }
        Ok(())
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

fn bind_resource(index: &Index, resource: &Resource) -> Result<()> {
    for (name, field) in resource.schema.fields() {
        if let Validator::Reference { target } = &field.validator {
            if index.get_path(&target.0).is_none() {
                return Err(Error::Internal(format!(
                    "resource {:?}: field {:?} references unknown resource path {:?}",
                    resource.name, name, target.0
                )));
            }
        }
    }
    if let Some(parent_field) = &resource.parent_field_name {
        match resource.schema.get(parent_field) {
            Some(field) if matches!(field.validator, Validator::Reference { .. }) => {}
            _ => {
                return Err(Error::Internal(format!(
                    "resource {:?}: parent-field-name {:?} must have a Reference validator",
                    resource.name, parent_field
                )));
            }
        }
    }
    for child in &resource.children {
        bind_resource(index, child)?;
    }
    Ok(())
}

impl ReferenceChecker for Index {
    fn exists(&self, target: &ReferencePath, id: &Value) -> bool {
        let Some(resource) = self.get_path(&target.0) else {
            return false;
        };
        // Existence is checked synchronously against the in-memory form
        // only when the storer supports it cheaply; backends that must
        // hit storage for this resolve it via `resource.rs`'s async path
        // during full request handling. At bind/validate time we only
        // confirm the id is well-formed against the target's id field.
        crate::resource::coerce_id(resource, &id_to_raw(id)).is_some()
    }
}

fn id_to_raw(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
