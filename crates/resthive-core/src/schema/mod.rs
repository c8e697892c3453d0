//! C1 — Schema & Validators.
//!
//! A `Schema` is an ordered map of field name → `Field` (§3); ordering is
//! significant for stable OpenAPI output (§4.4) and is therefore backed by
//! `IndexMap` rather than a `HashMap`, the way the teacher keeps its
//! column maps ordered.

mod field;
mod validator;

pub use field::{Field, ValueProducer};
pub use validator::{ReferenceChecker, ReferencePath, Validator};

use crate::error::{Error, Issues, Result};
use indexmap::IndexMap;
use serde_json::Value;

/// Ordered map of field name → `Field`, plus a description.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: IndexMap<String, Field>,
    pub description: Option<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field, preserving insertion order.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Enumerate fields in insertion order, per §4.4.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Navigate a dotted field path (`a.b.c`), per §3 ("Compilation
    /// produces a fast lookup for nested field paths").
    pub fn get_field(&self, path: &str) -> Option<&Field> {
        if path.is_empty() {
            return None;
        }
        let (head, rest) = path.split_once('.').unwrap_or((path, ""));
        let field = self.fields.get(head)?;
        if rest.is_empty() {
            Some(field)
        } else {
            field.validator.get_field(rest)
        }
    }

    /// Apply defaults and `OnInit`/`OnUpdate` producers, dropping
    /// read-only fields supplied by the client (§4.1, §8 "Read-only
    /// purge"). `replace=true` drops omitted fields; `false` merges over
    /// `original`.
    pub fn prepare(&self, payload: &Value, original: Option<&Value>, replace: bool) -> Result<Value> {
        let payload_obj = payload
            .as_object()
            .ok_or_else(|| Error::BadRequest("request body must be a JSON object".into()))?;
        let original_obj = original.and_then(|v| v.as_object());
        let is_create = original.is_none();

        let mut out = serde_json::Map::new();

        for (name, field) in self.fields.iter() {
            let client_value = if field.read_only { None } else { payload_obj.get(name) };

            let producer = if is_create { &field.on_init } else { &field.on_update };

            let value = if let Some(producer) = producer {
                Some(producer(client_value))
            } else if let Some(v) = client_value {
                Some(v.clone())
            } else if !replace {
                original_obj.and_then(|o| o.get(name)).cloned()
            } else {
                field.default.clone()
            };

            if let Some(value) = value {
                out.insert(name.clone(), value);
            } else if !replace && !is_create {
                // merge mode keeps whatever was already there even with no default
                if let Some(v) = original_obj.and_then(|o| o.get(name)) {
                    out.insert(name.clone(), v.clone());
                }
            }
        }

        Ok(Value::Object(out))
    }

    /// Per-field coercion using validators; returns an issues map on
    /// failure (§4.1).
    pub fn validate(&self, payload: &Value, checker: &dyn ReferenceChecker) -> Result<Value> {
        let obj = payload
            .as_object()
            .ok_or_else(|| Error::BadRequest("request body must be a JSON object".into()))?;

        let mut issues = Issues::new();
        let mut out = serde_json::Map::new();

        for (name, field) in self.fields.iter() {
            let Some(value) = obj.get(name) else {
                if field.required {
                    issues.entry(name.clone()).or_default().push("required".into());
                }
                continue;
            };

            match field.validator.validate(value) {
                Ok(coerced) => {
                    if field.validator.is_reference() {
                        if let Err(e) = field.validator.validate_for(&coerced, checker) {
                            issues
                                .entry(name.clone())
                                .or_default()
                                .push(e.to_string());
                            continue;
                        }
                    }
                    out.insert(name.clone(), coerced);
                }
                Err(message) => {
                    issues.entry(name.clone()).or_default().push(message);
                }
            }
        }

        for key in obj.keys() {
            if !self.fields.contains_key(key) {
                issues
                    .entry(key.clone())
                    .or_default()
                    .push("invalid field".to_string());
            }
        }

        if issues.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(Error::unprocessable("Document contains error(s)", issues))
        }
    }
}
