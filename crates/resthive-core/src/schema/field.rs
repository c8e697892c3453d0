//! `Field`: a named attribute within a `Schema`, per §3.

use super::Validator;
use serde_json::Value;
use std::sync::Arc;

/// A value-producer invoked by `Schema::prepare` on create (`on_init`) or
/// on every write (`on_update`). Boxed behind `Arc` so `Field` stays
/// `Clone` without requiring the producer itself to be.
pub type ValueProducer = Arc<dyn Fn(Option<&Value>) -> Value + Send + Sync>;

/// A named attribute with a validator and behavioral flags.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub validator: Validator,
    pub read_only: bool,
    pub hidden: bool,
    pub required: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub on_init: Option<ValueProducer>,
    pub on_update: Option<ValueProducer>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("validator", &self.validator)
            .field("read_only", &self.read_only)
            .field("hidden", &self.hidden)
            .field("required", &self.required)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("default", &self.default)
            .finish()
    }
}

impl Field {
    /// A plain, filterable, sortable field with no flags set.
    pub fn new(name: impl Into<String>, validator: Validator) -> Self {
        Self {
            name: name.into(),
            validator,
            read_only: false,
            hidden: false,
            required: false,
            sortable: true,
            filterable: true,
            default: None,
            description: None,
            on_init: None,
            on_update: None,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_on_init(mut self, f: ValueProducer) -> Self {
        self.on_init = Some(f);
        self
    }

    pub fn with_on_update(mut self, f: ValueProducer) -> Self {
        self.on_update = Some(f);
        self
    }

    /// Navigate into a dotted sub-path, e.g. `get_field("address.city")`.
    pub fn get_field(&self, path: &str) -> Option<&Field> {
        if path.is_empty() {
            return Some(self);
        }
        let (head, rest) = path.split_once('.').unwrap_or((path, ""));
        if head != self.name && !head.is_empty() {
            // Caller already stripped our own name; this branch handles
            // validators that recurse directly on `rest`.
        }
        self.validator.get_field(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_builder_flags() {
        let f = Field::new("id", Validator::string()).read_only().required();
        assert!(f.read_only);
        assert!(f.required);
        assert!(f.sortable);
        assert!(f.filterable);
    }

    #[test]
    fn test_not_sortable_not_filterable() {
        let f = Field::new("secret", Validator::string())
            .not_sortable()
            .not_filterable()
            .hidden();
        assert!(!f.sortable);
        assert!(!f.filterable);
        assert!(f.hidden);
    }
}
