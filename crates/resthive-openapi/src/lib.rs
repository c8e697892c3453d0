//! OpenAPI 3.0.3 document generation from a bound `resthive_core::Index`.
//!
//! Unlike route-annotation-driven OpenAPI generators, the resource tree
//! here is only known at runtime — a host builds an `Index` out of
//! `Resource`s it assembles itself, so the document has to be produced by
//! walking that tree rather than by a `#[utoipa::path]`-style macro. This
//! mirrors how `FillOpenapiFromIndex` walks `index.GetResources()` and
//! fills in a document's `paths`/`components` from it.

mod components;
mod paths;
mod schema_gen;

use resthive_core::index::Index;
use serde_json::{json, Map, Value};

/// Top-level document metadata a host supplies; the resource tree itself
/// supplies everything else (`paths`, per-resource `schemas`).
#[derive(Clone, Debug)]
pub struct DocumentInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

impl DocumentInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self { title: title.into(), version: version.into(), description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Build a complete OpenAPI 3.0.3 document describing every resource in
/// `index`, gated on each resource's `ResourceConf::allowed_modes`.
pub fn build_document(index: &Index, info: DocumentInfo) -> Value {
    let walked = paths::Document::build(index.resources());

    let mut schemas = components::schemas();
    schemas.extend(walked.schemas);
    let mut parameters = components::parameters();
    parameters.extend(walked.parameters);

    let mut info_json = json!({
        "title": info.title,
        "version": info.version,
    });
    if let Some(description) = info.description {
        info_json["description"] = json!(description);
    }

    json!({
        "openapi": "3.0.3",
        "info": info_json,
        "tags": walked.tags,
        "paths": walked.paths,
        "components": {
            "parameters": parameters,
            "headers": components::headers(),
            "schemas": schemas,
            "responses": components::responses(),
        },
    })
}

/// Same as [`build_document`] but returns the raw component maps
/// un-merged, for callers that want to splice them into a larger document
/// rather than take this crate's top-level shape verbatim.
pub fn build_components(index: &Index) -> Map<String, Value> {
    let walked = paths::Document::build(index.resources());
    let mut schemas = components::schemas();
    schemas.extend(walked.schemas);
    let mut parameters = components::parameters();
    parameters.extend(walked.parameters);

    let mut out = Map::new();
    out.insert("parameters".into(), Value::Object(parameters));
    out.insert("headers".into(), Value::Object(components::headers()));
    out.insert("schemas".into(), Value::Object(schemas));
    out.insert("responses".into(), Value::Object(components::responses()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use resthive_core::resource::Resource;
    use resthive_core::schema::{Field, Schema, Validator};
    use resthive_core::storer::NoStorer;
    use std::sync::Arc;

    fn sample_index() -> Index {
        let users = Resource::new(
            "users",
            Schema::new()
                .field(Field::new("id", Validator::string()).read_only())
                .field(Field::new("name", Validator::string()).required()),
            Arc::new(NoStorer),
        );
        Index::new().with_resource(users)
    }

    #[test]
    fn test_build_document_has_top_level_shape() {
        let doc = build_document(&sample_index(), DocumentInfo::new("Demo API", "1.0.0"));
        assert_eq!(doc["openapi"], json!("3.0.3"));
        assert_eq!(doc["info"]["title"], json!("Demo API"));
        assert!(doc["paths"].get("/users").is_some());
        assert!(doc["components"]["schemas"].get("Error").is_some());
        assert!(doc["components"]["schemas"].get("user").is_some());
    }

    #[test]
    fn test_build_document_merges_resource_parameters_with_static_ones() {
        let doc = build_document(&sample_index(), DocumentInfo::new("Demo API", "1.0.0"));
        assert!(doc["components"]["parameters"].get("sort").is_some());
        assert!(doc["components"]["parameters"].get("userId").is_some());
    }
}
