//! Path and operation generation from the resource tree — the runtime
//! analogue of `addResource`: one entry per allowed `Mode`, recursing into
//! children with their ancestors' ids threaded onto the path.

use crate::schema_gen::schema_to_json;
use resthive_core::resource::{Mode, Resource};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

struct Ancestor {
    plural: String,
    singular: String,
    id_param: String,
}

/// Accumulates paths/tags/schemas/parameters while walking the resource
/// tree. Kept separate from the static components so callers can merge
/// both into one `components` object.
#[derive(Default)]
pub struct Document {
    pub paths: Map<String, Value>,
    pub tags: Vec<Value>,
    pub schemas: Map<String, Value>,
    pub parameters: Map<String, Value>,
    tag_names: HashSet<String>,
}

impl Document {
    pub fn build(resources: &[Resource]) -> Self {
        let mut doc = Self::default();
        for resource in resources {
            doc.add_resource(resource, &[]);
        }
        doc
    }

    fn add_resource(&mut self, resource: &Resource, ancestors: &[Ancestor]) {
        let plural = resource.name.clone();
        let singular = singularize(&plural);
        let id_param_name = format!("{singular}Id");
        let source_schema_name = format!("{singular}Source");

        self.schemas.insert(singular.clone(), schema_to_json(&resource.schema, false));
        self.schemas
            .insert(source_schema_name.clone(), schema_to_json(&resource.schema, true));
        self.parameters.insert(
            id_param_name.clone(),
            json!({
                "name": id_param_name,
                "description": format!("The {singular}'s id"),
                "in": "path",
                "required": true,
                "schema": {"type": "string"},
            }),
        );

        let mut collection_path = String::new();
        let mut operation_suffix = String::new();
        let mut ancestor_params = Vec::new();
        for ancestor in ancestors {
            collection_path.push_str(&format!("/{}/{{{}}}", ancestor.plural, ancestor.id_param));
            operation_suffix.push_str(&format!("On{}", title_case(&ancestor.singular)));
            ancestor_params.push(json!({"$ref": format!("#/components/parameters/{}", ancestor.id_param)}));
        }
        collection_path.push_str(&format!("/{plural}"));
        let item_path = format!("{collection_path}/{{{id_param_name}}}");

        let tag_name = title_case(ancestors.first().map(|a| a.plural.as_str()).unwrap_or(&plural));
        if self.tag_names.insert(tag_name.clone()) {
            self.tags.push(json!({
                "name": tag_name,
                "description": resource.schema.description,
            }));
        }

        let resource_title = title_case(&plural);
        let singular_title = title_case(&singular);

        if resource.allows(Mode::List) {
            let mut params = ancestor_params.clone();
            params.extend(shared_param_refs(&["sort", "filter", "fields", "limit", "skip", "page", "total"]));
            self.insert_operation(
                &collection_path,
                "get",
                json!({
                    "operationId": format!("List{resource_title}{operation_suffix}"),
                    "tags": [tag_name],
                    "parameters": params,
                    "responses": {
                        "200": {
                            "description": format!("A page of {plural}"),
                            "headers": {
                                "Date": {"$ref": "#/components/headers/Date"},
                                "X-Total": {"$ref": "#/components/headers/X-Total"},
                            },
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": {"$ref": format!("#/components/schemas/{singular}")},
                                    },
                                },
                            },
                        },
                        "default": {"$ref": "#/components/responses/Error"},
                    },
                }),
            );
        }

        if resource.allows(Mode::Create) {
            self.insert_operation(
                &collection_path,
                "post",
                json!({
                    "operationId": format!("Create{singular_title}{operation_suffix}"),
                    "tags": [tag_name],
                    "parameters": ancestor_params.clone(),
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {"schema": {"$ref": format!("#/components/schemas/{source_schema_name}")}},
                        },
                    },
                    "responses": {
                        "201": {
                            "description": format!("The created {singular}"),
                            "headers": {
                                "Etag": {"$ref": "#/components/headers/Etag"},
                                "Last-Modified": {"$ref": "#/components/headers/Last-Modified"},
                            },
                            "content": {
                                "application/json": {"schema": {"$ref": format!("#/components/schemas/{singular}")}},
                            },
                        },
                        "422": {"$ref": "#/components/responses/ValidationError"},
                        "default": {"$ref": "#/components/responses/Error"},
                    },
                }),
            );
        }

        if resource.allows(Mode::Clear) {
            let mut params = ancestor_params.clone();
            params.extend(shared_param_refs(&["filter"]));
            self.insert_operation(
                &collection_path,
                "delete",
                json!({
                    "operationId": format!("Clear{resource_title}{operation_suffix}"),
                    "tags": [tag_name],
                    "parameters": params,
                    "responses": {
                        "204": {
                            "description": format!("{resource_title} matching the filter were removed"),
                            "headers": {
                                "Date": {"$ref": "#/components/headers/Date"},
                                "X-Total": {"$ref": "#/components/headers/X-Total"},
                            },
                        },
                        "default": {"$ref": "#/components/responses/Error"},
                    },
                }),
            );
        }

        if resource.allows(Mode::Read) {
            let mut params = ancestor_params.clone();
            params.push(json!({"$ref": format!("#/components/parameters/{id_param_name}")}));
            params.extend(shared_param_refs(&["fields"]));
            self.insert_operation(
                &item_path,
                "get",
                json!({
                    "operationId": format!("Read{singular_title}{operation_suffix}"),
                    "tags": [tag_name],
                    "parameters": params,
                    "responses": {
                        "200": {
                            "description": format!("The requested {singular}"),
                            "headers": {
                                "Etag": {"$ref": "#/components/headers/Etag"},
                                "Last-Modified": {"$ref": "#/components/headers/Last-Modified"},
                            },
                            "content": {
                                "application/json": {"schema": {"$ref": format!("#/components/schemas/{singular}")}},
                            },
                        },
                        "default": {"$ref": "#/components/responses/Error"},
                    },
                }),
            );
        }

        if resource.allows(Mode::Replace) {
            let mut params = ancestor_params.clone();
            params.push(json!({"$ref": format!("#/components/parameters/{id_param_name}")}));
            self.insert_operation(
                &item_path,
                "put",
                json!({
                    "operationId": format!("Replace{singular_title}{operation_suffix}"),
                    "tags": [tag_name],
                    "parameters": params,
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {"schema": {"$ref": format!("#/components/schemas/{source_schema_name}")}},
                        },
                    },
                    "responses": {
                        "200": {
                            "description": format!("The replaced {singular}"),
                            "headers": {
                                "Etag": {"$ref": "#/components/headers/Etag"},
                                "Last-Modified": {"$ref": "#/components/headers/Last-Modified"},
                            },
                            "content": {
                                "application/json": {"schema": {"$ref": format!("#/components/schemas/{singular}")}},
                            },
                        },
                        "422": {"$ref": "#/components/responses/ValidationError"},
                        "default": {"$ref": "#/components/responses/Error"},
                    },
                }),
            );
        }

        if resource.allows(Mode::Update) {
            let mut params = ancestor_params.clone();
            params.push(json!({"$ref": format!("#/components/parameters/{id_param_name}")}));
            self.insert_operation(
                &item_path,
                "patch",
                json!({
                    "operationId": format!("Update{singular_title}{operation_suffix}"),
                    "tags": [tag_name],
                    "parameters": params,
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json-patch+json": {"schema": {"$ref": "#/components/schemas/JSONPatch"}},
                            "application/json": {"schema": {"$ref": format!("#/components/schemas/{source_schema_name}")}},
                        },
                    },
                    "responses": {
                        "200": {
                            "description": format!("The updated {singular}"),
                            "headers": {
                                "Etag": {"$ref": "#/components/headers/Etag"},
                                "Last-Modified": {"$ref": "#/components/headers/Last-Modified"},
                            },
                            "content": {
                                "application/json": {"schema": {"$ref": format!("#/components/schemas/{singular}")}},
                            },
                        },
                        "422": {"$ref": "#/components/responses/ValidationError"},
                        "default": {"$ref": "#/components/responses/Error"},
                    },
                }),
            );
        }

        if resource.allows(Mode::Delete) {
            let mut params = ancestor_params.clone();
            params.push(json!({"$ref": format!("#/components/parameters/{id_param_name}")}));
            params.push(json!({"$ref": "#/components/parameters/If-Match"}));
            self.insert_operation(
                &item_path,
                "delete",
                json!({
                    "operationId": format!("Delete{singular_title}{operation_suffix}"),
                    "tags": [tag_name],
                    "parameters": params,
                    "responses": {
                        "204": {"description": format!("The {singular} was removed")},
                        "422": {"$ref": "#/components/responses/ValidationError"},
                        "default": {"$ref": "#/components/responses/Error"},
                    },
                }),
            );
        }

        let mut child_ancestors: Vec<Ancestor> = ancestors
            .iter()
            .map(|a| Ancestor { plural: a.plural.clone(), singular: a.singular.clone(), id_param: a.id_param.clone() })
            .collect();
        child_ancestors.push(Ancestor { plural, singular, id_param: id_param_name });
        for child in &resource.children {
            self.add_resource(child, &child_ancestors);
        }
    }

    fn insert_operation(&mut self, path: &str, method: &str, operation: Value) {
        let entry = self.paths.entry(path.to_string()).or_insert_with(|| json!({}));
        entry
            .as_object_mut()
            .expect("path entries are always objects")
            .insert(method.to_string(), operation);
    }
}

fn shared_param_refs(names: &[&str]) -> Vec<Value> {
    names
        .iter()
        .map(|name| json!({"$ref": format!("#/components/parameters/{name}")}))
        .collect()
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Approximate English singularization, matching the common resource-name
/// shapes (`users` -> `user`, `categories` -> `category`, `addresses` ->
/// `address`). Resources whose name is already singular pass through
/// unchanged.
fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = name.strip_suffix("ses") {
        return stem.to_string();
    }
    if let Some(stem) = name.strip_suffix("xes") {
        return stem.to_string();
    }
    if let Some(stem) = name.strip_suffix('s') {
        if !name.ends_with("ss") {
            return stem.to_string();
        }
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use resthive_core::schema::Schema;
    use resthive_core::storer::NoStorer;
    use std::sync::Arc;

    fn resource(name: &str) -> Resource {
        Resource::new(name, Schema::new(), Arc::new(NoStorer))
    }

    #[test]
    fn test_singularize_common_shapes() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("status"), "status");
    }

    #[test]
    fn test_top_level_resource_generates_collection_and_item_paths() {
        let doc = Document::build(&[resource("users")]);
        assert!(doc.paths.contains_key("/users"));
        assert!(doc.paths.contains_key("/users/{userId}"));
        assert!(doc.schemas.contains_key("user"));
        assert!(doc.schemas.contains_key("userSource"));
        assert!(doc.parameters.contains_key("userId"));
    }

    #[test]
    fn test_disallowed_mode_is_not_generated() {
        use resthive_core::resource::ResourceConf;
        let mut conf = ResourceConf::default();
        conf.allowed_modes.remove(&Mode::Delete);
        let r = resource("users").with_conf(conf);
        let doc = Document::build(&[r]);
        let item = &doc.paths["/users/{userId}"];
        assert!(item.get("delete").is_none());
        assert!(item.get("get").is_some());
    }

    #[test]
    fn test_child_resource_nests_parent_id_in_path() {
        let child = resource("posts").as_child_of("owner");
        let parent = resource("users").with_child(child);
        let doc = Document::build(&[parent]);
        assert!(doc.paths.contains_key("/users/{userId}/posts"));
        assert!(doc.paths.contains_key("/users/{userId}/posts/{postId}"));
    }

    #[test]
    fn test_tags_are_deduplicated_by_top_level_resource() {
        let a = resource("widgets");
        let b = resource("gadgets");
        let doc = Document::build(&[a, b]);
        assert_eq!(doc.tags.len(), 2);
    }
}
