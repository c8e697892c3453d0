//! JSON Schema generation from a `resthive_core::Schema`, the runtime
//! analogue of `generateSchema`/`generateSchemaFromField`.

use resthive_core::schema::{Field, Schema, Validator};
use serde_json::{json, Map, Value};

/// Render a schema as an OpenAPI `object` schema. When `hide_read_only`
/// is set, fields the client cannot supply on write are omitted — this is
/// how the `{Singular}Source` schema differs from the plain `{Singular}`
/// one.
pub fn schema_to_json(schema: &Schema, hide_read_only: bool) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (name, field) in schema.fields() {
        if field.hidden || (hide_read_only && field.read_only) {
            continue;
        }
        if field.required && !hide_read_only {
            required.push(json!(name));
        }
        properties.insert(name.clone(), field_to_json(field, hide_read_only));
    }

    let mut value = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        value["required"] = Value::Array(required);
    }
    if let Some(description) = &schema.description {
        value["description"] = json!(description);
    }
    value
}

fn field_to_json(field: &Field, hide_read_only: bool) -> Value {
    let mut value = validator_to_json(&field.validator, hide_read_only);

    if let Some(description) = &field.description {
        value["description"] = json!(description);
    }
    if field.read_only {
        value["readOnly"] = json!(true);
    }
    if let Some(default) = &field.default {
        value["default"] = default.clone();
    }
    value
}

fn validator_to_json(validator: &Validator, hide_read_only: bool) -> Value {
    match validator {
        Validator::String { min_len, max_len, regexp, allowed } => {
            let mut v = json!({"type": "string"});
            if let Some(min) = min_len {
                v["minLength"] = json!(min);
            }
            if let Some(max) = max_len {
                v["maxLength"] = json!(max);
            }
            if let Some(re) = regexp {
                v["pattern"] = json!(re.as_str());
            }
            if let Some(allowed) = allowed {
                v["enum"] = json!(allowed);
            }
            v
        }
        Validator::Integer { allowed } => {
            let mut v = json!({"type": "integer", "format": "int64"});
            if let Some(allowed) = allowed {
                v["enum"] = json!(allowed);
            }
            v
        }
        Validator::Float => json!({"type": "number", "format": "double"}),
        Validator::Bool => json!({"type": "boolean"}),
        Validator::Time => json!({"type": "string", "format": "date-time"}),
        Validator::Null => json!({"type": "string", "nullable": true}),
        Validator::Url => json!({"type": "string", "format": "uri"}),
        Validator::Password { min_len } => {
            let mut v = json!({"type": "string", "format": "password"});
            if let Some(min) = min_len {
                v["minLength"] = json!(min);
            }
            v
        }
        Validator::Dict => json!({"type": "object"}),
        Validator::Array { values } => json!({
            "type": "array",
            "items": field_to_json(values, hide_read_only),
        }),
        Validator::Object { schema } => schema_to_json(schema, hide_read_only),
        Validator::Reference { target } => json!({
            "type": "string",
            "description": format!("References an item in {:?}", target.0),
        }),
    }
}
