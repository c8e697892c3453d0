//! Static, resource-independent OpenAPI components — the runtime
//! analogue of `staticComponents()`: shared parameters, headers, and the
//! error/patch schemas every resource's operations reference by `$ref`.

use serde_json::{json, Map, Value};

pub fn parameters() -> Map<String, Value> {
    let mut m = Map::new();
    m.insert(
        "sort".into(),
        json!({
            "name": "sort",
            "description": "Comma-separated list of fields to sort by, prefix with `-` for descending order",
            "in": "query",
            "schema": {"type": "string"},
        }),
    );
    m.insert(
        "filter".into(),
        json!({
            "name": "filter",
            "description": "MongoDB-style JSON filter expression",
            "in": "query",
            "schema": {"type": "string"},
        }),
    );
    m.insert(
        "fields".into(),
        json!({
            "name": "fields",
            "description": "Comma-separated list of fields to include in the response, prefix with `-` to exclude",
            "in": "query",
            "schema": {"type": "string"},
        }),
    );
    m.insert(
        "limit".into(),
        json!({
            "name": "limit",
            "description": "Maximum number of items to return",
            "in": "query",
            "schema": {"type": "integer", "format": "int32"},
        }),
    );
    m.insert(
        "skip".into(),
        json!({
            "name": "skip",
            "description": "Number of items to skip before the first item returned",
            "in": "query",
            "schema": {"type": "integer", "format": "int32", "default": 0},
        }),
    );
    m.insert(
        "page".into(),
        json!({
            "name": "page",
            "description": "1-indexed page number, an alternative to `skip`",
            "in": "query",
            "schema": {"type": "integer", "format": "int32"},
        }),
    );
    m.insert(
        "total".into(),
        json!({
            "name": "total",
            "description": "Set to 1 to force an exact `X-Total` count even when the backend would otherwise skip it",
            "in": "query",
            "schema": {"type": "integer", "enum": [0, 1]},
        }),
    );
    m.insert(
        "If-Match".into(),
        json!({
            "name": "If-Match",
            "description": "The item's expected ETag; the request fails with 412 if it does not match",
            "in": "header",
            "schema": {"type": "string"},
        }),
    );
    m
}

pub fn headers() -> Map<String, Value> {
    let mut m = Map::new();
    m.insert(
        "If-Match".into(),
        json!({
            "description": "The item's current ETag, for optimistic concurrency control",
            "schema": {"type": "string"},
        }),
    );
    m.insert(
        "Date".into(),
        json!({
            "description": "The date the response was generated",
            "schema": {"type": "string", "format": "date-time"},
        }),
    );
    m.insert(
        "Etag".into(),
        json!({
            "description": "The item's current entity tag",
            "schema": {"type": "string"},
        }),
    );
    m.insert(
        "Last-Modified".into(),
        json!({
            "description": "The item's last modification time",
            "schema": {"type": "string", "format": "date-time"},
        }),
    );
    m.insert(
        "X-Total".into(),
        json!({
            "description": "The total number of items matching the request's filter, when requested via `total=1`",
            "schema": {"type": "integer"},
        }),
    );
    m
}

pub fn schemas() -> Map<String, Value> {
    let mut m = Map::new();
    m.insert(
        "Error".into(),
        json!({
            "type": "object",
            "properties": {
                "code": {"type": "integer"},
                "message": {"type": "string"},
            },
            "required": ["code", "message"],
        }),
    );
    m.insert(
        "ValidationError".into(),
        json!({
            "type": "object",
            "properties": {
                "code": {"type": "integer"},
                "message": {"type": "string"},
                "issues": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "array",
                        "items": {"type": "string"},
                    },
                },
            },
            "required": ["code", "message", "issues"],
        }),
    );
    m.insert(
        "JSONPatch".into(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "op": {"type": "string", "enum": ["add", "remove", "replace", "move", "copy", "test"]},
                    "path": {"type": "string"},
                    "value": {},
                    "from": {"type": "string"},
                },
                "required": ["op", "path"],
            },
        }),
    );
    m
}

pub fn responses() -> Map<String, Value> {
    let mut m = Map::new();
    m.insert(
        "Error".into(),
        json!({
            "description": "Unexpected error",
            "content": {
                "application/json": {"schema": {"$ref": "#/components/schemas/Error"}},
            },
        }),
    );
    m.insert(
        "ValidationError".into(),
        json!({
            "description": "The request body failed validation",
            "content": {
                "application/json": {"schema": {"$ref": "#/components/schemas/ValidationError"}},
            },
        }),
    );
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_parameters_cover_list_query_params() {
        let params = parameters();
        for name in ["sort", "filter", "fields", "limit", "skip", "page", "total"] {
            assert!(params.contains_key(name), "missing parameter {name}");
        }
    }

    #[test]
    fn test_shared_headers_cover_caching_and_concurrency() {
        let h = headers();
        for name in ["If-Match", "Date", "Etag", "Last-Modified", "X-Total"] {
            assert!(h.contains_key(name), "missing header {name}");
        }
    }
}
