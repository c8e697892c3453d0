//! The projection tree (§4.2): which fields of a payload make it into a
//! response, with optional renaming, sub-selection into compound fields,
//! and reference embedding.

/// One field selected by a projection, with its optional alias,
/// sub-projection (for `Object`/`Array` fields), and embed projection
/// (for `Reference` fields resolved against another resource).
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionField {
    pub name: String,
    pub alias: Option<String>,
    pub sub: Option<Projection>,
    pub embed: Option<Projection>,
}

impl ProjectionField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            sub: None,
            embed: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_sub(mut self, sub: Projection) -> Self {
        self.sub = Some(sub);
        self
    }

    pub fn with_embed(mut self, embed: Projection) -> Self {
        self.embed = Some(embed);
        self
    }

    /// The name under which this field surfaces in the response.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A set of selected fields, in the order they were requested.
pub type Projection = Vec<ProjectionField>;

/// Apply a projection to a payload, producing the shaped response object.
/// Reference embedding is resolved separately (§4.5) since it requires
/// storage access; this function only handles plain selection/renaming/
/// sub-projection of already-materialized values.
pub fn apply(projection: &Projection, payload: &serde_json::Value) -> serde_json::Value {
    let Some(obj) = payload.as_object() else {
        return payload.clone();
    };
    let mut out = serde_json::Map::new();
    for field in projection {
        let Some(value) = obj.get(&field.name) else {
            continue;
        };
        let shaped = match (&field.sub, value) {
            (Some(sub), serde_json::Value::Object(_)) => apply(sub, value),
            (Some(sub), serde_json::Value::Array(items)) => {
                serde_json::Value::Array(items.iter().map(|item| apply(sub, item)).collect())
            }
            _ => value.clone(),
        };
        out.insert(field.output_name().to_string(), shaped);
    }
    serde_json::Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_apply_selects_and_aliases() {
        let projection = vec![
            ProjectionField::new("id"),
            ProjectionField::new("foo").with_alias("renamed"),
        ];
        let payload = json!({"id": "1", "foo": "bar", "baz": "dropped"});
        assert_eq!(apply(&projection, &payload), json!({"id": "1", "renamed": "bar"}));
    }

    #[test]
    fn test_apply_recurses_into_sub_projection() {
        let projection = vec![ProjectionField::new("address")
            .with_sub(vec![ProjectionField::new("city")])];
        let payload = json!({"address": {"city": "NYC", "zip": "10001"}});
        assert_eq!(apply(&projection, &payload), json!({"address": {"city": "NYC"}}));
    }

    #[test]
    fn test_apply_recurses_into_array_of_objects() {
        let projection = vec![ProjectionField::new("items")
            .with_sub(vec![ProjectionField::new("name")])];
        let payload = json!({"items": [{"name": "a", "extra": 1}, {"name": "b", "extra": 2}]});
        assert_eq!(apply(&projection, &payload), json!({"items": [{"name": "a"}, {"name": "b"}]}));
    }
}
