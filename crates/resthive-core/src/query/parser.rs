//! Parsers for the three mini-languages of §4.2.
//!
//! The filter language is a MongoDB-like JSON object, so it's parsed
//! directly off `serde_json::Value` rather than through `nom`. The
//! projection and sort DSLs are plain strings and use `nom` combinators
//! the way the teacher's query-param parsing does.

use super::predicate::Expr;
use super::projection::{Projection, ProjectionField};
use super::sort::SortTerm;
use crate::error::{Error, Result};
use crate::schema::Schema;
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::opt,
    multi::separated_list0,
    sequence::{delimited, preceded},
    IResult,
};
use serde_json::Value;

// ============================================================================
// Filter
// ============================================================================

/// Parse a filter JSON object into a `Predicate`, validating field
/// references and value coercion against `schema`.
pub fn parse_filter(value: &Value, schema: &Schema) -> Result<Vec<Expr>> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::BadRequest("filter must be a JSON object".into()))?;

    let mut exprs = Vec::with_capacity(obj.len());
    for (key, val) in obj {
        exprs.push(parse_clause(key, val, schema)?);
    }
    Ok(exprs)
}

fn parse_clause(key: &str, value: &Value, schema: &Schema) -> Result<Expr> {
    match key {
        "$and" => Ok(Expr::And(parse_clause_list(value, schema)?)),
        "$or" => Ok(Expr::Or(parse_clause_list(value, schema)?)),
        field => parse_field_clause(field, value, schema),
    }
}

fn parse_clause_list(value: &Value, schema: &Schema) -> Result<Vec<Expr>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::BadRequest("$and/$or require an array of clauses".into()))?;
    items
        .iter()
        .map(|item| parse_filter(item, schema).map(Expr::And))
        .collect()
}

fn parse_field_clause(field: &str, value: &Value, schema: &Schema) -> Result<Expr> {
    let schema_field = schema
        .get_field(field)
        .ok_or_else(|| Error::BadRequest(format!("unknown filter field {:?}", field)))?;
    if !schema_field.filterable {
        return Err(Error::BadRequest(format!("field {:?} is not filterable", field)));
    }

    if let Some(operators) = value.as_object() {
        if let Some(inner) = operators.get("$ne") {
            return Ok(Expr::NotEqual { field: field.to_string(), value: coerce(schema, field, inner)? });
        }
        if let Some(inner) = operators.get("$gt") {
            return Ok(Expr::GreaterThan { field: field.to_string(), value: coerce(schema, field, inner)? });
        }
        if let Some(inner) = operators.get("$gte") {
            return Ok(Expr::GreaterOrEqual { field: field.to_string(), value: coerce(schema, field, inner)? });
        }
        if let Some(inner) = operators.get("$lt") {
            return Ok(Expr::LowerThan { field: field.to_string(), value: coerce(schema, field, inner)? });
        }
        if let Some(inner) = operators.get("$lte") {
            return Ok(Expr::LowerOrEqual { field: field.to_string(), value: coerce(schema, field, inner)? });
        }
        if let Some(inner) = operators.get("$in") {
            return Ok(Expr::In { field: field.to_string(), values: coerce_list(schema, field, inner)? });
        }
        if let Some(inner) = operators.get("$nin") {
            return Ok(Expr::NotIn { field: field.to_string(), values: coerce_list(schema, field, inner)? });
        }
        if let Some(inner) = operators.get("$regex") {
            if !matches!(schema_field.validator, crate::schema::Validator::String { .. }) {
                return Err(Error::BadRequest(format!("$regex requires a String field, got {:?}", field)));
            }
            let pattern = inner
                .as_str()
                .ok_or_else(|| Error::BadRequest("$regex value must be a string".into()))?;
            let re = regex::Regex::new(pattern)
                .map_err(|e| Error::BadRequest(format!("invalid regex: {}", e)))?;
            return Ok(Expr::Regex { field: field.to_string(), pattern: re });
        }
        if let Some(inner) = operators.get("$exists") {
            let exists = inner
                .as_bool()
                .ok_or_else(|| Error::BadRequest("$exists value must be a boolean".into()))?;
            return Ok(Expr::Exists { field: field.to_string(), exists });
        }
        return Err(Error::BadRequest(format!("unsupported filter operator for field {:?}", field)));
    }

    Ok(Expr::Equal { field: field.to_string(), value: coerce(schema, field, value)? })
}

fn coerce(schema: &Schema, field: &str, value: &Value) -> Result<Value> {
    let schema_field = schema
        .get_field(field)
        .ok_or_else(|| Error::BadRequest(format!("unknown filter field {:?}", field)))?;
    schema_field
        .validator
        .validate(value)
        .map_err(|message| Error::BadRequest(format!("{}: {}", field, message)))
}

fn coerce_list(schema: &Schema, field: &str, value: &Value) -> Result<Vec<Value>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::BadRequest(format!("{}: expected an array", field)))?;
    items.iter().map(|item| coerce(schema, field, item)).collect()
}

// ============================================================================
// Projection
// ============================================================================

/// Parse a comma-separated projection DSL string, per §4.2:
/// `name[:alias][(sub-projection)][{ref-embed}]`.
pub fn parse_projection(input: &str, schema: &Schema) -> Result<Projection> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    let (_, fields) = projection_items(input)
        .map_err(|_| Error::BadRequest(format!("invalid projection: {:?}", input)))?;

    for field in &fields {
        let schema_field = schema
            .get_field(&field.name)
            .ok_or_else(|| Error::BadRequest(format!("unknown field {:?}", field.name)))?;
        if field.embed.is_some() && !schema_field.validator.is_reference() && !schema_field.validator.is_compound() {
            return Err(Error::BadRequest(format!(
                "field {:?} cannot be embedded: not a reference or compound field",
                field.name
            )));
        }
    }
    Ok(fields)
}

fn projection_items(input: &str) -> IResult<&str, Projection> {
    separated_list0(char(','), projection_item)(input)
}

fn projection_item(input: &str) -> IResult<&str, ProjectionField> {
    let (input, name) = identifier(input)?;
    let (input, alias) = opt(preceded(char(':'), identifier))(input)?;
    let (input, sub) = opt(delimited(char('('), projection_items, char(')')))(input)?;
    let (input, embed) = opt(delimited(char('{'), projection_items, char('}')))(input)?;

    let mut field = ProjectionField::new(name);
    if let Some(alias) = alias {
        field = field.with_alias(alias);
    }
    if let Some(sub) = sub {
        field = field.with_sub(sub);
    }
    if let Some(embed) = embed {
        field = field.with_embed(embed);
    }
    Ok((input, field))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.')(input)
}

// ============================================================================
// Sort
// ============================================================================

/// Parse a comma-separated sort DSL string, per §4.2: `[-]name`.
pub fn parse_sort(input: &str, schema: &Schema) -> Result<Vec<SortTerm>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    let (_, terms) = sort_terms(input).map_err(|_| Error::BadRequest(format!("invalid sort: {:?}", input)))?;

    for term in &terms {
        let field = schema
            .get_field(&term.field)
            .ok_or_else(|| Error::BadRequest(format!("unknown sort field {:?}", term.field)))?;
        if !field.sortable {
            return Err(Error::BadRequest(format!("field {:?} is not sortable", term.field)));
        }
    }
    Ok(terms)
}

fn sort_terms(input: &str) -> IResult<&str, Vec<SortTerm>> {
    separated_list0(char(','), sort_term)(input)
}

fn sort_term(input: &str) -> IResult<&str, SortTerm> {
    let (input, descending) = opt(tag("-"))(input)?;
    let (input, name) = identifier(input)?;
    Ok((
        input,
        SortTerm {
            field: name.to_string(),
            descending: descending.is_some(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Validator};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_schema() -> Schema {
        Schema::new()
            .field(Field::new("name", Validator::string()))
            .field(Field::new("age", Validator::integer()))
            .field(Field::new("hidden", Validator::string()).not_filterable().not_sortable())
    }

    #[test]
    fn test_parse_filter_equal() {
        let schema = sample_schema();
        let predicate = parse_filter(&json!({"name": "bob"}), &schema).unwrap();
        assert_eq!(predicate.len(), 1);
        assert!(matches!(predicate[0], Expr::Equal { .. }));
    }

    #[test]
    fn test_parse_filter_comparison_operators() {
        let schema = sample_schema();
        let predicate = parse_filter(&json!({"age": {"$gte": 18}}), &schema).unwrap();
        assert!(matches!(predicate[0], Expr::GreaterOrEqual { .. }));
    }

    #[test]
    fn test_parse_filter_and_or() {
        let schema = sample_schema();
        let predicate = parse_filter(
            &json!({"$or": [{"name": "a"}, {"name": "b"}]}),
            &schema,
        )
        .unwrap();
        assert!(matches!(predicate[0], Expr::Or(_)));
    }

    #[test]
    fn test_parse_filter_rejects_non_filterable() {
        let schema = sample_schema();
        assert!(parse_filter(&json!({"hidden": "x"}), &schema).is_err());
    }

    #[test]
    fn test_parse_projection_basic() {
        let schema = sample_schema();
        let projection = parse_projection("name:n,age", &schema).unwrap();
        assert_eq!(projection.len(), 2);
        assert_eq!(projection[0].output_name(), "n");
    }

    #[test]
    fn test_parse_sort_rejects_non_sortable() {
        let schema = sample_schema();
        assert!(parse_sort("-hidden", &schema).is_err());
    }

    #[test]
    fn test_parse_sort_descending() {
        let schema = sample_schema();
        let terms = parse_sort("-age,name", &schema).unwrap();
        assert!(terms[0].descending);
        assert!(!terms[1].descending);
    }
}
