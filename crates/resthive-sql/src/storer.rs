//! `PgStorer`: a `resthive_core::Storer` backed by PostgreSQL. Each
//! resource owns one table with `id`/`etag`/`updated`/`payload` columns;
//! predicates, sorts, and windows are translated into parameterized SQL
//! via the builders in this crate, the way
//! `original_source/storage/pgsql/find.go` translates `query.Predicate`
//! into `goqu` expressions.

use crate::{
    builder::SqlFragment,
    delete::DeleteBuilder,
    expr::Expr as SqlExpr,
    identifier::{escape_ident, QualifiedIdentifier},
    insert::InsertBuilder,
    param::SqlParam,
    select::SelectBuilder,
    update::UpdateBuilder,
};
use async_trait::async_trait;
use resthive_core::error::{Error, Result};
use resthive_core::item::{ETag, Item, ItemId};
use resthive_core::query::{Expr as CoreExpr, Query, SortTerm};
use resthive_core::storer::{ItemList, Storer};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// A `Storer` that persists items one row per item in a single Postgres
/// table. Per DESIGN.md's Open Question decision, `find`'s `total` stays
/// `-1` unless the caller explicitly asked for a count — `list`'s
/// `total=1` query param routes through `Storer::count` instead.
pub struct PgStorer {
    pool: PgPool,
    table: QualifiedIdentifier,
    integer_id: bool,
}

impl PgStorer {
    pub fn new(pool: PgPool, table: QualifiedIdentifier) -> Self {
        Self {
            pool,
            table,
            integer_id: false,
        }
    }

    /// Mark this resource's `id` field as backed by an `Integer`
    /// validator, so rows decode back into `ItemId::Integer` rather
    /// than `ItemId::String` (the `id` column itself stays `TEXT`
    /// either way, for a uniform schema across resources).
    pub fn with_integer_id(mut self) -> Self {
        self.integer_id = true;
        self
    }
}

#[async_trait]
impl Storer for PgStorer {
    async fn find(&self, query: &Query) -> Result<ItemList> {
        let mut builder = SelectBuilder::new()
            .column("id")
            .column("etag")
            .column("updated")
            .column("payload")
            .from_table(&self.table);

        if !query.predicate.is_empty() {
            builder = builder.where_raw(translate_predicate(&query.predicate));
        }
        for term in &query.sort {
            builder = builder.order_by_raw(translate_sort(term));
        }
        if let Some(limit) = query.window.limit {
            builder = builder.limit(limit as i64);
        }
        if query.window.offset > 0 {
            builder = builder.offset(query.window.offset as i64);
        }

        let (sql, params) = builder.build().build();
        let rows = bind_query(&sql, &params)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let items = rows
            .iter()
            .map(|row| row_to_item(row, self.integer_id))
            .collect::<Result<Vec<_>>>()?;

        Ok(ItemList {
            total: -1,
            limit: query.window.limit,
            offset: query.window.offset,
            items,
        })
    }

    async fn insert(&self, item: Item) -> Result<Item> {
        let builder = InsertBuilder::new()
            .into_table(&self.table)
            .columns(vec!["id".into(), "etag".into(), "updated".into(), "payload".into()])
            .values(vec![
                id_param(&item.id),
                SqlParam::text(item.etag.0.clone()),
                SqlParam::Timestamp(item.updated),
                SqlParam::Json(item.payload.clone()),
            ]);
        let (sql, params) = builder.build().build();

        bind_query(&sql, &params)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(item)
    }

    async fn update(&self, item: Item, original: &Item) -> Result<Item> {
        let builder = UpdateBuilder::new()
            .table(&self.table)
            .set("etag", SqlParam::text(item.etag.0.clone()))
            .set("updated", SqlParam::Timestamp(item.updated))
            .set("payload", SqlParam::Json(item.payload.clone()))
            .where_expr(SqlExpr::eq("id", id_param(&item.id)))
            .where_raw(etag_match(&original.etag));
        let (sql, params) = builder.build().build();

        let result = bind_query(&sql, &params)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::PreconditionFailed);
        }
        Ok(item)
    }

    async fn delete(&self, original: &Item) -> Result<()> {
        let builder = DeleteBuilder::new()
            .from_table(&self.table)
            .where_expr(SqlExpr::eq("id", id_param(&original.id)))
            .where_raw(etag_match(&original.etag));
        let (sql, params) = builder.build().build();

        let result = bind_query(&sql, &params)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::PreconditionFailed);
        }
        Ok(())
    }

    async fn clear(&self, query: &Query) -> Result<i64> {
        let mut builder = DeleteBuilder::new().from_table(&self.table);
        if !query.predicate.is_empty() {
            builder = builder.where_raw(translate_predicate(&query.predicate));
        }
        let (sql, params) = builder.build().build();

        let result = bind_query(&sql, &params)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() as i64)
    }

    async fn count(&self, query: &Query) -> Result<Option<i64>> {
        let mut builder = SelectBuilder::new()
            .column_raw(SqlFragment::raw("COUNT(*)"))
            .from_table(&self.table);
        if !query.predicate.is_empty() {
            builder = builder.where_raw(translate_predicate(&query.predicate));
        }
        let (sql, params) = builder.build().build();

        let row = bind_query(&sql, &params)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let count: i64 = row.try_get(0).map_err(|e| Error::Internal(e.to_string()))?;
        Ok(Some(count))
    }

    fn supports_count(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn etag_match(etag: &ETag) -> SqlFragment {
    let mut frag = SqlFragment::raw(escape_ident("etag"));
    frag.push(" = ");
    frag.push_param(SqlParam::text(etag.0.clone()));
    frag
}

fn id_param(id: &ItemId) -> SqlParam {
    match id {
        ItemId::String(s) => SqlParam::Text(s.clone()),
        ItemId::Integer(n) => SqlParam::Text(n.to_string()),
    }
}

fn row_to_item(row: &PgRow, integer_id: bool) -> Result<Item> {
    let id_str: String = row.try_get("id").map_err(|e| Error::Internal(e.to_string()))?;
    let etag: String = row.try_get("etag").map_err(|e| Error::Internal(e.to_string()))?;
    let updated = row
        .try_get("updated")
        .map_err(|e| Error::Internal(e.to_string()))?;
    let payload = row
        .try_get("payload")
        .map_err(|e| Error::Internal(e.to_string()))?;

    let id = if integer_id {
        id_str
            .parse::<i64>()
            .map(ItemId::Integer)
            .map_err(|_| Error::Internal("invalid integer id column".into()))?
    } else {
        ItemId::String(id_str)
    };

    Ok(Item {
        id,
        etag: ETag(etag),
        updated,
        payload,
    })
}

/// Translate a predicate's implicit top-level `$and` into SQL.
fn translate_predicate(predicate: &[CoreExpr]) -> SqlFragment {
    let frags: Vec<SqlFragment> = predicate.iter().map(translate_expr).collect();
    join_with(" AND ", frags, "TRUE")
}

fn translate_expr(expr: &CoreExpr) -> SqlFragment {
    match expr {
        CoreExpr::Equal { field, value } => cmp(field, "=", value),
        CoreExpr::NotEqual { field, value } => cmp(field, "<>", value),
        CoreExpr::GreaterThan { field, value } => cmp(field, ">", value),
        CoreExpr::GreaterOrEqual { field, value } => cmp(field, ">=", value),
        CoreExpr::LowerThan { field, value } => cmp(field, "<", value),
        CoreExpr::LowerOrEqual { field, value } => cmp(field, "<=", value),
        CoreExpr::In { field, values } => in_list(field, values, false),
        CoreExpr::NotIn { field, values } => in_list(field, values, true),
        CoreExpr::Regex { field, pattern } => {
            let mut frag = field_sql(field);
            frag.push(" ~ ");
            frag.push_param(SqlParam::text(pattern.as_str()));
            frag
        }
        CoreExpr::Exists { field, exists } => {
            let mut frag = field_sql(field);
            frag.push(if *exists { " IS NOT NULL" } else { " IS NULL" });
            frag
        }
        CoreExpr::And(exprs) => {
            let frags: Vec<SqlFragment> = exprs.iter().map(translate_expr).collect();
            join_with(" AND ", frags, "TRUE")
        }
        CoreExpr::Or(exprs) => {
            let frags: Vec<SqlFragment> = exprs.iter().map(translate_expr).collect();
            join_with(" OR ", frags, "FALSE")
        }
    }
}

fn join_with(sep: &str, frags: Vec<SqlFragment>, empty: &str) -> SqlFragment {
    if frags.is_empty() {
        return SqlFragment::raw(empty);
    }
    SqlFragment::join(sep, frags.into_iter().map(|f| f.parens())).parens()
}

fn cmp(field: &str, op: &str, value: &serde_json::Value) -> SqlFragment {
    let mut frag = field_sql(field);
    if field != "id" && value.is_number() {
        frag.push("::numeric");
    }
    frag.push(" ");
    frag.push(op);
    frag.push(" ");
    frag.push_param(value_param(value));
    frag
}

fn in_list(field: &str, values: &[serde_json::Value], negate: bool) -> SqlFragment {
    if values.is_empty() {
        return SqlFragment::raw(if negate { "TRUE" } else { "FALSE" });
    }
    let mut frag = field_sql(field);
    frag.push(if negate { " NOT IN (" } else { " IN (" });
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            frag.push(", ");
        }
        frag.push_param(value_param(value));
    }
    frag.push(")");
    frag
}

fn value_param(value: &serde_json::Value) -> SqlParam {
    match value {
        serde_json::Value::Null => SqlParam::Null,
        serde_json::Value::Bool(b) => SqlParam::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(SqlParam::Int)
            .unwrap_or_else(|| SqlParam::Float(n.as_f64().unwrap_or(0.0))),
        serde_json::Value::String(s) => SqlParam::Text(s.clone()),
        other => SqlParam::Json(other.clone()),
    }
}

/// A field is either the `id` column directly or a dotted path into the
/// `payload` jsonb column, rendered with `jsonb_extract_path_text` the
/// way `postgresJsonbSupport` (`storage/pgsql/common.go`) addresses JSON
/// subfields.
fn field_sql(field: &str) -> SqlFragment {
    if field == "id" {
        return SqlFragment::raw(escape_ident("id"));
    }
    let mut frag = SqlFragment::raw("jsonb_extract_path_text(");
    frag.push(&escape_ident("payload"));
    for segment in field.split('.') {
        frag.push(", ");
        frag.push_param(SqlParam::text(segment));
    }
    frag.push(")");
    frag
}

fn translate_sort(term: &SortTerm) -> SqlFragment {
    let mut frag = field_sql(&term.field);
    frag.push(if term.descending { " DESC" } else { " ASC" });
    frag
}

fn bind_query<'a>(
    sql: &'a str,
    params: &'a [SqlParam],
) -> sqlx::query::Query<'a, sqlx::Postgres, sqlx::postgres::PgArguments> {
    let mut q = sqlx::query(sql);
    for param in params {
        q = match param {
            SqlParam::Null => q.bind(None::<String>),
            SqlParam::Bool(b) => q.bind(*b),
            SqlParam::Int(n) => q.bind(*n),
            SqlParam::Float(f) => q.bind(*f),
            SqlParam::Text(s) => q.bind(s.clone()),
            SqlParam::Bytes(b) => q.bind(b.clone()),
            SqlParam::Json(v) => q.bind(v.clone()),
            SqlParam::Uuid(u) => q.bind(*u),
            SqlParam::Timestamp(t) => q.bind(*t),
            SqlParam::Array(_) => q.bind(Option::<String>::None),
        };
    }
    q
}

/// Unique-violation maps to the pipeline's `Conflict`; everything else
/// is `Internal` (the raw error is logged by the caller via `tracing`).
fn map_sqlx_error(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return Error::Conflict;
        }
    }
    tracing::error!("postgres storer error: {}", e);
    Error::Internal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_sql_id_is_plain_column() {
        let frag = field_sql("id");
        assert_eq!(frag.sql(), "\"id\"");
    }

    #[test]
    fn test_field_sql_dotted_path_uses_jsonb_extract() {
        let frag = field_sql("address.city");
        assert!(frag.sql().contains("jsonb_extract_path_text"));
        assert_eq!(frag.params().len(), 2);
    }

    #[test]
    fn test_translate_predicate_empty_is_true() {
        let frag = translate_predicate(&[]);
        assert_eq!(frag.sql(), "TRUE");
    }

    #[test]
    fn test_translate_equal() {
        let predicate = vec![CoreExpr::Equal {
            field: "foo".into(),
            value: json!("bar"),
        }];
        let frag = translate_predicate(&predicate);
        assert!(frag.sql().contains("jsonb_extract_path_text"));
        assert!(frag.sql().contains("="));
    }

    #[test]
    fn test_translate_in_list_empty_is_false() {
        let frag = in_list("foo", &[], false);
        assert_eq!(frag.sql(), "FALSE");
    }

    #[test]
    fn test_translate_sort_descending() {
        let term = SortTerm::descending("created_at");
        let frag = translate_sort(&term);
        assert!(frag.sql().ends_with("DESC"));
    }

    #[test]
    fn test_id_param_integer_stored_as_text() {
        let param = id_param(&ItemId::Integer(42));
        assert!(matches!(param, SqlParam::Text(ref s) if s == "42"));
    }
}
