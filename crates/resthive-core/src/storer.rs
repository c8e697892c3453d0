//! C3 — the storage adapter contract (§5): every backend (in-memory,
//! Postgres, ...) implements `Storer`. Modeled as an `async_trait` the
//! way `0c9c3043_octofhir-server-rs__crates-octofhir-storage-src-traits.rs.rs`
//! shapes its `FhirStorage` trait, with capability-flag methods covering
//! the optional `count`/`multi_get` fallback paths in §4.3/§4.6.

use crate::error::Result;
use crate::item::{Item, ItemId};
use crate::query::Query;
use async_trait::async_trait;
use serde_json::Value;

/// A page of items returned by `find`, per §4.3. `total = -1` means the
/// backend did not compute an exact count (see DESIGN.md's Open Question
/// decision on `Find` semantics).
#[derive(Clone, Debug, Default)]
pub struct ItemList {
    pub total: i64,
    pub limit: Option<u32>,
    pub offset: u32,
    pub items: Vec<Item>,
}

/// The storage adapter contract. Every mutation is expected to be
/// optimistic-concurrency safe: `update`/`delete` take the client's
/// expected `Item` (with its `etag`) and must fail with
/// `Error::Conflict` if the stored item's etag no longer matches.
#[async_trait]
pub trait Storer: Send + Sync {
    /// List/search items matching `query`, per §4.3.
    async fn find(&self, query: &Query) -> Result<ItemList>;

    /// Create a single item. Fails with `Error::Conflict` if the id
    /// already exists.
    async fn insert(&self, item: Item) -> Result<Item>;

    /// Replace or merge an existing item, enforcing optimistic
    /// concurrency against `original`'s etag.
    async fn update(&self, item: Item, original: &Item) -> Result<Item>;

    /// Delete a single item, enforcing optimistic concurrency against
    /// `original`'s etag.
    async fn delete(&self, original: &Item) -> Result<()>;

    /// Bulk-delete everything matching `query`'s predicate, per §4.6's
    /// `Clear` operation.
    async fn clear(&self, query: &Query) -> Result<i64>;

    /// Exact count of items matching `query`'s predicate, independent of
    /// its window. Backends that can't do this cheaply should leave the
    /// default (`Ok(None)`) and report `supports_count() == false`.
    async fn count(&self, _query: &Query) -> Result<Option<i64>> {
        Ok(None)
    }

    /// Fetch several items by id in one round trip, used by reference
    /// embedding (§4.5). Default falls back to one `find` per id.
    async fn multi_get(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let mut query = Query::new();
            query.predicate.push(crate::query::Expr::Equal {
                field: "id".to_string(),
                value: id.to_value(),
            });
            let page = self.find(&query).await?;
            out.extend(page.items);
        }
        Ok(out)
    }

    /// Whether `count` returns an exact value rather than falling back
    /// to `-1`/unknown.
    fn supports_count(&self) -> bool {
        false
    }

    /// Whether `multi_get` is implemented as a genuine batch round trip.
    fn supports_multi_get(&self) -> bool {
        false
    }

    /// Whether this storer implements pagination past what `find`
    /// reports directly, per §4.3's capability-detection fallback.
    fn backend_name(&self) -> &'static str;
}

/// The "no storage defined" placeholder assigned to resources that
/// expose no storer (§4.4, §7's `NotImplemented`/501 case).
pub struct NoStorer;

#[async_trait]
impl Storer for NoStorer {
    async fn find(&self, _query: &Query) -> Result<ItemList> {
        Err(crate::error::Error::NotImplemented)
    }

    async fn insert(&self, _item: Item) -> Result<Item> {
        Err(crate::error::Error::NotImplemented)
    }

    async fn update(&self, _item: Item, _original: &Item) -> Result<Item> {
        Err(crate::error::Error::NotImplemented)
    }

    async fn delete(&self, _original: &Item) -> Result<()> {
        Err(crate::error::Error::NotImplemented)
    }

    async fn clear(&self, _query: &Query) -> Result<i64> {
        Err(crate::error::Error::NotImplemented)
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_storer_returns_not_implemented() {
        let storer = NoStorer;
        let err = storer.find(&Query::new()).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::NotImplemented));
    }
}
