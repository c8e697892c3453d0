//! `MemStorer`: an in-memory `resthive_core::Storer`, the same role
//! `mem.NewHandler()` plays in the Go test suite — a storage adapter with
//! no external dependencies, used for unit tests and local demos.

use async_trait::async_trait;
use resthive_core::error::{Error, Result};
use resthive_core::item::{Item, ItemId};
use resthive_core::query::{compare_by_sort, matches_predicate, Query};
use resthive_core::storer::{ItemList, Storer};
use tokio::sync::RwLock;

/// A `Storer` backed by a single in-memory `Vec<Item>` guarded by a
/// `tokio::sync::RwLock`. Every operation scans the full vector — fine
/// for tests and small demos, not meant for production scale.
pub struct MemStorer {
    items: RwLock<Vec<Item>>,
}

impl MemStorer {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Seed the storer with items, e.g. fixtures loaded before a test run.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

impl Default for MemStorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storer for MemStorer {
    async fn find(&self, query: &Query) -> Result<ItemList> {
        let items = self.items.read().await;
        let mut matched: Vec<Item> = items
            .iter()
            .filter(|item| matches_predicate(&query.predicate, &item.payload))
            .cloned()
            .collect();

        if !query.sort.is_empty() {
            matched.sort_by(|a, b| compare_by_sort(&query.sort, &a.payload, &b.payload));
        }

        let total = matched.len() as i64;
        let offset = query.window.offset as usize;
        let page: Vec<Item> = match query.window.limit {
            Some(limit) => matched
                .into_iter()
                .skip(offset)
                .take(limit as usize)
                .collect(),
            None => matched.into_iter().skip(offset).collect(),
        };

        Ok(ItemList {
            total,
            limit: query.window.limit,
            offset: query.window.offset,
            items: page,
        })
    }

    async fn insert(&self, item: Item) -> Result<Item> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(Error::Conflict);
        }
        items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, item: Item, original: &Item) -> Result<Item> {
        let mut items = self.items.write().await;
        let slot = items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or_else(|| Error::NotFound(item.id.to_string()))?;

        if slot.etag != original.etag {
            return Err(Error::PreconditionFailed);
        }
        *slot = item.clone();
        Ok(item)
    }

    async fn delete(&self, original: &Item) -> Result<()> {
        let mut items = self.items.write().await;
        let index = items
            .iter()
            .position(|existing| existing.id == original.id)
            .ok_or_else(|| Error::NotFound(original.id.to_string()))?;

        if items[index].etag != original.etag {
            return Err(Error::PreconditionFailed);
        }
        items.remove(index);
        Ok(())
    }

    async fn clear(&self, query: &Query) -> Result<i64> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| !matches_predicate(&query.predicate, &item.payload));
        Ok((before - items.len()) as i64)
    }

    async fn count(&self, query: &Query) -> Result<Option<i64>> {
        let items = self.items.read().await;
        let count = items
            .iter()
            .filter(|item| matches_predicate(&query.predicate, &item.payload))
            .count();
        Ok(Some(count as i64))
    }

    async fn multi_get(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }

    fn supports_count(&self) -> bool {
        true
    }

    fn supports_multi_get(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
