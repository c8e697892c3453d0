//! C4 — `Resource`: a node in the resource tree, per §3/§4.4.

use crate::error::Result;
use crate::item::{Item, ItemId};
use crate::query::Query;
use crate::router::ResourcePath;
use crate::schema::Schema;
use crate::storer::{NoStorer, Storer};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// The operation a request dispatches to, gating `ResourceConf::allowed_modes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    List,
    Create,
    Read,
    Replace,
    Update,
    Delete,
    Clear,
}

/// Pagination defaults/limits and allowed modes for a resource.
#[derive(Clone, Debug)]
pub struct ResourceConf {
    pub allowed_modes: HashSet<Mode>,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for ResourceConf {
    fn default() -> Self {
        Self {
            allowed_modes: [Mode::List, Mode::Create, Mode::Read, Mode::Replace, Mode::Update, Mode::Delete, Mode::Clear]
                .into_iter()
                .collect(),
            default_limit: 20,
            max_limit: 1000,
        }
    }
}

/// Lifecycle hooks fired by C6 around storage calls (§4.4). All methods
/// default to no-ops the way `Storer`'s optional `count`/`multi_get`
/// default out of the box; a host overrides only what it needs.
#[async_trait]
pub trait Hooks: Send + Sync {
    async fn authorize(&self, _path: &ResourcePath, _mode: Mode) -> Result<()> {
        Ok(())
    }
    async fn on_found(&self, _path: &ResourcePath) -> Result<()> {
        Ok(())
    }
    async fn on_got(&self, _item: &mut Item) -> Result<()> {
        Ok(())
    }
    async fn on_got_list(&self, _items: &mut [Item]) -> Result<()> {
        Ok(())
    }
    async fn on_insert(&self, _item: &mut Item) -> Result<()> {
        Ok(())
    }
    async fn on_inserted(&self, _item: &Item) -> Result<()> {
        Ok(())
    }
    async fn on_update(&self, _item: &mut Item, _original: &Item) -> Result<()> {
        Ok(())
    }
    async fn on_updated(&self, _item: &Item) -> Result<()> {
        Ok(())
    }
    async fn on_delete(&self, _original: &Item) -> Result<()> {
        Ok(())
    }
    async fn on_deleted(&self, _original: &Item) -> Result<()> {
        Ok(())
    }
    async fn on_clear(&self, _query: &Query) -> Result<()> {
        Ok(())
    }
    async fn on_cleared(&self, _count: i64) -> Result<()> {
        Ok(())
    }
}

/// The default hook set: authorizes everything, observes nothing.
pub struct NoopHooks;

impl Hooks for NoopHooks {}

/// A named node in the resource tree.
pub struct Resource {
    pub name: String,
    pub parent_field_name: Option<String>,
    pub schema: Schema,
    pub storer: Arc<dyn Storer>,
    pub conf: ResourceConf,
    pub hooks: Arc<dyn Hooks>,
    pub children: Vec<Resource>,
}

impl Resource {
    /// Build a resource bound to a storer. Use [`Resource::without_storer`]
    /// for one whose dispatches should all yield `NotImplemented`/501.
    pub fn new(name: impl Into<String>, schema: Schema, storer: Arc<dyn Storer>) -> Self {
        Self {
            name: name.into(),
            parent_field_name: None,
            schema,
            storer,
            conf: ResourceConf::default(),
            hooks: Arc::new(NoopHooks),
            children: Vec::new(),
        }
    }

    pub fn without_storer(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, schema, Arc::new(NoStorer))
    }

    /// Declare this resource as a child bound to `parent_field`; the
    /// field's validator must be `Reference{target=parent-path}` (§3's
    /// invariant, checked by `Index::bind`).
    pub fn as_child_of(mut self, parent_field: impl Into<String>) -> Self {
        self.parent_field_name = Some(parent_field.into());
        self
    }

    pub fn with_conf(mut self, conf: ResourceConf) -> Self {
        self.conf = conf;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn Hooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_child(mut self, child: Resource) -> Self {
        self.children.push(child);
        self
    }

    pub fn get_child(&self, name: &str) -> Option<&Resource> {
        self.children.iter().find(|r| r.name == name)
    }

    pub fn allows(&self, mode: Mode) -> bool {
        self.conf.allowed_modes.contains(&mode)
    }
}

/// Coerce a URL id segment through this resource's `id` field validator.
/// URL segments arrive as strings; an `Integer` id field additionally
/// needs the segment parsed as a number before validation.
pub fn coerce_id(resource: &Resource, raw: &str) -> Option<ItemId> {
    let id_field = resource.schema.get("id")?;
    let value = match &id_field.validator {
        crate::schema::Validator::Integer { .. } => {
            serde_json::Value::Number(raw.parse::<i64>().ok()?.into())
        }
        _ => serde_json::Value::String(raw.to_string()),
    };
    let coerced = id_field.validator.validate(&value).ok()?;
    ItemId::from_value(&coerced)
}
