//! resthive-core — the request-processing pipeline for exposing
//! hierarchical resource collections over HTTP as a uniform REST API.
//!
//! # Architecture
//!
//! The request processing pipeline:
//!
//! 1. **Schema & Validators** (`schema`) — field validation/coercion,
//!    referential integrity hooks.
//! 2. **Query language** (`query`) — filter/projection/sort mini-languages.
//! 3. **Storer contract** (`storer`) — the async storage adapter trait.
//! 4. **Resource & Index** (`resource`, `index`) — the resource tree.
//! 5. **Router** (`router`) — URL → `ResourcePath`.
//! 6. **Method handlers** (`handlers`) — per-HTTP-method state machine.
//! 7. **Response shaping** (`response`) — projection, embedding, etags.
//!
//! Storage backends (`resthive-mem`, `resthive-sql`), the OpenAPI
//! emitter (`resthive-openapi`), and server binding (`resthive-server`)
//! all depend on this crate; it has no knowledge of any of them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod index;
pub mod item;
pub mod json_patch;
pub mod query;
pub mod resource;
pub mod response;
pub mod router;
pub mod schema;
pub mod storer;

pub use config::{AppConfig, LogLevel};
pub use error::{Error, Result};
pub use index::Index;
pub use item::{ETag, Item, ItemId};
pub use query::{Predicate, Projection, Query, Window};
pub use resource::{Hooks, Mode, NoopHooks, Resource, ResourceConf};
pub use router::{route, ResourcePath};
pub use schema::{Field, ReferenceChecker, ReferencePath, Schema, Validator, ValueProducer};
pub use storer::{ItemList, NoStorer, Storer};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use super::handlers::{self, Outcome, RequestHeaders};
    pub use super::index::Index;
    pub use super::item::{ETag, Item, ItemId};
    pub use super::query::{Predicate, Projection, Query, Window};
    pub use super::resource::{Hooks, Mode, NoopHooks, Resource, ResourceConf};
    pub use super::router::{route, ResourcePath};
    pub use super::schema::{Field, ReferenceChecker, Schema, Validator};
    pub use super::storer::{ItemList, Storer};
    pub use super::config::AppConfig;
}
