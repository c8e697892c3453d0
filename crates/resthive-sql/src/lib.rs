//! PostgreSQL storage adapter: SQL builder plus a `Storer` implementation.
//!
//! Provides a safe way to construct SQL queries without string concatenation,
//! using parameterized queries to prevent SQL injection.

mod builder;
mod expr;
pub mod identifier;
mod param;
mod select;
mod insert;
mod update;
mod delete;
mod storer;

pub use builder::{SqlBuilder, SqlFragment};
pub use expr::{Expr, OrderExpr};
pub use identifier::{escape_ident, quote_literal, from_qi, QualifiedIdentifier};
pub use param::SqlParam;
pub use select::SelectBuilder;
pub use insert::InsertBuilder;
pub use update::UpdateBuilder;
pub use delete::DeleteBuilder;
pub use storer::PgStorer;

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        SqlBuilder, SqlFragment, SqlParam,
        SelectBuilder, InsertBuilder, UpdateBuilder, DeleteBuilder,
        Expr, OrderExpr,
        escape_ident, quote_literal, from_qi,
        PgStorer,
    };
}
