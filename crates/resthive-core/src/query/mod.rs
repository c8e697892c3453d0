//! C2 — Query language: filter predicate, projection, sort, and window
//! (limit/offset), per §4.2/§3.

mod parser;
mod predicate;
mod projection;
mod sort;

pub use parser::{parse_filter, parse_projection, parse_sort};
pub use predicate::{matches_predicate, Expr, Predicate};
pub use projection::{apply as apply_projection, Projection, ProjectionField};
pub use sort::{compare as compare_by_sort, SortTerm};

/// Pagination bounds for a `List` request, per §4.3.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Window {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// A fully decoded request query: predicate, projection, sort, window.
#[derive(Clone, Debug, Default)]
pub struct Query {
    pub predicate: Predicate,
    pub projection: Option<Projection>,
    pub sort: Vec<SortTerm>,
    pub window: Window,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }
}
