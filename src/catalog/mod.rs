//! Catalog for resolving tables, attributes and GROUP BY columns.

mod schema;
mod view;

pub use schema::{type_key, Catalog, GroupByColumn};
pub use view::CatalogView;
