//! Type vocabulary shared by the catalog and the type checker.

mod data_type;

pub use data_type::{describe, DataType};
