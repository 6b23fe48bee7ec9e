//! sqlsema - semantic analysis for SQL expressions
//!
//! Validates parsed scalar, boolean and aggregate expressions against a
//! schema catalog: reference resolution, type checking, and GROUP BY
//! membership.
//!
//! ```
//! use sqlsema::{analyze, AnalyzerConfig, Catalog, DataType, Expr};
//!
//! let mut catalog = Catalog::new();
//! catalog.add_table("employee", "e").unwrap();
//! catalog.add_attribute("employee", "salary", DataType::Int).unwrap();
//!
//! let expr = Expr::sum(Expr::ident("e", "salary"));
//! let report = analyze(&expr, &catalog, &AnalyzerConfig::default());
//! assert_eq!(report.into_result().unwrap(), DataType::Int);
//! ```

pub mod analyzer;
pub mod catalog;
pub mod error;
pub mod expr;
pub mod types;

pub use analyzer::{
    analyze, check_type, in_group_by, validate_tree, AnalysisReport, AnalyzerConfig, Diagnostic,
    DiagnosticKind, NodePath, PassOutcome, Severity,
};
pub use catalog::{Catalog, CatalogView};
pub use error::{Result, SemaError};
pub use expr::{BinaryOp, Expr, Identifier, UnaryOp};
pub use types::DataType;
