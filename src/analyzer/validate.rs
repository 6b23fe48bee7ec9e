//! Structural validation: every column reference must resolve.

use tracing::debug_span;

use crate::catalog::CatalogView;
use crate::expr::{Expr, Identifier};

use super::diagnostic::{DiagnosticKind, PassOutcome, Reporter};

/// Checks that every identifier names a known table and an attribute of it.
///
/// Both children of a binary node are always visited, so one pass reports
/// every unresolved reference in the tree.
///
/// Recursion follows the tree, so a tree deeper than the thread's stack can
/// hold overflows it; [`analyze`](super::analyze) rejects such trees up front
/// through [`AnalyzerConfig::max_depth`](super::AnalyzerConfig::max_depth).
#[must_use]
pub fn validate_tree(expr: &Expr, catalog: &dyn CatalogView) -> PassOutcome<bool> {
    let _span = debug_span!("validate_tree", nodes = expr.node_count()).entered();
    let mut reporter = Reporter::new(DiagnosticKind::Structural);
    let valid = validate_node(expr, catalog, &mut reporter);
    reporter.finish(valid)
}

fn validate_node(expr: &Expr, catalog: &dyn CatalogView, reporter: &mut Reporter) -> bool {
    match expr {
        Expr::Bool(_) | Expr::Int(_) | Expr::Double(_) | Expr::String(_) => true,
        Expr::Identifier(ident) => validate_identifier(expr, ident, catalog, reporter),
        Expr::Unary { child, .. } => reporter.descend(0, |r| validate_node(child, catalog, r)),
        Expr::Binary { lhs, rhs, .. } => {
            let left = reporter.descend(0, |r| validate_node(lhs, catalog, r));
            let right = reporter.descend(1, |r| validate_node(rhs, catalog, r));
            left && right
        }
    }
}

fn validate_identifier(
    node: &Expr,
    ident: &Identifier,
    catalog: &dyn CatalogView,
    reporter: &mut Reporter,
) -> bool {
    if !catalog.table_exists(&ident.table) {
        reporter.error(node, format!("table '{}' does not exist", ident.table));
        return false;
    }
    if !catalog.attribute_exists(&ident.table, &ident.attribute) {
        reporter.error(
            node,
            format!(
                "table '{}' does not have attribute '{}'",
                ident.table, ident.attribute
            ),
        );
        return false;
    }
    true
}
