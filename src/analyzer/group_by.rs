//! GROUP BY membership checking for projected expressions.

use tracing::debug_span;

use crate::catalog::CatalogView;
use crate::expr::{Expr, Identifier, UnaryOp};

use super::diagnostic::{DiagnosticKind, PassOutcome, Reporter};

/// Checks that every non-aggregated column in `expr` is grouped.
///
/// `sum`, `avg` and `!` exempt their whole subtree: the child is never
/// visited and the node is always accepted.
///
/// Recursion follows the tree, so a tree deeper than the thread's stack can
/// hold overflows it; [`analyze`](super::analyze) rejects such trees up front
/// through [`AnalyzerConfig::max_depth`](super::AnalyzerConfig::max_depth).
#[must_use]
pub fn in_group_by(expr: &Expr, catalog: &dyn CatalogView) -> PassOutcome<bool> {
    let _span = debug_span!("in_group_by", nodes = expr.node_count()).entered();
    let mut reporter = Reporter::new(DiagnosticKind::Grouping);
    let grouped = check_node(expr, catalog, &mut reporter);
    reporter.finish(grouped)
}

fn check_node(expr: &Expr, catalog: &dyn CatalogView, reporter: &mut Reporter) -> bool {
    match expr {
        Expr::Bool(_) | Expr::Int(_) | Expr::Double(_) | Expr::String(_) => true,
        Expr::Identifier(ident) => check_identifier(expr, ident, catalog, reporter),
        Expr::Unary { op, .. } => match op {
            UnaryOp::Not | UnaryOp::Sum | UnaryOp::Avg => true,
        },
        Expr::Binary { lhs, rhs, .. } => {
            let left = reporter.descend(0, |r| check_node(lhs, catalog, r));
            let right = reporter.descend(1, |r| check_node(rhs, catalog, r));
            left && right
        }
    }
}

fn check_identifier(
    node: &Expr,
    ident: &Identifier,
    catalog: &dyn CatalogView,
    reporter: &mut Reporter,
) -> bool {
    if catalog.is_group_by_column(&ident.table, &ident.attribute) {
        return true;
    }
    reporter.error(
        node,
        format!(
            "selected attribute '{}' of table '{}' is not in the GROUP BY clause",
            ident.attribute, ident.table
        ),
    );
    false
}
