//! Type inference and checking.
//!
//! Literals have fixed types; identifiers take the type declared in the
//! catalog; operators combine child types through [`binary_rule`] and
//! [`unary_rule`]. A result of [`DataType::None`] marks a subtree as not well
//! typed and is carried upward unchanged.

use tracing::debug_span;

use crate::catalog::CatalogView;
use crate::expr::{BinaryOp, Expr, Identifier, UnaryOp};
use crate::types::{describe, DataType};

use super::diagnostic::{DiagnosticKind, PassOutcome, Reporter};

/// Infers the type of `expr`.
///
/// The value is `None` when the root has no type at all (an identifier
/// without a declared type), and `Some(DataType::None)` when an operator
/// rejected its operands. Callers must treat both as a failure.
///
/// Recursion follows the tree, so a tree deeper than the thread's stack can
/// hold overflows it; [`analyze`](super::analyze) rejects such trees up front
/// through [`AnalyzerConfig::max_depth`](super::AnalyzerConfig::max_depth).
#[must_use]
pub fn check_type(expr: &Expr, catalog: &dyn CatalogView) -> PassOutcome<Option<DataType>> {
    let _span = debug_span!("check_type", nodes = expr.node_count()).entered();
    let mut reporter = Reporter::new(DiagnosticKind::Type);
    let ty = infer(expr, catalog, &mut reporter);
    reporter.finish(ty)
}

/// Result type of a binary operator for the given operand types.
#[must_use]
pub fn binary_rule(op: BinaryOp, lhs: Option<DataType>, rhs: Option<DataType>) -> DataType {
    let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
        return DataType::None;
    };
    match op {
        BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide => {
            match (lhs, rhs) {
                (DataType::String, DataType::String) if op == BinaryOp::Plus => DataType::String,
                (DataType::Int, DataType::Int) => DataType::Int,
                (l, r) if l.is_numeric() && r.is_numeric() => DataType::Double,
                _ => DataType::None,
            }
        }
        BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Eq | BinaryOp::Neq => match (lhs, rhs) {
            (DataType::String, DataType::String) => DataType::Bool,
            (l, r) if l.is_numeric() && r.is_numeric() => DataType::Bool,
            _ => DataType::None,
        },
        BinaryOp::Or => match (lhs, rhs) {
            (DataType::Bool, DataType::Bool) => DataType::Bool,
            _ => DataType::None,
        },
    }
}

/// Result type of a unary operator for the given child type.
///
/// `sum` yields `int` even over `double` input, while `avg` always yields
/// `double`.
#[must_use]
pub fn unary_rule(op: UnaryOp, child: Option<DataType>) -> DataType {
    match (op, child) {
        (UnaryOp::Not, Some(DataType::Bool)) => DataType::Bool,
        (UnaryOp::Sum, Some(ty)) if ty.is_numeric() => DataType::Int,
        (UnaryOp::Avg, Some(ty)) if ty.is_numeric() => DataType::Double,
        _ => DataType::None,
    }
}

fn infer(expr: &Expr, catalog: &dyn CatalogView, reporter: &mut Reporter) -> Option<DataType> {
    match expr {
        Expr::Bool(_) => Some(DataType::Bool),
        Expr::Int(_) => Some(DataType::Int),
        Expr::Double(_) => Some(DataType::Double),
        Expr::String(_) => Some(DataType::String),
        Expr::Identifier(ident) => identifier_type(expr, ident, catalog, reporter),
        Expr::Unary { op, child } => {
            let child_ty = reporter.descend(0, |r| infer(child, catalog, r));
            Some(check_unary(expr, *op, child_ty, reporter))
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs_ty = reporter.descend(0, |r| infer(lhs, catalog, r));
            let rhs_ty = reporter.descend(1, |r| infer(rhs, catalog, r));
            let ty = binary_rule(*op, lhs_ty, rhs_ty);
            if ty == DataType::None {
                reporter.error(
                    expr,
                    format!(
                        "type mismatch: {} {} {}",
                        describe(lhs_ty),
                        op.as_str(),
                        describe(rhs_ty)
                    ),
                );
            }
            Some(ty)
        }
    }
}

fn check_unary(
    node: &Expr,
    op: UnaryOp,
    child: Option<DataType>,
    reporter: &mut Reporter,
) -> DataType {
    let ty = unary_rule(op, child);
    if ty != DataType::None {
        return ty;
    }
    match op {
        UnaryOp::Not => {
            reporter.error(node, format!("type mismatch: !({})", describe(child)));
        }
        // sum stays quiet when its argument already failed
        UnaryOp::Sum => {
            if child != Some(DataType::None) {
                reporter.error(
                    node,
                    format!("sum() cannot be applied to {}", describe(child)),
                );
            }
        }
        UnaryOp::Avg => {
            reporter.error(node, format!("type mismatch: avg({})", describe(child)));
        }
    }
    ty
}

fn identifier_type(
    node: &Expr,
    ident: &Identifier,
    catalog: &dyn CatalogView,
    reporter: &mut Reporter,
) -> Option<DataType> {
    let full_name = catalog.resolve_full_name(&ident.table)?;
    let raw = catalog.declared_type(full_name, &ident.attribute)?;
    match raw.parse() {
        Ok(ty) => Some(ty),
        Err(_) => {
            reporter.warning(
                node,
                format!(
                    "attribute '{}.{}' has unrecognized declared type '{raw}'",
                    full_name, ident.attribute
                ),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{type_key, Catalog};

    const NUMERIC: [DataType; 2] = [DataType::Int, DataType::Double];

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_table("employee", "e").unwrap();
        catalog.add_attribute("e", "salary", DataType::Int).unwrap();
        catalog.add_attribute("e", "rate", DataType::Double).unwrap();
        catalog.add_attribute("e", "name", DataType::String).unwrap();
        catalog.add_attribute("e", "active", DataType::Bool).unwrap();
        catalog
    }

    #[test]
    fn test_plus_rules() {
        use DataType::{Bool, Double, Int, String};
        let plus = |l, r| binary_rule(BinaryOp::Plus, Some(l), Some(r));
        assert_eq!(plus(Int, Int), Int);
        assert_eq!(plus(String, String), String);
        assert_eq!(plus(Int, Double), Double);
        assert_eq!(plus(Double, Int), Double);
        assert_eq!(plus(Double, Double), Double);
        assert_eq!(plus(String, Double), DataType::None);
        assert_eq!(plus(Bool, Bool), DataType::None);
    }

    #[test]
    fn test_other_arithmetic_rejects_strings() {
        for op in [BinaryOp::Minus, BinaryOp::Times, BinaryOp::Divide] {
            assert_eq!(
                binary_rule(op, Some(DataType::String), Some(DataType::String)),
                DataType::None
            );
            assert_eq!(
                binary_rule(op, Some(DataType::Int), Some(DataType::String)),
                DataType::None
            );
            assert_eq!(
                binary_rule(op, Some(DataType::Int), Some(DataType::Int)),
                DataType::Int
            );
            assert_eq!(
                binary_rule(op, Some(DataType::Int), Some(DataType::Double)),
                DataType::Double
            );
        }
    }

    #[test]
    fn test_comparison_rules() {
        for op in [BinaryOp::Gt, BinaryOp::Lt, BinaryOp::Eq, BinaryOp::Neq] {
            for l in NUMERIC {
                for r in NUMERIC {
                    assert_eq!(binary_rule(op, Some(l), Some(r)), DataType::Bool);
                }
            }
            assert_eq!(
                binary_rule(op, Some(DataType::String), Some(DataType::String)),
                DataType::Bool
            );
            assert_eq!(
                binary_rule(op, Some(DataType::String), Some(DataType::Int)),
                DataType::None
            );
            assert_eq!(
                binary_rule(op, Some(DataType::Bool), Some(DataType::Bool)),
                DataType::None
            );
        }
    }

    #[test]
    fn test_or_rules() {
        assert_eq!(
            binary_rule(BinaryOp::Or, Some(DataType::Bool), Some(DataType::Bool)),
            DataType::Bool
        );
        assert_eq!(
            binary_rule(BinaryOp::Or, Some(DataType::Bool), Some(DataType::Int)),
            DataType::None
        );
    }

    #[test]
    fn test_absent_and_none_operands_never_type() {
        for op in [BinaryOp::Plus, BinaryOp::Eq, BinaryOp::Or] {
            for other in DataType::ALL {
                assert_eq!(binary_rule(op, None, Some(other)), DataType::None);
                assert_eq!(binary_rule(op, Some(DataType::None), Some(other)), DataType::None);
            }
        }
    }

    #[test]
    fn test_unary_rules() {
        assert_eq!(unary_rule(UnaryOp::Not, Some(DataType::Bool)), DataType::Bool);
        assert_eq!(unary_rule(UnaryOp::Not, Some(DataType::Int)), DataType::None);
        for ty in NUMERIC {
            assert_eq!(unary_rule(UnaryOp::Sum, Some(ty)), DataType::Int);
            assert_eq!(unary_rule(UnaryOp::Avg, Some(ty)), DataType::Double);
        }
        assert_eq!(unary_rule(UnaryOp::Sum, Some(DataType::String)), DataType::None);
        assert_eq!(unary_rule(UnaryOp::Avg, None), DataType::None);
    }

    #[test]
    fn test_identifier_types() {
        let catalog = catalog();
        assert_eq!(check_type(&Expr::ident("e", "rate"), &catalog).value, Some(DataType::Double));
        assert_eq!(
            check_type(&Expr::ident("employee", "name"), &catalog).value,
            Some(DataType::String)
        );
        let outcome = check_type(&Expr::ident("x", "rate"), &catalog);
        assert_eq!(outcome.value, None);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_unrecognized_declared_type_warns() {
        let mut catalog = catalog();
        catalog.put_string(type_key("employee", "hired"), "date");
        let outcome = check_type(&Expr::ident("e", "hired"), &catalog);
        assert_eq!(outcome.value, None);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(!outcome.has_errors());
    }

    #[test]
    fn test_binary_mismatch_names_operands() {
        let expr = Expr::minus(Expr::ident("e", "name"), Expr::int(1));
        let outcome = check_type(&expr, &catalog());
        assert_eq!(outcome.value, Some(DataType::None));
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].message, "type mismatch: string - int");
    }

    #[test]
    fn test_none_cascades_through_binary() {
        let expr = Expr::plus(Expr::minus(Expr::string("a"), Expr::int(1)), Expr::int(2));
        let outcome = check_type(&expr, &catalog());
        assert_eq!(outcome.value, Some(DataType::None));
        assert_eq!(outcome.diagnostics.len(), 2);
        assert_eq!(outcome.diagnostics[1].message, "type mismatch: none + int");
    }

    #[test]
    fn test_sum_suppresses_cascade() {
        let expr = Expr::sum(Expr::minus(Expr::string("a"), Expr::int(1)));
        let outcome = check_type(&expr, &catalog());
        assert_eq!(outcome.value, Some(DataType::None));
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_sum_reports_absent_child() {
        let outcome = check_type(&Expr::sum(Expr::ident("e", "ghost")), &catalog());
        assert_eq!(outcome.value, Some(DataType::None));
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].message, "sum() cannot be applied to absent");
    }

    #[test]
    fn test_avg_does_not_suppress_cascade() {
        let expr = Expr::avg(Expr::minus(Expr::string("a"), Expr::int(1)));
        let outcome = check_type(&expr, &catalog());
        assert_eq!(outcome.value, Some(DataType::None));
        assert_eq!(outcome.diagnostics.len(), 2);
        assert_eq!(outcome.diagnostics[1].message, "type mismatch: avg(none)");
    }

    #[test]
    fn test_not_requires_bool() {
        let catalog = catalog();
        assert_eq!(
            check_type(&Expr::not(Expr::ident("e", "active")), &catalog).value,
            Some(DataType::Bool)
        );
        let outcome = check_type(&Expr::not(Expr::int(0)), &catalog);
        assert_eq!(outcome.value, Some(DataType::None));
        assert_eq!(outcome.diagnostics[0].message, "type mismatch: !(int)");
    }
}
