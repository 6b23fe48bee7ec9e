//! Canonical operator-prefix rendering, e.g. `+ (int[3], double[4.5])`.

use std::fmt;

use super::ast::{Expr, Identifier, UnaryOp};

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}_{}]", self.table, self.attribute)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(value) => write!(f, "bool[{value}]"),
            Expr::Int(value) => write!(f, "int[{value}]"),
            // Debug keeps a trailing `.0` on integral values
            Expr::Double(value) => write!(f, "double[{value:?}]"),
            Expr::String(value) => write!(f, "string[{value}]"),
            Expr::Identifier(ident) => write!(f, "{ident}"),
            Expr::Unary { op, child } => match op {
                UnaryOp::Not => write!(f, "!({child})"),
                UnaryOp::Sum | UnaryOp::Avg => write!(f, "{}({child})", op.as_str()),
            },
            Expr::Binary { op, lhs, rhs } => write!(f, "{} ({lhs}, {rhs})", op.as_str()),
        }
    }
}

impl Expr {
    /// Renders only this node, with `…` standing in for each child.
    #[must_use]
    pub fn shape(&self) -> String {
        match self {
            Expr::Unary {
                op: UnaryOp::Not, ..
            } => "!(…)".to_string(),
            Expr::Unary { op, .. } => format!("{}(…)", op.as_str()),
            Expr::Binary { op, .. } => format!("{} (…, …)", op.as_str()),
            leaf => leaf.to_string(),
        }
    }
}
