//! Expression tree for scalar, boolean and aggregate SQL expressions.
//!
//! Trees are built once by the parser and then read by the analysis passes
//! in [`crate::analyzer`].

mod ast;
mod render;

pub use ast::{BinaryOp, Expr, Identifier, Nodes, UnaryOp};
