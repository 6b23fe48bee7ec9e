//! Expression tree definitions.

/// A parsed scalar, boolean, or aggregate expression.
///
/// Every internal node exclusively owns its children, so a tree is acyclic
/// and has no sharing. Arity is fixed by the node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Double(f64),
    /// String literal, already stripped of its delimiters.
    String(String),
    /// Column reference.
    Identifier(Identifier),
    /// Negation or aggregation of a single child.
    Unary { op: UnaryOp, child: Box<Expr> },
    /// Arithmetic, comparison, or disjunction of two children.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Column reference as written in the query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Full table name or its registered abbreviation.
    pub table: String,
    /// Attribute name.
    pub attribute: String,
}

impl Identifier {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(table: impl Into<String>, attribute: impl Into<String>) -> Self {
        Identifier {
            table: table.into(),
            attribute: attribute.into(),
        }
    }
}

/// Single-child operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Sum,
    Avg,
}

impl UnaryOp {
    /// Returns the name used when rendering this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Sum => "sum",
            UnaryOp::Avg => "avg",
        }
    }

    /// Returns whether this operator aggregates rows.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(self, UnaryOp::Sum | UnaryOp::Avg)
    }
}

/// Two-child operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Gt,
    Lt,
    Eq,
    Neq,
    Or,
}

impl BinaryOp {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Or => "||",
        }
    }

    /// Returns whether this is one of `+ - * /`.
    #[must_use]
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide
        )
    }

    /// Returns whether this is one of `> < == !=`.
    #[must_use]
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Eq | BinaryOp::Neq
        )
    }
}

impl Expr {
    /// Creates a boolean literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Expr::Bool(value)
    }

    /// Creates an integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Expr::Int(value)
    }

    /// Creates a floating point literal.
    #[must_use]
    pub fn double(value: f64) -> Self {
        Expr::Double(value)
    }

    /// Creates a string literal from unquoted text.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Expr::String(value.into())
    }

    /// Creates a string literal from a raw token such as `'abc'`, stripping
    /// exactly one leading and one trailing delimiter.
    ///
    /// # Panics
    ///
    /// Panics if the token is shorter than two characters or does not end
    /// with the delimiter it starts with. The lexer guarantees well-formed
    /// tokens, so a malformed one is a caller bug.
    #[must_use]
    pub fn string_from_token(raw: &str) -> Self {
        let mut chars = raw.chars();
        match (chars.next(), chars.next_back()) {
            (Some(open), Some(close)) if open == close => {
                Expr::String(chars.as_str().to_string())
            }
            _ => panic!("string literal token {raw:?} is not enclosed in matching delimiters"),
        }
    }

    /// Creates a column reference.
    #[must_use]
    pub fn ident(table: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::Identifier(Identifier::new(table, attribute))
    }

    /// Creates a unary node.
    #[must_use]
    pub fn unary(op: UnaryOp, child: Expr) -> Self {
        Expr::Unary {
            op,
            child: Box::new(child),
        }
    }

    /// Creates a binary node.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    #[must_use]
    pub fn not(child: Expr) -> Self {
        Self::unary(UnaryOp::Not, child)
    }

    #[must_use]
    pub fn sum(child: Expr) -> Self {
        Self::unary(UnaryOp::Sum, child)
    }

    #[must_use]
    pub fn avg(child: Expr) -> Self {
        Self::unary(UnaryOp::Avg, child)
    }

    #[must_use]
    pub fn plus(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Plus, lhs, rhs)
    }

    #[must_use]
    pub fn minus(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Minus, lhs, rhs)
    }

    #[must_use]
    pub fn times(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Times, lhs, rhs)
    }

    #[must_use]
    pub fn divide(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Divide, lhs, rhs)
    }

    #[must_use]
    pub fn gt(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Gt, lhs, rhs)
    }

    #[must_use]
    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Lt, lhs, rhs)
    }

    #[must_use]
    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Eq, lhs, rhs)
    }

    #[must_use]
    pub fn neq(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Neq, lhs, rhs)
    }

    #[must_use]
    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Or, lhs, rhs)
    }

    /// Returns whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Expr::Bool(_) | Expr::Int(_) | Expr::Double(_) | Expr::String(_) | Expr::Identifier(_)
        )
    }

    /// Returns the direct children in order (left before right).
    #[must_use]
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Unary { child, .. } => vec![child.as_ref()],
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Follows a child-index path from this node.
    ///
    /// Returns `None` if the path leaves the tree.
    #[must_use]
    pub fn node_at(&self, path: &[usize]) -> Option<&Expr> {
        path.iter()
            .try_fold(self, |node, &index| node.children().get(index).copied())
    }

    /// Walks the tree in pre-order without recursion, pairing each node with
    /// its depth (the root is at depth 1).
    #[must_use]
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![(self, 1)],
        }
    }

    /// Returns the number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Returns the height of the tree; a single leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes().map(|(_, depth)| depth).max().unwrap_or(1)
    }

    /// Returns every column reference in pre-order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&Identifier> {
        self.nodes()
            .filter_map(|(node, _)| match node {
                Expr::Identifier(ident) => Some(ident),
                _ => None,
            })
            .collect()
    }

    /// Returns whether any node in the tree is `sum` or `avg`.
    #[must_use]
    pub fn contains_aggregate(&self) -> bool {
        self.nodes()
            .any(|(node, _)| matches!(node, Expr::Unary { op, .. } if op.is_aggregate()))
    }

    /// Moves every non-leaf child into `out`, leaving a leaf in its place.
    fn detach_children(&mut self, out: &mut Vec<Expr>) {
        let mut detach = |slot: &mut Expr| {
            if !slot.is_leaf() {
                out.push(std::mem::replace(slot, Expr::Bool(false)));
            }
        };
        match self {
            Expr::Unary { child, .. } => detach(child.as_mut()),
            Expr::Binary { lhs, rhs, .. } => {
                detach(lhs.as_mut());
                detach(rhs.as_mut());
            }
            _ => {}
        }
    }
}

// Frees nested children from an explicit stack, one level at a time.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

/// Pre-order iterator returned by [`Expr::nodes`].
#[derive(Debug)]
pub struct Nodes<'a> {
    stack: Vec<(&'a Expr, usize)>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (&'a Expr, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        match node {
            Expr::Unary { child, .. } => self.stack.push((child.as_ref(), depth + 1)),
            Expr::Binary { lhs, rhs, .. } => {
                self.stack.push((rhs.as_ref(), depth + 1));
                self.stack.push((lhs.as_ref(), depth + 1));
            }
            _ => {}
        }
        Some((node, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_from_token_strips_delimiters() {
        assert_eq!(Expr::string_from_token("'abc'"), Expr::string("abc"));
        assert_eq!(Expr::string_from_token("\"x y\""), Expr::string("x y"));
        assert_eq!(Expr::string_from_token("''"), Expr::string(""));
    }

    #[test]
    fn test_string_from_token_strips_only_one_pair() {
        assert_eq!(Expr::string_from_token("''a''"), Expr::string("'a'"));
    }

    #[test]
    #[should_panic(expected = "matching delimiters")]
    fn test_string_from_token_missing_trailing_delimiter() {
        let _ = Expr::string_from_token("'abc");
    }

    #[test]
    #[should_panic(expected = "matching delimiters")]
    fn test_string_from_token_single_char() {
        let _ = Expr::string_from_token("'");
    }

    #[test]
    fn test_shape_helpers() {
        let expr = Expr::plus(
            Expr::sum(Expr::ident("e", "salary")),
            Expr::times(Expr::int(2), Expr::ident("d", "budget")),
        );
        assert_eq!(expr.node_count(), 6);
        assert_eq!(expr.depth(), 3);
        assert!(expr.contains_aggregate());
        assert!(!expr.is_leaf());

        let idents = expr.identifiers();
        assert_eq!(idents.len(), 2);
        assert_eq!(idents[0], &Identifier::new("e", "salary"));
        assert_eq!(idents[1], &Identifier::new("d", "budget"));
    }

    #[test]
    fn test_node_at() {
        let expr = Expr::gt(Expr::ident("e", "age"), Expr::not(Expr::boolean(true)));
        assert_eq!(expr.node_at(&[]), Some(&expr));
        assert_eq!(expr.node_at(&[1, 0]), Some(&Expr::boolean(true)));
        assert_eq!(expr.node_at(&[1, 1]), None);
        assert_eq!(expr.node_at(&[0, 0]), None);
    }

    #[test]
    fn test_operator_categories() {
        assert!(BinaryOp::Divide.is_arithmetic());
        assert!(!BinaryOp::Or.is_arithmetic());
        assert!(BinaryOp::Neq.is_comparison());
        assert!(!BinaryOp::Plus.is_comparison());
        assert!(UnaryOp::Avg.is_aggregate());
        assert!(!UnaryOp::Not.is_aggregate());
    }

    #[test]
    fn test_nodes_pre_order_with_depth() {
        let expr = Expr::gt(Expr::ident("e", "age"), Expr::not(Expr::boolean(true)));
        let walked: Vec<(String, usize)> = expr
            .nodes()
            .map(|(node, depth)| (node.shape(), depth))
            .collect();
        assert_eq!(
            walked,
            vec![
                ("> (…, …)".to_string(), 1),
                ("[e_age]".to_string(), 2),
                ("!(…)".to_string(), 2),
                ("bool[true]".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_deep_chain_helpers_and_drop() {
        let levels = 200_000;
        let chain = (0..levels).fold(Expr::int(0), |acc, _| Expr::minus(acc, Expr::int(1)));
        assert_eq!(chain.node_count(), 2 * levels + 1);
        assert_eq!(chain.depth(), levels + 1);
        assert!(!chain.contains_aggregate());
        assert!(chain.identifiers().is_empty());
        drop(chain);
    }
}
