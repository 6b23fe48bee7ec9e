//! Structured diagnostics returned alongside each pass result.

use std::fmt;

use tracing::debug;

use crate::expr::Expr;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// Which rule a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Unresolved table or attribute.
    Structural,
    /// Operand types an operator does not accept.
    Type,
    /// Non-aggregated column missing from GROUP BY.
    Grouping,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Structural => "structural",
            DiagnosticKind::Type => "type",
            DiagnosticKind::Grouping => "grouping",
        })
    }
}

/// Child-index path from the root to a node. The root is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Creates the path of the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns the child indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns the node this path points to inside `root`.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a Expr) -> Option<&'a Expr> {
        root.node_at(&self.0)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        NodePath(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// A problem found at one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Where the failing node sits in the analyzed tree.
    pub path: NodePath,
    /// The failing node alone, children elided (see [`Expr::shape`]).
    pub node: String,
}

impl Diagnostic {
    /// Returns whether this diagnostic has error severity.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "{severity}[{}] at {} {}: {}",
            self.kind, self.path, self.node, self.message
        )
    }
}

/// Result of one pass over a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome<T> {
    /// Value computed for the root node.
    pub value: T,
    /// Diagnostics in the order the nodes reported them.
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> PassOutcome<T> {
    /// Returns whether any diagnostic has error severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Collects diagnostics while a pass walks the tree, tracking the current
/// node path.
pub(crate) struct Reporter {
    kind: DiagnosticKind,
    path: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub(crate) fn new(kind: DiagnosticKind) -> Self {
        Reporter {
            kind,
            path: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Runs `visit` with the path extended by `index`.
    pub(crate) fn descend<R>(&mut self, index: usize, visit: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(index);
        let result = visit(self);
        self.path.pop();
        result
    }

    pub(crate) fn error(&mut self, node: &Expr, message: String) {
        self.push(Severity::Error, node, message);
    }

    pub(crate) fn warning(&mut self, node: &Expr, message: String) {
        self.push(Severity::Warning, node, message);
    }

    fn push(&mut self, severity: Severity, node: &Expr, message: String) {
        let path = NodePath(self.path.clone());
        let node = node.shape();
        debug!(kind = %self.kind, ?severity, %path, %node, "{message}");
        self.diagnostics.push(Diagnostic {
            severity,
            kind: self.kind,
            message,
            path,
            node,
        });
    }

    pub(crate) fn finish<T>(self, value: T) -> PassOutcome<T> {
        PassOutcome {
            value,
            diagnostics: self.diagnostics,
        }
    }
}
