//! Semantic analysis of expression trees.
//!
//! Three independent passes walk a tree against a read-only catalog:
//! - [`validate_tree`]: table and attribute references resolve
//! - [`check_type`]: operand types are accepted by every operator
//! - [`in_group_by`]: projected columns appear in the GROUP BY clause
//!
//! No pass stops at the first problem. Each returns its value for the root
//! together with every diagnostic found, and the caller decides what is fatal.

mod diagnostic;
mod group_by;
mod type_check;
mod validate;

use tracing::{debug_span, warn};

use crate::catalog::CatalogView;
use crate::error::{Result, SemaError};
use crate::expr::Expr;
use crate::types::DataType;

pub use diagnostic::{Diagnostic, DiagnosticKind, NodePath, PassOutcome, Severity};
pub use group_by::in_group_by;
pub use type_check::{binary_rule, check_type, unary_rule};
pub use validate::validate_tree;

/// Configuration for [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Run the GROUP BY membership pass.
    pub check_grouping: bool,
    /// Maximum diagnostics kept in a report (0 = unlimited).
    pub max_diagnostics: usize,
    /// Deepest tree the passes will walk (0 = unlimited). Deeper trees are
    /// rejected with one structural error instead of being traversed.
    pub max_depth: usize,
}

/// Default for [`AnalyzerConfig::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 1024;

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            check_grouping: true,
            max_diagnostics: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new analyzer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the GROUP BY pass.
    #[must_use]
    pub fn with_check_grouping(mut self, check_grouping: bool) -> Self {
        self.check_grouping = check_grouping;
        self
    }

    /// Sets the maximum number of diagnostics kept.
    #[must_use]
    pub fn with_max_diagnostics(mut self, max_diagnostics: usize) -> Self {
        self.max_diagnostics = max_diagnostics;
        self
    }

    /// Sets the deepest tree the passes will walk.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Combined result of all passes over one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Result of [`validate_tree`].
    pub valid: bool,
    /// Result of [`check_type`].
    pub data_type: Option<DataType>,
    /// Result of [`in_group_by`], or `None` when the pass was disabled.
    pub grouped: Option<bool>,
    /// Diagnostics of every pass, in pass order.
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics dropped because of [`AnalyzerConfig::max_diagnostics`].
    pub truncated: usize,
}

impl AnalysisReport {
    /// Returns whether every enabled pass accepted the expression.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.valid
            && self.data_type.is_some_and(|ty| ty.is_well_typed())
            && self.grouped != Some(false)
    }

    /// Returns the error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Converts the report into the expression type, or an error listing
    /// every error diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`SemaError::AnalysisFailed`] if any pass rejected the
    /// expression.
    pub fn into_result(self) -> Result<DataType> {
        if self.is_ok() {
            if let Some(ty) = self.data_type {
                return Ok(ty);
            }
        }
        let mut errors: Vec<String> = self.errors().map(ToString::to_string).collect();
        if self.data_type.is_none() {
            errors.push("expression has no declared type".to_string());
        }
        if self.truncated > 0 {
            errors.push(format!("{} more diagnostic(s) omitted", self.truncated));
        }
        Err(SemaError::AnalysisFailed { errors })
    }
}

/// Runs every enabled pass over `expr`, in the order validate, type check,
/// grouping.
///
/// A tree deeper than [`AnalyzerConfig::max_depth`] is not traversed; the
/// report then holds a single structural error at the root.
#[must_use]
pub fn analyze(expr: &Expr, catalog: &dyn CatalogView, config: &AnalyzerConfig) -> AnalysisReport {
    let _span = debug_span!("analyze", check_grouping = config.check_grouping).entered();

    let depth = expr.depth();
    if config.max_depth > 0 && depth > config.max_depth {
        warn!(depth, max_depth = config.max_depth, "expression too deep to analyze");
        return AnalysisReport {
            valid: false,
            data_type: None,
            grouped: None,
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                kind: DiagnosticKind::Structural,
                message: format!(
                    "expression depth {depth} exceeds the limit of {}",
                    config.max_depth
                ),
                path: NodePath::root(),
                node: expr.shape(),
            }],
            truncated: 0,
        };
    }

    let validated = validate_tree(expr, catalog);
    let typed = check_type(expr, catalog);
    let grouping = config.check_grouping.then(|| in_group_by(expr, catalog));

    let mut diagnostics = validated.diagnostics;
    diagnostics.extend(typed.diagnostics);
    let grouped = grouping.map(|outcome| {
        diagnostics.extend(outcome.diagnostics);
        outcome.value
    });

    let mut truncated = 0;
    if config.max_diagnostics > 0 && diagnostics.len() > config.max_diagnostics {
        truncated = diagnostics.len() - config.max_diagnostics;
        diagnostics.truncate(config.max_diagnostics);
    }

    AnalysisReport {
        valid: validated.value,
        data_type: typed.value,
        grouped,
        diagnostics,
        truncated,
    }
}

impl Expr {
    /// See [`validate_tree`].
    #[must_use]
    pub fn validate_tree(&self, catalog: &dyn CatalogView) -> PassOutcome<bool> {
        validate_tree(self, catalog)
    }

    /// See [`check_type`].
    #[must_use]
    pub fn check_type(&self, catalog: &dyn CatalogView) -> PassOutcome<Option<DataType>> {
        check_type(self, catalog)
    }

    /// See [`in_group_by`].
    #[must_use]
    pub fn in_group_by(&self, catalog: &dyn CatalogView) -> PassOutcome<bool> {
        in_group_by(self, catalog)
    }
}
