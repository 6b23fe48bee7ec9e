//! Read-only catalog interface consumed by the analyzer.

/// Schema lookups the analysis passes need.
///
/// Implementations must behave as an immutable snapshot for the duration of
/// a pass: the same question must always get the same answer.
pub trait CatalogView {
    /// Resolves a full table name or an abbreviation to the full table name.
    fn resolve_full_name(&self, name_or_abbrev: &str) -> Option<&str>;

    /// Returns the abbreviation registered for a full table name.
    fn resolve_abbreviation(&self, table_name: &str) -> Option<&str>;

    /// Returns whether the name or abbreviation refers to a known table.
    fn table_exists(&self, name_or_abbrev: &str) -> bool {
        self.resolve_full_name(name_or_abbrev).is_some()
    }

    /// Returns whether the attribute is declared for the table, keyed either
    /// by the reference as written or by its resolved full name.
    fn attribute_exists(&self, name_or_abbrev: &str, attribute: &str) -> bool;

    /// Returns the raw declared type string stored for `table.attribute`.
    fn declared_type(&self, full_table_name: &str, attribute: &str) -> Option<&str>;

    /// Returns whether `(table, attribute)` or `(full name, attribute)` is a
    /// registered GROUP BY column.
    fn is_group_by_column(&self, name_or_full_name: &str, attribute: &str) -> bool;
}
