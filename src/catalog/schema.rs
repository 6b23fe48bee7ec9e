//! In-memory catalog: key/value metadata, table abbreviations, GROUP BY list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, SemaError};
use crate::types::DataType;

use super::view::CatalogView;

/// Separator terminating each element of a stored string list.
const LIST_SEPARATOR: char = '#';

/// Returns the metadata key holding the declared type of `table.attribute`.
#[must_use]
pub fn type_key(table: &str, attribute: &str) -> String {
    format!("{table}.{attribute}.type")
}

/// A column registered in the GROUP BY clause of the query being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByColumn {
    /// Table name or abbreviation as written in the GROUP BY clause.
    pub table: String,
    /// Attribute name.
    pub attribute: String,
}

impl GroupByColumn {
    /// Creates a new GROUP BY column entry.
    #[must_use]
    pub fn new(table: impl Into<String>, attribute: impl Into<String>) -> Self {
        GroupByColumn {
            table: table.into(),
            attribute: attribute.into(),
        }
    }
}

/// Central registry of schema metadata.
///
/// Table names and abbreviations form a bijection: every table has exactly
/// one abbreviation, and no string names one table while abbreviating
/// another. A table may use its own name as its abbreviation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Raw metadata such as `employee.salary.type -> int`.
    entries: BTreeMap<String, String>,
    /// Full table name -> abbreviation.
    tables: BTreeMap<String, String>,
    /// Abbreviation -> full table name.
    abbreviations: BTreeMap<String, String>,
    /// GROUP BY columns, in clause order.
    #[serde(default)]
    group_by: Vec<GroupByColumn>,
}

impl Catalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------
    // Key/value metadata
    // -------------------------

    /// Stores a string value, replacing any previous value.
    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the string stored under `key`.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Stores an integer value.
    pub fn put_int(&mut self, key: impl Into<String>, value: i64) {
        self.entries.insert(key.into(), value.to_string());
    }

    /// Returns the integer stored under `key`, or `None` if it is missing or
    /// does not parse as an integer.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.trim().parse().ok()
    }

    /// Stores a list of strings, each element terminated by `#`.
    pub fn put_string_list<S: AsRef<str>>(&mut self, key: impl Into<String>, values: &[S]) {
        let encoded = values.iter().fold(String::new(), |mut acc, value| {
            acc.push_str(value.as_ref());
            acc.push(LIST_SEPARATOR);
            acc
        });
        self.entries.insert(key.into(), encoded);
    }

    /// Returns the list stored under `key`.
    #[must_use]
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.get_string(key).map(|encoded| {
            encoded
                .split_terminator(LIST_SEPARATOR)
                .map(str::to_string)
                .collect()
        })
    }

    // -------------------------
    // Tables and attributes
    // -------------------------

    /// Registers a table together with its abbreviation.
    ///
    /// # Errors
    ///
    /// Returns an error if either string is empty, the table already exists,
    /// or the registration would make a name or abbreviation ambiguous.
    pub fn add_table(&mut self, name: &str, abbreviation: &str) -> Result<()> {
        if name.is_empty() || abbreviation.is_empty() {
            return Err(SemaError::SchemaError(
                "Table name and abbreviation cannot be empty".into(),
            ));
        }
        if self.tables.contains_key(name) {
            return Err(SemaError::SchemaError(format!("Table '{name}' already exists")));
        }
        if let Some(owner) = self.abbreviations.get(abbreviation) {
            return Err(SemaError::SchemaError(format!(
                "Abbreviation '{abbreviation}' is already used by table '{owner}'"
            )));
        }
        if self.tables.contains_key(abbreviation) {
            return Err(SemaError::SchemaError(format!(
                "Abbreviation '{abbreviation}' is the name of another table"
            )));
        }
        if let Some(owner) = self.abbreviations.get(name) {
            return Err(SemaError::SchemaError(format!(
                "Table name '{name}' is already the abbreviation of table '{owner}'"
            )));
        }

        trace!(table = name, abbreviation, "registering table");
        self.tables.insert(name.to_string(), abbreviation.to_string());
        self.abbreviations.insert(abbreviation.to_string(), name.to_string());
        Ok(())
    }

    /// Declares an attribute on a registered table.
    ///
    /// The type is stored under the table's full name even when `table` is
    /// an abbreviation.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is unknown or the attribute name is empty.
    pub fn add_attribute(
        &mut self,
        table: &str,
        attribute: &str,
        data_type: DataType,
    ) -> Result<()> {
        if attribute.is_empty() {
            return Err(SemaError::SchemaError("Attribute name cannot be empty".into()));
        }
        let full_name = self
            .resolve_full_name(table)
            .ok_or_else(|| SemaError::SchemaError(format!("Table '{table}' does not exist")))?
            .to_string();

        trace!(table = %full_name, attribute, %data_type, "declaring attribute");
        self.put_string(type_key(&full_name, attribute), data_type.name());
        Ok(())
    }

    /// Returns `(full name, abbreviation)` pairs ordered by full name.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables
            .iter()
            .map(|(name, abbrev)| (name.as_str(), abbrev.as_str()))
    }

    /// Removes every table registration. Attribute metadata is kept.
    pub fn clear_tables(&mut self) {
        self.tables.clear();
        self.abbreviations.clear();
    }

    // -------------------------
    // GROUP BY list
    // -------------------------

    /// Appends a column to the GROUP BY list.
    pub fn add_group_by_column(&mut self, table: impl Into<String>, attribute: impl Into<String>) {
        let column = GroupByColumn::new(table, attribute);
        trace!(table = %column.table, attribute = %column.attribute, "adding group by column");
        self.group_by.push(column);
    }

    /// Returns the GROUP BY list in clause order.
    #[must_use]
    pub fn group_by_columns(&self) -> &[GroupByColumn] {
        &self.group_by
    }

    /// Empties the GROUP BY list, typically between queries.
    pub fn clear_group_by(&mut self) {
        self.group_by.clear();
    }

    // -------------------------
    // Snapshots
    // -------------------------

    /// Serializes the catalog to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| SemaError::CatalogError(format!("Failed to serialize catalog: {e}")))
    }

    /// Deserializes a catalog from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| SemaError::CatalogError(format!("Failed to deserialize catalog: {e}")))
    }
}

impl CatalogView for Catalog {
    fn resolve_full_name(&self, name_or_abbrev: &str) -> Option<&str> {
        if let Some((name, _)) = self.tables.get_key_value(name_or_abbrev) {
            return Some(name.as_str());
        }
        self.abbreviations.get(name_or_abbrev).map(String::as_str)
    }

    fn resolve_abbreviation(&self, table_name: &str) -> Option<&str> {
        self.tables.get(table_name).map(String::as_str)
    }

    fn attribute_exists(&self, name_or_abbrev: &str, attribute: &str) -> bool {
        if self.entries.contains_key(&type_key(name_or_abbrev, attribute)) {
            return true;
        }
        self.resolve_full_name(name_or_abbrev)
            .is_some_and(|full| self.entries.contains_key(&type_key(full, attribute)))
    }

    fn declared_type(&self, full_table_name: &str, attribute: &str) -> Option<&str> {
        self.get_string(&type_key(full_table_name, attribute))
    }

    fn is_group_by_column(&self, name_or_full_name: &str, attribute: &str) -> bool {
        let full_name = self.resolve_full_name(name_or_full_name);
        self.group_by.iter().any(|column| {
            column.attribute == attribute
                && (column.table == name_or_full_name || Some(column.table.as_str()) == full_name)
        })
    }
}
