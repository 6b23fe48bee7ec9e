//! `DataType` definitions for sqlsema.

use std::fmt;
use std::str::FromStr;

use crate::error::SemaError;

/// Types an expression can carry after type checking.
///
/// The names match the strings stored in the catalog under
/// `<table>.<attr>.type`. An expression whose type could not be determined at
/// all (for example an attribute with no catalog entry) is represented as
/// `Option::<DataType>::None`, never as [`DataType::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Double,
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Not well typed. Once produced it propagates to every enclosing node.
    None,
}

impl DataType {
    /// All five types, in catalog vocabulary order.
    pub const ALL: [DataType; 5] = [
        DataType::Int,
        DataType::Double,
        DataType::String,
        DataType::Bool,
        DataType::None,
    ];

    /// Returns the name of the data type as stored in the catalog.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Double => "double",
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::None => "none",
        }
    }

    /// Returns whether this type is numeric (`int` or `double`).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Double)
    }

    /// Returns whether this is a real type rather than the `none` sentinel.
    #[must_use]
    pub fn is_well_typed(&self) -> bool {
        !matches!(self, DataType::None)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = SemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| SemaError::TypeError {
                expected: "one of int, double, string, bool, none".into(),
                actual: s.to_string(),
            })
    }
}

/// Renders a possibly absent type for diagnostics.
#[must_use]
pub fn describe(ty: Option<DataType>) -> &'static str {
    ty.map_or("absent", |t| t.name())
}
