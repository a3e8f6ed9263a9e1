//! Legacy data-binding paths
//!
//! Provides [`DataPath`] for the `Table:Join1!Join2!...!Field` binding text
//! found in legacy form definitions.

use crate::join::DataPathJoin;
use crate::names::{eq_ignore_case, hash_ignore_case};
use crate::CALCULATED_PREFIX;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Separator between the root table and the rest of the path
const TABLE_SEPARATOR: char = ':';

/// Separator between joins and the terminal field
const SEGMENT_SEPARATOR: char = '!';

/// Chain of table joins terminating at a field
///
/// Immutable once built. Equality is structural and ignores case.
///
/// # Examples
/// - `ACCOUNT:ACCOUNTID` → field on the root table
/// - `CONTACT:ADDRESSID=ADDRESS.ADDRESSID!CITY` → one join, then `CITY`
#[derive(Debug, Clone)]
pub struct DataPath {
    root_table: String,
    joins: Vec<DataPathJoin>,
    target_field: String,
}

impl DataPath {
    /// Create path from parts
    ///
    /// # Errors
    /// Returns [`PathError::BrokenChain`] unless every join starts where the
    /// previous one (or the root table) ends.
    pub fn new(
        root_table: impl Into<String>,
        joins: Vec<DataPathJoin>,
        target_field: impl Into<String>,
    ) -> Result<Self, PathError> {
        let root_table = root_table.into();
        let target_field = target_field.into();

        if root_table.trim().is_empty() {
            return Err(PathError::EmptyTable);
        }
        if target_field.trim().is_empty() {
            return Err(PathError::EmptyField);
        }

        let mut current = root_table.as_str();
        for join in &joins {
            if !eq_ignore_case(join.from_table(), current) {
                return Err(PathError::BrokenChain {
                    expected: current.to_string(),
                    found: join.to_string(),
                });
            }
            current = join.to_table();
        }

        Ok(Self {
            root_table,
            joins,
            target_field,
        })
    }

    /// Path addressing a field directly on a table
    #[inline]
    #[must_use]
    pub fn field(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            root_table: table.into(),
            joins: Vec::new(),
            target_field: field.into(),
        }
    }

    /// Parse legacy binding text
    ///
    /// # Errors
    /// Returns error if the separator, table, field or any join is malformed
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let (table, rest) = text
            .split_once(TABLE_SEPARATOR)
            .ok_or_else(|| PathError::MissingTableSeparator(text.to_string()))?;

        let table = table.trim();
        if table.is_empty() {
            return Err(PathError::EmptyTable);
        }

        let mut segments: Vec<&str> = rest.split(SEGMENT_SEPARATOR).collect();
        // split always yields at least one item
        let field = segments.pop().unwrap_or_default().trim();
        if field.is_empty() {
            return Err(PathError::EmptyField);
        }

        let mut joins = Vec::with_capacity(segments.len());
        let mut current = table.to_string();
        for segment in segments {
            let join = DataPathJoin::parse(&current, segment)?;
            current = join.to_table().to_string();
            joins.push(join);
        }

        Ok(Self {
            root_table: table.to_string(),
            joins,
            target_field: field.to_string(),
        })
    }

    /// Table the path starts from
    #[inline]
    #[must_use]
    pub fn root_table(&self) -> &str {
        &self.root_table
    }

    /// Join chain, possibly empty
    #[inline]
    #[must_use]
    pub fn joins(&self) -> &[DataPathJoin] {
        &self.joins
    }

    /// Field addressed on the terminal table
    #[inline]
    #[must_use]
    pub fn target_field(&self) -> &str {
        &self.target_field
    }

    /// First join's source field, or the target field when there are no joins
    #[inline]
    #[must_use]
    pub fn root_field(&self) -> &str {
        self.joins
            .first()
            .map_or(self.target_field.as_str(), DataPathJoin::from_field)
    }

    /// Last join's destination table, or the root table when there are no joins
    #[inline]
    #[must_use]
    pub fn target_table(&self) -> &str {
        self.joins
            .last()
            .map_or(self.root_table.as_str(), DataPathJoin::to_table)
    }

    /// Whether the target field is calculated (`@` prefixed)
    #[inline]
    #[must_use]
    pub fn is_calculated(&self) -> bool {
        self.target_field.starts_with(CALCULATED_PREFIX)
    }

    /// Path walked backward
    ///
    /// Starts at the old target table, visits the joins in reverse order with
    /// each one flipped, and keeps the target field. Applying it twice
    /// yields the original path.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            root_table: self.target_table().to_string(),
            joins: self.joins.iter().rev().map(DataPathJoin::flipped).collect(),
            target_field: self.target_field.clone(),
        }
    }

    /// Splice `prefix`'s join chain in front of this path's
    ///
    /// Used for grid-column and lookup-column paths bound relative to a parent
    /// binding.
    ///
    /// # Errors
    /// Returns [`PathError::BrokenChain`] if this path does not start at the
    /// prefix's target table.
    pub fn with_prefix(&self, prefix: &Self) -> Result<Self, PathError> {
        let broken = || PathError::BrokenChain {
            expected: prefix.target_table().to_string(),
            found: self.to_string(),
        };
        if !eq_ignore_case(&self.root_table, prefix.target_table()) {
            return Err(broken());
        }
        let joins = prefix
            .joins
            .iter()
            .chain(self.joins.iter())
            .cloned()
            .collect();
        Self::new(prefix.root_table.clone(), joins, self.target_field.clone())
            .map_err(|_| broken())
    }
}

impl PartialEq for DataPath {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(&self.root_table, &other.root_table)
            && eq_ignore_case(&self.target_field, &other.target_field)
            && self.joins == other.joins
    }
}

impl Eq for DataPath {}

impl Hash for DataPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_case(&self.root_table, state);
        self.joins.hash(state);
        hash_ignore_case(&self.target_field, state);
    }
}

impl Display for DataPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root_table, TABLE_SEPARATOR)?;
        for join in &self.joins {
            write!(f, "{}{}", join.segment(), SEGMENT_SEPARATOR)?;
        }
        f.write_str(&self.target_field)
    }
}

impl FromStr for DataPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DataPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Errors related to data paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No `:` between table and field
    #[error("missing ':' after root table in '{0}'")]
    MissingTableSeparator(String),

    /// Root table is empty
    #[error("path has an empty root table")]
    EmptyTable,

    /// Target field is empty
    #[error("path has an empty target field")]
    EmptyField,

    /// Join segment does not match `Field<op>Table.Field`
    #[error("malformed join segment '{0}' (expected Field=Table.Field)")]
    MalformedJoin(String),

    /// Join does not continue from the previous table
    #[error("join '{found}' does not start at table '{expected}'")]
    BrokenChain { expected: String, found: String },
}
