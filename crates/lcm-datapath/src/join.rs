//! Directed join edges between legacy tables
//!
//! Provides [`DataPathJoin`], the `FromTable.FromField = ToTable.ToField` edge
//! used both inside [`DataPath`](crate::DataPath) chains and as the key for
//! relationship lookup.

use crate::names::{eq_ignore_case, hash_ignore_case};
use crate::path::PathError;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Characters accepted as the join operator in legacy text
const OPERATOR_CHARS: &[char] = &['=', '<', '>'];

/// Directed equi-join edge
///
/// Equality and hashing ignore case on all four names. Direction matters:
/// the flipped edge is a different key.
#[derive(Debug, Clone)]
pub struct DataPathJoin {
    from_table: String,
    from_field: String,
    to_table: String,
    to_field: String,
}

impl DataPathJoin {
    /// Create join edge from its four names
    #[inline]
    #[must_use]
    pub fn new(
        from_table: impl Into<String>,
        from_field: impl Into<String>,
        to_table: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_field: from_field.into(),
            to_table: to_table.into(),
            to_field: to_field.into(),
        }
    }

    /// Parse the legacy `Field<op>Table.Field` segment leaving `from_table`
    ///
    /// The operator glyph (`=`, `<`, `>` or a run of them) is ignored; the
    /// edge always points left to right.
    ///
    /// # Errors
    /// Returns [`PathError::MalformedJoin`] if any part is missing
    pub fn parse(from_table: &str, segment: &str) -> Result<Self, PathError> {
        let malformed = || PathError::MalformedJoin(segment.to_string());

        let op_start = segment.find(OPERATOR_CHARS).ok_or_else(malformed)?;
        let after_op = segment[op_start..].trim_start_matches(OPERATOR_CHARS);

        let from_field = segment[..op_start].trim();
        let (to_table, to_field) = after_op.split_once('.').ok_or_else(malformed)?;
        let (to_table, to_field) = (to_table.trim(), to_field.trim());

        if from_table.trim().is_empty()
            || from_field.is_empty()
            || to_field.is_empty()
            || to_table.is_empty()
        {
            return Err(malformed());
        }

        Ok(Self::new(from_table.trim(), from_field, to_table, to_field))
    }

    /// Source table
    #[inline]
    #[must_use]
    pub fn from_table(&self) -> &str {
        &self.from_table
    }

    /// Source field
    #[inline]
    #[must_use]
    pub fn from_field(&self) -> &str {
        &self.from_field
    }

    /// Destination table
    #[inline]
    #[must_use]
    pub fn to_table(&self) -> &str {
        &self.to_table
    }

    /// Destination field
    #[inline]
    #[must_use]
    pub fn to_field(&self) -> &str {
        &self.to_field
    }

    /// Same edge walked in the opposite direction
    #[inline]
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self::new(
            self.to_table.clone(),
            self.to_field.clone(),
            self.from_table.clone(),
            self.from_field.clone(),
        )
    }

    /// Check whether this edge starts where `previous` ends
    #[inline]
    #[must_use]
    pub fn continues(&self, previous: &Self) -> bool {
        eq_ignore_case(&self.from_table, &previous.to_table)
    }

    /// Legacy text segment: `FROMFIELD=TOTABLE.TOFIELD`
    #[must_use]
    pub fn segment(&self) -> String {
        format!("{}={}.{}", self.from_field, self.to_table, self.to_field)
    }
}

impl PartialEq for DataPathJoin {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(&self.from_table, &other.from_table)
            && eq_ignore_case(&self.from_field, &other.from_field)
            && eq_ignore_case(&self.to_table, &other.to_table)
            && eq_ignore_case(&self.to_field, &other.to_field)
    }
}

impl Eq for DataPathJoin {}

impl Hash for DataPathJoin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_case(&self.from_table, state);
        hash_ignore_case(&self.from_field, state);
        hash_ignore_case(&self.to_table, state);
        hash_ignore_case(&self.to_field, state);
    }
}

impl Display for DataPathJoin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}={}.{}",
            self.from_table, self.from_field, self.to_table, self.to_field
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn join_parse_equals() {
        let join = DataPathJoin::parse("ACCOUNT", "ACCOUNTID=ADDRESS.ACCOUNTID").unwrap();
        assert_eq!(join.from_table(), "ACCOUNT");
        assert_eq!(join.from_field(), "ACCOUNTID");
        assert_eq!(join.to_table(), "ADDRESS");
        assert_eq!(join.to_field(), "ACCOUNTID");
    }

    #[test]
    fn join_parse_ignores_operator_glyph() {
        let eq = DataPathJoin::parse("CONTACT", "ACCOUNTID=ACCOUNT.ACCOUNTID").unwrap();
        let outer = DataPathJoin::parse("CONTACT", "ACCOUNTID>ACCOUNT.ACCOUNTID").unwrap();
        let wide = DataPathJoin::parse("CONTACT", "ACCOUNTID<=ACCOUNT.ACCOUNTID").unwrap();
        assert_eq!(eq, outer);
        assert_eq!(eq, wide);
    }

    #[test]
    fn join_parse_rejects_missing_parts() {
        for bad in ["ACCOUNTID", "=ACCOUNT.ACCOUNTID", "ACCOUNTID=ACCOUNT", "ACCOUNTID=.ACCOUNTID", "A=B."] {
            let result = DataPathJoin::parse("CONTACT", bad);
            assert!(matches!(result, Err(PathError::MalformedJoin(_))), "{bad}");
        }
    }

    #[test]
    fn join_equality_ignores_case() {
        let a = DataPathJoin::new("Account", "AccountId", "Contact", "AccountId");
        let b = DataPathJoin::new("ACCOUNT", "ACCOUNTID", "CONTACT", "ACCOUNTID");
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn join_direction_is_identity() {
        let join = DataPathJoin::new("ACCOUNT", "ACCOUNTID", "CONTACT", "ACCOUNTID");
        assert_ne!(join, join.flipped());
        assert_eq!(join, join.flipped().flipped());
    }

    #[test]
    fn join_segment_round_trip() {
        let join = DataPathJoin::new("CONTACT", "ADDRESSID", "ADDRESS", "ADDRESSID");
        assert_eq!(join.segment(), "ADDRESSID=ADDRESS.ADDRESSID");
        assert_eq!(DataPathJoin::parse("CONTACT", &join.segment()).unwrap(), join);
    }

    #[test]
    fn join_display() {
        let join = DataPathJoin::new("CONTACT", "ADDRESSID", "ADDRESS", "ADDRESSID");
        assert_eq!(join.to_string(), "CONTACT.ADDRESSID=ADDRESS.ADDRESSID");
    }
}
