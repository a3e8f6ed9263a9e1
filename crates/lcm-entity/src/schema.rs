//! Read-only lookup boundary onto the legacy database schema
//!
//! The persistence engine asks a [`SchemaSource`] for table columns, key
//! columns and calculated-field metadata. [`InMemorySchema`] is the
//! serde-loadable implementation used by the CLI and tests.

use lcm_datapath::eq_ignore_case;
use serde::{Deserialize, Serialize};

/// Legacy table definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// All column names
    pub columns: Vec<String>,
    /// Primary key column names
    #[serde(default)]
    pub key_columns: Vec<String>,
}

impl TableSchema {
    /// Create table with columns and a single key column
    #[must_use]
    pub fn new(name: impl Into<String>, key: &str, columns: &[&str]) -> Self {
        let mut all: Vec<String> = vec![key.to_string()];
        all.extend(
            columns
                .iter()
                .filter(|c| !eq_ignore_case(c, key))
                .map(|c| (*c).to_string()),
        );
        Self {
            name: name.into(),
            columns: all,
            key_columns: vec![key.to_string()],
        }
    }

    /// Check column existence (case-insensitive)
    #[inline]
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| eq_ignore_case(c, column))
    }
}

/// Calculated field metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedField {
    /// Owning table
    pub table: String,
    /// Field name without the `@` marker
    pub name: String,
    /// Property name on the target entity
    pub property_name: String,
    /// Legacy calculation template
    #[serde(default)]
    pub expression: String,
}

/// Lookup boundary consumed by the persistence engine
pub trait SchemaSource {
    /// Table definition by name
    fn table(&self, name: &str) -> Option<&TableSchema>;

    /// Calculated field metadata by table and field (no `@`)
    fn calculated_field(&self, table: &str, field: &str) -> Option<&CalculatedField>;
}

/// Schema held in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySchema {
    #[serde(default)]
    tables: Vec<TableSchema>,
    #[serde(default)]
    calculated_fields: Vec<CalculatedField>,
}

impl InMemorySchema {
    /// Create empty schema
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table
    #[must_use]
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    /// Add calculated field metadata
    #[must_use]
    pub fn with_calculated(mut self, field: CalculatedField) -> Self {
        self.calculated_fields.push(field);
        self
    }

    /// All tables
    #[inline]
    #[must_use]
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }
}

impl SchemaSource for InMemorySchema {
    fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| eq_ignore_case(&t.name, name))
    }

    fn calculated_field(&self, table: &str, field: &str) -> Option<&CalculatedField> {
        self.calculated_fields
            .iter()
            .find(|c| eq_ignore_case(&c.table, table) && eq_ignore_case(&c.name, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_schema_new_puts_key_first() {
        let table = TableSchema::new("ACCOUNT", "ACCOUNTID", &["ACCOUNT", "accountid", "TYPE"]);
        assert_eq!(table.columns, vec!["ACCOUNTID", "ACCOUNT", "TYPE"]);
        assert!(table.has_column("type"));
    }

    #[test]
    fn in_memory_lookup_ignores_case() {
        let schema = InMemorySchema::new()
            .with_table(TableSchema::new("ACCOUNT", "ACCOUNTID", &["ACCOUNT"]))
            .with_calculated(CalculatedField {
                table: "ACCOUNT".into(),
                name: "FULLNAME".into(),
                property_name: "FullName".into(),
                expression: String::new(),
            });

        assert!(schema.table("account").is_some());
        assert!(schema.table("CONTACT").is_none());
        assert!(schema.calculated_field("Account", "fullname").is_some());
    }

    #[test]
    fn in_memory_deserializes() {
        let json = r#"{"tables":[{"name":"ACCOUNT","columns":["ACCOUNTID"],"key_columns":["ACCOUNTID"]}]}"#;
        let schema: InMemorySchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.tables().len(), 1);
    }
}
