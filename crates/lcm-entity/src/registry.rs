//! Table and join registry
//!
//! Accumulates, per logical legacy table, the referenced columns and the
//! join edges discovered while parsing forms. Purely additive and idempotent
//! per key; read back by the persistence engine.

use indexmap::{IndexMap, IndexSet};
use lcm_datapath::{DataPath, DataPathJoin, NameKey};
use std::collections::HashMap;

/// Index of a table in its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId(pub usize);

/// Declared field-synchronization link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryJoin {
    /// Table holding the synchronized value
    pub target: TableId,
    /// Local (denormalized) field
    pub left: DataPath,
    /// Field the value is read from
    pub right: DataPath,
}

/// Everything referenced about one legacy table
#[derive(Debug, Clone)]
pub struct TableInfo {
    name: String,
    columns: IndexMap<NameKey, String>,
    joins: IndexMap<DataPathJoin, TableId>,
    secondary_joins: IndexMap<DataPathJoin, SecondaryJoin>,
    exists: bool,
}

impl TableInfo {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            columns: IndexMap::new(),
            joins: IndexMap::new(),
            secondary_joins: IndexMap::new(),
            exists: false,
        }
    }

    /// Table name as first seen
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referenced column names (first-seen spelling)
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }

    /// Whether a column was referenced
    #[inline]
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(&NameKey::new(column))
    }

    /// Join edges touching this table and the table each leads to
    ///
    /// Both endpoints index the same join key.
    #[inline]
    #[must_use]
    pub fn joins(&self) -> &IndexMap<DataPathJoin, TableId> {
        &self.joins
    }

    /// Secondary joins owned by this table
    #[inline]
    #[must_use]
    pub fn secondary_joins(&self) -> &IndexMap<DataPathJoin, SecondaryJoin> {
        &self.secondary_joins
    }

    /// Whether an entity was resolved for this table
    #[inline]
    #[must_use]
    pub fn exists(&self) -> bool {
        self.exists
    }

    fn add_column(&mut self, column: &str) {
        let column = column.trim();
        if !column.is_empty() {
            self.columns
                .entry(NameKey::new(column))
                .or_insert_with(|| column.to_string());
        }
    }
}

/// Registry of every table referenced during the migration
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: Vec<TableInfo>,
    by_name: HashMap<NameKey, TableId>,
}

impl TableRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a table exists; idempotent
    pub fn register_table(&mut self, name: &str) -> TableId {
        let key = NameKey::new(name);
        if let Some(id) = self.by_name.get(&key) {
            return *id;
        }
        let id = TableId(self.tables.len());
        self.tables.push(TableInfo::new(name));
        self.by_name.insert(key, id);
        id
    }

    /// Register every table, join and column along `path`
    ///
    /// Returns the path's terminal table.
    pub fn register_field(&mut self, path: &DataPath) -> TableId {
        let mut current = self.register_table(path.root_table());

        for join in path.joins() {
            self.tables[current.0].add_column(join.from_field());

            let next = self.register_table(join.to_table());
            self.tables[next.0].add_column(join.to_field());

            self.tables[current.0]
                .joins
                .entry(join.clone())
                .or_insert(next);
            self.tables[next.0]
                .joins
                .entry(join.clone())
                .or_insert(current);

            current = next;
        }

        self.tables[current.0].add_column(path.target_field());
        current
    }

    /// Declare that `left`'s field is kept in sync with `right`'s
    ///
    /// Registers both paths, then links the two terminal tables through the
    /// synthetic join `(leftTable, leftField, rightTable, rightField)`.
    /// Returns `left`'s terminal table.
    pub fn register_join(&mut self, left: &DataPath, right: &DataPath) -> TableId {
        let left_table = self.register_field(left);
        let right_table = self.register_field(right);

        let key = DataPathJoin::new(
            left.target_table(),
            left.target_field(),
            right.target_table(),
            right.target_field(),
        );
        self.tables[left_table.0]
            .secondary_joins
            .entry(key)
            .or_insert_with(|| SecondaryJoin {
                target: right_table,
                left: left.clone(),
                right: right.clone(),
            });

        left_table
    }

    /// Table by id
    ///
    /// # Panics
    /// Panics if the id did not come from this registry
    #[inline]
    #[must_use]
    pub fn get(&self, id: TableId) -> &TableInfo {
        &self.tables[id.0]
    }

    /// Table by name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TableId> {
        self.by_name.get(&NameKey::new(name)).copied()
    }

    /// All table ids in registration order
    pub fn table_ids(&self) -> impl Iterator<Item = TableId> {
        (0..self.tables.len()).map(TableId)
    }

    /// All tables
    pub fn tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.iter()
    }

    /// Number of tables
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every distinct natural join key, in discovery order
    #[must_use]
    pub fn join_keys(&self) -> Vec<DataPathJoin> {
        let keys: IndexSet<&DataPathJoin> = self
            .tables
            .iter()
            .flat_map(|t| t.joins.keys())
            .collect();
        keys.into_iter().cloned().collect()
    }

    /// Every secondary join with its key, in declaration order
    #[must_use]
    pub fn secondary_joins(&self) -> Vec<(DataPathJoin, SecondaryJoin)> {
        self.tables
            .iter()
            .flat_map(|t| t.secondary_joins.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Record whether an entity was resolved for a table
    pub fn set_exists(&mut self, id: TableId, exists: bool) {
        self.tables[id.0].exists = exists;
    }
}
