//! Resolved relationships keyed by join
//!
//! Provides [`RelationshipInfo`] and the [`Resolution`] cache the
//! translation service consults.

use crate::model::{EntityId, RelationshipId};
use lcm_datapath::{DataPathJoin, NameKey};
use std::collections::HashMap;

/// How a join was materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Foreign key relationship
    ForeignKey {
        /// Relationship record
        id: RelationshipId,
        /// Walking the join yields a collection
        one_to_many: bool,
    },
    /// 1:1 supertype/subtype pair sharing a key value
    Extension {
        /// Supertype
        parent: EntityId,
        /// Subtype
        child: EntityId,
    },
}

/// Relationship resolved for one join key, seen from its source table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipInfo {
    kind: RelationshipKind,
    property_name: String,
}

impl RelationshipInfo {
    /// Foreign key edge
    #[must_use]
    pub fn foreign_key(id: RelationshipId, one_to_many: bool, property_name: impl Into<String>) -> Self {
        Self {
            kind: RelationshipKind::ForeignKey { id, one_to_many },
            property_name: property_name.into(),
        }
    }

    /// Extended entity edge; `property_name` is the other entity's name
    #[must_use]
    pub fn extension(parent: EntityId, child: EntityId, property_name: impl Into<String>) -> Self {
        Self {
            kind: RelationshipKind::Extension { parent, child },
            property_name: property_name.into(),
        }
    }

    /// Materialization kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    /// Navigation property on the source side
    #[inline]
    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Whether walking the join yields a collection
    #[inline]
    #[must_use]
    pub fn is_one_to_many(&self) -> bool {
        matches!(self.kind, RelationshipKind::ForeignKey { one_to_many: true, .. })
    }

    /// Whether this is an extended entity pair
    #[inline]
    #[must_use]
    pub fn is_extension(&self) -> bool {
        matches!(self.kind, RelationshipKind::Extension { .. })
    }

    /// Underlying relationship record, if any
    #[inline]
    #[must_use]
    pub fn relationship(&self) -> Option<RelationshipId> {
        match self.kind {
            RelationshipKind::ForeignKey { id, .. } => Some(id),
            RelationshipKind::Extension { .. } => None,
        }
    }
}

/// Table→entity and join→relationship maps built by the persistence engine
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    entities: HashMap<NameKey, EntityId>,
    relationships: HashMap<DataPathJoin, RelationshipInfo>,
}

impl Resolution {
    /// Create empty resolution
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity resolved for a table
    #[must_use]
    pub fn entity(&self, table: &str) -> Option<EntityId> {
        self.entities.get(&NameKey::new(table)).copied()
    }

    /// Relationship resolved for an exact join key
    #[inline]
    #[must_use]
    pub fn relationship(&self, join: &DataPathJoin) -> Option<&RelationshipInfo> {
        self.relationships.get(join)
    }

    /// Record a table's entity
    pub fn insert_entity(&mut self, table: &str, entity: EntityId) {
        self.entities.insert(NameKey::new(table), entity);
    }

    /// Record a join's relationship; the first record per key wins
    pub fn insert_relationship(&mut self, join: DataPathJoin, info: RelationshipInfo) {
        self.relationships.entry(join).or_insert(info);
    }

    /// Number of resolved entities
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of resolved joins
    #[inline]
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_info_flags() {
        let fk = RelationshipInfo::foreign_key(RelationshipId(0), true, "Contacts");
        assert!(fk.is_one_to_many());
        assert!(!fk.is_extension());
        assert_eq!(fk.relationship(), Some(RelationshipId(0)));

        let ext = RelationshipInfo::extension(EntityId(0), EntityId(1), "AccountExt");
        assert!(!ext.is_one_to_many());
        assert!(ext.is_extension());
        assert_eq!(ext.relationship(), None);
    }

    #[test]
    fn resolution_first_record_wins() {
        let join = DataPathJoin::new("A", "X", "B", "Y");
        let mut resolution = Resolution::new();
        resolution.insert_relationship(join.clone(), RelationshipInfo::foreign_key(RelationshipId(0), false, "B"));
        resolution.insert_relationship(join.clone(), RelationshipInfo::foreign_key(RelationshipId(1), true, "Bs"));
        assert_eq!(resolution.relationship(&join).unwrap().property_name(), "B");
        assert_eq!(resolution.relationship_count(), 1);
    }

    #[test]
    fn resolution_entity_lookup_ignores_case() {
        let mut resolution = Resolution::new();
        resolution.insert_entity("ACCOUNT", EntityId(3));
        assert_eq!(resolution.entity("account"), Some(EntityId(3)));
    }
}
