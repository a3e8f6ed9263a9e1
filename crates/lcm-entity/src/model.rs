//! Target entity model
//!
//! Arena of [`Entity`] and [`Relationship`] records addressed by index. The
//! model arrives pre-populated with the target project's existing entities
//! and is extended by the persistence engine.

use crate::error::DanglingEntity;
use crate::naming::pascal_case;
use crate::schema::TableSchema;
use lcm_datapath::eq_ignore_case;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Index of an entity in its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub usize);

/// Index of a relationship in its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub usize);

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Column-backed property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProperty {
    /// Property name
    pub name: String,
    /// Legacy column name
    pub column: String,
}

/// Calculated (expression-backed) property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedProperty {
    /// Property name
    pub name: String,
    /// Legacy field name without `@`
    pub field: String,
    /// Legacy calculation template
    #[serde(default)]
    pub expression: String,
}

/// Entity lifecycle event a hook runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    /// Before the row is first written
    BeforeInsert,
    /// Before an existing row is written
    BeforeUpdate,
}

/// Generated code attached to a lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleHook {
    /// Triggering event
    pub event: HookEvent,
    /// Statement text
    pub snippet: String,
}

/// Entity mapped onto one legacy table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Display name
    pub name: String,
    /// Legacy table name
    pub table: String,
    /// Primary key columns
    pub key_columns: Vec<String>,
    /// Column-backed properties
    #[serde(default)]
    pub properties: Vec<EntityProperty>,
    /// Calculated properties
    #[serde(default)]
    pub calculated: Vec<CalculatedProperty>,
    /// Lifecycle hooks
    #[serde(default)]
    pub hooks: Vec<LifecycleHook>,
    /// Supertype for extended entities
    #[serde(default)]
    pub extends: Option<EntityId>,
    /// Created during this migration
    #[serde(default)]
    pub generated: bool,
}

impl Entity {
    /// Create entity without properties
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>, key_columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            key_columns,
            properties: Vec::new(),
            calculated: Vec::new(),
            hooks: Vec::new(),
            extends: None,
            generated: false,
        }
    }

    /// Create a generated entity covering every column of a legacy table
    ///
    /// The sole key column becomes `Id`; other columns are PascalCased.
    #[must_use]
    pub fn from_schema(name: impl Into<String>, table: &TableSchema) -> Self {
        let mut entity = Self::new(name, table.name.clone(), table.key_columns.clone());
        entity.generated = true;
        for column in &table.columns {
            let property = if entity.is_sole_key(column) {
                "Id".to_string()
            } else {
                pascal_case(column)
            };
            entity = entity.with_property(property, column.clone());
        }
        entity
    }

    /// Add a column-backed property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.properties.push(EntityProperty {
            name: name.into(),
            column: column.into(),
        });
        self
    }

    /// Property mapped to a column
    #[must_use]
    pub fn property_for_column(&self, column: &str) -> Option<&EntityProperty> {
        self.properties
            .iter()
            .find(|p| eq_ignore_case(&p.column, column))
    }

    /// Calculated property for a legacy field (no `@`)
    #[must_use]
    pub fn calculated_for_field(&self, field: &str) -> Option<&CalculatedProperty> {
        self.calculated.iter().find(|c| eq_ignore_case(&c.field, field))
    }

    /// Whether `column` is this entity's one and only key column
    #[inline]
    #[must_use]
    pub fn is_sole_key(&self, column: &str) -> bool {
        matches!(self.key_columns.as_slice(), [key] if eq_ignore_case(key, column))
    }

    /// Attach a hook unless an identical one is present
    pub fn add_hook(&mut self, event: HookEvent, snippet: impl Into<String>) {
        let hook = LifecycleHook {
            event,
            snippet: snippet.into(),
        };
        if !self.hooks.contains(&hook) {
            self.hooks.push(hook);
        }
    }
}

/// Relationship multiplicity seen from the parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// Parent has many children
    OneToMany,
    /// Parent has at most one child
    OneToOne,
}

/// Foreign key relationship between two entities
///
/// The parent owns the key column; the child carries the foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Entity owning the primary key
    pub parent: EntityId,
    /// Entity carrying the foreign key
    pub child: EntityId,
    /// Key column on the parent
    pub parent_column: String,
    /// Foreign key column on the child
    pub child_column: String,
    /// Navigation property on the parent (collection or reference)
    #[serde(default)]
    pub parent_property: Option<String>,
    /// Reference property on the child
    #[serde(default)]
    pub child_property: Option<String>,
    /// Multiplicity
    pub cardinality: Cardinality,
}

impl Relationship {
    /// Create relationship without navigation properties
    #[must_use]
    pub fn new(
        parent: EntityId,
        child: EntityId,
        parent_column: impl Into<String>,
        child_column: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            parent,
            child,
            parent_column: parent_column.into(),
            child_column: child_column.into(),
            parent_property: None,
            child_property: None,
            cardinality,
        }
    }

    /// Check whether this relationship joins the same columns of the same entities
    #[must_use]
    pub fn connects(
        &self,
        parent: EntityId,
        child: EntityId,
        parent_column: &str,
        child_column: &str,
    ) -> bool {
        self.parent == parent
            && self.child == child
            && eq_ignore_case(&self.parent_column, parent_column)
            && eq_ignore_case(&self.child_column, child_column)
    }
}

/// Arena of entities and relationships
///
/// Deserialization rejects `extends`, `parent` and `child` ids that point
/// outside the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEntityModel")]
pub struct EntityModel {
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    dynamic_schema: bool,
}

/// Unchecked wire form of [`EntityModel`]
#[derive(Deserialize)]
struct RawEntityModel {
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    relationships: Vec<Relationship>,
    #[serde(default = "default_dynamic_schema")]
    dynamic_schema: bool,
}

impl TryFrom<RawEntityModel> for EntityModel {
    type Error = DanglingEntity;

    fn try_from(raw: RawEntityModel) -> Result<Self, Self::Error> {
        let model = Self {
            entities: raw.entities,
            relationships: raw.relationships,
            dynamic_schema: raw.dynamic_schema,
        };
        match model.dangling_ids().into_iter().next() {
            Some(dangling) => Err(dangling),
            None => Ok(model),
        }
    }
}

fn default_dynamic_schema() -> bool {
    true
}

impl Default for EntityModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityModel {
    /// Create empty model supporting schema generation
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            relationships: Vec::new(),
            dynamic_schema: true,
        }
    }

    /// Set whether new relationship properties may be generated
    #[inline]
    #[must_use]
    pub fn with_dynamic_schema(mut self, dynamic: bool) -> Self {
        self.dynamic_schema = dynamic;
        self
    }

    /// Whether new relationship properties may be generated
    #[inline]
    #[must_use]
    pub fn dynamic_schema(&self) -> bool {
        self.dynamic_schema
    }

    /// Add entity, returning its id
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        self.entities.push(entity);
        EntityId(self.entities.len() - 1)
    }

    /// Entity by id
    ///
    /// # Panics
    /// Panics if the id did not come from this model
    #[inline]
    #[must_use]
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    /// Entity by id, `None` when out of range
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    /// Mutable entity by id
    #[inline]
    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    /// All entities with their ids
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().enumerate().map(|(i, e)| (EntityId(i), e))
    }

    /// Number of entities
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity mapped onto a legacy table
    #[must_use]
    pub fn find_by_table(&self, table: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .position(|e| eq_ignore_case(&e.table, table))
            .map(EntityId)
    }

    /// Entity by display name
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .position(|e| eq_ignore_case(&e.name, name))
            .map(EntityId)
    }

    /// Add relationship, returning its id
    pub fn add_relationship(&mut self, relationship: Relationship) -> RelationshipId {
        self.relationships.push(relationship);
        RelationshipId(self.relationships.len() - 1)
    }

    /// Relationship by id
    #[inline]
    #[must_use]
    pub fn relationship(&self, id: RelationshipId) -> &Relationship {
        &self.relationships[id.0]
    }

    /// Mutable relationship by id
    #[inline]
    pub fn relationship_mut(&mut self, id: RelationshipId) -> &mut Relationship {
        &mut self.relationships[id.0]
    }

    /// All relationships with their ids
    pub fn relationships(&self) -> impl Iterator<Item = (RelationshipId, &Relationship)> {
        self.relationships
            .iter()
            .enumerate()
            .map(|(i, r)| (RelationshipId(i), r))
    }

    /// Existing relationship joining the same columns of the same entities
    #[must_use]
    pub fn find_relationship(
        &self,
        parent: EntityId,
        child: EntityId,
        parent_column: &str,
        child_column: &str,
    ) -> Option<RelationshipId> {
        self.relationships
            .iter()
            .position(|r| r.connects(parent, child, parent_column, child_column))
            .map(RelationshipId)
    }

    /// Every entity id referenced by the model that is not in the arena
    #[must_use]
    pub fn dangling_ids(&self) -> Vec<DanglingEntity> {
        let missing = |id: &EntityId| self.get(*id).is_none();
        let extends = self.entities.iter().filter_map(|e| {
            e.extends.filter(missing).map(|id| DanglingEntity {
                owner: format!("entity '{}'", e.name),
                id,
            })
        });
        let endpoints = self.relationships.iter().enumerate().flat_map(|(i, r)| {
            [r.parent, r.child]
                .into_iter()
                .filter(missing)
                .map(move |id| DanglingEntity {
                    owner: format!("relationship #{i}"),
                    id,
                })
        });
        extends.chain(endpoints).collect()
    }

    /// Whether `name` is already used by any property of `entity`
    ///
    /// Covers column, calculated and navigation properties.
    #[must_use]
    pub fn is_property_taken(&self, entity: EntityId, name: &str) -> bool {
        let e = self.entity(entity);
        e.properties.iter().any(|p| eq_ignore_case(&p.name, name))
            || e.calculated.iter().any(|c| eq_ignore_case(&c.name, name))
            || self.relationships.iter().any(|r| {
                (r.parent == entity
                    && r.parent_property
                        .as_deref()
                        .is_some_and(|p| eq_ignore_case(p, name)))
                    || (r.child == entity
                        && r.child_property
                            .as_deref()
                            .is_some_and(|p| eq_ignore_case(p, name)))
            })
    }
}
