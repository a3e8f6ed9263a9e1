//! Entity and relationship persistence engine
//!
//! Turns the accumulated table/column/join registry into committed entities
//! and relationships.
//!
//! # Algorithm
//! 1. Per table: resolve the existing entity or generate one from the legacy
//!    schema, checking referenced columns and attaching calculated fields
//! 2. Per join: classify by which side is its table's sole key
//!    - neither → error
//!    - both → extended entity, parent chosen by [`similarity_score`]
//!    - one → foreign key relationship, reused or synthesized
//! 3. Per secondary join: attach synchronization hooks to the owning entity
//!
//! Every failure is logged and collected; processing continues.

use crate::error::InferenceError;
use crate::model::{
    CalculatedProperty, Cardinality, Entity, EntityId, EntityModel, HookEvent, Relationship,
};
use crate::naming::{pascal_case, pluralize, similarity_score, strip_key_suffix, unique_name};
use crate::registry::{SecondaryJoin, TableId, TableRegistry};
use crate::relationship::{RelationshipInfo, Resolution};
use crate::schema::SchemaSource;
use crate::translation::Translator;
use lcm_datapath::{DataPathJoin, CALCULATED_PREFIX};
use serde::Serialize;
use std::cmp::Ordering;

/// Counters and errors from one persistence pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistenceReport {
    /// Tables mapped onto entities that already existed
    pub existing_entities: usize,
    /// Entities generated from the legacy schema
    pub created_entities: usize,
    /// Relationships generated
    pub created_relationships: usize,
    /// Joins mapped onto relationships that already existed
    pub reused_relationships: usize,
    /// Extended entity pairs recorded
    pub extensions: usize,
    /// Lifecycle hooks attached for secondary joins
    pub hooks: usize,
    /// Everything skipped
    #[serde(skip)]
    pub errors: Vec<InferenceError>,
}

impl PersistenceReport {
    /// Whether nothing was skipped
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Which end of a foreign key join the walk starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkFrom {
    Parent,
    Child,
}

/// Foreign key join oriented parent (key) → child (foreign key)
struct ForeignKey<'j> {
    join: &'j DataPathJoin,
    parent: EntityId,
    parent_column: &'j str,
    child: EntityId,
    child_column: &'j str,
    walk: WalkFrom,
}

/// Step-wise persistence over a registry, model and resolution
pub struct RelationshipEngine<'a, S: SchemaSource + ?Sized> {
    registry: &'a mut TableRegistry,
    model: &'a mut EntityModel,
    resolution: &'a mut Resolution,
    schema: &'a S,
    report: PersistenceReport,
}

impl<'a, S: SchemaSource + ?Sized> RelationshipEngine<'a, S> {
    /// Create engine
    pub fn new(
        registry: &'a mut TableRegistry,
        model: &'a mut EntityModel,
        resolution: &'a mut Resolution,
        schema: &'a S,
    ) -> Self {
        Self {
            registry,
            model,
            resolution,
            schema,
            report: PersistenceReport::default(),
        }
    }

    /// Run every step and return the report
    #[must_use]
    pub fn run(mut self) -> PersistenceReport {
        for table in self.table_ids() {
            self.resolve_table(table);
        }
        for join in self.join_keys() {
            self.resolve_join(&join);
        }
        self.attach_secondary_joins();
        self.finish()
    }

    /// Registered tables, in order
    #[must_use]
    pub fn table_ids(&self) -> Vec<TableId> {
        self.registry.table_ids().collect()
    }

    /// Registered natural joins, in order
    #[must_use]
    pub fn join_keys(&self) -> Vec<DataPathJoin> {
        self.registry.join_keys()
    }

    /// Finish and return the report
    #[must_use]
    pub fn finish(self) -> PersistenceReport {
        tracing::info!(
            created_entities = self.report.created_entities,
            created_relationships = self.report.created_relationships,
            errors = self.report.errors.len(),
            "persistence finished"
        );
        self.report
    }

    /// Resolve or generate the entity for one table
    pub fn resolve_table(&mut self, table: TableId) {
        let source = self.schema;
        let info = self.registry.get(table);
        let name = info.name().to_string();
        let columns: Vec<String> = info.columns().map(str::to_string).collect();
        let _span = tracing::info_span!("table", name = %name).entered();

        if let Some(id) = self.model.find_by_table(&name) {
            tracing::debug!("mapped onto existing entity {}", self.model.entity(id).name);
            self.resolution.insert_entity(&name, id);
            self.registry.set_exists(table, true);
            self.report.existing_entities += 1;
            return;
        }

        let Some(schema) = source.table(&name) else {
            self.fail(InferenceError::MissingTable { table: name });
            return;
        };

        let entity_name = unique_name(&pascal_case(&schema.name), |n| {
            self.model.find_by_name(n).is_some()
        });
        let mut entity = Entity::from_schema(entity_name, schema);

        for column in columns {
            if let Some(field) = column.strip_prefix(CALCULATED_PREFIX) {
                match source.calculated_field(&name, field) {
                    Some(calc) => entity.calculated.push(CalculatedProperty {
                        name: calc.property_name.clone(),
                        field: calc.name.clone(),
                        expression: calc.expression.clone(),
                    }),
                    None => self.fail(InferenceError::MissingCalculatedField {
                        table: name.clone(),
                        field: field.to_string(),
                    }),
                }
            } else if !schema.has_column(&column) {
                self.fail(InferenceError::MissingColumn {
                    table: name.clone(),
                    column,
                });
            }
        }

        tracing::info!("generated entity {}", entity.name);
        let id = self.model.add_entity(entity);
        self.resolution.insert_entity(&name, id);
        self.registry.set_exists(table, true);
        self.report.created_entities += 1;
    }

    /// Materialize one join as a relationship or extension
    pub fn resolve_join(&mut self, join: &DataPathJoin) {
        let _span = tracing::info_span!("join", join = %join).entered();

        if self.resolution.relationship(join).is_some() {
            return;
        }

        let Some(from) = self.entity_for(join, join.from_table()) else {
            return;
        };
        let Some(to) = self.entity_for(join, join.to_table()) else {
            return;
        };

        let from_key = self.model.entity(from).is_sole_key(join.from_field());
        let to_key = self.model.entity(to).is_sole_key(join.to_field());

        match (from_key, to_key) {
            (false, false) => self.fail(InferenceError::NoPrimaryKey {
                join: join.to_string(),
            }),
            (true, true) => self.resolve_extension(join, from, to),
            (true, false) => self.resolve_foreign_key(&ForeignKey {
                join,
                parent: from,
                parent_column: join.from_field(),
                child: to,
                child_column: join.to_field(),
                walk: WalkFrom::Parent,
            }),
            (false, true) => self.resolve_foreign_key(&ForeignKey {
                join,
                parent: to,
                parent_column: join.to_field(),
                child: from,
                child_column: join.from_field(),
                walk: WalkFrom::Child,
            }),
        }
    }

    /// Attach synchronization hooks for every secondary join
    pub fn attach_secondary_joins(&mut self) {
        for (key, secondary) in self.registry.secondary_joins() {
            let _span = tracing::info_span!("secondary_join", join = %key).entered();
            if let Err(err) = self.attach_secondary_join(&key, &secondary) {
                self.fail(err);
            }
        }
    }

    fn entity_for(&mut self, join: &DataPathJoin, table: &str) -> Option<EntityId> {
        let id = self.resolution.entity(table);
        if id.is_none() {
            self.fail(InferenceError::MissingEntity {
                join: join.to_string(),
                table: table.to_string(),
            });
        }
        id
    }

    fn resolve_extension(&mut self, join: &DataPathJoin, from: EntityId, to: EntityId) {
        let from_score = similarity_score(join.from_field(), join.from_table());
        let to_score = similarity_score(join.to_field(), join.to_table());

        let (parent, child) = match from_score.cmp(&to_score) {
            Ordering::Greater => (from, to),
            Ordering::Less => (to, from),
            Ordering::Equal => {
                self.fail(InferenceError::AmbiguousExtension {
                    join: join.to_string(),
                    score: from_score,
                });
                return;
            }
        };

        if self.model.entity(parent).extends == Some(child) {
            self.fail(InferenceError::ConflictingExtension {
                join: join.to_string(),
                parent: self.model.entity(child).name.clone(),
                child: self.model.entity(parent).name.clone(),
            });
            return;
        }

        match self.model.entity(child).extends {
            Some(existing) if existing == parent => {}
            Some(existing) => {
                let existing = self
                    .model
                    .get(existing)
                    .map_or_else(|| existing.to_string(), |e| e.name.clone());
                self.fail(InferenceError::AlreadyExtended {
                    join: join.to_string(),
                    entity: self.model.entity(child).name.clone(),
                    existing,
                });
                return;
            }
            None => {
                self.model.entity_mut(child).extends = Some(parent);
                self.report.extensions += 1;
                tracing::info!(
                    "{} extends {}",
                    self.model.entity(child).name,
                    self.model.entity(parent).name
                );
            }
        }

        let property = self.model.entity(to).name.clone();
        self.resolution
            .insert_relationship(join.clone(), RelationshipInfo::extension(parent, child, property));
    }

    fn resolve_foreign_key(&mut self, fk: &ForeignKey<'_>) {
        let join = fk.join;
        let Some(fk_property) = self
            .model
            .entity(fk.child)
            .property_for_column(fk.child_column)
            .map(|p| p.name.clone())
        else {
            self.fail(InferenceError::MissingFkProperty {
                join: join.to_string(),
                entity: self.model.entity(fk.child).name.clone(),
                column: fk.child_column.to_string(),
            });
            return;
        };

        let id = match self
            .model
            .find_relationship(fk.parent, fk.child, fk.parent_column, fk.child_column)
        {
            Some(id) => {
                self.report.reused_relationships += 1;
                id
            }
            None => {
                if !self.model.dynamic_schema() {
                    self.fail(InferenceError::SchemaGenerationUnsupported {
                        join: join.to_string(),
                        entity: self.model.entity(fk.child).name.clone(),
                    });
                    return;
                }
                self.report.created_relationships += 1;
                self.model.add_relationship(Relationship::new(
                    fk.parent,
                    fk.child,
                    fk.parent_column,
                    fk.child_column,
                    Cardinality::OneToMany,
                ))
            }
        };

        let relationship = self.model.relationship(id);
        let one_to_many = fk.walk == WalkFrom::Parent
            && relationship.cardinality == Cardinality::OneToMany;
        let existing = match fk.walk {
            WalkFrom::Parent => relationship.parent_property.clone(),
            WalkFrom::Child => relationship.child_property.clone(),
        };

        let property = match existing {
            Some(property) => property,
            None => {
                let owner = match fk.walk {
                    WalkFrom::Parent => fk.parent,
                    WalkFrom::Child => fk.child,
                };
                if !self.model.dynamic_schema() {
                    self.fail(InferenceError::SchemaGenerationUnsupported {
                        join: join.to_string(),
                        entity: self.model.entity(owner).name.clone(),
                    });
                    return;
                }
                let property = match fk.walk {
                    WalkFrom::Parent => self.collection_name(fk, one_to_many),
                    WalkFrom::Child => self.reference_name(fk, &fk_property),
                };
                let relationship = self.model.relationship_mut(id);
                match fk.walk {
                    WalkFrom::Parent => relationship.parent_property = Some(property.clone()),
                    WalkFrom::Child => relationship.child_property = Some(property.clone()),
                }
                property
            }
        };

        tracing::debug!("join navigates through {property}");
        self.resolution.insert_relationship(
            join.clone(),
            RelationshipInfo::foreign_key(id, one_to_many, property),
        );
    }

    /// Reference property on the child: the foreign key minus `ID`/`CODE`,
    /// else the parent entity's name
    fn reference_name(&self, fk: &ForeignKey<'_>, fk_property: &str) -> String {
        let parent_name = self.model.entity(fk.parent).name.clone();
        let taken = |n: &str| self.model.is_property_taken(fk.child, n);

        let base = strip_key_suffix(fk_property)
            .filter(|stem| !taken(*stem))
            .map_or(parent_name, str::to_string);
        unique_name(&base, taken)
    }

    /// Collection property on the parent: the child entity's plural
    fn collection_name(&self, fk: &ForeignKey<'_>, one_to_many: bool) -> String {
        let child_name = &self.model.entity(fk.child).name;
        let base = if one_to_many {
            pluralize(child_name)
        } else {
            child_name.clone()
        };
        unique_name(&base, |n| self.model.is_property_taken(fk.parent, n))
    }

    fn attach_secondary_join(
        &mut self,
        key: &DataPathJoin,
        secondary: &SecondaryJoin,
    ) -> Result<(), InferenceError> {
        let owner_table = secondary.left.root_table();
        if !owner_table.eq_ignore_ascii_case(secondary.right.root_table()) {
            return Err(InferenceError::SecondaryJoinOwnerMismatch {
                join: key.to_string(),
            });
        }

        let unresolved = |reason: String| InferenceError::UnresolvedSecondaryJoin {
            join: key.to_string(),
            reason,
        };

        let translator = Translator::new(self.model, self.resolution);
        let local = translator
            .translate_field(&secondary.left)
            .map_err(|e| unresolved(e.to_string()))?;
        let remote = translator
            .translate_field(&secondary.right)
            .map_err(|e| unresolved(e.to_string()))?;
        let owner = self
            .resolution
            .entity(owner_table)
            .ok_or_else(|| unresolved(format!("no entity for table '{owner_table}'")))?;

        let snippet = format!("this.{local} = this.{};", remote.replace('.', "?."));
        let entity = self.model.entity_mut(owner);
        for event in [HookEvent::BeforeInsert, HookEvent::BeforeUpdate] {
            entity.add_hook(event, snippet.clone());
        }
        self.report.hooks += 1;
        tracing::info!("synchronizing {}.{local} on write", entity.name);
        Ok(())
    }

    fn fail(&mut self, err: InferenceError) {
        tracing::error!("skipped: {err}");
        self.report.errors.push(err);
    }
}
