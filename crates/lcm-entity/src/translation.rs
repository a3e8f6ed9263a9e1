//! Data path translation
//!
//! Converts legacy [`DataPath`]s into dotted property paths against the
//! resolved entity model.
//!
//! # Workflow
//! 1. While forms are parsed, `register_*` accumulates tables, columns and joins
//! 2. [`DataPathTranslationService::persist`] materializes entities and relationships
//! 3. Form builders call `translate_*` to obtain binding paths
//!
//! Every translation is a pure function of the path and the resolved state.

use crate::error::MigrationError;
use crate::model::{EntityId, EntityModel};
use crate::persistence::{PersistenceReport, RelationshipEngine};
use crate::registry::{TableInfo, TableRegistry};
use crate::relationship::{RelationshipInfo, Resolution};
use crate::schema::SchemaSource;
use lcm_datapath::{DataPath, DataPathJoin, CALCULATED_PREFIX};

/// Property name used for an entity's sole key
pub const KEY_PROPERTY: &str = "Id";

/// Read-only translator over a model and its resolution
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    model: &'a EntityModel,
    resolution: &'a Resolution,
}

impl<'a> Translator<'a> {
    /// Create translator
    #[inline]
    #[must_use]
    pub fn new(model: &'a EntityModel, resolution: &'a Resolution) -> Self {
        Self { model, resolution }
    }

    /// Entity display name for a legacy table
    ///
    /// # Errors
    /// [`MigrationError::MissingEntity`] if no entity was resolved
    pub fn translate_table(&self, table: &str) -> Result<String, MigrationError> {
        let id = self.entity_for(table)?;
        Ok(self.model.entity(id).name.clone())
    }

    /// Dotted property path for a field binding
    ///
    /// Every join must be single-valued.
    ///
    /// # Errors
    /// Fails on a missing relationship, a one-to-many edge, or an unmapped field
    pub fn translate_field(&self, path: &DataPath) -> Result<String, MigrationError> {
        let mut parts = path
            .joins()
            .iter()
            .map(|join| self.single_valued(join).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        parts.push(self.field_property(path.target_table(), path.target_field())?);
        Ok(parts.join("."))
    }

    /// Dotted property path for `path` bound relative to `prefix`
    ///
    /// # Errors
    /// [`MigrationError::InvalidPrefix`] if `path` does not start at the
    /// prefix's target table, otherwise as [`Self::translate_field`]
    pub fn translate_field_with_prefix(
        &self,
        prefix: &DataPath,
        path: &DataPath,
    ) -> Result<String, MigrationError> {
        let spliced = path
            .with_prefix(prefix)
            .map_err(|_| MigrationError::InvalidPrefix {
                prefix: prefix.to_string(),
                path: path.to_string(),
            })?;
        self.translate_field(&spliced)
    }

    /// Property path for a reference whose final edge lands on `table.field`
    ///
    /// # Errors
    /// Fails as [`Self::translate_field`] for leading edges, and with
    /// [`MigrationError::CardinalityMismatch`] if the final edge is a collection
    pub fn translate_reference(
        &self,
        path: &DataPath,
        table: &str,
        field: &str,
    ) -> Result<String, MigrationError> {
        self.translate_relationship(path, table, field, false)
    }

    /// Property path for a collection whose final edge lands on `table.field`
    ///
    /// # Errors
    /// Fails as [`Self::translate_field`] for leading edges, and with
    /// [`MigrationError::CardinalityMismatch`] if the final edge is single-valued
    pub fn translate_collection(
        &self,
        path: &DataPath,
        table: &str,
        field: &str,
    ) -> Result<String, MigrationError> {
        self.translate_relationship(path, table, field, true)
    }

    fn translate_relationship(
        &self,
        path: &DataPath,
        table: &str,
        field: &str,
        one_to_many: bool,
    ) -> Result<String, MigrationError> {
        let (last, leading) = path
            .joins()
            .split_last()
            .ok_or_else(|| MigrationError::EmptyPath {
                path: path.to_string(),
            })?;

        if !(last.to_table().eq_ignore_ascii_case(table)
            && last.to_field().eq_ignore_ascii_case(field))
        {
            return Err(MigrationError::TargetMismatch {
                path: path.to_string(),
                table: table.to_string(),
                field: field.to_string(),
            });
        }

        let mut parts = leading
            .iter()
            .map(|join| self.single_valued(join).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        let info = self.edge(last)?;
        if info.is_one_to_many() != one_to_many {
            return Err(MigrationError::CardinalityMismatch {
                join: last.to_string(),
                expected: cardinality_label(one_to_many),
                actual: cardinality_label(info.is_one_to_many()),
            });
        }
        parts.push(info.property_name().to_string());
        Ok(parts.join("."))
    }

    fn entity_for(&self, table: &str) -> Result<EntityId, MigrationError> {
        self.resolution
            .entity(table)
            .ok_or_else(|| MigrationError::MissingEntity {
                table: table.to_string(),
            })
    }

    fn edge(&self, join: &DataPathJoin) -> Result<&'a RelationshipInfo, MigrationError> {
        self.resolution
            .relationship(join)
            .ok_or_else(|| MigrationError::MissingRelationship {
                join: join.to_string(),
            })
    }

    fn single_valued(&self, join: &DataPathJoin) -> Result<&'a str, MigrationError> {
        let info = self.edge(join)?;
        if info.is_one_to_many() {
            return Err(MigrationError::CollectionInPath {
                join: join.to_string(),
            });
        }
        Ok(info.property_name())
    }

    fn field_property(&self, table: &str, field: &str) -> Result<String, MigrationError> {
        let entity = self.model.entity(self.entity_for(table)?);

        if let Some(calculated) = field.strip_prefix(CALCULATED_PREFIX) {
            return entity
                .calculated_for_field(calculated)
                .map(|c| c.name.clone())
                .ok_or_else(|| MigrationError::MissingCalculatedField {
                    entity: entity.name.clone(),
                    table: table.to_string(),
                    field: calculated.to_string(),
                });
        }

        if entity.is_sole_key(field) {
            return Ok(KEY_PROPERTY.to_string());
        }

        entity
            .property_for_column(field)
            .map(|p| p.name.clone())
            .ok_or_else(|| MigrationError::MissingProperty {
                entity: entity.name.clone(),
                table: table.to_string(),
                field: field.to_string(),
            })
    }
}

fn cardinality_label(one_to_many: bool) -> &'static str {
    if one_to_many {
        "one-to-many"
    } else {
        "single-valued"
    }
}

/// Registration and translation front end for one migration run
///
/// Owns the table registry, the target entity model and the resolved
/// relationship cache.
#[derive(Debug, Clone, Default)]
pub struct DataPathTranslationService {
    registry: TableRegistry,
    model: EntityModel,
    resolution: Resolution,
}

impl DataPathTranslationService {
    /// Create service over an existing entity model
    #[inline]
    #[must_use]
    pub fn new(model: EntityModel) -> Self {
        Self {
            registry: TableRegistry::new(),
            model,
            resolution: Resolution::new(),
        }
    }

    /// Ensure a table is registered; idempotent
    pub fn register_table(&mut self, name: &str) -> &TableInfo {
        let id = self.registry.register_table(name);
        self.registry.get(id)
    }

    /// Register every table, join and column along `path`
    ///
    /// Returns the path's terminal table.
    pub fn register_field(&mut self, path: &DataPath) -> &TableInfo {
        let id = self.registry.register_field(path);
        self.registry.get(id)
    }

    /// Declare that `left`'s field is synchronized from `right`
    ///
    /// Returns `left`'s terminal table.
    pub fn register_join(&mut self, left: &DataPath, right: &DataPath) -> &TableInfo {
        let id = self.registry.register_join(left, right);
        self.registry.get(id)
    }

    /// Relationship engine over this service's state
    ///
    /// Use for step-wise persistence with cancellation checks between steps.
    pub fn engine<'s, S: SchemaSource + ?Sized>(
        &'s mut self,
        schema: &'s S,
    ) -> RelationshipEngine<'s, S> {
        RelationshipEngine::new(
            &mut self.registry,
            &mut self.model,
            &mut self.resolution,
            schema,
        )
    }

    /// Materialize entities and relationships for everything registered
    pub fn persist<S: SchemaSource + ?Sized>(&mut self, schema: &S) -> PersistenceReport {
        self.engine(schema).run()
    }

    /// Translator over the current resolution
    #[inline]
    #[must_use]
    pub fn translator(&self) -> Translator<'_> {
        Translator::new(&self.model, &self.resolution)
    }

    /// See [`Translator::translate_table`]
    ///
    /// # Errors
    /// [`MigrationError::MissingEntity`] if no entity was resolved
    pub fn translate_table(&self, table: &str) -> Result<String, MigrationError> {
        self.translator().translate_table(table)
    }

    /// See [`Translator::translate_field`]
    ///
    /// # Errors
    /// See [`Translator::translate_field`]
    pub fn translate_field(&self, path: &DataPath) -> Result<String, MigrationError> {
        self.translator().translate_field(path)
    }

    /// See [`Translator::translate_field_with_prefix`]
    ///
    /// # Errors
    /// See [`Translator::translate_field_with_prefix`]
    pub fn translate_field_with_prefix(
        &self,
        prefix: &DataPath,
        path: &DataPath,
    ) -> Result<String, MigrationError> {
        self.translator().translate_field_with_prefix(prefix, path)
    }

    /// See [`Translator::translate_reference`]
    ///
    /// # Errors
    /// See [`Translator::translate_reference`]
    pub fn translate_reference(
        &self,
        path: &DataPath,
        table: &str,
        field: &str,
    ) -> Result<String, MigrationError> {
        self.translator().translate_reference(path, table, field)
    }

    /// See [`Translator::translate_collection`]
    ///
    /// # Errors
    /// See [`Translator::translate_collection`]
    pub fn translate_collection(
        &self,
        path: &DataPath,
        table: &str,
        field: &str,
    ) -> Result<String, MigrationError> {
        self.translator().translate_collection(path, table, field)
    }

    /// Table registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Target entity model
    #[inline]
    #[must_use]
    pub fn model(&self) -> &EntityModel {
        &self.model
    }

    /// Resolved relationship cache
    #[inline]
    #[must_use]
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Consume the service, keeping the entity model
    #[inline]
    #[must_use]
    pub fn into_model(self) -> EntityModel {
        self.model
    }
}
