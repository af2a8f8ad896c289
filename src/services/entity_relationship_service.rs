use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::database::entities::{
    entity, entity_relationship, EntityType, Patient, RelationshipType,
};
use crate::errors::{ServiceError, ServiceResult};

/// Relationship views keyed by relationship type name.
///
/// Each group is a set: two rows that render to the same view are reported once.
/// Groups and entries keep the order in which rows came back from the store.
pub type GroupedRelationships = IndexMap<String, IndexSet<RelationshipView>>;

/// The `{id, name, type}` summary of an entity used inside relationship views
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct EntityRef {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

impl From<&entity::Model> for EntityRef {
    fn from(model: &entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            entity_type: model.entity_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct RelationshipView {
    pub source: EntityRef,
    pub destination: EntityRef,
    pub patient_types: Vec<Patient>,
}

impl RelationshipView {
    fn new(relationship: &LoadedRelationship, patient_types: Vec<Patient>) -> Self {
        Self {
            source: EntityRef::from(&relationship.source),
            destination: EntityRef::from(&relationship.destination),
            patient_types,
        }
    }
}

/// A relationship row together with the entities at both of its ends
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedRelationship {
    pub relationship: entity_relationship::Model,
    pub source: entity::Model,
    pub destination: entity::Model,
}

impl LoadedRelationship {
    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship.relationship_type
    }
}

#[derive(Clone)]
pub struct EntityRelationshipService {
    db: DatabaseConnection,
}

impl EntityRelationshipService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All relationships originating at `source`.
    pub async fn get_relationships_by_source_entity(
        &self,
        source: Option<&entity::Model>,
    ) -> ServiceResult<Vec<LoadedRelationship>> {
        let source = require_source(source)?;

        find_relationships(&self.db, source, None)
            .await
            .map_err(storage_failure("retrieving relationships"))
    }

    /// Relationships originating at `source` whose type is in `relationship_types`.
    ///
    /// An empty set applies no type filter.
    pub async fn get_relationships_by_source_entity_and_types(
        &self,
        source: Option<&entity::Model>,
        relationship_types: &HashSet<RelationshipType>,
    ) -> ServiceResult<Vec<LoadedRelationship>> {
        let source = require_source(source)?;

        find_relationships(&self.db, source, Some(relationship_types))
            .await
            .map_err(storage_failure("retrieving relationships"))
    }

    /// Like [`Self::get_relationships_by_source_entity_and_types`], taking type names.
    ///
    /// Names are parsed before the store is touched; one unknown name fails the call.
    pub async fn get_relationships_by_source_entity_and_type_names<S: AsRef<str>>(
        &self,
        source: Option<&entity::Model>,
        relationship_type_names: &[S],
    ) -> ServiceResult<Vec<LoadedRelationship>> {
        let relationship_types = RelationshipType::parse_set(relationship_type_names)?;
        self.get_relationships_by_source_entity_and_types(source, &relationship_types)
            .await
    }

    /// The patient embedded in every row linking `source` to `destination` with
    /// the given type. Duplicates are kept.
    pub async fn get_patients_by_source_and_destination_and_type(
        &self,
        source: &entity::Model,
        destination: &entity::Model,
        relationship_type: RelationshipType,
    ) -> ServiceResult<Vec<Patient>> {
        find_patients(&self.db, source.id, destination.id, relationship_type)
            .await
            .map_err(storage_failure("retrieving patients"))
    }

    pub async fn map_relationship(
        &self,
        relationship: &LoadedRelationship,
    ) -> ServiceResult<RelationshipView> {
        map_with_patients(&self.db, relationship, &mut PatientCache::new())
            .await
            .map_err(storage_failure("retrieving patients"))
    }

    pub async fn group_relationships(
        &self,
        relationships: Vec<LoadedRelationship>,
    ) -> ServiceResult<GroupedRelationships> {
        group_and_enrich(&self.db, relationships)
            .await
            .map_err(storage_failure("grouping relationships"))
    }

    /// Fetch, group and enrich the relationships of `source` inside one read
    /// transaction. The transaction is rolled back on every error path.
    pub async fn relationships_for_source(
        &self,
        source: Option<&entity::Model>,
        relationship_types: &HashSet<RelationshipType>,
    ) -> ServiceResult<GroupedRelationships> {
        let source = require_source(source)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(storage_failure("opening a read transaction"))?;

        let relationships = find_relationships(&txn, source, Some(relationship_types))
            .await
            .map_err(storage_failure("retrieving relationships"))?;

        debug!(
            "Found {} relationships for source entity {}",
            relationships.len(),
            source.id
        );

        let grouped = group_and_enrich(&txn, relationships)
            .await
            .map_err(storage_failure("grouping relationships"))?;

        txn.commit()
            .await
            .map_err(storage_failure("closing the read transaction"))?;

        Ok(grouped)
    }
}

fn require_source(source: Option<&entity::Model>) -> ServiceResult<&entity::Model> {
    source.ok_or_else(|| {
        warn!("Source entity is missing");
        ServiceError::NotFound("Source entity not found".to_string())
    })
}

fn storage_failure(action: &'static str) -> impl FnOnce(DbErr) -> ServiceError {
    move |err| {
        error!("An error occurred while {}: {}", action, err);
        ServiceError::relationships_unavailable()
    }
}

async fn find_relationships<C: ConnectionTrait>(
    conn: &C,
    source: &entity::Model,
    relationship_types: Option<&HashSet<RelationshipType>>,
) -> Result<Vec<LoadedRelationship>, DbErr> {
    let mut query = entity_relationship::Entity::find()
        .filter(entity_relationship::Column::SourceEntityId.eq(source.id));

    if let Some(types) = relationship_types.filter(|types| !types.is_empty()) {
        query = query
            .filter(entity_relationship::Column::RelationshipType.is_in(types.iter().copied()));
    }

    let rows = query
        .order_by_asc(entity_relationship::Column::Id)
        .find_also_linked(entity_relationship::DestinationEntityLink)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(relationship, destination)| {
            let destination = destination.ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "destination entity {} of relationship {}",
                    relationship.destination_entity_id, relationship.id
                ))
            })?;

            Ok(LoadedRelationship {
                relationship,
                source: source.clone(),
                destination,
            })
        })
        .collect()
}

async fn find_patients<C: ConnectionTrait>(
    conn: &C,
    source_entity_id: i32,
    destination_entity_id: i32,
    relationship_type: RelationshipType,
) -> Result<Vec<Patient>, DbErr> {
    let rows = entity_relationship::Entity::find()
        .filter(entity_relationship::Column::SourceEntityId.eq(source_entity_id))
        .filter(entity_relationship::Column::DestinationEntityId.eq(destination_entity_id))
        .filter(entity_relationship::Column::RelationshipType.eq(relationship_type))
        .order_by_asc(entity_relationship::Column::Id)
        .all(conn)
        .await?;

    Ok(rows.iter().map(entity_relationship::Model::patient).collect())
}

/// Rows sharing a (source, destination, type) triple resolve to the same patients
type PatientCache = HashMap<(i32, i32, RelationshipType), Vec<Patient>>;

async fn map_with_patients<C: ConnectionTrait>(
    conn: &C,
    relationship: &LoadedRelationship,
    cache: &mut PatientCache,
) -> Result<RelationshipView, DbErr> {
    let relationship_type = relationship.relationship_type();
    let triple = (
        relationship.source.id,
        relationship.destination.id,
        relationship_type,
    );

    let patient_types = match cache.get(&triple) {
        Some(patients) => patients.clone(),
        None => {
            let patients = find_patients(conn, triple.0, triple.1, relationship_type).await?;
            cache.insert(triple, patients.clone());
            patients
        }
    };

    Ok(RelationshipView::new(relationship, patient_types))
}

async fn group_and_enrich<C: ConnectionTrait>(
    conn: &C,
    relationships: Vec<LoadedRelationship>,
) -> Result<GroupedRelationships, DbErr> {
    let mut cache = PatientCache::new();
    let mut grouped = GroupedRelationships::new();

    for relationship in relationships {
        let view = map_with_patients(conn, &relationship, &mut cache).await?;

        grouped
            .entry(relationship.relationship_type().to_string())
            .or_default()
            .insert(view);
    }

    Ok(grouped)
}
