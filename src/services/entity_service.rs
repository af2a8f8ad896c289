use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::error;

use crate::database::entities::entity;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct EntityService {
    db: DatabaseConnection,
}

impl EntityService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every entity, unfiltered and unpaginated
    pub async fn get_all_entities(&self) -> ServiceResult<Vec<entity::Model>> {
        entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to list entities: {}", e);
                ServiceError::entities_unavailable()
            })
    }

    /// Look up one entity; a missing row is `Ok(None)`, not an error.
    pub async fn get_entity_by_id(&self, entity_id: i32) -> ServiceResult<Option<entity::Model>> {
        entity::Entity::find_by_id(entity_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to load entity {}: {}", entity_id, e);
                ServiceError::entities_unavailable()
            })
    }
}
