use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::info;

use crate::database::entities::entity::{self, Model as Entity};
use crate::errors::ServiceError;
use crate::server::app::AppState;
use crate::services::EntityService;

#[utoipa::path(
    get,
    path = "/api/entities",
    tag = "entities",
    responses(
        (status = 200, description = "List all entities", body = [Entity]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_entities(
    State(state): State<AppState>,
) -> Result<Json<Vec<entity::Model>>, ServiceError> {
    let entities = EntityService::new(state.db.clone())
        .get_all_entities()
        .await?;

    Ok(Json(entities))
}

#[utoipa::path(
    get,
    path = "/api/entities/{id}",
    tag = "entities",
    params(
        ("id" = i32, Path, description = "Entity ID")
    ),
    responses(
        (status = 200, description = "Entity found", body = Entity),
        (status = 404, description = "Entity not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn get_entity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<entity::Model>, ServiceError> {
    let entity = EntityService::new(state.db.clone())
        .get_entity_by_id(id)
        .await?
        .ok_or_else(|| {
            info!("Could not find entity with ID {}", id);
            ServiceError::NotFound(format!("Entity {} not found", id))
        })?;

    Ok(Json(entity))
}
