use axum::response::Json;
use utoipa::OpenApi;

use super::handlers::{entities, entity_relationships, health, hello};
use crate::database::entities::{entity, EntityType, Patient, PatientType, RelationshipType};
use crate::services::{EntityRef, RelationshipView};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        hello::hello,
        entities::list_entities,
        entities::get_entity,
        entity_relationships::get_relationships_by_source_entity,
    ),
    components(schemas(
        entity::Model,
        EntityType,
        RelationshipType,
        PatientType,
        Patient,
        EntityRef,
        RelationshipView,
        entity_relationships::RelationshipsResponse,
    )),
    tags(
        (name = "entities", description = "Facility lookup"),
        (name = "relationships", description = "Typed relationships between facilities"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
