use std::collections::HashSet;
use std::num::IntErrorKind;

use axum::{
    extract::{Path, RawQuery, State},
    response::Json,
};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::database::entities::RelationshipType;
use crate::errors::{ServiceError, ServiceResult};
use crate::server::app::AppState;
use crate::services::{EntityRelationshipService, EntityService, GroupedRelationships};

pub const RELATIONSHIP_TYPES_PARAM: &str = "relationshipTypes";

#[derive(Debug, Serialize, ToSchema)]
pub struct RelationshipsResponse {
    /// Relationship type name to the relationships of that type
    #[schema(value_type = Object)]
    pub relationships: GroupedRelationships,
}

/// Relationships originating at a source entity, grouped by relationship type
#[utoipa::path(
    get,
    path = "/api/entity-relationships/by-source/{sourceEntityId}",
    tag = "relationships",
    params(
        ("sourceEntityId" = i64, Path, description = "ID of the source entity, must be positive"),
        ("relationshipTypes" = Option<String>, Query, description = "Comma separated relationship types to keep")
    ),
    responses(
        (status = 200, description = "Grouped relationships", body = RelationshipsResponse),
        (status = 400, description = "Invalid source entity ID or relationship type"),
        (status = 404, description = "Source entity not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn get_relationships_by_source_entity(
    State(state): State<AppState>,
    Path(source_entity_id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<RelationshipsResponse>, ServiceError> {
    let (source_id, relationship_types) = validate_request(&source_entity_id, query.as_deref())
        .map_err(|err| {
            warn!(
                "Could not validate the request for source entity {}: {}",
                source_entity_id, err
            );
            err
        })?;

    let source_entity = match source_id {
        // Entity lookup failures surface as a relationship retrieval failure here
        Some(id) => EntityService::new(state.db.clone())
            .get_entity_by_id(id)
            .await
            .map_err(|_| ServiceError::relationships_unavailable())?,
        None => None,
    };

    let Some(source_entity) = source_entity else {
        info!(
            "Could not find the provided source entity with ID {}",
            source_entity_id
        );
        return Err(ServiceError::NotFound(format!(
            "Source entity {} not found",
            source_entity_id
        )));
    };

    let relationships = EntityRelationshipService::new(state.db.clone())
        .relationships_for_source(Some(&source_entity), &relationship_types)
        .await?;

    Ok(Json(RelationshipsResponse { relationships }))
}

/// Check the request before any storage access.
///
/// Returns the source id, or `None` when it is positive but too large to name a
/// stored entity, together with the type filter.
pub fn validate_request(
    source_entity_id: &str,
    query: Option<&str>,
) -> ServiceResult<(Option<i32>, HashSet<RelationshipType>)> {
    let source_id = parse_source_entity_id(source_entity_id)?;
    let relationship_types = RelationshipType::parse_set(relationship_type_params(query))?;

    Ok((source_id, relationship_types))
}

fn parse_source_entity_id(raw: &str) -> ServiceResult<Option<i32>> {
    let not_positive = || {
        ServiceError::Validation(format!("sourceEntityId must be positive, got {}", raw))
    };

    match raw.parse::<i64>() {
        Ok(id) if id <= 0 => Err(not_positive()),
        Ok(id) => Ok(i32::try_from(id).ok()),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(None),
            IntErrorKind::NegOverflow => Err(not_positive()),
            _ => Err(ServiceError::Validation(format!(
                "sourceEntityId must be an integer, got '{}'",
                raw
            ))),
        },
    }
}

/// Collect `relationshipTypes` values, accepting both `A,B` and repeated parameters.
pub fn relationship_type_params(query: Option<&str>) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter_map(|(key, value)| (key == RELATIONSHIP_TYPES_PARAM).then_some(value))
        .flat_map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}
