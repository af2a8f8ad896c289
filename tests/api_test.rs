//! API integration tests
//!
//! Tests for the REST endpoints, status mapping and response shapes

use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use fse::database::entities::*;
use fse::database::setup_database;
use fse::server::app::create_app;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

const BY_SOURCE: &str = "/api/entity-relationships/by-source";

/// Create a test server backed by a migrated SQLite file
async fn setup_test_server() -> Result<(TestServer, DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    let app = create_app(db.clone(), Some("*")).await?;
    let server = TestServer::new(app)?;

    Ok((server, db, temp_file))
}

/// A server whose database has no schema, so any storage access fails
async fn setup_broken_server() -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;

    let app = create_app(db, None).await?;
    let server = TestServer::new(app)?;

    Ok((server, temp_file))
}

/// Entity 5 with a TRANSPORT relationship to 7 and a REFERRAL relationship to 9,
/// each carrying its own patient
async fn seed_scenario(db: &DatabaseConnection) -> Result<()> {
    for (id, name, entity_type) in [
        (5, "St. Mary's Regional", EntityType::Hospital),
        (7, "Valley County EMS", EntityType::EmsAgency),
        (9, "Lakeside Stroke Center", EntityType::Hospital),
    ] {
        entity::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            entity_type: Set(entity_type),
        }
        .insert(db)
        .await?;
    }

    for (destination, relationship_type, patient_type, phone, instructions) in [
        (
            7,
            RelationshipType::Transport,
            PatientType::Trauma,
            "555-0107",
            "Meet at bay 2",
        ),
        (
            9,
            RelationshipType::Referral,
            PatientType::Stroke,
            "555-0109",
            "Page the stroke team",
        ),
    ] {
        entity_relationship::ActiveModel {
            source_entity_id: Set(5),
            destination_entity_id: Set(destination),
            relationship_type: Set(relationship_type),
            patient_type: Set(Some(patient_type)),
            contact_phone: Set(Some(phone.to_string())),
            instructions: Set(Some(instructions.to_string())),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _db, _temp_file) = setup_test_server().await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "fse-server");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_hello_endpoint() -> Result<()> {
    let (server, _db, _temp_file) = setup_test_server().await?;

    let response = server.get("/api/hello").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Hello, Pulsara!");

    Ok(())
}

#[tokio::test]
async fn test_list_entities() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;

    let response = server.get("/api/entities").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let entities: Vec<Value> = response.json();
    assert!(entities.is_empty());

    seed_scenario(&db).await?;

    let response = server.get("/api/entities").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let entities: Vec<Value> = response.json();
    assert_eq!(entities.len(), 3);
    assert_eq!(
        entities[0],
        json!({"id": 5, "name": "St. Mary's Regional", "entityType": "HOSPITAL"})
    );
    assert_eq!(entities[1]["entityType"], "EMS_AGENCY");

    Ok(())
}

#[tokio::test]
async fn test_get_entity() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let response = server.get("/api/entities/9").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let entity: Value = response.json();
    assert_eq!(entity["name"], "Lakeside Stroke Center");

    let response = server.get("/api/entities/999").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_relationships_grouped_by_type() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let response = server.get(&format!("{}/5", BY_SOURCE)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let groups = body["relationships"]
        .as_object()
        .expect("relationships should be an object");
    assert_eq!(groups.len(), 2);

    assert_eq!(
        body["relationships"]["TRANSPORT"],
        json!([{
            "source": {"id": 5, "name": "St. Mary's Regional", "type": "HOSPITAL"},
            "destination": {"id": 7, "name": "Valley County EMS", "type": "EMS_AGENCY"},
            "patient_types": [{
                "patientType": "TRAUMA",
                "contactPhone": "555-0107",
                "instructions": "Meet at bay 2"
            }]
        }])
    );

    assert_eq!(
        body["relationships"]["REFERRAL"],
        json!([{
            "source": {"id": 5, "name": "St. Mary's Regional", "type": "HOSPITAL"},
            "destination": {"id": 9, "name": "Lakeside Stroke Center", "type": "HOSPITAL"},
            "patient_types": [{
                "patientType": "STROKE",
                "contactPhone": "555-0109",
                "instructions": "Page the stroke team"
            }]
        }])
    );

    Ok(())
}

#[tokio::test]
async fn test_relationships_filtered_by_type() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let response = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_query_param("relationshipTypes", "REFERRAL")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let groups = body["relationships"].as_object().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(body["relationships"]["REFERRAL"][0]["destination"]["id"], 9);

    // A filter matching nothing yields an empty grouping
    let response = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_query_param("relationshipTypes", "CONSULT")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({"relationships": {}}));

    Ok(())
}

#[tokio::test]
async fn test_comma_separated_and_repeated_filters_agree() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let comma: Value = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_query_param("relationshipTypes", "TRANSPORT,REFERRAL")
        .await
        .json();
    let repeated: Value = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_raw_query_param("relationshipTypes=TRANSPORT&relationshipTypes=REFERRAL")
        .await
        .json();
    let unfiltered: Value = server.get(&format!("{}/5", BY_SOURCE)).await.json();

    assert_eq!(comma, repeated);
    assert_eq!(comma, unfiltered);

    Ok(())
}

#[tokio::test]
async fn test_unknown_relationship_type_is_bad_request() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let response = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_query_param("relationshipTypes", "BOGUS")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body.get("relationships").is_none());

    // One bad name rejects the whole request
    let response = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_query_param("relationshipTypes", "REFERRAL,BOGUS")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_non_positive_source_id_is_bad_request() -> Result<()> {
    let (server, _db, _temp_file) = setup_test_server().await?;

    for id in ["0", "-1", "-5"] {
        let response = server.get(&format!("{}/{}", BY_SOURCE, id)).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    for id in ["abc", "5.5"] {
        let response = server.get(&format!("{}/{}", BY_SOURCE, id)).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["error"], "VALIDATION_FAILED");
    }

    Ok(())
}

#[tokio::test]
async fn test_missing_source_is_not_found() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let response = server.get(&format!("{}/999", BY_SOURCE)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "NOT_FOUND");

    // Beyond the id column range
    let response = server.get(&format!("{}/99999999999", BY_SOURCE)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_source_without_relationships() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let response = server.get(&format!("{}/7", BY_SOURCE)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body, json!({"relationships": {}}));

    Ok(())
}

#[tokio::test]
async fn test_repeated_requests_are_identical() -> Result<()> {
    let (server, db, _temp_file) = setup_test_server().await?;
    seed_scenario(&db).await?;

    let first: Value = server.get(&format!("{}/5", BY_SOURCE)).await.json();
    let second: Value = server.get(&format!("{}/5", BY_SOURCE)).await.json();

    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn test_validation_happens_before_storage_access() -> Result<()> {
    let (server, _temp_file) = setup_broken_server().await?;

    let response = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_query_param("relationshipTypes", "BOGUS")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body["message"].as_str().unwrap().contains("BOGUS"));

    let response = server.get(&format!("{}/0", BY_SOURCE)).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "VALIDATION_FAILED");

    // A valid request against the same store does reach storage
    let response = server
        .get(&format!("{}/5", BY_SOURCE))
        .add_query_param("relationshipTypes", "REFERRAL")
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}

#[tokio::test]
async fn test_storage_failure_is_generic_internal_error() -> Result<()> {
    let (server, _temp_file) = setup_broken_server().await?;

    let response = server.get(&format!("{}/5", BY_SOURCE)).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["error"], "INTERNAL_ERROR");
    assert_eq!(
        body["message"],
        "Unable to retrieve relationships at this time. Please try again!"
    );

    let response = server.get("/api/entities").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "INTERNAL_ERROR");
    assert_eq!(
        body["message"],
        "Unable to retrieve entities at this time. Please try again!"
    );

    let response = server.get("/api/entities/5").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(!body["message"].as_str().unwrap().contains("no such table"));

    Ok(())
}

#[tokio::test]
async fn test_openapi_document() -> Result<()> {
    let (server, _db, _temp_file) = setup_test_server().await?;

    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let doc: Value = response.json();
    assert!(doc["paths"]["/api/entity-relationships/by-source/{sourceEntityId}"].is_object());
    assert!(doc["paths"]["/api/entities"].is_object());

    // Every schema reference points at a registered component
    let mut refs = Vec::new();
    collect_refs(&doc, &mut refs);
    assert!(!refs.is_empty());
    for reference in refs {
        let name = reference
            .strip_prefix("#/components/schemas/")
            .unwrap_or_else(|| panic!("unexpected reference {}", reference));
        assert!(
            doc["components"]["schemas"][name].is_object(),
            "dangling reference {}",
            reference
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_cors_headers() -> Result<()> {
    let (server, _db, _temp_file) = setup_test_server().await?;

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://localhost:3001"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    // CORS headers should be present
    let headers = response.headers();
    assert!(headers.get("access-control-allow-origin").is_some());

    Ok(())
}

fn collect_refs(value: &Value, refs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(reference)) => refs.push(reference.clone()),
                    _ => collect_refs(child, refs),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, refs)),
        _ => {}
    }
}
