use anyhow::Result;
use sea_orm::*;
use tracing::info;

use crate::database::entities::{
    entity, entity_relationship, EntityType, PatientType, RelationshipType,
};

/// Insert a small sample network of facilities unless entities already exist.
pub async fn create_sample_network(db: &DatabaseConnection) -> Result<()> {
    let existing = entity::Entity::find().count(db).await?;
    if existing > 0 {
        info!(
            "Database already holds {} entities, skipping seed data creation",
            existing
        );
        return Ok(());
    }

    let txn = db.begin().await?;

    create_sample_entities(&txn).await?;
    create_sample_relationships(&txn).await?;

    txn.commit().await?;

    info!("Successfully created sample facility network");
    Ok(())
}

async fn create_sample_entities<C: ConnectionTrait>(db: &C) -> Result<()> {
    info!("Creating sample entities...");

    let entities_data = [
        (5, "St. Mary's Regional Medical Center", EntityType::Hospital),
        (7, "Valley County EMS", EntityType::EmsAgency),
        (9, "Lakeside Comprehensive Stroke Center", EntityType::Hospital),
        (11, "Northside Family Clinic", EntityType::Clinic),
        (13, "Riverbend Urgent Care", EntityType::UrgentCare),
    ];

    let models = entities_data
        .into_iter()
        .map(|(id, name, entity_type)| entity::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            entity_type: Set(entity_type),
        });

    entity::Entity::insert_many(models).exec(db).await?;
    Ok(())
}

async fn create_sample_relationships<C: ConnectionTrait>(db: &C) -> Result<()> {
    info!("Creating sample relationships...");

    let relationships_data = [
        (
            5,
            7,
            RelationshipType::Transport,
            PatientType::Trauma,
            "555-0107",
            "Call dispatch before scene departure",
        ),
        (
            5,
            9,
            RelationshipType::Referral,
            PatientType::Stroke,
            "555-0109",
            "Page the stroke team on arrival",
        ),
        (
            5,
            9,
            RelationshipType::Transfer,
            PatientType::Stemi,
            "555-0190",
            "Direct to cath lab",
        ),
        (
            11,
            5,
            RelationshipType::Referral,
            PatientType::General,
            "555-0105",
            "Fax records to admissions",
        ),
        (
            13,
            5,
            RelationshipType::Consult,
            PatientType::Sepsis,
            "555-0150",
            "Consult ED attending by phone",
        ),
    ];

    let models = relationships_data.into_iter().map(
        |(source, destination, relationship_type, patient_type, phone, instructions)| {
            entity_relationship::ActiveModel {
                source_entity_id: Set(source),
                destination_entity_id: Set(destination),
                relationship_type: Set(relationship_type),
                patient_type: Set(Some(patient_type)),
                contact_phone: Set(Some(phone.to_string())),
                instructions: Set(Some(instructions.to_string())),
                ..Default::default()
            }
        },
    );

    entity_relationship::Entity::insert_many(models)
        .exec(db)
        .await?;
    Ok(())
}
