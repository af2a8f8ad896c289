use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::{PatientType, RelationshipType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entity_relationships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub source_entity_id: i32,
    pub destination_entity_id: i32,
    pub relationship_type: RelationshipType,
    // Embedded patient record
    pub patient_type: Option<PatientType>,
    pub contact_phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub instructions: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entity::Entity",
        from = "Column::SourceEntityId",
        to = "super::entity::Column::Id"
    )]
    SourceEntity,
    #[sea_orm(
        belongs_to = "super::entity::Entity",
        from = "Column::DestinationEntityId",
        to = "super::entity::Column::Id"
    )]
    DestinationEntity,
}

/// Both foreign keys point at `entities`, so the destination end is joined through a link.
pub struct DestinationEntityLink;

impl Linked for DestinationEntityLink {
    type FromEntity = Entity;
    type ToEntity = super::entity::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::DestinationEntity.def()]
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Patient data carried by a relationship row; it has no identity of its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub patient_type: Option<PatientType>,
    pub contact_phone: Option<String>,
    pub instructions: Option<String>,
}

impl Model {
    pub fn patient(&self) -> Patient {
        Patient {
            patient_type: self.patient_type,
            contact_phone: self.contact_phone.clone(),
            instructions: self.instructions.clone(),
        }
    }
}
