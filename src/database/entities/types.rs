use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::UnknownVariant;

/// Classification of a directed relationship between two entities
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    #[sea_orm(string_value = "TRANSPORT")]
    Transport,
    #[sea_orm(string_value = "REFERRAL")]
    Referral,
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
    #[sea_orm(string_value = "CONSULT")]
    Consult,
}

/// Kind of facility an entity represents
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    #[sea_orm(string_value = "HOSPITAL")]
    Hospital,
    #[sea_orm(string_value = "EMS_AGENCY")]
    EmsAgency,
    #[sea_orm(string_value = "CLINIC")]
    Clinic,
    #[sea_orm(string_value = "URGENT_CARE")]
    UrgentCare,
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientType {
    #[sea_orm(string_value = "STROKE")]
    Stroke,
    #[sea_orm(string_value = "STEMI")]
    Stemi,
    #[sea_orm(string_value = "TRAUMA")]
    Trauma,
    #[sea_orm(string_value = "SEPSIS")]
    Sepsis,
    #[sea_orm(string_value = "GENERAL")]
    General,
}

/// Implements `FromStr` and `Display` over the stored string value, so the
/// wire form, the column value and the parse input are one and the same.
macro_rules! string_enum {
    ($name:ident, $kind:literal) => {
        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as ActiveEnum>::try_from_value(&s.to_owned()).map_err(|_| UnknownVariant {
                    kind: $kind,
                    value: s.to_owned(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_value())
            }
        }
    };
}

string_enum!(RelationshipType, "relationship type");
string_enum!(EntityType, "entity type");
string_enum!(PatientType, "patient type");

impl RelationshipType {
    /// Parse every name, failing on the first one that is not a relationship type.
    pub fn parse_set<I, S>(names: I) -> Result<HashSet<Self>, UnknownVariant>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|name| name.as_ref().parse()).collect()
    }
}
