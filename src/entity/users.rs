use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    /// Hashed credential, never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Opaque bearer credential presented by API clients. Issuance and
    /// rotation belong to the identity provider, not this service.
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub api_token: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::devices::Entity")]
    Devices,
    #[sea_orm(has_many = "super::device_groups::Entity")]
    DeviceGroups,
}

impl Related<super::devices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Devices.def()
    }
}

impl Related<super::device_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
