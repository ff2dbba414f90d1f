use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Device role: sensors emit data, actuators receive commands.
#[derive(
    Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[sea_orm(string_value = "sensor")]
    Sensor,
    #[sea_orm(string_value = "actuator")]
    Actuator,
}

/// Reachability state. Telemetry ingestion is only accepted while `Online`.
#[derive(
    Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "offline")]
    Offline,
    #[sea_orm(string_value = "error")]
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    /// Refreshed on every write-touch, including telemetry/log insertion.
    pub last_seen: DateTimeWithTimeZone,
    pub serial_number: String,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::device_logs::Entity")]
    DeviceLogs,
    #[sea_orm(has_many = "super::device_data::Entity")]
    DeviceData,
    #[sea_orm(has_many = "super::device_group_devices::Entity")]
    GroupMemberships,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::device_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceLogs.def()
    }
}

impl Related<super::device_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceData.def()
    }
}

impl Related<super::device_groups::Entity> for Entity {
    fn to() -> RelationDef {
        super::device_group_devices::Relation::Group.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::device_group_devices::Relation::Device.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
