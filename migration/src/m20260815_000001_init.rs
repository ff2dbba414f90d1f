use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(users_table()).await?;

        manager.create_table(devices_table()).await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_devices_owner_created")
                    .table(Devices::Table)
                    .col(Devices::OwnerId)
                    .col(Devices::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager.create_table(device_logs_table()).await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_device_logs_device_created")
                    .table(DeviceLogs::Table)
                    .col(DeviceLogs::DeviceId)
                    .col(DeviceLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager.create_table(device_data_table()).await?;
        // Range queries filter on (device_id, created_at)
        manager
            .create_index(
                Index::create()
                    .name("idx_device_data_device_created")
                    .table(DeviceData::Table)
                    .col(DeviceData::DeviceId)
                    .col(DeviceData::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager.create_table(device_groups_table()).await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_device_groups_owner_created")
                    .table(DeviceGroups::Table)
                    .col(DeviceGroups::OwnerId)
                    .col(DeviceGroups::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager.create_table(device_group_devices_table()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeviceGroupDevices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .uuid()
                .not_null()
                .primary_key()
                .extra("DEFAULT gen_random_uuid()"),
        )
        .col(
            ColumnDef::new(Users::Email)
                .string_len(255)
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Users::Name).string_len(255).not_null())
        .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
        .col(
            ColumnDef::new(Users::ApiToken)
                .string_len(64)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(Users::IsActive)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(
            ColumnDef::new(Users::IsStaff)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Users::IsSuperuser)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Users::CreatedAt)
                .timestamp_with_time_zone()
                .extra("DEFAULT NOW()"),
        )
        .to_owned()
}

fn devices_table() -> TableCreateStatement {
    Table::create()
        .table(Devices::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Devices::Id)
                .uuid()
                .not_null()
                .primary_key()
                .extra("DEFAULT gen_random_uuid()"),
        )
        .col(ColumnDef::new(Devices::OwnerId).uuid().not_null())
        .col(ColumnDef::new(Devices::Name).string_len(50).not_null())
        .col(ColumnDef::new(Devices::DeviceType).string_len(16).not_null())
        .col(
            ColumnDef::new(Devices::Status)
                .string_len(16)
                .not_null()
                .default("online"),
        )
        .col(
            ColumnDef::new(Devices::LastSeen)
                .timestamp_with_time_zone()
                .not_null()
                .extra("DEFAULT NOW()"),
        )
        .col(
            ColumnDef::new(Devices::SerialNumber)
                .string_len(50)
                .not_null(),
        )
        .col(
            ColumnDef::new(Devices::CreatedAt)
                .timestamp_with_time_zone()
                .extra("DEFAULT NOW()"),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_devices_owner")
                .from(Devices::Table, Devices::OwnerId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn device_logs_table() -> TableCreateStatement {
    Table::create()
        .table(DeviceLogs::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(DeviceLogs::Id)
                .uuid()
                .not_null()
                .primary_key()
                .extra("DEFAULT gen_random_uuid()"),
        )
        .col(ColumnDef::new(DeviceLogs::DeviceId).uuid().not_null())
        .col(
            ColumnDef::new(DeviceLogs::Message)
                .string_len(255)
                .not_null(),
        )
        .col(
            ColumnDef::new(DeviceLogs::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .extra("DEFAULT NOW()"),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_device_logs_device")
                .from(DeviceLogs::Table, DeviceLogs::DeviceId)
                .to(Devices::Table, Devices::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn device_data_table() -> TableCreateStatement {
    Table::create()
        .table(DeviceData::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(DeviceData::Id)
                .uuid()
                .not_null()
                .primary_key()
                .extra("DEFAULT gen_random_uuid()"),
        )
        .col(ColumnDef::new(DeviceData::DeviceId).uuid().not_null())
        .col(ColumnDef::new(DeviceData::Data).string_len(255).not_null())
        .col(
            ColumnDef::new(DeviceData::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .extra("DEFAULT NOW()"),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_device_data_device")
                .from(DeviceData::Table, DeviceData::DeviceId)
                .to(Devices::Table, Devices::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn device_groups_table() -> TableCreateStatement {
    Table::create()
        .table(DeviceGroups::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(DeviceGroups::Id)
                .uuid()
                .not_null()
                .primary_key()
                .extra("DEFAULT gen_random_uuid()"),
        )
        .col(ColumnDef::new(DeviceGroups::OwnerId).uuid().not_null())
        .col(ColumnDef::new(DeviceGroups::Name).string_len(50).not_null())
        .col(ColumnDef::new(DeviceGroups::Description).string_len(100))
        .col(
            ColumnDef::new(DeviceGroups::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .extra("DEFAULT NOW()"),
        )
        .col(
            ColumnDef::new(DeviceGroups::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .extra("DEFAULT NOW()"),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_device_groups_owner")
                .from(DeviceGroups::Table, DeviceGroups::OwnerId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

// Composite primary key: membership is a set, not a list.
fn device_group_devices_table() -> TableCreateStatement {
    Table::create()
        .table(DeviceGroupDevices::Table)
        .if_not_exists()
        .col(ColumnDef::new(DeviceGroupDevices::GroupId).uuid().not_null())
        .col(
            ColumnDef::new(DeviceGroupDevices::DeviceId)
                .uuid()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(DeviceGroupDevices::GroupId)
                .col(DeviceGroupDevices::DeviceId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_group_devices_group")
                .from(DeviceGroupDevices::Table, DeviceGroupDevices::GroupId)
                .to(DeviceGroups::Table, DeviceGroups::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_group_devices_device")
                .from(DeviceGroupDevices::Table, DeviceGroupDevices::DeviceId)
                .to(Devices::Table, Devices::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    ApiToken,
    IsActive,
    IsStaff,
    IsSuperuser,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Devices {
    Table,
    Id,
    OwnerId,
    Name,
    DeviceType,
    Status,
    LastSeen,
    SerialNumber,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeviceLogs {
    Table,
    Id,
    DeviceId,
    Message,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeviceData {
    Table,
    Id,
    DeviceId,
    Data,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeviceGroups {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DeviceGroupDevices {
    Table,
    GroupId,
    DeviceId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::sea_query::PostgresQueryBuilder;

    #[test]
    fn every_child_table_cascades_on_parent_delete() {
        // (statement, number of FK edges that must cascade)
        let tables = [
            (devices_table().to_string(PostgresQueryBuilder), 1),
            (device_logs_table().to_string(PostgresQueryBuilder), 1),
            (device_data_table().to_string(PostgresQueryBuilder), 1),
            (device_groups_table().to_string(PostgresQueryBuilder), 1),
            (
                device_group_devices_table().to_string(PostgresQueryBuilder),
                2,
            ),
        ];

        for (sql, expected) in tables {
            assert_eq!(
                sql.matches("ON DELETE CASCADE").count(),
                expected,
                "missing cascade in: {sql}"
            );
        }
    }

    #[test]
    fn group_membership_key_is_the_pair() {
        let sql = device_group_devices_table().to_string(PostgresQueryBuilder);
        assert!(
            sql.contains(r#"PRIMARY KEY ("group_id", "device_id")"#),
            "unexpected membership key in: {sql}"
        );
    }

    #[test]
    fn user_identity_and_token_are_unique() {
        let sql = users_table().to_string(PostgresQueryBuilder);
        assert_eq!(sql.matches("UNIQUE").count(), 2, "in: {sql}");
    }
}
