use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create entities table
        manager
            .create_table(
                Table::create()
                    .table(Entities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entities::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entities::Name).string().not_null())
                    .col(ColumnDef::new(Entities::EntityType).string_len(32).not_null())
                    .to_owned(),
            )
            .await?;

        // Create entity_relationships table; patient columns are embedded
        manager
            .create_table(
                Table::create()
                    .table(EntityRelationships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntityRelationships::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EntityRelationships::SourceEntityId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntityRelationships::DestinationEntityId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntityRelationships::RelationshipType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EntityRelationships::PatientType).string_len(32))
                    .col(ColumnDef::new(EntityRelationships::ContactPhone).string())
                    .col(ColumnDef::new(EntityRelationships::Instructions).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entity_relationships_source_entity_id")
                            .from(EntityRelationships::Table, EntityRelationships::SourceEntityId)
                            .to(Entities::Table, Entities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entity_relationships_destination_entity_id")
                            .from(
                                EntityRelationships::Table,
                                EntityRelationships::DestinationEntityId,
                            )
                            .to(Entities::Table, Entities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_entity_relationships_source_type")
                    .table(EntityRelationships::Table)
                    .col(EntityRelationships::SourceEntityId)
                    .col(EntityRelationships::RelationshipType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(EntityRelationships::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Entities::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Entities {
    Table,
    Id,
    Name,
    EntityType,
}

#[derive(DeriveIden)]
enum EntityRelationships {
    Table,
    Id,
    SourceEntityId,
    DestinationEntityId,
    RelationshipType,
    PatientType,
    ContactPhone,
    Instructions,
}
