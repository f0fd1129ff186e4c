//! Consolidated initial schema migration

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create accounts table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(uuid(Account::Id).primary_key())
                    .col(string_len(Account::Username, 255).not_null().unique_key())
                    .col(string_len(Account::PasswordHash, 255).not_null())
                    .col(string_len(Account::Role, 32).not_null())
                    .col(
                        timestamp_with_time_zone(Account::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Account::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_accounts_username")
                    .table(Account::Table)
                    .col(Account::Username)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create fruits table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Fruit::Table)
                    .if_not_exists()
                    .col(uuid(Fruit::Id).primary_key())
                    .col(string_len(Fruit::ProductName, 255).not_null())
                    .col(string_len(Fruit::State, 255).not_null())
                    .col(double(Fruit::Price).not_null())
                    .col(integer(Fruit::Quantity).not_null().default(0))
                    .col(
                        string_len(Fruit::Remark, 32)
                            .not_null()
                            .default("Available"),
                    )
                    .col(string_len(Fruit::Status, 32).not_null().default("Pending"))
                    .col(string_len(Fruit::AddedBy, 255).not_null())
                    .col(string_len(Fruit::AddedByRole, 32).not_null())
                    .col(string_len_null(Fruit::ApprovedBy, 255))
                    .col(string_len_null(Fruit::ApprovedByRole, 32))
                    .col(timestamp_with_time_zone_null(Fruit::ApprovalDate))
                    .col(text_null(Fruit::RejectionReason))
                    .col(
                        timestamp_with_time_zone(Fruit::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Fruit::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fruits_added_by")
                    .table(Fruit::Table)
                    .col(Fruit::AddedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fruits_status")
                    .table(Fruit::Table)
                    .col(Fruit::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fruits_created_at")
                    .table(Fruit::Table)
                    .col(Fruit::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Fruit::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum Account {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Fruit {
    #[sea_orm(iden = "fruits")]
    Table,
    Id,
    ProductName,
    State,
    Price,
    Quantity,
    Remark,
    Status,
    AddedBy,
    AddedByRole,
    ApprovedBy,
    ApprovedByRole,
    ApprovalDate,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
}
