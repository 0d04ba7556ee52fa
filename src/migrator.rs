use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_companies_table::Migration),
            Box::new(m20241001_000002_create_users_table::Migration),
            Box::new(m20241001_000003_create_materials_table::Migration),
            Box::new(m20241001_000004_create_orders_table::Migration),
            Box::new(m20241001_000005_create_order_items_table::Migration),
            Box::new(m20241001_000006_create_skip_hire_orders_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    CompanyType,
    Email,
    Phone,
    Logo,
    Rating,
    City,
    Country,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    Avatar,
    UserType,
    Status,
    EmailVerified,
    PhoneVerified,
    CompanyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Materials {
    Table,
    Id,
    Name,
    Description,
    Category,
    SubCategory,
    BasePrice,
    Unit,
    Currency,
    InStock,
    MinOrder,
    MaxOrder,
    IsRecycled,
    Quality,
    Certificates,
    Images,
    Specifications,
    SupplierId,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    OrderType,
    BuyerId,
    CreatedById,
    DeliveryAddress,
    DeliveryCity,
    DeliveryState,
    DeliveryPostal,
    DeliveryDate,
    DeliveryWindow,
    DeliveryFee,
    Subtotal,
    Tax,
    Total,
    Currency,
    Status,
    PaymentStatus,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    MaterialId,
    Quantity,
    Unit,
    UnitPrice,
    Total,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SkipHireOrders {
    Table,
    Id,
    OrderNumber,
    Location,
    WasteCategory,
    SkipSize,
    DeliveryDate,
    Price,
    Currency,
    Status,
    ContactName,
    ContactEmail,
    ContactPhone,
    Notes,
    UserId,
    CreatedAt,
    UpdatedAt,
}

mod m20241001_000001_create_companies_table {
    use super::Companies;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000001_create_companies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Companies::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .col(ColumnDef::new(Companies::CompanyType).string_len(20).not_null())
                        .col(ColumnDef::new(Companies::Email).string().null())
                        .col(ColumnDef::new(Companies::Phone).string().null())
                        .col(ColumnDef::new(Companies::Logo).string().null())
                        .col(ColumnDef::new(Companies::Rating).decimal_len(3, 2).null())
                        .col(ColumnDef::new(Companies::City).string().null())
                        .col(ColumnDef::new(Companies::Country).string().null())
                        .col(
                            ColumnDef::new(Companies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Companies::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000002_create_users_table {
    use super::{Companies, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000002_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::FirstName).string().not_null())
                        .col(ColumnDef::new(Users::LastName).string().not_null())
                        .col(ColumnDef::new(Users::Phone).string().null())
                        .col(ColumnDef::new(Users::Avatar).string().null())
                        .col(ColumnDef::new(Users::UserType).string_len(20).not_null())
                        .col(ColumnDef::new(Users::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Users::EmailVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::PhoneVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Users::CompanyId).uuid().null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_users_company_id")
                                .from(Users::Table, Users::CompanyId)
                                .to(Companies::Table, Companies::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_company_id")
                        .table(Users::Table)
                        .col(Users::CompanyId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000003_create_materials_table {
    use super::{Companies, Materials};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000003_create_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Materials::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Materials::Name).string().not_null())
                        .col(ColumnDef::new(Materials::Description).text().null())
                        .col(ColumnDef::new(Materials::Category).string_len(20).not_null())
                        .col(ColumnDef::new(Materials::SubCategory).string().null())
                        .col(
                            ColumnDef::new(Materials::BasePrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::Unit).string_len(10).not_null())
                        .col(ColumnDef::new(Materials::Currency).string_len(3).not_null())
                        .col(
                            ColumnDef::new(Materials::InStock)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Materials::MinOrder).decimal_len(12, 3).null())
                        .col(ColumnDef::new(Materials::MaxOrder).decimal_len(12, 3).null())
                        .col(
                            ColumnDef::new(Materials::IsRecycled)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Materials::Quality).string().null())
                        .col(ColumnDef::new(Materials::Certificates).json().not_null())
                        .col(ColumnDef::new(Materials::Images).json().not_null())
                        .col(ColumnDef::new(Materials::Specifications).json().null())
                        .col(ColumnDef::new(Materials::SupplierId).uuid().not_null())
                        .col(
                            ColumnDef::new(Materials::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_materials_supplier_id")
                                .from(Materials::Table, Materials::SupplierId)
                                .to(Companies::Table, Companies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_materials_supplier_id")
                        .table(Materials::Table)
                        .col(Materials::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_materials_category")
                        .table(Materials::Table)
                        .col(Materials::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000004_create_orders_table {
    use super::{Companies, Orders, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000004_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::OrderType).string_len(20).not_null())
                        .col(ColumnDef::new(Orders::BuyerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::CreatedById).uuid().not_null())
                        .col(ColumnDef::new(Orders::DeliveryAddress).string().not_null())
                        .col(ColumnDef::new(Orders::DeliveryCity).string().not_null())
                        .col(ColumnDef::new(Orders::DeliveryState).string().not_null())
                        .col(ColumnDef::new(Orders::DeliveryPostal).string().not_null())
                        .col(ColumnDef::new(Orders::DeliveryDate).date().null())
                        .col(ColumnDef::new(Orders::DeliveryWindow).string().null())
                        .col(
                            ColumnDef::new(Orders::DeliveryFee)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Subtotal).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Orders::Tax).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Orders::Total).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Orders::Currency).string_len(3).not_null())
                        .col(ColumnDef::new(Orders::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string_len(20).not_null())
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_buyer_id")
                                .from(Orders::Table, Orders::BuyerId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_created_by_id")
                                .from(Orders::Table, Orders::CreatedById)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_buyer_id")
                        .table(Orders::Table)
                        .col(Orders::BuyerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000005_create_order_items_table {
    use super::{Materials, OrderItems, Orders};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000005_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::MaterialId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Quantity)
                                .decimal_len(12, 3)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::Unit).string_len(10).not_null())
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::Total).decimal_len(12, 2).not_null())
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_material_id")
                                .from(OrderItems::Table, OrderItems::MaterialId)
                                .to(Materials::Table, Materials::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000006_create_skip_hire_orders_table {
    use super::{SkipHireOrders, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000006_create_skip_hire_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SkipHireOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SkipHireOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SkipHireOrders::OrderNumber)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(SkipHireOrders::Location).string().not_null())
                        .col(
                            ColumnDef::new(SkipHireOrders::WasteCategory)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SkipHireOrders::SkipSize)
                                .string_len(10)
                                .not_null(),
                        )
                        .col(ColumnDef::new(SkipHireOrders::DeliveryDate).date().not_null())
                        .col(
                            ColumnDef::new(SkipHireOrders::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SkipHireOrders::Currency)
                                .string_len(3)
                                .not_null(),
                        )
                        .col(ColumnDef::new(SkipHireOrders::Status).string_len(20).not_null())
                        .col(ColumnDef::new(SkipHireOrders::ContactName).string().null())
                        .col(ColumnDef::new(SkipHireOrders::ContactEmail).string().null())
                        .col(ColumnDef::new(SkipHireOrders::ContactPhone).string().null())
                        .col(ColumnDef::new(SkipHireOrders::Notes).text().null())
                        .col(ColumnDef::new(SkipHireOrders::UserId).uuid().null())
                        .col(
                            ColumnDef::new(SkipHireOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SkipHireOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_skip_hire_orders_user_id")
                                .from(SkipHireOrders::Table, SkipHireOrders::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_skip_hire_orders_user_id")
                        .table(SkipHireOrders::Table)
                        .col(SkipHireOrders::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SkipHireOrders::Table).to_owned())
                .await
        }
    }
}
