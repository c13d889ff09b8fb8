use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_customers_table::Migration),
            Box::new(m20240101_000003_create_dealers_table::Migration),
            Box::new(m20240101_000004_create_users_tables::Migration),
            Box::new(m20240101_000005_create_dealer_order_tables::Migration),
            Box::new(m20240101_000006_create_quotations_table::Migration),
            Box::new(m20240101_000007_create_orders_table::Migration),
            Box::new(m20240101_000008_create_invoices_table::Migration),
            Box::new(m20240101_000009_create_installment_tables::Migration),
            Box::new(m20240101_000010_create_payments_table::Migration),
            Box::new(m20240101_000011_create_appointments_table::Migration),
            Box::new(m20240101_000012_create_feedback_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(VehicleModels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VehicleModels::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleModels::Name).string().not_null())
                        .col(ColumnDef::new(VehicleModels::Segment).string().null())
                        .col(
                            ColumnDef::new(VehicleModels::BasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(VehicleModels::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(VehicleModels::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleModels::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VehicleVariants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VehicleVariants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleVariants::ModelId).uuid().not_null())
                        .col(ColumnDef::new(VehicleVariants::Name).string().not_null())
                        .col(ColumnDef::new(VehicleVariants::Sku).string().not_null())
                        .col(
                            ColumnDef::new(VehicleVariants::BatteryKwh)
                                .decimal()
                                .null(),
                        )
                        .col(ColumnDef::new(VehicleVariants::RangeKm).integer().null())
                        .col(ColumnDef::new(VehicleVariants::Color).string().null())
                        .col(
                            ColumnDef::new(VehicleVariants::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(VehicleVariants::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(VehicleVariants::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleVariants::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vehicle_variants_model_id")
                        .table(VehicleVariants::Table)
                        .col(VehicleVariants::ModelId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_vehicle_variants_sku")
                        .table(VehicleVariants::Table)
                        .col(VehicleVariants::Sku)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VehicleVariants::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(VehicleModels::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum VehicleModels {
        Table,
        Id,
        Name,
        Segment,
        BasePrice,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum VehicleVariants {
        Table,
        Id,
        ModelId,
        Name,
        Sku,
        BatteryKwh,
        RangeKm,
        Color,
        Price,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::FullName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_customers_email")
                        .table(Customers::Table)
                        .col(Customers::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        FullName,
        Email,
        Phone,
        Address,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_dealers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_dealers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Dealers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Dealers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Dealers::Name).string().not_null())
                        .col(ColumnDef::new(Dealers::Region).string().null())
                        .col(
                            ColumnDef::new(Dealers::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Dealers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Dealers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Dealers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Dealers {
        Table,
        Id,
        Name,
        Region,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_users_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_users_tables"
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
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::DealerId).uuid().null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RefreshTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RefreshTokens::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RefreshTokens::UserId).uuid().not_null())
                        .col(ColumnDef::new(RefreshTokens::JtiHash).string().not_null())
                        .col(
                            ColumnDef::new(RefreshTokens::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::Revoked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_refresh_tokens_jti_hash")
                        .table(RefreshTokens::Table)
                        .col(RefreshTokens::JtiHash)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_refresh_tokens_user_id")
                        .table(RefreshTokens::Table)
                        .col(RefreshTokens::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RefreshTokens::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Role,
        DealerId,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum RefreshTokens {
        Table,
        Id,
        UserId,
        JtiHash,
        ExpiresAt,
        Revoked,
        CreatedAt,
    }
}

mod m20240101_000005_create_dealer_order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_dealer_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DealerOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DealerOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DealerOrders::DealerId).uuid().not_null())
                        .col(ColumnDef::new(DealerOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(DealerOrders::OrderDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DealerOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DealerOrders::Notes).string().null())
                        .col(ColumnDef::new(DealerOrders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_dealer_orders_dealer_id")
                        .table(DealerOrders::Table)
                        .col(DealerOrders::DealerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DealerOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DealerOrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DealerOrderItems::DealerOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DealerOrderItems::VariantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DealerOrderItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DealerOrderItems::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DealerOrderItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_dealer_order_items_order_id")
                        .table(DealerOrderItems::Table)
                        .col(DealerOrderItems::DealerOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DealerOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DealerOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DealerOrders {
        Table,
        Id,
        DealerId,
        Status,
        OrderDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum DealerOrderItems {
        Table,
        Id,
        DealerOrderId,
        VariantId,
        Quantity,
        UnitPrice,
        CreatedAt,
    }
}

mod m20240101_000006_create_quotations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_quotations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Quotations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Quotations::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Quotations::VariantId).uuid().not_null())
                        .col(ColumnDef::new(Quotations::DealerId).uuid().null())
                        .col(ColumnDef::new(Quotations::DealerOrderId).uuid().null())
                        .col(ColumnDef::new(Quotations::TotalPrice).decimal().not_null())
                        .col(
                            ColumnDef::new(Quotations::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Quotations::FinalPrice).decimal().not_null())
                        .col(ColumnDef::new(Quotations::Status).string().not_null())
                        .col(
                            ColumnDef::new(Quotations::QuotationDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Quotations::ExpiryDate).timestamp().null())
                        .col(ColumnDef::new(Quotations::RejectionReason).string().null())
                        .col(ColumnDef::new(Quotations::RejectedAt).timestamp().null())
                        .col(ColumnDef::new(Quotations::Notes).string().null())
                        .col(ColumnDef::new(Quotations::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Quotations::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Quotations::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotations_customer_id")
                        .table(Quotations::Table)
                        .col(Quotations::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotations_status")
                        .table(Quotations::Table)
                        .col(Quotations::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotations_dealer_id")
                        .table(Quotations::Table)
                        .col(Quotations::DealerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Quotations {
        Table,
        Id,
        CustomerId,
        VariantId,
        DealerId,
        DealerOrderId,
        TotalPrice,
        DiscountAmount,
        FinalPrice,
        Status,
        QuotationDate,
        ExpiryDate,
        RejectionReason,
        RejectedAt,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000007_create_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_orders_table"
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
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::VariantId).uuid().not_null())
                        .col(ColumnDef::new(Orders::QuotationId).uuid().null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::OrderDate).timestamp().not_null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_orders_order_number")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // One order per accepted quotation
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_orders_quotation_id")
                        .table(Orders::Table)
                        .col(Orders::QuotationId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
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
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        OrderNumber,
        CustomerId,
        VariantId,
        QuotationId,
        Status,
        TotalAmount,
        OrderDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000008_create_invoices_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Invoices::InvoiceNumber).string().not_null())
                        .col(ColumnDef::new(Invoices::QuotationId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::DealerOrderId).uuid().null())
                        .col(ColumnDef::new(Invoices::TotalAmount).decimal().not_null())
                        .col(ColumnDef::new(Invoices::Status).string().not_null())
                        .col(ColumnDef::new(Invoices::IssueDate).timestamp().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).timestamp().not_null())
                        .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Invoices::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_invoices_invoice_number")
                        .table(Invoices::Table)
                        .col(Invoices::InvoiceNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // One invoice per accepted quotation
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_invoices_quotation_id")
                        .table(Invoices::Table)
                        .col(Invoices::QuotationId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_status")
                        .table(Invoices::Table)
                        .col(Invoices::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Invoices {
        Table,
        Id,
        InvoiceNumber,
        QuotationId,
        DealerOrderId,
        TotalAmount,
        Status,
        IssueDate,
        DueDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000009_create_installment_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_installment_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InstallmentPlans::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InstallmentPlans::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::InvoiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::TotalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::DownPayment)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::LoanAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::InterestRate)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::TermMonths)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::FirstPaymentDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One plan per invoice
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_installment_plans_invoice_id")
                        .table(InstallmentPlans::Table)
                        .col(InstallmentPlans::InvoiceId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InstallmentSchedules::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InstallmentSchedules::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::PlanId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::InstallmentNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::DueDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::PrincipalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::InterestAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::PaidDate)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::PaidAmount)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentSchedules::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uidx_installment_schedules_plan_number")
                        .table(InstallmentSchedules::Table)
                        .col(InstallmentSchedules::PlanId)
                        .col(InstallmentSchedules::InstallmentNumber)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InstallmentSchedules::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InstallmentPlans::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InstallmentPlans {
        Table,
        Id,
        InvoiceId,
        TotalAmount,
        DownPayment,
        LoanAmount,
        InterestRate,
        TermMonths,
        FirstPaymentDate,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum InstallmentSchedules {
        Table,
        Id,
        PlanId,
        InstallmentNumber,
        DueDate,
        PrincipalAmount,
        InterestAmount,
        Amount,
        Status,
        PaidDate,
        PaidAmount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000010_create_payments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000010_create_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::InvoiceId).uuid().null())
                        .col(ColumnDef::new(Payments::OrderId).uuid().null())
                        .col(ColumnDef::new(Payments::Amount).decimal().not_null())
                        .col(ColumnDef::new(Payments::Method).string().not_null())
                        .col(ColumnDef::new(Payments::Status).string().not_null())
                        .col(ColumnDef::new(Payments::Reference).string().null())
                        .col(ColumnDef::new(Payments::PaidAt).timestamp().null())
                        .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Payments::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_invoice_id")
                        .table(Payments::Table)
                        .col(Payments::InvoiceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_order_id")
                        .table(Payments::Table)
                        .col(Payments::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Payments {
        Table,
        Id,
        InvoiceId,
        OrderId,
        Amount,
        Method,
        Status,
        Reference,
        PaidAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000011_create_appointments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000011_create_appointments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Appointments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Appointments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Appointments::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::DealerId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::VariantId).uuid().null())
                        .col(
                            ColumnDef::new(Appointments::ScheduledAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Appointments::Status).string().not_null())
                        .col(ColumnDef::new(Appointments::Notes).string().null())
                        .col(
                            ColumnDef::new(Appointments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Appointments::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_appointments_dealer_id")
                        .table(Appointments::Table)
                        .col(Appointments::DealerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Appointments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Appointments {
        Table,
        Id,
        CustomerId,
        DealerId,
        VariantId,
        ScheduledAt,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000012_create_feedback_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000012_create_feedback_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Feedback::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Feedback::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Feedback::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Feedback::OrderId).uuid().null())
                        .col(ColumnDef::new(Feedback::Rating).integer().not_null())
                        .col(ColumnDef::new(Feedback::Comment).string().null())
                        .col(ColumnDef::new(Feedback::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_feedback_customer_id")
                        .table(Feedback::Table)
                        .col(Feedback::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Feedback::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Feedback {
        Table,
        Id,
        CustomerId,
        OrderId,
        Rating,
        Comment,
        CreatedAt,
    }
}
