//! Database migrations for workshop orders

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_customers::Migration),
            Box::new(m20250301_000002_create_catalogs::Migration),
            Box::new(m20250301_000003_create_orders::Migration),
        ]
    }
}

fn money(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column).decimal_len(12, 3).not_null().default(0).to_owned()
}

fn id(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

mod m20250301_000001_create_customers {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(id(Customers::Id))
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::NickName).string())
                        .col(ColumnDef::new(Customers::ArabicName).string())
                        .col(ColumnDef::new(Customers::Phone).string().not_null())
                        .col(ColumnDef::new(Customers::AlternateMobile).string())
                        .col(ColumnDef::new(Customers::Whatsapp).string())
                        .col(ColumnDef::new(Customers::Email).string())
                        .col(ColumnDef::new(Customers::Nationality).string())
                        .col(ColumnDef::new(Customers::CustomerSegment).string())
                        .col(ColumnDef::new(Customers::City).string())
                        .col(ColumnDef::new(Customers::Area).string())
                        .col(ColumnDef::new(Customers::Block).string())
                        .col(ColumnDef::new(Customers::Street).string())
                        .col(ColumnDef::new(Customers::HouseNo).string())
                        .col(ColumnDef::new(Customers::AddressNote).string())
                        .col(ColumnDef::new(Customers::AccountType).string())
                        .col(ColumnDef::new(Customers::Relation).string())
                        .col(timestamp(Customers::CreatedAt))
                        .col(timestamp(Customers::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_customers_phone")
                        .table(Customers::Table)
                        .col(Customers::Phone)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Measurements::Table)
                        .if_not_exists()
                        .col(id(Measurements::Id))
                        .col(ColumnDef::new(Measurements::CustomerId).integer().not_null())
                        .col(ColumnDef::new(Measurements::MeasurementCode).string().not_null())
                        .col(ColumnDef::new(Measurements::MeasurementType).string().not_null())
                        .col(ColumnDef::new(Measurements::Reference).string())
                        .col(ColumnDef::new(Measurements::Measurer).string())
                        .col(timestamp(Measurements::MeasurementDate))
                        .col(ColumnDef::new(Measurements::Dimensions).json().not_null())
                        .col(ColumnDef::new(Measurements::ArmholeProvision).decimal_len(12, 3))
                        .col(ColumnDef::new(Measurements::ChestProvision).decimal_len(12, 3))
                        .col(ColumnDef::new(Measurements::WaistProvision).decimal_len(12, 3))
                        .col(ColumnDef::new(Measurements::Notes).text())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_measurements_customer")
                                .from(Measurements::Table, Measurements::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_measurements_customer_code")
                        .table(Measurements::Table)
                        .col(Measurements::CustomerId)
                        .col(Measurements::MeasurementCode)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Measurements::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        NickName,
        ArabicName,
        Phone,
        AlternateMobile,
        Whatsapp,
        Email,
        Nationality,
        CustomerSegment,
        City,
        Area,
        Block,
        Street,
        HouseNo,
        AddressNote,
        AccountType,
        Relation,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Measurements {
        Table,
        Id,
        CustomerId,
        MeasurementCode,
        MeasurementType,
        Reference,
        Measurer,
        MeasurementDate,
        Dimensions,
        ArmholeProvision,
        ChestProvision,
        WaistProvision,
        Notes,
    }
}

mod m20250301_000002_create_catalogs {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Fabrics::Table)
                        .if_not_exists()
                        .col(id(Fabrics::Id))
                        .col(ColumnDef::new(Fabrics::Name).string().not_null())
                        .col(ColumnDef::new(Fabrics::Color).string())
                        .col(money(Fabrics::PricePerMeter))
                        .col(money(Fabrics::RealStock))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Styles::Table)
                        .if_not_exists()
                        .col(id(Styles::Id))
                        .col(ColumnDef::new(Styles::Code).string().not_null().unique_key())
                        .col(ColumnDef::new(Styles::Name).string().not_null())
                        .col(ColumnDef::new(Styles::StyleType).string().not_null())
                        .col(money(Styles::RatePerItem))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Prices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Prices::Key).string().not_null().primary_key())
                        .col(money(Prices::Value))
                        .col(ColumnDef::new(Prices::Description).string())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Campaigns::Table)
                        .if_not_exists()
                        .col(id(Campaigns::Id))
                        .col(ColumnDef::new(Campaigns::Name).string().not_null())
                        .col(ColumnDef::new(Campaigns::Active).boolean().not_null().default(true))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Shelf::Table)
                        .if_not_exists()
                        .col(id(Shelf::Id))
                        .col(ColumnDef::new(Shelf::ProductType).string().not_null())
                        .col(ColumnDef::new(Shelf::Brand).string())
                        .col(money(Shelf::Price))
                        .col(ColumnDef::new(Shelf::Stock).integer().not_null().default(0))
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Shelf::Table.into_iden(),
                Campaigns::Table.into_iden(),
                Prices::Table.into_iden(),
                Styles::Table.into_iden(),
                Fabrics::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Fabrics {
        Table,
        Id,
        Name,
        Color,
        PricePerMeter,
        RealStock,
    }

    #[derive(DeriveIden)]
    enum Styles {
        Table,
        Id,
        Code,
        Name,
        StyleType,
        RatePerItem,
    }

    #[derive(DeriveIden)]
    enum Prices {
        Table,
        Key,
        Value,
        Description,
    }

    #[derive(DeriveIden)]
    pub(super) enum Campaigns {
        Table,
        Id,
        Name,
        Active,
    }

    #[derive(DeriveIden)]
    pub(super) enum Shelf {
        Table,
        Id,
        ProductType,
        Brand,
        Price,
        Stock,
    }
}

mod m20250301_000003_create_orders {
    use super::m20250301_000001_create_customers::{Customers, Measurements};
    use super::m20250301_000002_create_catalogs::{Campaigns, Fabrics, Shelf};
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(id(Orders::Id))
                        .col(ColumnDef::new(Orders::CustomerId).integer().not_null())
                        .col(ColumnDef::new(Orders::InvoiceNumber).integer().unique_key())
                        .col(ColumnDef::new(Orders::OrderType).string().not_null())
                        .col(ColumnDef::new(Orders::CheckoutStatus).string().not_null())
                        .col(ColumnDef::new(Orders::ProductionStage).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentType).string())
                        .col(ColumnDef::new(Orders::PaymentRef).string())
                        .col(ColumnDef::new(Orders::OrderDate).timestamp_with_time_zone())
                        .col(ColumnDef::new(Orders::DeliveryDate).date())
                        .col(ColumnDef::new(Orders::HomeDelivery).boolean().not_null().default(false))
                        .col(ColumnDef::new(Orders::CampaignId).integer())
                        .col(money(Orders::StitchingPrice))
                        .col(ColumnDef::new(Orders::DiscountType).string())
                        .col(ColumnDef::new(Orders::DiscountValue).decimal_len(12, 3))
                        .col(ColumnDef::new(Orders::ReferralCode).string())
                        .col(money(Orders::FabricCharge))
                        .col(money(Orders::StitchingCharge))
                        .col(money(Orders::StyleCharge))
                        .col(money(Orders::ShelfCharge))
                        .col(money(Orders::DeliveryCharge))
                        .col(money(Orders::DiscountAmount))
                        .col(money(Orders::Total))
                        .col(money(Orders::Advance))
                        .col(money(Orders::Paid))
                        .col(ColumnDef::new(Orders::NumOfFabrics).integer().not_null().default(0))
                        .col(ColumnDef::new(Orders::LinkedOrderId).integer())
                        .col(ColumnDef::new(Orders::LinkedDate).timestamp_with_time_zone())
                        .col(ColumnDef::new(Orders::UnlinkedDate).timestamp_with_time_zone())
                        .col(ColumnDef::new(Orders::Notes).text())
                        .col(timestamp(Orders::CreatedAt))
                        .col(timestamp(Orders::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_campaign")
                                .from(Orders::Table, Orders::CampaignId)
                                .to(Campaigns::Table, Campaigns::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_linked_order")
                                .from(Orders::Table, Orders::LinkedOrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_customer_status")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .col(Orders::CheckoutStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_linked_order_id")
                        .table(Orders::Table)
                        .col(Orders::LinkedOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Garments::Table)
                        .if_not_exists()
                        .col(id(Garments::Id))
                        .col(ColumnDef::new(Garments::OrderId).integer().not_null())
                        .col(ColumnDef::new(Garments::GarmentCode).string().not_null())
                        .col(ColumnDef::new(Garments::MeasurementId).integer().not_null())
                        .col(ColumnDef::new(Garments::FabricSource).string().not_null())
                        .col(ColumnDef::new(Garments::FabricId).integer())
                        .col(money(Garments::FabricLength))
                        .col(ColumnDef::new(Garments::Color).string())
                        .col(ColumnDef::new(Garments::Style).string().not_null())
                        .col(ColumnDef::new(Garments::Options).json().not_null())
                        .col(ColumnDef::new(Garments::Express).boolean().not_null().default(false))
                        .col(ColumnDef::new(Garments::Brova).boolean().not_null().default(false))
                        .col(ColumnDef::new(Garments::DeliveryDate).date())
                        .col(ColumnDef::new(Garments::Notes).text())
                        .col(money(Garments::FabricPrice))
                        .col(money(Garments::StitchingPrice))
                        .col(money(Garments::StylePrice))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_garments_order")
                                .from(Garments::Table, Garments::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_garments_measurement")
                                .from(Garments::Table, Garments::MeasurementId)
                                .to(Measurements::Table, Measurements::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_garments_fabric")
                                .from(Garments::Table, Garments::FabricId)
                                .to(Fabrics::Table, Fabrics::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderShelfItems::Table)
                        .if_not_exists()
                        .col(id(OrderShelfItems::Id))
                        .col(ColumnDef::new(OrderShelfItems::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderShelfItems::ShelfId).integer().not_null())
                        .col(ColumnDef::new(OrderShelfItems::Quantity).integer().not_null())
                        .col(money(OrderShelfItems::UnitPrice))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_shelf_items_order")
                                .from(OrderShelfItems::Table, OrderShelfItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_shelf_items_shelf")
                                .from(OrderShelfItems::Table, OrderShelfItems::ShelfId)
                                .to(Shelf::Table, Shelf::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderShelfItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Garments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        InvoiceNumber,
        OrderType,
        CheckoutStatus,
        ProductionStage,
        PaymentType,
        PaymentRef,
        OrderDate,
        DeliveryDate,
        HomeDelivery,
        CampaignId,
        StitchingPrice,
        DiscountType,
        DiscountValue,
        ReferralCode,
        FabricCharge,
        StitchingCharge,
        StyleCharge,
        ShelfCharge,
        DeliveryCharge,
        DiscountAmount,
        Total,
        Advance,
        Paid,
        NumOfFabrics,
        LinkedOrderId,
        LinkedDate,
        UnlinkedDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Garments {
        Table,
        Id,
        OrderId,
        GarmentCode,
        MeasurementId,
        FabricSource,
        FabricId,
        FabricLength,
        Color,
        Style,
        Options,
        Express,
        Brova,
        DeliveryDate,
        Notes,
        FabricPrice,
        StitchingPrice,
        StylePrice,
    }

    #[derive(DeriveIden)]
    enum OrderShelfItems {
        Table,
        Id,
        OrderId,
        ShelfId,
        Quantity,
        UnitPrice,
    }
}
