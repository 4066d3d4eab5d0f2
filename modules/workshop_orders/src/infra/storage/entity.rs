//! SeaORM entities for database tables
//!
//! Enums are stored as their string labels; measurement dimensions and garment
//! style options are stored as JSON documents.

/// Customers table entity
pub mod customer {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub nick_name: Option<String>,
        pub arabic_name: Option<String>,
        pub phone: String,
        pub alternate_mobile: Option<String>,
        pub whatsapp: Option<String>,
        pub email: Option<String>,
        pub nationality: Option<String>,
        pub customer_segment: Option<String>,
        pub city: Option<String>,
        pub area: Option<String>,
        pub block: Option<String>,
        pub street: Option<String>,
        pub house_no: Option<String>,
        pub address_note: Option<String>,
        /// `Primary` or `Secondary`
        pub account_type: Option<String>,
        /// Phone of the primary account
        pub relation: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::order::Entity")]
        Orders,
        #[sea_orm(has_many = "super::measurement::Entity")]
        Measurements,
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Orders.def()
        }
    }

    impl Related<super::measurement::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Measurements.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Measurements table entity
pub mod measurement {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "measurements")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub customer_id: i32,
        pub measurement_code: String,
        pub measurement_type: String,
        pub reference: Option<String>,
        pub measurer: Option<String>,
        pub measurement_date: DateTimeUtc,
        /// Body dimensions as JSON
        pub dimensions: Json,
        pub armhole_provision: Option<Decimal>,
        pub chest_provision: Option<Decimal>,
        pub waist_provision: Option<Decimal>,
        pub notes: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Orders table entity
pub mod order {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub customer_id: i32,
        #[sea_orm(unique)]
        pub invoice_number: Option<i32>,
        pub order_type: String,
        pub checkout_status: String,
        pub production_stage: String,
        pub payment_type: Option<String>,
        pub payment_ref: Option<String>,
        pub order_date: Option<DateTimeUtc>,
        pub delivery_date: Option<Date>,
        pub home_delivery: bool,
        pub campaign_id: Option<i32>,
        pub stitching_price: Decimal,
        pub discount_type: Option<String>,
        pub discount_value: Option<Decimal>,
        pub referral_code: Option<String>,
        pub fabric_charge: Decimal,
        pub stitching_charge: Decimal,
        pub style_charge: Decimal,
        pub shelf_charge: Decimal,
        pub delivery_charge: Decimal,
        pub discount_amount: Decimal,
        pub total: Decimal,
        pub advance: Decimal,
        pub paid: Decimal,
        pub num_of_fabrics: i32,
        pub linked_order_id: Option<i32>,
        pub linked_date: Option<DateTimeUtc>,
        pub unlinked_date: Option<DateTimeUtc>,
        pub notes: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(has_many = "super::garment::Entity")]
        Garments,
        #[sea_orm(has_many = "super::order_shelf_item::Entity")]
        ShelfItems,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::garment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Garments.def()
        }
    }

    impl Related<super::order_shelf_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ShelfItems.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Garments table entity
pub mod garment {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "garments")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub order_id: i32,
        pub garment_code: String,
        pub measurement_id: i32,
        pub fabric_source: String,
        pub fabric_id: Option<i32>,
        pub fabric_length: Decimal,
        pub color: Option<String>,
        pub style: String,
        /// Style option codes and accessory flags as JSON
        pub options: Json,
        pub express: bool,
        pub brova: bool,
        pub delivery_date: Option<Date>,
        pub notes: Option<String>,
        pub fabric_price: Decimal,
        pub stitching_price: Decimal,
        pub style_price: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::order::Entity",
            from = "Column::OrderId",
            to = "super::order::Column::Id"
        )]
        Order,
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Order.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Shelf lines of an order
pub mod order_shelf_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "order_shelf_items")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub order_id: i32,
        pub shelf_id: i32,
        pub quantity: i32,
        pub unit_price: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::order::Entity",
            from = "Column::OrderId",
            to = "super::order::Column::Id"
        )]
        Order,
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Order.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod fabric {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "fabrics")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub color: Option<String>,
        pub price_per_meter: Decimal,
        pub real_stock: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod style {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "styles")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub code: String,
        pub name: String,
        pub style_type: String,
        pub rate_per_item: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Price table keyed by option code
pub mod price {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "prices")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub key: String,
        pub value: Decimal,
        pub description: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod campaign {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "campaigns")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub active: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Ready-made shelf products
pub mod shelf {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "shelf")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub product_type: String,
        pub brand: Option<String>,
        pub price: Decimal,
        pub stock: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
