use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priced, time-bounded offer for a vehicle variant.
///
/// `final_price` is always `total_price - discount_amount` and never
/// negative. `expired` is never written back: read paths derive it from
/// `expiry_date` (see `services::quotations::effective_status`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub variant_id: Uuid,
    /// Set for quotations produced from a dealer wholesale order
    pub dealer_id: Option<Uuid>,
    pub dealer_order_id: Option<Uuid>,
    pub total_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
    pub status: String,
    pub quotation_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::vehicle_variant::Entity",
        from = "Column::VariantId",
        to = "super::vehicle_variant::Column::Id"
    )]
    VehicleVariant,
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::vehicle_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleVariant.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
