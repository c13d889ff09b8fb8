use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dealer_order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_order_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dealer_order::Entity",
        from = "Column::DealerOrderId",
        to = "super::dealer_order::Column::Id"
    )]
    DealerOrder,
    #[sea_orm(
        belongs_to = "super::vehicle_variant::Entity",
        from = "Column::VariantId",
        to = "super::vehicle_variant::Column::Id"
    )]
    VehicleVariant,
}

impl Related<super::dealer_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DealerOrder.def()
    }
}

impl Related<super::vehicle_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleVariant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
