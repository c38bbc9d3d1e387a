use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single line of a sales order. `unit` is a free string at the storage
/// layer ("KG", "Quintal", "Ton", "Bags"); conversion to kilograms happens in
/// `reports::units`, never here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub order_id: Uuid,
    pub product_name: String,
    pub grade: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    pub rate_per_unit: Decimal,
    /// Invariant: `quantity * rate_per_unit`.
    pub total_amount: Decimal,
    /// Free-text packaging description, e.g. "25kg Bags".
    pub packaging: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_order::Entity",
        from = "Column::OrderId",
        to = "super::sales_order::Column::Id"
    )]
    SalesOrder,
}

impl Related<super::sales_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
