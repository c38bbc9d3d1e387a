use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A field check-in captured by an executive at a customer site. Visits carry
/// no commercial totals; they count as records in activity reports and
/// contribute zero to every monetary aggregate.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub created_by: Option<Uuid>,
    pub godown_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub visit_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
