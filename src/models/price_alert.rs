use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::enums::{AlertStatus, AlertType};
use crate::utils::validation::{FieldCheck, PRICE_PLACES};

pub const MESSAGE_MAX: usize = 200;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub user_id: i32,

    #[sea_orm(indexed)]
    pub stock_id: i32,

    pub alert_type: AlertType,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub target_price: Decimal,

    pub status: AlertStatus,

    #[sea_orm(column_type = "String(StringLen::N(200))", nullable)]
    pub message: Option<String>,

    pub triggered_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::stock::Entity",
        from = "Column::StockId",
        to = "super::stock::Column::Id"
    )]
    Stock,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stock.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let check = FieldCheck::new("price_alerts");
        check.places("target_price", &self.target_price, PRICE_PLACES)?;
        check.opt_max_len("message", &self.message, MESSAGE_MAX)?;

        let now = Utc::now();
        if insert {
            if self.status.is_not_set() {
                self.status = Set(AlertStatus::Active);
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
