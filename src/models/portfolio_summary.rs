use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::utils::validation::{FieldCheck, AMOUNT_PLACES, PERCENT_PLACES};

/// Agrégat dénormalisé, une ligne par utilisateur (user_id unique).
/// Recalculé par `PortfolioService::summarize`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolio_summaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, indexed)]
    pub user_id: i32,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total_value: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total_invested: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total_gain_loss: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_gain_loss_percent: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub day_change: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub day_change_percent: Decimal,

    #[sea_orm(default_value = 0)]
    pub number_of_holdings: i32,

    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let check = FieldCheck::new("portfolio_summaries");
        check.places("total_value", &self.total_value, AMOUNT_PLACES)?;
        check.places("total_invested", &self.total_invested, AMOUNT_PLACES)?;
        check.places("total_gain_loss", &self.total_gain_loss, AMOUNT_PLACES)?;
        check.places("total_gain_loss_percent", &self.total_gain_loss_percent, PERCENT_PLACES)?;
        check.places("day_change", &self.day_change, AMOUNT_PLACES)?;
        check.places("day_change_percent", &self.day_change_percent, PERCENT_PLACES)?;

        if insert {
            for value in [
                &mut self.total_value,
                &mut self.total_invested,
                &mut self.total_gain_loss,
                &mut self.total_gain_loss_percent,
                &mut self.day_change,
                &mut self.day_change_percent,
            ] {
                if value.is_not_set() {
                    *value = Set(Decimal::ZERO);
                }
            }
            if self.number_of_holdings.is_not_set() {
                self.number_of_holdings = Set(0);
            }
        }
        self.last_updated = Set(Utc::now());
        Ok(self)
    }
}
