use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::utils::validation::{FieldCheck, AMOUNT_PLACES, PERCENT_PLACES, PRICE_PLACES, QUANTITY_PLACES};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolio_holdings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub user_id: i32,

    #[sea_orm(indexed)]
    pub stock_id: i32,

    // Actions fractionnaires autorisées
    #[sea_orm(column_type = "Decimal(Some((16, 6)))")]
    pub quantity: Decimal,

    // Coût moyen par action
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub average_cost: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total_invested: Decimal,

    // Valeur de marché au dernier prix connu
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub current_value: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub unrealized_gain_loss: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub unrealized_gain_loss_percent: Decimal,

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
        let check = FieldCheck::new("portfolio_holdings");
        check.places("quantity", &self.quantity, QUANTITY_PLACES)?;
        check.places("average_cost", &self.average_cost, PRICE_PLACES)?;
        check.places("total_invested", &self.total_invested, AMOUNT_PLACES)?;
        check.places("current_value", &self.current_value, AMOUNT_PLACES)?;
        check.places("unrealized_gain_loss", &self.unrealized_gain_loss, AMOUNT_PLACES)?;
        check.places(
            "unrealized_gain_loss_percent",
            &self.unrealized_gain_loss_percent,
            PERCENT_PLACES,
        )?;

        let now = Utc::now();
        if insert {
            for value in [
                &mut self.current_value,
                &mut self.unrealized_gain_loss,
                &mut self.unrealized_gain_loss_percent,
            ] {
                if value.is_not_set() {
                    *value = Set(Decimal::ZERO);
                }
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
