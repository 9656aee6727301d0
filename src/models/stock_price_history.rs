use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::utils::validation::{FieldCheck, PRICE_PLACES};

/// Barre OHLC + volume d'un titre, indexée par timestamp
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_price_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub stock_id: i32,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,

    #[sea_orm(default_value = 0)]
    pub volume: i64,

    #[sea_orm(indexed)]
    pub timestamp: DateTimeUtc,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub open_price: Option<Decimal>,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub high_price: Option<Decimal>,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub low_price: Option<Decimal>,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub close_price: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock::Entity",
        from = "Column::StockId",
        to = "super::stock::Column::Id"
    )]
    Stock,
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
        let check = FieldCheck::new("stock_price_history");
        check.places("price", &self.price, PRICE_PLACES)?;
        check.opt_places("open_price", &self.open_price, PRICE_PLACES)?;
        check.opt_places("high_price", &self.high_price, PRICE_PLACES)?;
        check.opt_places("low_price", &self.low_price, PRICE_PLACES)?;
        check.opt_places("close_price", &self.close_price, PRICE_PLACES)?;

        if insert {
            if self.volume.is_not_set() {
                self.volume = Set(0);
            }
            if self.timestamp.is_not_set() {
                self.timestamp = Set(Utc::now());
            }
        }
        Ok(self)
    }
}
