use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::utils::validation::{FieldCheck, AMOUNT_PLACES, PERCENT_PLACES, PRICE_PLACES};

pub const SYMBOL_MAX: usize = 10;
pub const NAME_MAX: usize = 200;
pub const EXCHANGE_MAX: usize = 50;
pub const SECTOR_MAX: usize = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stocks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, indexed, column_type = "String(StringLen::N(10))")]
    pub symbol: String,

    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub name: String,

    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub exchange: String,

    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub sector: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
    pub market_cap: Option<Decimal>,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub current_price: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub previous_close: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub day_change: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub day_change_percent: Decimal,

    #[sea_orm(default_value = 0)]
    pub volume: i64,

    pub last_updated: DateTimeUtc,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeUtc,

    // Données de marché additionnelles (objet JSON libre)
    #[sea_orm(column_type = "Json")]
    pub market_data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::portfolio_holding::Entity")]
    Holdings,

    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,

    #[sea_orm(has_many = "super::price_alert::Entity")]
    Alerts,

    #[sea_orm(has_many = "super::stock_price_history::Entity")]
    PriceHistory,
}

impl Related<super::portfolio_holding::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Holdings.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::price_alert::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alerts.def()
    }
}

impl Related<super::stock_price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let check = FieldCheck::new("stocks");
        check.min_len("symbol", &self.symbol, 1)?;
        check.max_len("symbol", &self.symbol, SYMBOL_MAX)?;
        check.max_len("name", &self.name, NAME_MAX)?;
        check.max_len("exchange", &self.exchange, EXCHANGE_MAX)?;
        check.opt_max_len("sector", &self.sector, SECTOR_MAX)?;
        check.opt_places("market_cap", &self.market_cap, AMOUNT_PLACES)?;
        check.places("current_price", &self.current_price, PRICE_PLACES)?;
        check.places("previous_close", &self.previous_close, PRICE_PLACES)?;
        check.places("day_change", &self.day_change, PRICE_PLACES)?;
        check.places("day_change_percent", &self.day_change_percent, PERCENT_PLACES)?;

        if !insert && self.current_price.is_set() && !self.last_updated.is_set() {
            // prix modifié directement: l'horodatage suit
            self.last_updated = Set(Utc::now());
        }

        if insert {
            let now = Utc::now();
            if self.volume.is_not_set() {
                self.volume = Set(0);
            }
            if self.is_active.is_not_set() {
                self.is_active = Set(true);
            }
            if self.market_data.is_not_set() {
                self.market_data = Set(serde_json::json!({}));
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.last_updated.is_not_set() {
                self.last_updated = Set(now);
            }
        }
        Ok(self)
    }
}
