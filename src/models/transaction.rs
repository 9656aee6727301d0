use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::enums::TransactionType;
use crate::utils::validation::{FieldCheck, AMOUNT_PLACES, PRICE_PLACES, QUANTITY_PLACES};

pub const NOTES_MAX: usize = 500;

/// Achat ou vente exécuté. Historique immuable: une fois inséré, la ligne
/// n'est plus modifiée (le hook refuse les UPDATE).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub user_id: i32,

    #[sea_orm(indexed)]
    pub stock_id: i32,

    pub transaction_type: TransactionType,

    #[sea_orm(column_type = "Decimal(Some((16, 6)))")]
    pub quantity: Decimal,

    // Prix par action au moment de la transaction
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total_amount: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub fees: Decimal,

    #[sea_orm(column_type = "String(StringLen::N(500))", nullable)]
    pub notes: Option<String>,

    pub transaction_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
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
        if !insert {
            return Err(DbErr::Custom(
                "transactions are immutable once recorded".to_string(),
            ));
        }

        let check = FieldCheck::new("transactions");
        check.places("quantity", &self.quantity, QUANTITY_PLACES)?;
        check.places("price", &self.price, PRICE_PLACES)?;
        check.places("total_amount", &self.total_amount, AMOUNT_PLACES)?;
        check.places("fees", &self.fees, AMOUNT_PLACES)?;
        check.opt_max_len("notes", &self.notes, NOTES_MAX)?;

        let now = Utc::now();
        if self.fees.is_not_set() {
            self.fees = Set(Decimal::ZERO);
        }
        if self.transaction_date.is_not_set() {
            self.transaction_date = Set(now);
        }
        if self.created_at.is_not_set() {
            self.created_at = Set(now);
        }
        Ok(self)
    }
}
