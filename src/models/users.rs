use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::utils::validation::FieldCheck;

pub const USERNAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 255;
pub const FULL_NAME_MAX: usize = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, column_type = "String(StringLen::N(50))")]
    pub username: String,

    #[sea_orm(unique, column_type = "String(StringLen::N(255))")]
    pub email: String,

    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub full_name: String,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::portfolio_holding::Entity")]
    Holdings,

    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,

    #[sea_orm(has_many = "super::price_alert::Entity")]
    Alerts,

    #[sea_orm(has_one = "super::portfolio_summary::Entity")]
    Summary,
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

impl Related<super::portfolio_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Summary.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let check = FieldCheck::new("users");
        check.min_len("username", &self.username, 1)?;
        check.max_len("username", &self.username, USERNAME_MAX)?;
        check.max_len("email", &self.email, EMAIL_MAX)?;
        check.email("email", &self.email)?;
        check.max_len("full_name", &self.full_name, FULL_NAME_MAX)?;

        let now = Utc::now();
        if insert {
            if self.is_active.is_not_set() {
                self.is_active = Set(true);
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
