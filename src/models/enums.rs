use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    #[sea_orm(string_value = "BUY")]
    Buy,
    #[sea_orm(string_value = "SELL")]
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    #[sea_orm(string_value = "ABOVE")]
    Above,
    #[sea_orm(string_value = "BELOW")]
    Below,
}

/// Cycle de vie d'une alerte: ACTIVE -> TRIGGERED ou ACTIVE -> DISABLED.
/// TRIGGERED et DISABLED sont terminaux.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    #[default]
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "TRIGGERED")]
    Triggered,
    #[sea_orm(string_value = "DISABLED")]
    Disabled,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        }
    }
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Above => "ABOVE",
            AlertType::Below => "BELOW",
        }
    }
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "ACTIVE",
            AlertStatus::Triggered => "TRIGGERED",
            AlertStatus::Disabled => "DISABLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Triggered | AlertStatus::Disabled)
    }

    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        match (self, next) {
            (current, next) if *current == next => true,
            (AlertStatus::Active, AlertStatus::Triggered | AlertStatus::Disabled) => true,
            _ => false,
        }
    }
}
