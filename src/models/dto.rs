// ============================================================================
// DTO : FORMES DE REQUÊTE / RÉPONSE DE L'API
// ============================================================================
//
// Description:
//   Formes non persistées: validation des entrées (create/update) et
//   sérialisation des réponses. Les montants restent en Decimal de bout en
//   bout; serde les écrit comme chaînes ("150.2500") pour ne rien perdre.
//
// Règles de validation:
//   - longueurs max identiques aux colonnes (users, stocks, ...)
//   - email: même regex que users.email
//   - décimales: 2 (montants), 4 (prix, pourcentages), 6 (quantités)
//
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::{AlertStatus, AlertType, TransactionType};
use crate::utils::validation::EMAIL_RE;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(max = 255), regex(path = *EMAIL_RE))]
    pub email: String,
    #[validate(length(max = 100))]
    pub full_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,
    #[validate(length(max = 255), regex(path = *EMAIL_RE))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockCreate {
    #[validate(length(min = 1, max = 10))]
    pub symbol: String,
    #[validate(length(max = 200))]
    pub name: String,
    #[validate(length(max = 50))]
    pub exchange: String,
    #[validate(length(max = 100))]
    pub sector: Option<String>,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub current_price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StockUpdate {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub exchange: Option<String>,
    #[validate(length(max = 100))]
    pub sector: Option<String>,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub current_price: Option<Decimal>,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub previous_close: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransactionCreate {
    pub stock_id: i32,
    pub transaction_type: TransactionType,
    #[validate(custom(function = "crate::utils::validation::quantity_places"))]
    pub quantity: Decimal,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::amount_places"))]
    pub fees: Decimal,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PriceAlertCreate {
    pub stock_id: i32,
    pub alert_type: AlertType,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub target_price: Decimal,
    #[validate(length(max = 200))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PriceAlertUpdate {
    pub alert_type: Option<AlertType>,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub target_price: Option<Decimal>,
    pub status: Option<AlertStatus>,
    #[validate(length(max = 200))]
    pub message: Option<String>,
}

/// Nouveau prix pour un titre, avec barre OHLC optionnelle
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockPriceUpdate {
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub price: Decimal,
    #[serde(default)]
    pub volume: i64,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub open_price: Option<Decimal>,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub high_price: Option<Decimal>,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub low_price: Option<Decimal>,
    #[validate(custom(function = "crate::utils::validation::price_places"))]
    pub close_price: Option<Decimal>,
}

// Réponses

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioHoldingResponse {
    pub id: i32,
    pub stock_symbol: String,
    pub stock_name: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub unrealized_gain_loss: Decimal,
    pub unrealized_gain_loss_percent: Decimal,
    pub day_change: Decimal,
    pub day_change_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummaryResponse {
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_percent: Decimal,
    pub day_change: Decimal,
    pub day_change_percent: Decimal,
    pub number_of_holdings: i32,
    pub holdings: Vec<PortfolioHoldingResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSearchResponse {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub current_price: Decimal,
    pub day_change: Decimal,
    pub day_change_percent: Decimal,
}
