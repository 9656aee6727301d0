use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, Set};
use validator::Validate;

use crate::error::PortfolioError;
use crate::models::dto::{StockCreate, StockPriceUpdate, StockSearchResponse, StockUpdate};
use crate::models::{stock, stock_price_history};
use crate::utils::money::{percent_of, round_price};

pub struct StockService;

/// Variation du jour par rapport à la clôture précédente
fn day_change(current_price: Decimal, previous_close: Decimal) -> Result<(Decimal, Decimal), PortfolioError> {
    let change = round_price(current_price - previous_close);
    Ok((change, percent_of(change, previous_close)?))
}

impl StockService {
    /// Nouveau titre: la clôture précédente démarre au prix courant
    pub fn new_stock(request: StockCreate) -> Result<stock::ActiveModel, PortfolioError> {
        request.validate()?;
        if request.current_price < Decimal::ZERO {
            return Err(PortfolioError::InvalidInput("current_price cannot be negative".to_string()));
        }

        Ok(stock::ActiveModel {
            id: NotSet,
            symbol: Set(request.symbol),
            name: Set(request.name),
            exchange: Set(request.exchange),
            sector: Set(request.sector),
            market_cap: Set(None),
            current_price: Set(request.current_price),
            previous_close: Set(request.current_price),
            day_change: Set(Decimal::ZERO),
            day_change_percent: Set(Decimal::ZERO),
            volume: Set(0),
            is_active: Set(true),
            market_data: Set(serde_json::json!({})),
            ..Default::default()
        })
    }

    /// Applique une mise à jour partielle. Si un prix change, la variation
    /// du jour est recalculée et `last_updated` passe à `now`.
    pub fn apply_update(
        stock: stock::Model,
        request: StockUpdate,
        now: DateTime<Utc>,
    ) -> Result<stock::ActiveModel, PortfolioError> {
        request.validate()?;

        let current_price = request.current_price.unwrap_or(stock.current_price);
        let previous_close = request.previous_close.unwrap_or(stock.previous_close);
        if current_price < Decimal::ZERO || previous_close < Decimal::ZERO {
            return Err(PortfolioError::InvalidInput("prices cannot be negative".to_string()));
        }
        let price_changed = request.current_price.is_some() || request.previous_close.is_some();

        let mut active: stock::ActiveModel = stock.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(exchange) = request.exchange {
            active.exchange = Set(exchange);
        }
        if let Some(sector) = request.sector {
            active.sector = Set(Some(sector));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        if price_changed {
            let (change, percent) = day_change(current_price, previous_close)?;
            active.current_price = Set(current_price);
            active.previous_close = Set(previous_close);
            active.day_change = Set(change);
            active.day_change_percent = Set(percent);
            active.last_updated = Set(now);
        }
        Ok(active)
    }

    /// Nouveau prix coté: met à jour le titre et produit la barre
    /// d'historique correspondante. Aucune planification ici, l'appelant
    /// fournit le prix et l'horodatage.
    pub fn apply_price_update(
        stock: stock::Model,
        update: StockPriceUpdate,
        at: DateTime<Utc>,
    ) -> Result<(stock::ActiveModel, stock_price_history::ActiveModel), PortfolioError> {
        update.validate()?;

        let prices = [
            Some(update.price),
            update.open_price,
            update.high_price,
            update.low_price,
            update.close_price,
        ];
        if prices.iter().flatten().any(|p| *p < Decimal::ZERO) {
            return Err(PortfolioError::InvalidInput("prices cannot be negative".to_string()));
        }
        if update.volume < 0 {
            return Err(PortfolioError::InvalidInput("volume cannot be negative".to_string()));
        }
        if let (Some(high), Some(low)) = (update.high_price, update.low_price) {
            if high < low {
                return Err(PortfolioError::InvalidInput(format!(
                    "high_price {} is below low_price {}",
                    high, low
                )));
            }
        }

        let (change, percent) = day_change(update.price, stock.previous_close)?;
        let stock_id = stock.id;

        let mut active: stock::ActiveModel = stock.into();
        active.current_price = Set(update.price);
        active.day_change = Set(change);
        active.day_change_percent = Set(percent);
        active.volume = Set(update.volume);
        active.last_updated = Set(at);

        let bar = stock_price_history::ActiveModel {
            id: NotSet,
            stock_id: Set(stock_id),
            price: Set(update.price),
            volume: Set(update.volume),
            timestamp: Set(at),
            open_price: Set(update.open_price),
            high_price: Set(update.high_price),
            low_price: Set(update.low_price),
            close_price: Set(update.close_price),
        };

        Ok((active, bar))
    }

    /// Clôture de séance: le prix courant devient la clôture précédente
    pub fn roll_session(stock: stock::Model, now: DateTime<Utc>) -> stock::ActiveModel {
        let close = stock.current_price;
        let mut active: stock::ActiveModel = stock.into();
        active.previous_close = Set(close);
        active.day_change = Set(Decimal::ZERO);
        active.day_change_percent = Set(Decimal::ZERO);
        active.last_updated = Set(now);
        active
    }
}

impl From<stock::Model> for StockSearchResponse {
    fn from(stock: stock::Model) -> Self {
        Self {
            symbol: stock.symbol,
            name: stock.name,
            exchange: stock.exchange,
            current_price: stock.current_price,
            day_change: stock.day_change,
            day_change_percent: stock.day_change_percent,
        }
    }
}
