use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, Set};
use tracing::debug;
use validator::Validate;

use crate::error::PortfolioError;
use crate::models::dto::TransactionCreate;
use crate::models::{portfolio_holding, stock, transaction, TransactionType};
use crate::services::portfolio_service::Valuation;
use crate::utils::money::{product, quotient, round_amount, round_price};

pub struct TradeService;

/// Lignes à sauvegarder pour une transaction: la transaction elle-même et la
/// position mise à jour (ou créée au premier achat).
#[derive(Debug, Clone)]
pub struct RecordedTrade {
    pub transaction: transaction::ActiveModel,
    pub holding: portfolio_holding::ActiveModel,
    /// La position est soldée (quantité 0) après une vente
    pub closed: bool,
}

impl TradeService {
    /// Enregistre un achat ou une vente et réconcilie la position.
    ///
    /// - BUY: la quantité augmente, le montant investi inclut les frais,
    ///   le coût moyen est recalculé
    /// - SELL: impossible de vendre plus que la quantité détenue; l'investi
    ///   diminue au coût moyen, qui lui ne change pas
    pub fn record(
        user_id: i32,
        stock: &stock::Model,
        holding: Option<portfolio_holding::Model>,
        request: TransactionCreate,
        now: DateTime<Utc>,
    ) -> Result<RecordedTrade, PortfolioError> {
        request.validate()?;

        if request.stock_id != stock.id {
            return Err(PortfolioError::InvalidInput(format!(
                "transaction is for stock {}, got {} ({})",
                request.stock_id, stock.id, stock.symbol
            )));
        }
        if request.quantity <= Decimal::ZERO {
            return Err(PortfolioError::InvalidInput("quantity must be greater than 0".to_string()));
        }
        if request.price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidInput("price must be greater than 0".to_string()));
        }
        if request.fees < Decimal::ZERO {
            return Err(PortfolioError::InvalidInput("fees cannot be negative".to_string()));
        }
        if let Some(h) = &holding {
            if h.user_id != user_id || h.stock_id != stock.id {
                return Err(PortfolioError::InvalidInput(format!(
                    "holding {} does not belong to user {} for {}",
                    h.id, user_id, stock.symbol
                )));
            }
        }

        let (held, invested, average_cost) = holding
            .as_ref()
            .map(|h| (h.quantity, h.total_invested, h.average_cost))
            .unwrap_or((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));

        let gross = product(request.quantity, request.price, "total_amount")?;

        let (quantity, total_invested, average_cost) = match request.transaction_type {
            TransactionType::Buy => {
                let quantity = held + request.quantity;
                let total_invested = invested + round_amount(gross + request.fees);
                let average_cost = round_price(quotient(total_invested, quantity, "average_cost")?);
                (quantity, total_invested, average_cost)
            }
            TransactionType::Sell => {
                if request.quantity > held {
                    return Err(PortfolioError::InsufficientQuantity {
                        symbol: stock.symbol.clone(),
                        requested: request.quantity,
                        held,
                    });
                }

                let quantity = held - request.quantity;
                let total_invested = if quantity.is_zero() {
                    Decimal::ZERO
                } else {
                    let cost_basis = product(request.quantity, average_cost, "total_invested")?;
                    (invested - round_amount(cost_basis)).max(Decimal::ZERO)
                };
                (quantity, total_invested, average_cost)
            }
        };

        debug!(
            "{} {} {} @ {}: position {} -> {}",
            user_id,
            request.transaction_type.as_str(),
            stock.symbol,
            request.price,
            held,
            quantity
        );

        let valuation = Valuation::at_price(quantity, total_invested, stock.current_price)?;

        let mut holding_model = match holding {
            Some(existing) => portfolio_holding::ActiveModel::from(existing),
            None => portfolio_holding::ActiveModel {
                id: NotSet,
                user_id: Set(user_id),
                stock_id: Set(stock.id),
                ..Default::default()
            },
        };
        holding_model.quantity = Set(quantity);
        holding_model.average_cost = Set(average_cost);
        holding_model.total_invested = Set(total_invested);
        holding_model.current_value = Set(valuation.current_value);
        holding_model.unrealized_gain_loss = Set(valuation.unrealized_gain_loss);
        holding_model.unrealized_gain_loss_percent = Set(valuation.unrealized_gain_loss_percent);

        let transaction = transaction::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            stock_id: Set(stock.id),
            transaction_type: Set(request.transaction_type),
            quantity: Set(request.quantity),
            price: Set(request.price),
            total_amount: Set(round_amount(gross)),
            fees: Set(request.fees),
            notes: Set(request.notes),
            transaction_date: Set(request.transaction_date.unwrap_or(now)),
            created_at: NotSet,
        };

        Ok(RecordedTrade {
            transaction,
            holding: holding_model,
            closed: quantity.is_zero(),
        })
    }
}
