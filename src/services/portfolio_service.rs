use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, Set};

use crate::error::PortfolioError;
use crate::models::dto::{PortfolioHoldingResponse, PortfolioSummaryResponse};
use crate::models::{portfolio_holding, portfolio_summary, stock};
use crate::utils::money::{percent_of, product, round_amount};

pub struct PortfolioService;

/// Valeur de marché d'une position à un prix donné
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub current_value: Decimal,
    pub unrealized_gain_loss: Decimal,
    pub unrealized_gain_loss_percent: Decimal,
}

impl Valuation {
    pub fn at_price(quantity: Decimal, total_invested: Decimal, price: Decimal) -> Result<Self, PortfolioError> {
        let current_value = round_amount(product(quantity, price, "current_value")?);
        let unrealized_gain_loss = current_value - total_invested;

        Ok(Self {
            current_value,
            unrealized_gain_loss,
            unrealized_gain_loss_percent: percent_of(unrealized_gain_loss, total_invested)?,
        })
    }
}

impl PortfolioService {
    /// Recalcule les champs dérivés d'une position au prix courant du titre
    pub fn revalue(
        holding: portfolio_holding::Model,
        stock: &stock::Model,
    ) -> Result<portfolio_holding::ActiveModel, PortfolioError> {
        ensure_same_stock(&holding, stock)?;

        let valuation = Valuation::at_price(holding.quantity, holding.total_invested, stock.current_price)?;

        let mut active: portfolio_holding::ActiveModel = holding.into();
        active.current_value = Set(valuation.current_value);
        active.unrealized_gain_loss = Set(valuation.unrealized_gain_loss);
        active.unrealized_gain_loss_percent = Set(valuation.unrealized_gain_loss_percent);
        Ok(active)
    }

    pub fn holding_response(
        holding: &portfolio_holding::Model,
        stock: &stock::Model,
    ) -> Result<PortfolioHoldingResponse, PortfolioError> {
        ensure_same_stock(holding, stock)?;

        let valuation = Valuation::at_price(holding.quantity, holding.total_invested, stock.current_price)?;

        Ok(PortfolioHoldingResponse {
            id: holding.id,
            stock_symbol: stock.symbol.clone(),
            stock_name: stock.name.clone(),
            quantity: holding.quantity,
            average_cost: holding.average_cost,
            current_price: stock.current_price,
            current_value: valuation.current_value,
            unrealized_gain_loss: valuation.unrealized_gain_loss,
            unrealized_gain_loss_percent: valuation.unrealized_gain_loss_percent,
            day_change: round_amount(product(holding.quantity, stock.day_change, "day_change")?),
            day_change_percent: stock.day_change_percent,
        })
    }

    /// Agrège les positions d'un utilisateur.
    ///
    /// Retourne la ligne `portfolio_summaries` à sauvegarder (mise à jour de
    /// `existing` si fournie, sinon insertion) et la réponse API. Les positions
    /// soldées (quantité nulle) sont ignorées.
    pub fn summarize(
        user_id: i32,
        existing: Option<portfolio_summary::Model>,
        positions: &[(portfolio_holding::Model, stock::Model)],
    ) -> Result<(portfolio_summary::ActiveModel, PortfolioSummaryResponse), PortfolioError> {
        let mut holdings = Vec::new();
        let mut total_value = Decimal::ZERO;
        let mut total_invested = Decimal::ZERO;
        let mut day_change = Decimal::ZERO;

        for (holding, stock) in positions {
            if holding.user_id != user_id {
                return Err(PortfolioError::InvalidInput(format!(
                    "holding {} belongs to user {}, not {}",
                    holding.id, holding.user_id, user_id
                )));
            }
            if holding.quantity.is_zero() {
                continue;
            }

            let response = Self::holding_response(holding, stock)?;
            total_value += response.current_value;
            total_invested += holding.total_invested;
            day_change += response.day_change;
            holdings.push(response);
        }

        let total_gain_loss = total_value - total_invested;
        let total_gain_loss_percent = percent_of(total_gain_loss, total_invested)?;
        let day_change_percent = percent_of(day_change, total_value - day_change)?;
        let number_of_holdings = i32::try_from(holdings.len())
            .map_err(|_| PortfolioError::InvalidInput(format!("too many holdings ({})", holdings.len())))?;

        let mut active: portfolio_summary::ActiveModel = match existing {
            Some(summary) if summary.user_id == user_id => summary.into(),
            Some(summary) => {
                return Err(PortfolioError::InvalidInput(format!(
                    "summary {} belongs to user {}, not {}",
                    summary.id, summary.user_id, user_id
                )));
            }
            None => portfolio_summary::ActiveModel {
                id: NotSet,
                user_id: Set(user_id),
                ..Default::default()
            },
        };
        active.total_value = Set(total_value);
        active.total_invested = Set(total_invested);
        active.total_gain_loss = Set(total_gain_loss);
        active.total_gain_loss_percent = Set(total_gain_loss_percent);
        active.day_change = Set(day_change);
        active.day_change_percent = Set(day_change_percent);
        active.number_of_holdings = Set(number_of_holdings);

        let response = PortfolioSummaryResponse {
            total_value,
            total_invested,
            total_gain_loss,
            total_gain_loss_percent,
            day_change,
            day_change_percent,
            number_of_holdings,
            holdings,
        };

        Ok((active, response))
    }
}

fn ensure_same_stock(holding: &portfolio_holding::Model, stock: &stock::Model) -> Result<(), PortfolioError> {
    if holding.stock_id != stock.id {
        return Err(PortfolioError::InvalidInput(format!(
            "holding {} is for stock {}, got {} ({})",
            holding.id, holding.stock_id, stock.id, stock.symbol
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::{dec, holding, stock};
    use super::*;

    #[test]
    fn test_valuation_at_price() {
        let v = Valuation::at_price(dec("10"), dec("1000"), dec("112.5")).unwrap();
        assert_eq!(v.current_value, dec("1125"));
        assert_eq!(v.unrealized_gain_loss, dec("125"));
        assert_eq!(v.unrealized_gain_loss_percent, dec("12.5"));

        // rien d'investi: pas de division par zéro
        let v = Valuation::at_price(dec("0"), dec("0"), dec("50")).unwrap();
        assert_eq!(v.unrealized_gain_loss_percent, Decimal::ZERO);
    }

    #[test]
    fn test_valuation_overflow_is_an_error() {
        let err = Valuation::at_price(Decimal::MAX, dec("1"), dec("10")).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_revalue_sets_derived_fields() {
        let aapl = stock(1, "AAPL", "150", "148");
        let active = PortfolioService::revalue(holding(9, 2, 1, "2.5", "120", "300"), &aapl).unwrap();

        assert_eq!(active.current_value, Set(dec("375")));
        assert_eq!(active.unrealized_gain_loss, Set(dec("75")));
        assert_eq!(active.unrealized_gain_loss_percent, Set(dec("25")));
    }

    #[test]
    fn test_revalue_rejects_other_stock() {
        let msft = stock(2, "MSFT", "400", "400");
        let err = PortfolioService::revalue(holding(9, 2, 1, "1", "1", "1"), &msft).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_holding_response_day_change() {
        let aapl = stock(1, "AAPL", "150", "148");
        let response = PortfolioService::holding_response(&holding(9, 2, 1, "3", "100", "300"), &aapl).unwrap();

        assert_eq!(response.stock_symbol, "AAPL");
        assert_eq!(response.current_price, dec("150"));
        assert_eq!(response.current_value, dec("450"));
        assert_eq!(response.day_change, dec("6"));
        assert_eq!(response.day_change_percent, dec("1.3514"));
    }

    #[test]
    fn test_summarize_totals() {
        let aapl = stock(1, "AAPL", "150", "148");
        let msft = stock(2, "MSFT", "400", "410");
        let closed = stock(3, "IBM", "200", "200");

        let positions = vec![
            (holding(1, 7, 1, "10", "100", "1000"), aapl),
            (holding(2, 7, 2, "2", "450", "900"), msft),
            (holding(3, 7, 3, "0", "180", "0"), closed),
        ];

        let (active, response) = PortfolioService::summarize(7, None, &positions).unwrap();

        assert_eq!(response.number_of_holdings, 2);
        assert_eq!(response.holdings.len(), 2);
        assert_eq!(response.total_value, dec("2300"));
        assert_eq!(response.total_invested, dec("1900"));
        assert_eq!(response.total_gain_loss, dec("400"));
        assert_eq!(response.total_gain_loss_percent, dec("21.0526"));
        // 10 * 2 + 2 * -10
        assert_eq!(response.day_change, Decimal::ZERO);
        assert_eq!(response.day_change_percent, Decimal::ZERO);

        assert_eq!(active.user_id, Set(7));
        assert_eq!(active.number_of_holdings, Set(2));
        assert_eq!(active.total_value, Set(dec("2300")));
    }

    #[test]
    fn test_summarize_day_change_percent() {
        let aapl = stock(1, "AAPL", "110", "100");
        let positions = vec![(holding(1, 7, 1, "10", "90", "900"), aapl)];

        let (_, response) = PortfolioService::summarize(7, None, &positions).unwrap();
        assert_eq!(response.day_change, dec("100"));
        // 100 / (1100 - 100)
        assert_eq!(response.day_change_percent, dec("10"));
    }

    #[test]
    fn test_summarize_empty_portfolio() {
        let (active, response) = PortfolioService::summarize(7, None, &[]).unwrap();
        assert_eq!(response.number_of_holdings, 0);
        assert_eq!(response.total_gain_loss_percent, Decimal::ZERO);
        assert_eq!(active.total_invested, Set(Decimal::ZERO));
    }

    #[test]
    fn test_summarize_rejects_foreign_rows() {
        let aapl = stock(1, "AAPL", "110", "100");
        let positions = vec![(holding(1, 8, 1, "1", "1", "1"), aapl)];
        assert!(PortfolioService::summarize(7, None, &positions).is_err());
    }
}
