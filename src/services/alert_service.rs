use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, Set};
use tracing::info;
use validator::Validate;

use crate::error::PortfolioError;
use crate::models::dto::{PriceAlertCreate, PriceAlertUpdate};
use crate::models::{price_alert, AlertStatus};

pub struct AlertService;

impl AlertService {
    pub fn new_alert(user_id: i32, request: PriceAlertCreate) -> Result<price_alert::ActiveModel, PortfolioError> {
        request.validate()?;
        if request.target_price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidInput("target_price must be greater than 0".to_string()));
        }

        Ok(price_alert::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            stock_id: Set(request.stock_id),
            alert_type: Set(request.alert_type),
            target_price: Set(request.target_price),
            status: Set(AlertStatus::Active),
            message: Set(request.message),
            triggered_at: Set(None),
            ..Default::default()
        })
    }

    /// Mise à jour partielle. Un changement de statut doit respecter
    /// `AlertStatus::can_transition_to`; le passage à TRIGGERED horodate
    /// `triggered_at`.
    pub fn apply_update(
        alert: price_alert::Model,
        request: PriceAlertUpdate,
        now: DateTime<Utc>,
    ) -> Result<price_alert::ActiveModel, PortfolioError> {
        request.validate()?;

        if let Some(next) = request.status {
            if !alert.status.can_transition_to(next) {
                return Err(PortfolioError::InvalidTransition {
                    from: alert.status,
                    to: next,
                });
            }
        }
        if let Some(target) = request.target_price {
            if target <= Decimal::ZERO {
                return Err(PortfolioError::InvalidInput("target_price must be greater than 0".to_string()));
            }
        }

        let current = alert.status;
        let alert_id = alert.id;
        let mut active: price_alert::ActiveModel = alert.into();

        if let Some(alert_type) = request.alert_type {
            active.alert_type = Set(alert_type);
        }
        if let Some(target) = request.target_price {
            active.target_price = Set(target);
        }
        if let Some(message) = request.message {
            active.message = Set(Some(message));
        }
        if let Some(next) = request.status {
            if next != current {
                info!("alert {}: {} -> {}", alert_id, current.as_str(), next.as_str());
                active.status = Set(next);
                if next == AlertStatus::Triggered {
                    active.triggered_at = Set(Some(now));
                }
            }
        }
        Ok(active)
    }
}
