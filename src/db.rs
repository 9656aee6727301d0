// connexion BD + création du schéma

use sea_orm::sea_query::{Alias, IndexCreateStatement, Table, TableCreateStatement};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityName, Schema};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::models::{
    portfolio_holding, portfolio_summary, price_alert, stock, stock_price_history, transaction, users,
};

pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.connection_url());
    options.connect_timeout(config.connect_timeout);

    Database::connect(options).await
}

/// Tables dans l'ordre des clés étrangères (parents d'abord)
fn table_statements(schema: &Schema) -> Vec<(String, TableCreateStatement)> {
    vec![
        (users::Entity.table_name().to_string(), schema.create_table_from_entity(users::Entity)),
        (stock::Entity.table_name().to_string(), schema.create_table_from_entity(stock::Entity)),
        (
            portfolio_holding::Entity.table_name().to_string(),
            schema.create_table_from_entity(portfolio_holding::Entity),
        ),
        (transaction::Entity.table_name().to_string(), schema.create_table_from_entity(transaction::Entity)),
        (price_alert::Entity.table_name().to_string(), schema.create_table_from_entity(price_alert::Entity)),
        (
            stock_price_history::Entity.table_name().to_string(),
            schema.create_table_from_entity(stock_price_history::Entity),
        ),
        (
            portfolio_summary::Entity.table_name().to_string(),
            schema.create_table_from_entity(portfolio_summary::Entity),
        ),
    ]
}

fn index_statements(schema: &Schema) -> Vec<IndexCreateStatement> {
    let mut indexes = Vec::new();
    indexes.extend(schema.create_index_from_entity(users::Entity));
    indexes.extend(schema.create_index_from_entity(stock::Entity));
    indexes.extend(schema.create_index_from_entity(portfolio_holding::Entity));
    indexes.extend(schema.create_index_from_entity(transaction::Entity));
    indexes.extend(schema.create_index_from_entity(price_alert::Entity));
    indexes.extend(schema.create_index_from_entity(stock_price_history::Entity));
    indexes.extend(schema.create_index_from_entity(portfolio_summary::Entity));
    indexes
}

/// Crée les 7 tables et leurs index s'ils n'existent pas
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    for (name, mut statement) in table_statements(&schema) {
        statement.if_not_exists();
        db.execute(backend.build(&statement)).await?;
        info!("table {} ready", name);
    }

    for mut statement in index_statements(&schema) {
        statement.if_not_exists();
        db.execute(backend.build(&statement)).await?;
    }

    Ok(())
}

/// Supprime toutes les tables puis les recrée. Réservé aux tests!
pub async fn reset_db(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    warn!("dropping all tables");
    for (name, _) in table_statements(&schema).into_iter().rev() {
        let statement = Table::drop().table(Alias::new(name)).if_exists().to_owned();
        db.execute(backend.build(&statement)).await?;
    }

    create_tables(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortfolioError;
    use crate::models::dto::{PriceAlertCreate, PriceAlertUpdate, StockCreate, StockPriceUpdate, TransactionCreate, UserCreate};
    use crate::models::{AlertStatus, AlertType, TransactionType};
    use crate::services::alert_service::AlertService;
    use crate::services::stock_service::StockService;
    use crate::services::trade_service::TradeService;
    use crate::services::user_service::UserService;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};

    async fn memory_db() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        create_tables(&db).await.unwrap();
        db
    }

    fn new_user(username: &str, email: &str) -> users::ActiveModel {
        UserService::new_user(UserCreate {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
        })
        .unwrap()
    }

    fn new_stock(symbol: &str) -> stock::ActiveModel {
        StockService::new_stock(StockCreate {
            symbol: symbol.to_string(),
            name: format!("{} Inc.", symbol),
            exchange: "NASDAQ".to_string(),
            sector: None,
            current_price: Decimal::new(1505, 1),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let db = memory_db().await;
        create_tables(&db).await.unwrap();

        let user = new_user("alice", "alice@example.com").insert(&db).await.unwrap();
        assert!(user.is_active);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let db = memory_db().await;
        new_user("alice", "alice@example.com").insert(&db).await.unwrap();

        let err = new_user("alice", "other@example.com").insert(&db).await.unwrap_err();
        assert!(matches!(PortfolioError::from(err), PortfolioError::Conflict(_)));

        let err = new_user("bob", "alice@example.com").insert(&db).await.unwrap_err();
        assert!(matches!(PortfolioError::from(err), PortfolioError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unique_symbol() {
        let db = memory_db().await;
        let stock = new_stock("AAPL").insert(&db).await.unwrap();
        assert_eq!(stock.market_data, serde_json::json!({}));
        assert_eq!(stock.volume, 0);

        let err = new_stock("AAPL").insert(&db).await.unwrap_err();
        assert!(matches!(PortfolioError::from(err), PortfolioError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_one_summary_per_user() {
        let db = memory_db().await;
        let user = new_user("alice", "alice@example.com").insert(&db).await.unwrap();

        let summary = portfolio_summary::ActiveModel {
            user_id: Set(user.id),
            ..Default::default()
        };
        let saved = summary.clone().insert(&db).await.unwrap();
        assert_eq!(saved.number_of_holdings, 0);
        assert_eq!(saved.total_value, Decimal::ZERO);

        let err = summary.insert(&db).await.unwrap_err();
        assert!(matches!(PortfolioError::from(err), PortfolioError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_save_hook_rejects_bad_fields() {
        let db = memory_db().await;

        let mut user = new_user("alice", "alice@example.com");
        user.email = Set("not-an-email".to_string());
        let err = user.insert(&db).await.unwrap_err();
        assert!(err.to_string().contains("users.email"));

        let mut stock = new_stock("MSFT");
        stock.current_price = Set(Decimal::new(123456789, 5));
        let err = PortfolioError::from(stock.insert(&db).await.unwrap_err());
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_foreign_key() {
        let db = memory_db().await;
        let summary = portfolio_summary::ActiveModel {
            user_id: Set(999),
            ..Default::default()
        };
        let err = summary.insert(&db).await.unwrap_err();
        assert!(matches!(PortfolioError::from(err), PortfolioError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_trade_round_trip_and_relations() {
        let db = memory_db().await;
        let user = new_user("alice", "alice@example.com").insert(&db).await.unwrap();
        let stock = new_stock("AAPL").insert(&db).await.unwrap();

        let request = TransactionCreate {
            stock_id: stock.id,
            transaction_type: TransactionType::Buy,
            quantity: Decimal::new(4, 0),
            price: Decimal::new(1505, 1),
            fees: Decimal::ZERO,
            notes: Some("first lot".to_string()),
            transaction_date: None,
        };
        let trade = TradeService::record(user.id, &stock, None, request, Utc::now()).unwrap();
        let tx = trade.transaction.insert(&db).await.unwrap();
        let holding = trade.holding.insert(&db).await.unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Buy);
        assert_eq!(holding.quantity, Decimal::new(4, 0));
        assert_eq!(holding.total_invested, Decimal::new(602, 0));

        let holdings = user.find_related(portfolio_holding::Entity).all(&db).await.unwrap();
        assert_eq!(holdings.len(), 1);
        let transactions = stock.find_related(transaction::Entity).all(&db).await.unwrap();
        assert_eq!(transactions.len(), 1);

        // historique immuable
        let mut edited: transaction::ActiveModel = tx.into();
        edited.notes = Set(Some("rewritten".to_string()));
        assert!(edited.update(&db).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_db_empties_tables() {
        let db = memory_db().await;
        new_user("alice", "alice@example.com").insert(&db).await.unwrap();

        reset_db(&db).await.unwrap();

        let users = users::Entity::find().all(&db).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_hook_rejects_empty_username_and_symbol() {
        let db = memory_db().await;

        let mut user = new_user("alice", "alice@example.com");
        user.username = Set(String::new());
        let err = PortfolioError::from(user.insert(&db).await.unwrap_err());
        assert!(matches!(err, PortfolioError::InvalidInput(ref msg) if msg.contains("users.username")));

        let mut stock = new_stock("AAPL");
        stock.symbol = Set(String::new());
        let err = PortfolioError::from(stock.insert(&db).await.unwrap_err());
        assert!(matches!(err, PortfolioError::InvalidInput(ref msg) if msg.contains("stocks.symbol")));
    }

    #[tokio::test]
    async fn test_hook_rejects_oversized_decimal() {
        let db = memory_db().await;
        let mut stock = new_stock("AAPL");
        stock.current_price = Set(Decimal::new(1_000_000_000_000, 0));
        let err = PortfolioError::from(stock.insert(&db).await.unwrap_err());
        assert!(matches!(err, PortfolioError::InvalidInput(ref msg) if msg.contains("stocks.current_price")));
    }

    #[tokio::test]
    async fn test_price_update_writes_history_bar() {
        let db = memory_db().await;
        let stock = new_stock("KO").insert(&db).await.unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 3, 14, 0, 0).unwrap();

        let update = StockPriceUpdate {
            price: Decimal::new(1025, 1),
            volume: 1_200,
            open_price: None,
            high_price: Some(Decimal::new(103, 0)),
            low_price: Some(Decimal::new(9975, 2)),
            close_price: None,
        };
        let (active, bar) = StockService::apply_price_update(stock.clone(), update, at).unwrap();
        let stock = active.update(&db).await.unwrap();
        bar.insert(&db).await.unwrap();

        assert_eq!(stock.current_price, Decimal::new(1025, 1));
        assert_eq!(stock.volume, 1_200);
        assert_eq!(stock.last_updated, at);

        let bars = stock.find_related(stock_price_history::Entity).all(&db).await.unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].price, Decimal::new(1025, 1));
        assert_eq!(bars[0].high_price, Some(Decimal::new(103, 0)));
        assert_eq!(bars[0].low_price, Some(Decimal::new(9975, 2)));
        assert_eq!(bars[0].open_price, None);
        assert_eq!(bars[0].timestamp, at);

        let orphan = stock_price_history::ActiveModel {
            stock_id: Set(999),
            price: Set(Decimal::ONE),
            ..Default::default()
        };
        let err = orphan.insert(&db).await.unwrap_err();
        assert!(matches!(PortfolioError::from(err), PortfolioError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_direct_price_write_refreshes_last_updated() {
        let db = memory_db().await;
        let stale = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        let mut stock = new_stock("KO");
        stock.last_updated = Set(stale);
        let stock = stock.insert(&db).await.unwrap();
        assert_eq!(stock.last_updated, stale);

        let mut active: stock::ActiveModel = stock.into();
        active.current_price = Set(Decimal::new(151, 0));
        let stock = active.update(&db).await.unwrap();
        assert!(stock.last_updated > stale);
    }

    #[tokio::test]
    async fn test_alert_status_round_trip() {
        let db = memory_db().await;
        let user = new_user("alice", "alice@example.com").insert(&db).await.unwrap();
        let stock = new_stock("AAPL").insert(&db).await.unwrap();

        let alert = AlertService::new_alert(
            user.id,
            PriceAlertCreate {
                stock_id: stock.id,
                alert_type: AlertType::Above,
                target_price: Decimal::new(200, 0),
                message: Some("take profit".to_string()),
            },
        )
        .unwrap()
        .insert(&db)
        .await
        .unwrap();

        let stored = price_alert::Entity::find_by_id(alert.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.status, AlertStatus::Active);
        assert_eq!(stored.alert_type, AlertType::Above);
        assert_eq!(stored.triggered_at, None);

        let now = Utc.with_ymd_and_hms(2026, 3, 5, 15, 0, 0).unwrap();
        let update = PriceAlertUpdate {
            status: Some(AlertStatus::Triggered),
            ..Default::default()
        };
        AlertService::apply_update(stored, update, now).unwrap().update(&db).await.unwrap();

        let stored = price_alert::Entity::find_by_id(alert.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.status, AlertStatus::Triggered);
        assert_eq!(stored.triggered_at, Some(now));

        let alerts = user.find_related(price_alert::Entity).all(&db).await.unwrap();
        assert_eq!(alerts.len(), 1);

        let back = PriceAlertUpdate {
            status: Some(AlertStatus::Active),
            ..Default::default()
        };
        assert!(AlertService::apply_update(stored, back, now).is_err());
    }
}
