// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table avec SeaORM.
//
// Liste des modules:
//   - enums : TransactionType (BUY/SELL), AlertType (ABOVE/BELOW), AlertStatus
//   - users : Comptes utilisateurs (username et email uniques)
//   - stock : Titres cotés (symbol unique) + données de marché JSON
//   - portfolio_holding : Position d'un utilisateur sur un titre
//   - transaction : Achats / ventes exécutés (historique immuable)
//   - price_alert : Alertes de prix (seuil au-dessus / en dessous)
//   - stock_price_history : Barres OHLC + volume par titre
//   - portfolio_summary : Agrégat par utilisateur (un seul par user)
//   - dto : Formes create/update/response pour l'API
//
// Points d'attention:
//   - Tous les montants sont en Decimal (jamais de f64)
//   - Les contraintes de longueur / décimales sont vérifiées dans
//     before_save (ActiveModelBehavior) et dans les DTO (validator)
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod enums;
pub mod users;
pub mod stock;
pub mod portfolio_holding;
pub mod transaction;
pub mod price_alert;
pub mod stock_price_history;
pub mod portfolio_summary;
pub mod dto;

pub use enums::{AlertStatus, AlertType, TransactionType};
