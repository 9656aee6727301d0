/*
services/
├─ user_service.rs        ← UserCreate / UserUpdate -> users::ActiveModel
├─ stock_service.rs       ← création, mise à jour, nouveau prix + barre d'historique
├─ trade_service.rs       ← BUY / SELL: transaction + réconciliation de la position
├─ portfolio_service.rs   ← valorisation des positions, agrégat portfolio_summaries
└─ alert_service.rs       ← création, mise à jour, transitions de statut

Aucune fonction ici n'écrit en base: elles retournent des ActiveModel que
l'appelant sauvegarde (insert / update), les hooks before_save font le reste.
*/

pub mod alert_service;
pub mod portfolio_service;
pub mod stock_service;
pub mod trade_service;
pub mod user_service;
