//! HTTP surface: thin actix-web handlers mapping the wire contract onto the
//! application services.

pub mod export;
pub mod payments;
pub mod types;
pub mod users;

use crate::application::accounts::AccountService;
use crate::application::payments::PaymentService;
use crate::domain::ports::UserStoreRef;
use actix_web::web;

/// Shared per-worker state. Services are cheap to clone; the store handle is
/// kept for the read-only export projection.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub payments: PaymentService,
    pub users: UserStoreRef,
    pub gateway_key_id: String,
}

/// Registers every route of the public surface.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::get_hashrate)
        .service(users::update_profile)
        .service(users::buy_product)
        .service(payments::get_key)
        .service(payments::create_order)
        .service(payments::verify_payment)
        .service(export::export_users);
}
