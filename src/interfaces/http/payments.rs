use super::types::{CreateOrderRequest, VerifyPaymentRequest};
use super::AppState;
use crate::error::ShopError;
use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

type Response = Result<HttpResponse, ShopError>;

/// Public key identifier for the checkout widget. The secret never leaves
/// the server.
#[get("/api/get-key")]
pub async fn get_key(state: web::Data<AppState>) -> Response {
    Ok(HttpResponse::Ok().json(json!({ "key": state.gateway_key_id })))
}

#[post("/create-order")]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Response {
    let amount = body.parsed_amount()?;
    let body = body.into_inner();
    let order = state
        .payments
        .create_order(
            amount,
            body.currency,
            &body.phone_number,
            body.qr_id,
            body.notes,
        )
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/verify-payment")]
pub async fn verify_payment(
    state: web::Data<AppState>,
    body: web::Json<VerifyPaymentRequest>,
) -> Response {
    let body = body.into_inner();
    let outcome = state
        .payments
        .verify_payment(
            &body.razorpay_order_id,
            &body.razorpay_payment_id,
            &body.razorpay_signature,
            body.product_data,
        )
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
