use super::types::{
    BuyProductRequest, HashrateQuery, LoginRequest, RegisterRequest, UpdateProfileRequest,
};
use super::AppState;
use crate::error::ShopError;
use actix_web::{get, post, put, web, HttpResponse};
use serde_json::json;
use validator::Validate;

type Response = Result<HttpResponse, ShopError>;

#[post("/register")]
pub async fn register(state: web::Data<AppState>, body: web::Json<RegisterRequest>) -> Response {
    body.validate()
        .map_err(|err| ShopError::Validation(err.to_string()))?;
    let user = state
        .accounts
        .register(&body.phone_number, &body.password, &body.invitation_code)
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "User registered successfully",
        "userId": user.id,
    })))
}

#[post("/login")]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Response {
    let user = state
        .accounts
        .login(&body.phone_number, &body.password)
        .await?;
    // Never echo the password or its hash.
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "phoneNumber": user.phone_number,
        "balance": user.balance,
    })))
}

/// Stateless no-op kept for client symmetry; there are no sessions.
#[post("/logout")]
pub async fn logout() -> Response {
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Logged out",
    })))
}

#[get("/api/get-hashrate")]
pub async fn get_hashrate(
    state: web::Data<AppState>,
    query: web::Query<HashrateQuery>,
) -> Response {
    let purchases = state.accounts.purchases(&query.phone_number).await?;
    Ok(HttpResponse::Ok().json(json!({ "purchases": purchases })))
}

#[put("/api/update-profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> Response {
    body.validate()
        .map_err(|err| ShopError::Validation(err.to_string()))?;
    state
        .accounts
        .change_password(&body.phone_number, &body.current_password, &body.new_password)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Password updated",
    })))
}

#[post("/api/buy-product")]
pub async fn buy_product(
    state: web::Data<AppState>,
    body: web::Json<BuyProductRequest>,
) -> Response {
    let body = body.into_inner();
    let new_balance = state
        .accounts
        .buy_product(&body.phone_number, body.product_data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "newBalance": new_balance,
    })))
}
