use super::AppState;
use crate::application::export::render_users_csv;
use crate::error::ShopError;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, HttpResponse};

/// Read-only projection of the user collection as a CSV download.
#[get("/api/export-users")]
pub async fn export_users(state: web::Data<AppState>) -> Result<HttpResponse, ShopError> {
    let users = state.users.all().await?;
    if users.is_empty() {
        return Err(ShopError::NotFound("No users to export".to_string()));
    }

    let csv = render_users_csv(&users)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename("users.csv".to_string())],
        })
        .body(csv))
}
