use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "lumen-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
