use actix_web::HttpResponse;

/// Liveness endpoint; empty 200, no envelope.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
