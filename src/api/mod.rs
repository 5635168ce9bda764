use actix_web::http::{header, Method};
use actix_web::{middleware, web, HttpRequest, HttpResponse, ResponseError};
use error::ApiError;

pub mod error;
pub mod scores;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/scores").configure(scores::routes))
        .default_service(web::to(not_found));
}

/// Headers every response carries, preflight or not.
pub fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .add((header::CONTENT_TYPE, "application/json"))
}

/// Answers OPTIONS on any path with an empty 200, everything else unmatched with a 404.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        HttpResponse::Ok().finish()
    } else {
        ApiError::NotFound.error_response()
    }
}
