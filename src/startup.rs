use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};

use crate::configuration::TokenSettings;
use crate::error::{AppError, FailureBody};
use crate::media::MediaStore;
use crate::middleware::{AuthMiddleware, RequestLogger};
use crate::routes::{
    change_current_password, get_current_user, health_check, login_user, logout_user,
    refresh_access_token, register_user,
};
use crate::store::UserStore;

/// Builds the server on an already-bound listener. Collaborators come in
/// as trait objects so tests can run against in-memory implementations.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    media: Arc<dyn MediaStore>,
    tokens: TokenSettings,
) -> Result<Server, std::io::Error> {
    let store_data: web::Data<dyn UserStore> = web::Data::from(store.clone());
    let media_data: web::Data<dyn MediaStore> = web::Data::from(media);
    let token_data = web::Data::new(tokens.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(RequestLogger)
            .app_data(store_data.clone())
            .app_data(media_data.clone())
            .app_data(token_data.clone())
            .app_data(json_error_handling())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/users")
                    .route("/register", web::post().to(register_user))
                    .route("/login", web::post().to(login_user))
                    .route("/refresh-token", web::post().to(refresh_access_token))
                    .service(
                        web::resource("/logout")
                            .wrap(AuthMiddleware::new(store.clone(), tokens.clone()))
                            .route(web::post().to(logout_user)),
                    )
                    .service(
                        web::resource("/change-password")
                            .wrap(AuthMiddleware::new(store.clone(), tokens.clone()))
                            .route(web::post().to(change_current_password)),
                    )
                    .service(
                        web::resource("/current-user")
                            .wrap(AuthMiddleware::new(store.clone(), tokens.clone()))
                            .route(web::get().to(get_current_user)),
                    ),
            )
            .default_service(web::route().to(unmatched_route))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Failure envelope for malformed JSON request bodies.
fn json_error_handling() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error, _req| {
        tracing::warn!("Rejected request body: {}", error);
        AppError::BadRequest("Invalid request body".to_string()).into()
    })
}

/// Failure envelope for unmatched routes.
async fn unmatched_route() -> HttpResponse {
    HttpResponse::NotFound().json(FailureBody::new(404, "Resource not found".to_string()))
}
