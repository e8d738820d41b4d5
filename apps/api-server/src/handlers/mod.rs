//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
///
/// The JSON and path extractor errors are remapped here so that malformed
/// bodies answer 400 and malformed identifiers answer 404, both with the
/// standard error body.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::NotFound("resource not found".to_string()).into()),
    )
    // Public routes
    .route("/health", web::get().to(health::health_check))
    // Auth routes
    .service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/me", web::get().to(auth::me)),
    )
    // Blog routes
    .service(
        web::scope("/posts")
            .route("", web::get().to(posts::list))
            .route("", web::post().to(posts::create))
            .route("/drafts", web::get().to(posts::drafts))
            .route("/{id}", web::get().to(posts::detail))
            .route("/{id}", web::post().to(posts::update))
            .route("/{id}", web::delete().to(posts::remove))
            .route("/{id}/publish", web::post().to(posts::publish))
            .route("/{id}/comments", web::get().to(comments::list_for_post))
            .route("/{id}/comments", web::post().to(comments::create)),
    )
    .service(
        web::scope("/comments")
            .route("/{id}", web::post().to(comments::update))
            .route("/{id}", web::delete().to(comments::remove))
            .route("/{id}/approve", web::post().to(comments::approve)),
    );
}

#[cfg(test)]
pub(crate) mod test_app {
    use std::sync::Arc;

    use actix_http::Request;
    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{App, Error, test, web};
    use uuid::Uuid;

    use quill_core::ports::{PasswordService, TokenService};
    use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

    use crate::state::AppState;

    fn token_service() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }))
    }

    /// Full application service over the given state, wired like `main`.
    pub(crate) async fn init(
        state: AppState,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
        let tokens = token_service();
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(tokens))
                .app_data(web::Data::new(passwords))
                .configure(super::configure_routes),
        )
        .await
    }

    /// An `Authorization` header value for the given user.
    pub(crate) fn bearer(user_id: Uuid) -> String {
        let token = token_service()
            .generate_token(user_id, "author@example.com")
            .unwrap();
        format!("Bearer {token}")
    }
}
