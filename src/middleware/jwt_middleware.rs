//! Access-token guard for protected routes.
//!
//! Resolves the caller from the `accessToken` cookie or the
//! `Authorization` header, checks the account still exists, and attaches
//! an [`AuthenticatedUser`] to the request extensions.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::auth::verify_access_token;
use crate::configuration::TokenSettings;
use crate::error::AppError;
use crate::store::{UserProfile, UserStore};

/// The verified caller, available to handlers behind [`AuthMiddleware`]
/// through `web::ReqData<AuthenticatedUser>`.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub profile: UserProfile,
}

pub struct AuthMiddleware {
    store: Arc<dyn UserStore>,
    tokens: TokenSettings,
}

impl AuthMiddleware {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenSettings) -> Self {
        Self { store, tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    store: Arc<dyn UserStore>,
    tokens: TokenSettings,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();
        let tokens = self.tokens.clone();

        Box::pin(async move {
            let token = extract_access_token(&req)
                .ok_or_else(|| AppError::Unauthorized("Unauthorized request".to_string()))?;

            let claims = verify_access_token(&token, &tokens)?;
            let user_id = claims.user_id()?;

            // A valid signature is not enough; the account may have been
            // deleted since the token was issued.
            let user = store
                .find_by_id(user_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::Unauthorized("Invalid Access Token".to_string()))?;

            req.extensions_mut().insert(AuthenticatedUser {
                id: user.id,
                profile: UserProfile::from(&user),
            });

            service.call(req).await
        })
    }
}

/// Cookie first, then the `Authorization` header. Blank values count as
/// absent.
fn extract_access_token(req: &ServiceRequest) -> Option<String> {
    let from_cookie = req
        .cookie("accessToken")
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.trim().is_empty());

    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
        .filter(|token| !token.trim().is_empty());

    from_cookie.or(from_header)
}
