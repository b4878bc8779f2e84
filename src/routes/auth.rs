//! Account and session handlers.
//!
//! Registration, login, refresh-token rotation, logout, password change
//! and the current-user lookup. Every response uses the
//! [`ApiResponse`] / failure envelope; tokens travel as HttpOnly cookies
//! with a bearer-header fallback.

use actix_web::{cookie::Cookie, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    hash_password, issue_access_token, issue_refresh_token, refresh_token_fingerprint,
    verify_password, verify_refresh_token,
};
use crate::configuration::TokenSettings;
use crate::error::AppError;
use crate::media::MediaStore;
use crate::middleware::AuthenticatedUser;
use crate::response::ApiResponse;
use crate::store::{NewUser, User, UserProfile, UserStore};
use crate::validators::{required_field, validate_email};

/// User registration request.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    /// Local file reference for the mandatory avatar.
    pub avatar: Option<String>,
    /// Local file reference for the optional cover image.
    pub cover_image: Option<String>,
}

/// User login request; `identifier` is a username or an email.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// Token refresh request body; the cookie takes precedence.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Password change request.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Login success payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh success payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /users/register
///
/// Register a new account. The avatar reference is uploaded through the
/// media store and must yield a URL; a cover image is optional and its
/// upload failure degrades to "no cover".
///
/// # Errors
/// - 400: missing fields, malformed email, missing or failed avatar
/// - 409: username or email already taken
/// - 500: storage failure
pub async fn register_user(
    body: web::Json<RegisterRequest>,
    store: web::Data<dyn UserStore>,
    media: web::Data<dyn MediaStore>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let username = required_field(body.username.as_deref(), "All fields are required")?;
    let email = required_field(body.email.as_deref(), "All fields are required")?;
    let full_name = required_field(body.full_name.as_deref(), "All fields are required")?;
    let password = required_field(body.password.as_deref(), "All fields are required")?;
    let email = validate_email(&email)?;

    let username_taken = store.find_by_username_or_email(&username).await?.is_some();
    let email_taken = store.find_by_username_or_email(&email).await?.is_some();
    if username_taken || email_taken {
        return Err(AppError::Conflict(
            "Email or Username Already Exists".to_string(),
        ));
    }

    let avatar_ref = required_field(body.avatar.as_deref(), "Avatar file is required")?;
    let avatar_url = media
        .upload(&avatar_ref)
        .await
        .ok_or_else(|| AppError::BadRequest("Avatar file is required".to_string()))?;

    let cover_image_url = match body.cover_image.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(cover_ref) => media.upload(cover_ref).await,
        None => None,
    };

    let new_user = NewUser::new(
        &username,
        &email,
        &full_name,
        &password,
        avatar_url,
        cover_image_url,
    )?;
    let user = store.create(new_user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(ApiResponse::new(
        201,
        UserProfile::from(&user),
        "User registered Successfully",
    )))
}

/// POST /users/login
///
/// Verify credentials, mint an access+refresh pair, record the refresh
/// fingerprint as the live session and set both token cookies.
///
/// # Errors
/// - 400: blank identifier or password
/// - 404: no account for the identifier
/// - 401: password mismatch
/// - 500: token generation failure
pub async fn login_user(
    body: web::Json<LoginRequest>,
    store: web::Data<dyn UserStore>,
    tokens: web::Data<TokenSettings>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let identifier = required_field(body.identifier.as_deref(), "Username or Email is required")?;
    let password = required_field(body.password.as_deref(), "Username or Email is required")?;

    let user = store
        .find_by_username_or_email(&identifier)
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist".to_string()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid user credentials".to_string(),
        ));
    }

    let (access_token, refresh_token) =
        generate_access_and_refresh_tokens(&user, store.get_ref(), tokens.get_ref()).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie("accessToken", access_token.clone()))
        .cookie(session_cookie("refreshToken", refresh_token.clone()))
        .json(ApiResponse::new(
            200,
            LoginData {
                user: UserProfile::from(&user),
                access_token,
                refresh_token,
            },
            "User Logged In successfully",
        )))
}

/// POST /users/refresh-token
///
/// Exchange a live refresh token for a new pair. The presented token
/// must match the stored fingerprint exactly; a rotated-out token is
/// reported as expired or used. Rotation itself is a compare-and-swap,
/// so of two concurrent exchanges of the same token only one wins.
///
/// # Errors
/// - 401: missing, invalid, or superseded refresh token
/// - 500: token generation failure
pub async fn refresh_access_token(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    store: web::Data<dyn UserStore>,
    tokens: web::Data<TokenSettings>,
) -> Result<HttpResponse, AppError> {
    let incoming = extract_refresh_token(&req, body.as_deref())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized request".to_string()))?;

    let claims = verify_refresh_token(&incoming, tokens.get_ref())?;
    let user_id = claims.user_id()?;

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let presented = refresh_token_fingerprint(&incoming);
    if !store.is_current_refresh(user.id, &presented).await? {
        return Err(AppError::Unauthorized(
            "Refresh token is expired or used".to_string(),
        ));
    }

    let (access_token, refresh_token) = mint_token_pair(&user, tokens.get_ref())?;
    let next = refresh_token_fingerprint(&refresh_token);

    // Rotation point. The swap fails exactly when another request rotated
    // this slot first; the presented token is then already spent.
    let rotated = store
        .rotate_current_refresh(user.id, &presented, &next)
        .await
        .map_err(|error| {
            tracing::error!("Failed to rotate the refresh fingerprint: {}", error);
            AppError::Internal(
                "Something went wrong while generating refresh and access token".to_string(),
            )
        })?;
    if !rotated {
        return Err(AppError::Unauthorized(
            "Refresh token is expired or used".to_string(),
        ));
    }

    tracing::info!(user_id = %user.id, "Access token refreshed");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie("accessToken", access_token.clone()))
        .cookie(session_cookie("refreshToken", refresh_token.clone()))
        .json(ApiResponse::new(
            200,
            TokenPairData {
                access_token,
                refresh_token,
            },
            "Access token refreshed successfully",
        )))
}

/// POST /users/logout
///
/// Clears the live session slot and expires both token cookies. Safe to
/// call with no live session.
pub async fn logout_user(
    auth: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    store.clear_current_refresh(auth.id).await?;

    tracing::info!(user_id = %auth.id, "User logged out");

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie("accessToken"))
        .cookie(removal_cookie("refreshToken"))
        .json(ApiResponse::new(
            200,
            serde_json::json!({}),
            "User logged out successfully",
        )))
}

/// POST /users/change-password
///
/// The equality checks run before the account is touched, so a rejected
/// request never reaches the store.
///
/// # Errors
/// - 400: blank fields, new == old, new != confirm, account gone
/// - 401: old password does not verify
pub async fn change_current_password(
    auth: web::ReqData<AuthenticatedUser>,
    body: web::Json<ChangePasswordRequest>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let old_password = required_field(body.old_password.as_deref(), "All fields are required")?;
    let new_password = required_field(body.new_password.as_deref(), "All fields are required")?;
    let confirm_password =
        required_field(body.confirm_password.as_deref(), "All fields are required")?;

    if new_password == old_password {
        return Err(AppError::BadRequest(
            "Old password and New Password must be different".to_string(),
        ));
    }
    if new_password != confirm_password {
        return Err(AppError::BadRequest(
            "New password and Confirm Password must be equal".to_string(),
        ));
    }

    let user = store
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    if !verify_password(&old_password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid Old Password".to_string()));
    }

    let new_hash = hash_password(&new_password)?;
    store.update_password(user.id, new_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        200,
        serde_json::json!({}),
        "Password changed successfully",
    )))
}

/// GET /users/current-user
pub async fn get_current_user(
    auth: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        200,
        auth.profile.clone(),
        "Current user fetched successfully",
    )))
}

/// Signs a fresh access+refresh pair. Failures collapse into one masked
/// message so signing internals never reach the client.
fn mint_token_pair(user: &User, settings: &TokenSettings) -> Result<(String, String), AppError> {
    let access_token = issue_access_token(user, settings);
    let refresh_token = issue_refresh_token(user.id, settings);

    match (access_token, refresh_token) {
        (Ok(access_token), Ok(refresh_token)) => Ok((access_token, refresh_token)),
        (Err(error), _) | (_, Err(error)) => {
            tracing::error!("Failed to mint a token pair: {}", error);
            Err(AppError::Internal(
                "Something went wrong while generating refresh and access token".to_string(),
            ))
        }
    }
}

/// Mints a pair and records the refresh fingerprint as the live session.
/// Used at login, where the slot is overwritten unconditionally.
async fn generate_access_and_refresh_tokens(
    user: &User,
    store: &dyn UserStore,
    settings: &TokenSettings,
) -> Result<(String, String), AppError> {
    let (access_token, refresh_token) = mint_token_pair(user, settings)?;

    store
        .set_current_refresh(user.id, &refresh_token_fingerprint(&refresh_token))
        .await
        .map_err(|error| {
            tracing::error!("Failed to store the refresh fingerprint: {}", error);
            AppError::Internal(
                "Something went wrong while generating refresh and access token".to_string(),
            )
        })?;

    Ok((access_token, refresh_token))
}

/// Cookie first, then the request body. Blank values count as absent.
fn extract_refresh_token(req: &HttpRequest, body: Option<&RefreshRequest>) -> Option<String> {
    let from_cookie = req
        .cookie("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.trim().is_empty());

    let from_body = body
        .and_then(|body| body.refresh_token.clone())
        .filter(|token| !token.trim().is_empty());

    from_cookie.or(from_body)
}

/// HttpOnly + Secure token cookie, path `/`.
fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build(name, value)
        .http_only(true)
        .secure(true)
        .path("/")
        .finish()
}

/// Expired counterpart of [`session_cookie`], same attributes.
fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new());
    cookie.make_removal();
    cookie
}
