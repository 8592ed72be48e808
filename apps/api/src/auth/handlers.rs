use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::extractor::CurrentUser;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::store::{create_student, find_user_by_email, find_user_by_id};
use crate::auth::tokens::{decode_token, issue_pair, TokenKind};
use crate::errors::AppError;
use crate::models::student::StudentProfileRow;
use crate::models::user::{UserInfo, UserRow};
use crate::state::AppState;
use crate::student::store::{find_profile_by_user, refresh_completion};
use crate::student::validation::validate_person_name;

pub const MAX_LOGIN_ATTEMPTS: u32 = 5;
pub const LOGIN_ATTEMPT_WINDOW_SECONDS: i64 = 15 * 60;
const EMAIL_TAKEN: &str = "Email already registered";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    #[validate(custom(function = "validate_person_name"))]
    pub first_name: String,
    #[validate(custom(function = "validate_person_name"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issues a fresh token pair and records the refresh token.
async fn token_response(
    state: &AppState,
    user: &UserRow,
    profile: Option<&StudentProfileRow>,
) -> Result<TokenResponse, AppError> {
    let pair = issue_pair(&state.config, user)?;
    state
        .cache
        .store_refresh_token(
            user.id,
            &pair.refresh_token,
            state.config.refresh_token_ttl_seconds().max(0) as u64,
        )
        .await;

    Ok(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "bearer",
        expires_in: state.config.access_token_ttl_seconds(),
        user: UserInfo::new(user, profile),
    })
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    req.validate()?;
    let email = normalize_email(&req.email);

    if find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Validation(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(req.password).await?;
    let (user, profile) = create_student(
        &state.db,
        &email,
        &password_hash,
        req.first_name.trim(),
        req.last_name.trim(),
    )
    .await
    .map_err(|e| AppError::on_conflict(e, EMAIL_TAKEN))?;
    info!(user_id = %user.id, "student registered");

    let response = token_response(&state, &user, Some(&profile)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()?;
    let email = normalize_email(&req.email);

    if state.cache.login_attempts(&email).await >= MAX_LOGIN_ATTEMPTS {
        warn!(email = %email, "login throttled");
        return Err(AppError::TooManyRequests(
            "Too many failed login attempts. Please try again in 15 minutes.".to_string(),
        ));
    }

    let found = find_user_by_email(&state.db, &email).await?;
    let verified = match &found {
        Some(user) => verify_password(req.password, user.password_hash.clone()).await,
        None => false,
    };
    let user = match found {
        Some(user) if verified => user,
        _ => {
            state
                .cache
                .increment_login_attempts(&email, LOGIN_ATTEMPT_WINDOW_SECONDS)
                .await;
            return Err(AppError::Unauthorized("Incorrect email or password".to_string()));
        }
    };

    if !user.is_active {
        return Err(AppError::Forbidden(
            "Account is inactive. Please contact support.".to_string(),
        ));
    }

    state.cache.reset_login_attempts(&email).await;
    let profile = find_profile_by_user(&state.db, user.id).await?;
    info!(user_id = %user.id, "user logged in");

    Ok(Json(token_response(&state, &user, profile.as_ref()).await?))
}

/// POST /api/v1/auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let claims = decode_token(&state.config.secret_key, &req.refresh_token)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;
    if claims.kind != TokenKind::Refresh {
        return Err(AppError::Unauthorized("Invalid token type".to_string()));
    }
    if !state.cache.verify_refresh_token(claims.sub, &req.refresh_token).await {
        return Err(AppError::Unauthorized(
            "Invalid or expired refresh token".to_string(),
        ));
    }

    let user = find_user_by_id(&state.db, claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("User not found or inactive".to_string()))?;
    let profile = find_profile_by_user(&state.db, user.id).await?;

    Ok(Json(token_response(&state, &user, profile.as_ref()).await?))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<MessageResponse> {
    state.cache.revoke_refresh_token(user.id).await;
    info!(user_id = %user.id, "user logged out");
    Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    })
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserInfo>, AppError> {
    let profile = match find_profile_by_user(&state.db, user.id).await? {
        Some(profile) => Some(refresh_completion(&state.db, profile).await?),
        None => None,
    };

    let mut info = UserInfo::new(&user, profile.as_ref());
    info.student_profile = profile;
    info.created_at = Some(user.created_at);
    Ok(Json(info))
}
