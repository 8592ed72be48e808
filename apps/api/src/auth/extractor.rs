use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::store::find_user_by_id;
use crate::auth::tokens::{decode_token, TokenKind};
use crate::errors::AppError;
use crate::models::student::StudentProfileRow;
use crate::models::user::{UserRow, ROLE_STUDENT};
use crate::state::AppState;
use crate::student::store::find_profile_by_user;

/// Authenticated, active account resolved from an `Authorization: Bearer` access token.
pub struct CurrentUser(pub UserRow);

/// Authenticated account with the student role and its profile.
pub struct CurrentStudent {
    pub user: UserRow,
    pub profile: StudentProfileRow,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

        let claims = decode_token(&state.config.secret_key, token).ok_or_else(AppError::invalid_credentials)?;
        if claims.kind != TokenKind::Access {
            return Err(AppError::invalid_credentials());
        }

        let user = find_user_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(AppError::invalid_credentials)?;
        if !user.is_active {
            return Err(AppError::Forbidden("Inactive user".to_string()));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_STUDENT {
            return Err(AppError::Forbidden("Access reserved for students".to_string()));
        }

        let profile = find_profile_by_user(&state.db, user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        Ok(CurrentStudent { user, profile })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
