//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pulse_core::error::CoreError;
use pulse_core::types::DbId;
use pulse_core::visibility::Viewer;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Roles granted moderator powers.
const MODERATOR_ROLES: [&str; 2] = ["moderator", "admin"];

/// Authenticated user extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's role name (`"user"`, `"moderator"`, `"admin"`).
    pub role: String,
}

impl AuthUser {
    pub fn is_moderator(&self) -> bool {
        MODERATOR_ROLES.contains(&self.role.as_str())
    }

    /// The domain-level viewer for visibility filtering.
    pub fn viewer(&self) -> Viewer {
        Viewer { user_id: self.user_id, is_moderator: self.is_moderator() }
    }

    /// Guard for moderator-only endpoints.
    pub fn require_moderator(&self) -> Result<(), AppError> {
        if self.is_moderator() {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Moderator role required".into(),
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser { user_id: claims.sub, role: claims.role })
    }
}
