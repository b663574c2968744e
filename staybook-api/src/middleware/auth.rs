use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use staybook_core::models::UserId;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims issued by the upstream identity service. `sub` carries the numeric user id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserClaims {
    pub sub: String,
    pub exp: usize,
}

/// Authenticated caller, inserted into request extensions by `require_user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
}

// ============================================================================
// Authentication Middleware
// ============================================================================

pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract token from Authorization header
    let auth_header = req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthenticationError("Expected a bearer token".to_string()))?;

    // 2. Decode and validate JWT
    let token_data = decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    ).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::AuthenticationError("Invalid token".to_string())
    })?;

    // 3. Subject must be a user id
    let user_id = token_data.claims.sub.parse::<UserId>()
        .map_err(|_| AppError::AuthenticationError("Invalid token subject".to_string()))?;

    // 4. Inject the caller into request extensions
    req.extensions_mut().insert(CurrentUser { user_id });

    Ok(next.run(req).await)
}
