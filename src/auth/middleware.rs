use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::{verify_token, TokenType};
use crate::error::AppError;
use crate::repository::SessionProvider;
use crate::AppState;

/// The caller behind a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

impl SessionProvider for AuthUser {
    fn current_user_id(&self) -> Option<String> {
        Some(self.id.clone())
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::NoAuthenticatedUser)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::NoAuthenticatedUser)?;

    let token_data = verify_token(token, &state.config)?;

    if token_data.claims.token_type != TokenType::Access || token_data.claims.sub.is_empty() {
        return Err(AppError::NoAuthenticatedUser);
    }

    req.extensions_mut().insert(AuthUser {
        id: token_data.claims.sub,
    });
    Ok(next.run(req).await)
}
