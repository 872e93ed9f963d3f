//! Authentication middleware for Axum
//!
//! Verifies `Authorization: Bearer <JWT>` and stores the caller as a
//! [`Principal`] request extension.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::principal::Principal;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};
use crate::interfaces::http::common::ApiResponse;

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// Authentication state containing the JWT settings
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller from the request headers
pub fn authenticate(request: &Request<Body>, jwt_config: &JwtConfig) -> Result<Principal, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;

    match verify_token(token, jwt_config) {
        Ok(claims) => Ok(claims.into_principal()),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AuthError::ExpiredToken),
            _ => Err(AuthError::InvalidToken),
        },
    }
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&request, &auth_state.jwt_config) {
        Ok(principal) => {
            tracing::debug!(user_id = %principal.user_id, role = %principal.role, "Authenticated");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid authentication token",
        AuthError::ExpiredToken => "Token has expired",
    };

    let body = Json(ApiResponse::<()>::failure(message, "unauthorized"));
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::create_token;

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_token_resolves_principal() {
        let config = JwtConfig::default();
        let token = create_token(&Principal::host("usr_9", "hst_9"), &config).unwrap();
        let principal = authenticate(&request(Some(&format!("Bearer {}", token))), &config).unwrap();
        assert_eq!(principal, Principal::host("usr_9", "hst_9"));
    }

    #[test]
    fn missing_and_malformed_headers_fail() {
        let config = JwtConfig::default();
        assert!(matches!(
            authenticate(&request(None), &config),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            authenticate(&request(Some("Basic abc")), &config),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            authenticate(&request(Some("Bearer not.a.jwt")), &config),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = JwtConfig {
            secret: "different".into(),
            ..JwtConfig::default()
        };
        let token = create_token(&Principal::admin("usr_1"), &other).unwrap();
        let result = authenticate(
            &request(Some(&format!("Bearer {}", token))),
            &JwtConfig::default(),
        );
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
