use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequestParts, State, rejection::JsonRejection},
    http::{StatusCode, header, request::Parts},
};

use crate::{
    api::{
        AppState,
        error::ApiError,
        models::{DemoCredentials, DemoUser, LoginRequest, LoginResponse, TokenDto},
    },
    auth::Claims,
    prelude::*,
};

/// Bearer token check for the protected routes.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;
        state.authenticator.verify(token.trim()).map_err(|error| {
            debug!("{error:#}");
            ApiError::Unauthorized
        })
    }
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    if request.username.is_empty() || request.password.is_empty() {
        return Ok(rejection(StatusCode::BAD_REQUEST, "Username and password are required."));
    }
    match state.authenticator.login(&request.username, &request.password)? {
        Some(issued) => Ok((
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                message: "Login successful".into(),
                token: Some(TokenDto { token: issued.token, expiration: issued.expires_at }),
            }),
        )),
        None => Ok(rejection(StatusCode::UNAUTHORIZED, "Invalid username or password.")),
    }
}

fn rejection(status_code: StatusCode, message: &str) -> (StatusCode, Json<LoginResponse>) {
    (status_code, Json(LoginResponse { success: false, message: message.into(), token: None }))
}

pub async fn demo_credentials(State(state): State<Arc<AppState>>) -> Json<DemoCredentials> {
    let users = state
        .authenticator
        .users()
        .iter()
        .map(|(username, password)| DemoUser {
            username: username.to_string(),
            password: password.to_string(),
        })
        .collect();
    Json(DemoCredentials {
        message: "Demo credentials, use `POST /api/auth/login` to obtain a bearer token",
        users,
    })
}
