// src/handlers/auth.rs

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::{middleware::auth::AuthenticatedUser, models::identity::CallerIdentity};

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Identidade resolvida a partir do token (rede, loja, cargos)", body = CallerIdentity),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(user: AuthenticatedUser) -> impl IntoResponse {
    (StatusCode::OK, Json(user.0))
}
