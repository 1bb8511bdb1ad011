// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermChainRead, PermChainWrite, RequirePermission},
    },
    models::tenancy::{Chain, ChainChanges, NewChain},
};

// POST /api/chains
#[utoipa::path(
    post,
    path = "/api/chains",
    tag = "Tenancy",
    request_body = NewChain,
    responses(
        (status = 201, description = "Rede criada", body = Chain),
        (status = 403, description = "Só o escopo global cria redes"),
        (status = 409, description = "Código já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_chain(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermChainWrite>,
    Json(payload): Json<NewChain>,
) -> Result<impl IntoResponse, ApiError> {
    let chain = app_state
        .tenant_service
        .create_chain(Some(&user.0), payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(chain)))
}

// GET /api/chains
#[utoipa::path(
    get,
    path = "/api/chains",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Redes visíveis ao usuário", body = Vec<Chain>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_chains(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermChainRead>,
) -> Result<impl IntoResponse, ApiError> {
    let chains = app_state
        .tenant_service
        .list_chains(Some(&user.0))
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(chains)))
}

// GET /api/chains/{id}
#[utoipa::path(
    get,
    path = "/api/chains/{id}",
    tag = "Tenancy",
    params(("id" = Uuid, Path, description = "ID da Rede")),
    responses(
        (status = 200, description = "Rede", body = Chain),
        (status = 404, description = "Rede não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_chain(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermChainRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let chain = app_state
        .tenant_service
        .find_chain(Some(&user.0), id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(chain)))
}

// PATCH /api/chains/{id}
#[utoipa::path(
    patch,
    path = "/api/chains/{id}",
    tag = "Tenancy",
    request_body = ChainChanges,
    params(("id" = Uuid, Path, description = "ID da Rede")),
    responses(
        (status = 200, description = "Rede atualizada", body = Chain),
        (status = 404, description = "Rede não encontrada"),
        (status = 409, description = "O código da rede não pode mudar")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_chain(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermChainWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChainChanges>,
) -> Result<impl IntoResponse, ApiError> {
    let chain = app_state
        .tenant_service
        .update_chain(Some(&user.0), id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(chain)))
}
