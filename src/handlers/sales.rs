// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
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
        rbac::{PermInvoiceRead, PermInvoiceWrite, PermOrderRead, PermOrderWrite, RequirePermission},
    },
    models::sales::{Invoice, InvoiceQuery, NewInvoice, NewOrder, Order, OrderDetail, OrderQuery},
};

// =============================================================================
//  1. PEDIDOS
// =============================================================================

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Sales",
    request_body = NewOrder,
    responses(
        (status = 201, description = "Pedido criado com preços do momento", body = OrderDetail),
        (status = 400, description = "Loja não informada ou produto oculto"),
        (status = 404, description = "Loja ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermOrderWrite>,
    Json(payload): Json<NewOrder>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .create(Some(&user.0), payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Sales",
    params(OrderQuery),
    responses(
        (status = 200, description = "Pedidos da rede/loja do usuário", body = Vec<Order>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermOrderRead>,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .find_all(Some(&user.0), query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID do Pedido")),
    responses(
        (status = 200, description = "Pedido com itens", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermOrderRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .find_one(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(order)))
}

// =============================================================================
//  2. NOTAS (HÓA ĐƠN)
// =============================================================================

// POST /api/orders/{id}/invoice
#[utoipa::path(
    post,
    path = "/api/orders/{id}/invoice",
    tag = "Sales",
    request_body = NewInvoice,
    params(("id" = Uuid, Path, description = "ID do Pedido")),
    responses(
        (status = 201, description = "Nota emitida", body = Invoice),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Pedido já faturado ou cancelado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermInvoiceWrite>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<NewInvoice>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .create_for_order(Some(&user.0), order_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Sales",
    params(InvoiceQuery),
    responses(
        (status = 200, description = "Notas da rede/loja do usuário", body = Vec<Invoice>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermInvoiceRead>,
    Query(query): Query<InvoiceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .invoice_service
        .find_all(Some(&user.0), query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(invoices)))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da Nota")),
    responses(
        (status = 200, description = "Nota", body = Invoice),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermInvoiceRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .find_one(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(invoice)))
}
