// src/handlers/catalog.rs

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
        rbac::{
            PermCategoryRead, PermCategoryWrite, PermModifierRead, PermModifierWrite,
            PermProductRead, PermProductWrite, RequirePermission,
        },
    },
    models::catalog::{
        Category, CategoryChanges, CategoryDepth, CategoryDetail, CategoryQuery, Modifier,
        ModifierChanges, ModifierQuery, NewCategory, NewModifier, NewProduct, Product,
        ProductChanges, ProductDetail, ProductQuery, ProductStatusChange,
    },
};

// =============================================================================
//  1. CATEGORIAS
// =============================================================================

// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = NewCategory,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Hierarquia inválida (máx. 3 níveis)"),
        (status = 404, description = "Categoria pai não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCategoryWrite>,
    Json(payload): Json<NewCategory>,
) -> Result<impl IntoResponse, ApiError> {
    let category = app_state
        .category_service
        .create(Some(&user.0), payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Categorias visíveis ao usuário", body = Vec<Category>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCategoryRead>,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .category_service
        .find_all(Some(&user.0), query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(categories)))
}

// GET /api/categories/{id}
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 200, description = "Categoria com pai, filhas e contagem de produtos", body = CategoryDetail),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCategoryRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .category_service
        .find_one(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PATCH /api/categories/{id}
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    tag = "Catalog",
    request_body = CategoryChanges,
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 400, description = "Hierarquia inválida"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCategoryWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryChanges>,
) -> Result<impl IntoResponse, ApiError> {
    let category = app_state
        .category_service
        .update(Some(&user.0), id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 204, description = "Categoria removida"),
        (status = 404, description = "Categoria não encontrada"),
        (status = 409, description = "Categoria ainda tem produtos ou subcategorias")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCategoryWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .category_service
        .remove(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/categories/{id}/depth
#[utoipa::path(
    get,
    path = "/api/categories/{id}/depth",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 200, description = "Nível da categoria na árvore (raiz = 1)", body = CategoryDepth),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category_depth(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCategoryRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let depth = app_state
        .category_service
        .depth(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(depth)))
}

// =============================================================================
//  2. PRODUTOS
// =============================================================================

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 404, description = "Categoria ou modificador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductWrite>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .create(Some(&user.0), payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(ProductQuery),
    responses(
        (status = 200, description = "Produtos visíveis ao usuário", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductRead>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .product_service
        .find_all(Some(&user.0), query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(products)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto com categoria e modificadores", body = ProductDetail),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .product_service
        .find_one(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PATCH /api/products/{id}
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Catalog",
    request_body = ProductChanges,
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductChanges>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .update(Some(&user.0), id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(product)))
}

// PATCH /api/products/{id}/status
#[utoipa::path(
    patch,
    path = "/api/products/{id}/status",
    tag = "Catalog",
    request_body = ProductStatusChange,
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto exibido/ocultado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_product_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductStatusChange>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .set_status(Some(&user.0), id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 204, description = "Produto removido com vínculos e receita"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Produto já aparece em pedidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .product_service
        .remove(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  3. MODIFICADORES
// =============================================================================

// POST /api/modifiers
#[utoipa::path(
    post,
    path = "/api/modifiers",
    tag = "Catalog",
    request_body = NewModifier,
    responses(
        (status = 201, description = "Modificador criado", body = Modifier)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_modifier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermModifierWrite>,
    Json(payload): Json<NewModifier>,
) -> Result<impl IntoResponse, ApiError> {
    let modifier = app_state
        .modifier_service
        .create(Some(&user.0), payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(modifier)))
}

// GET /api/modifiers
#[utoipa::path(
    get,
    path = "/api/modifiers",
    tag = "Catalog",
    params(ModifierQuery),
    responses(
        (status = 200, description = "Modificadores visíveis ao usuário", body = Vec<Modifier>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_modifiers(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermModifierRead>,
    Query(query): Query<ModifierQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let modifiers = app_state
        .modifier_service
        .find_all(Some(&user.0), query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(modifiers)))
}

// GET /api/modifiers/{id}
#[utoipa::path(
    get,
    path = "/api/modifiers/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do Modificador")),
    responses(
        (status = 200, description = "Modificador", body = Modifier),
        (status = 404, description = "Modificador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_modifier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermModifierRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let modifier = app_state
        .modifier_service
        .find_one(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(modifier)))
}

// PATCH /api/modifiers/{id}
#[utoipa::path(
    patch,
    path = "/api/modifiers/{id}",
    tag = "Catalog",
    request_body = ModifierChanges,
    params(("id" = Uuid, Path, description = "ID do Modificador")),
    responses(
        (status = 200, description = "Modificador atualizado", body = Modifier),
        (status = 404, description = "Modificador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_modifier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermModifierWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModifierChanges>,
) -> Result<impl IntoResponse, ApiError> {
    let modifier = app_state
        .modifier_service
        .update(Some(&user.0), id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(modifier)))
}

// DELETE /api/modifiers/{id}
#[utoipa::path(
    delete,
    path = "/api/modifiers/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do Modificador")),
    responses(
        (status = 204, description = "Modificador removido"),
        (status = 404, description = "Modificador não encontrado"),
        (status = 409, description = "Modificador ainda vinculado a produtos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_modifier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermModifierWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .modifier_service
        .remove(Some(&user.0), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
