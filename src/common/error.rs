// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::i18n::Locale;

// Entidades que aparecem nas mensagens de erro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    Product,
    Modifier,
    Order,
    Invoice,
    Chain,
    Store,
}

impl EntityKind {
    fn name(self, locale: &Locale) -> &'static str {
        match (self, locale.is_english()) {
            (EntityKind::Category, false) => "danh mục",
            (EntityKind::Product, false) => "sản phẩm",
            (EntityKind::Modifier, false) => "tùy chọn",
            (EntityKind::Order, false) => "đơn hàng",
            (EntityKind::Invoice, false) => "hóa đơn",
            (EntityKind::Chain, false) => "chuỗi",
            (EntityKind::Store, false) => "cửa hàng",
            (EntityKind::Category, true) => "category",
            (EntityKind::Product, true) => "product",
            (EntityKind::Modifier, true) => "modifier",
            (EntityKind::Order, true) => "order",
            (EntityKind::Invoice, true) => "invoice",
            (EntityKind::Chain, true) => "chain",
            (EntityKind::Store, true) => "store",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name(&Locale::english()))
    }
}

// Por que a árvore de categorias recusou a atribuição
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyViolation {
    SelfParent,
    TooDeep { max_depth: u32 },
    Cycle,
}

// O que está impedindo a exclusão
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentKind {
    Products,
    ChildCategories,
    OrderItems,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ChainCodeTaken(String),
    ChainCodeImmutable,
    InvoiceAlreadyIssued(Uuid),
    OrderCancelled(Uuid),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Também cobre registros fora do escopo do chamador.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("invalid category hierarchy: {0:?}")]
    InvalidHierarchy(HierarchyViolation),

    #[error("{entity} {id} has {count} dependent {kind:?}")]
    HasDependents {
        entity: EntityKind,
        id: Uuid,
        kind: DependentKind,
        count: i64,
    },

    #[error("conflict: {0:?}")]
    Conflict(ConflictKind),

    #[error("store is required for callers without store affiliation")]
    StoreRequired,

    #[error("product {0} is hidden and cannot be ordered")]
    ProductUnavailable(Uuid),

    #[error("missing permission {0}")]
    Forbidden(String),

    #[error("invalid token")]
    InvalidToken,

    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidHierarchy(_)
            | AppError::StoreRequired
            | AppError::ProductUnavailable(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::HasDependents { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Mensagem voltada ao usuário final (vi por padrão, en sob pedido).
    pub fn message(&self, locale: &Locale) -> String {
        let en = locale.is_english();
        match self {
            AppError::ValidationError(_) => {
                pick(en, "Một hoặc nhiều trường không hợp lệ.", "One or more fields are invalid.")
            }
            AppError::NotFound { entity, id } => {
                if en {
                    format!("The {} with id {} was not found.", entity.name(locale), id)
                } else {
                    format!("Không tìm thấy {} với id {}.", entity.name(locale), id)
                }
            }
            AppError::InvalidHierarchy(violation) => match violation {
                HierarchyViolation::SelfParent => pick(
                    en,
                    "Danh mục không thể là danh mục cha của chính nó.",
                    "A category cannot be its own parent.",
                ),
                HierarchyViolation::TooDeep { max_depth } => {
                    if en {
                        format!("Categories can be nested at most {max_depth} levels deep.")
                    } else {
                        format!("Danh mục chỉ được phép tối đa {max_depth} cấp.")
                    }
                }
                HierarchyViolation::Cycle => pick(
                    en,
                    "Không thể gán danh mục cha vì sẽ tạo vòng lặp.",
                    "This parent assignment would create a cycle.",
                ),
            },
            AppError::HasDependents { entity, kind, count, .. } => {
                let name = entity.name(locale);
                match (kind, en) {
                    (DependentKind::Products, false) => {
                        format!("Không thể xóa {name} vì còn {count} sản phẩm đang sử dụng.")
                    }
                    (DependentKind::Products, true) => {
                        format!("Cannot delete this {name}: it is still used by {count} product(s).")
                    }
                    (DependentKind::ChildCategories, false) => {
                        format!("Không thể xóa {name} vì còn {count} danh mục con.")
                    }
                    (DependentKind::ChildCategories, true) => {
                        format!("Cannot delete this {name}: it still has {count} subcategory(ies).")
                    }
                    (DependentKind::OrderItems, false) => format!(
                        "Không thể xóa {name} vì đã có {count} món trong đơn hàng. Hãy ẩn {name} thay vì xóa."
                    ),
                    (DependentKind::OrderItems, true) => format!(
                        "Cannot delete this {name}: {count} order line(s) reference it. Hide it instead."
                    ),
                }
            }
            AppError::Conflict(kind) => match kind {
                ConflictKind::ChainCodeTaken(code) => {
                    if en {
                        format!("Chain code '{code}' is already in use.")
                    } else {
                        format!("Mã chuỗi '{code}' đã được sử dụng.")
                    }
                }
                ConflictKind::ChainCodeImmutable => pick(
                    en,
                    "Không thể thay đổi mã chuỗi sau khi tạo.",
                    "A chain code cannot be changed after creation.",
                ),
                ConflictKind::InvoiceAlreadyIssued(order_id) => {
                    if en {
                        format!("Order {order_id} already has an invoice.")
                    } else {
                        format!("Đơn hàng {order_id} đã được xuất hóa đơn.")
                    }
                }
                ConflictKind::OrderCancelled(order_id) => {
                    if en {
                        format!("Order {order_id} was cancelled and cannot be invoiced.")
                    } else {
                        format!("Đơn hàng {order_id} đã bị hủy, không thể xuất hóa đơn.")
                    }
                }
            },
            AppError::StoreRequired => pick(
                en,
                "Vui lòng chọn cửa hàng cho đơn hàng.",
                "A store must be selected for this order.",
            ),
            AppError::ProductUnavailable(id) => {
                if en {
                    format!("Product {id} is hidden and cannot be ordered.")
                } else {
                    format!("Sản phẩm {id} đang bị ẩn, không thể đặt hàng.")
                }
            }
            AppError::Forbidden(slug) => {
                if en {
                    format!("You need the '{slug}' permission to perform this action.")
                } else {
                    format!("Bạn cần quyền '{slug}' để thực hiện thao tác này.")
                }
            }
            AppError::InvalidToken | AppError::JwtError(_) => pick(
                en,
                "Mã xác thực không hợp lệ hoặc bị thiếu.",
                "Authentication token is invalid or missing.",
            ),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => pick(
                en,
                "Đã xảy ra lỗi không mong muốn.",
                "An unexpected error occurred.",
            ),
        }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe técnico só vai para o log
            tracing::error!("Erro interno do servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .map(Value::String)
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            AppError::HasDependents { count, .. } => Some(json!({ "dependents": count })),
            _ => None,
        };

        ApiError {
            status,
            error: self.message(locale),
            details,
        }
    }
}

fn pick(en: bool, vi: &str, english: &str) -> String {
    if en { english.to_string() } else { vi.to_string() }
}

// Resposta de erro já localizada
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
