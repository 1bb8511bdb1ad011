// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::serde_ext::double_option;

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Giá trị không được âm.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.iter().any(|option| option.trim().is_empty()) {
        let mut err = ValidationError::new("blank_option");
        err.message = Some("Lựa chọn không được để trống.".into());
        return Err(err);
    }
    Ok(())
}

// --- 1. Categorias ---
// Árvore por referência ao pai; `chain_id` nulo = categoria compartilhada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Coffee")]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub chain_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Categoria com as relações expandidas (pai, filhos e contagem de produtos)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub parent: Option<Category>,
    pub children: Vec<Category>,
    pub product_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[validate(length(min = 1, max = 120, message = "Tên danh mục là bắt buộc."))]
    #[schema(example = "Drinks")]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    /// Ignorado quando o chamador pertence a uma rede.
    pub chain_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChanges {
    #[validate(length(min = 1, max = 120, message = "Tên danh mục là bắt buộc."))]
    pub name: Option<String>,
    /// Ausente = mantém; `null` = limpa.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// Ausente = mantém; `null` = vira raiz.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDepth {
    pub category_id: Uuid,
    #[schema(example = 2)]
    pub depth: u32,
    #[schema(example = 3)]
    pub max_depth: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub roots_only: bool,
    pub search: Option<String>,
}

// --- 2. Produtos ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Latte")]
    pub name: String,
    #[schema(example = "45000")]
    pub price: Decimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub chain_id: Option<Uuid>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Produto com categoria e modificadores expandidos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, max = 160, message = "Tên sản phẩm là bắt buộc."))]
    #[schema(example = "Latte")]
    pub name: String,
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "45000")]
    pub price: Decimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub chain_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub modifier_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[validate(length(min = 1, max = 160, message = "Tên sản phẩm là bắt buộc."))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    /// Toda categoria é obrigatória: aqui só troca, nunca limpa.
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    /// Quando presente, substitui o conjunto inteiro de modificadores.
    pub modifier_ids: Option<Vec<Uuid>>,
}

// Ocultar/exibir no cardápio
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatusChange {
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    pub search: Option<String>,
}

// --- 3. Modificadores ---
// Um conjunto nomeado de opções ("Ít đá", "Nhiều đá").
// No banco as opções ficam serializadas como texto JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub id: Uuid,
    #[schema(example = "Ice Level")]
    pub name: String,
    pub options: Vec<String>,
    pub chain_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewModifier {
    #[validate(length(min = 1, max = 120, message = "Tên tùy chọn là bắt buộc."))]
    #[schema(example = "Ice Level")]
    pub name: String,
    #[validate(
        length(min = 1, message = "Cần ít nhất một lựa chọn."),
        custom(function = "validate_options")
    )]
    pub options: Vec<String>,
    pub chain_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModifierChanges {
    #[validate(length(min = 1, max = 120, message = "Tên tùy chọn là bắt buộc."))]
    pub name: Option<String>,
    #[validate(
        length(min = 1, message = "Cần ít nhất một lựa chọn."),
        custom(function = "validate_options")
    )]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ModifierQuery {
    pub search: Option<String>,
}

// --- 4. Vínculos do produto ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductModifier {
    pub product_id: Uuid,
    pub modifier_id: Uuid,
}

// Linha da receita (ficha técnica) do produto; some junto com o produto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub product_id: Uuid,
    pub ingredient: String,
    pub quantity: Decimal,
    pub unit: String,
}
