// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "chain_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainStatus {
    Active,
    Inactive,
    Suspended,
}

// ---
// 1. Chain (A "Rede")
// ---
// A raiz do tenant: uma marca/franquia dona das lojas.
// O `code` é único e não muda depois da criação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub id: Uuid,
    #[schema(example = "The Coffee House")]
    pub name: String,
    #[schema(example = "TCH")]
    pub code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: ChainStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Store (A "Loja")
// ---
// `chain_id` nulo só existe em fixtures do sistema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub chain_id: Option<Uuid>,
    #[schema(example = "TCH Nguyễn Huệ")]
    pub name: String,
    #[schema(example = "TCH-Q1-01")]
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    let valid = code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        let mut err = ValidationError::new("code_format");
        err.message = Some("Mã chuỗi chỉ gồm chữ, số, '-' và '_'.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewChain {
    #[validate(length(min = 1, max = 120, message = "Tên chuỗi là bắt buộc."))]
    #[schema(example = "The Coffee House")]
    pub name: String,
    #[validate(
        length(min = 2, max = 20, message = "Mã chuỗi phải có từ 2 đến 20 ký tự."),
        custom(function = "validate_code")
    )]
    #[schema(example = "TCH")]
    pub code: String,
    pub phone: Option<String>,
    #[validate(email(message = "Email không hợp lệ."))]
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainChanges {
    #[validate(length(min = 1, max = 120, message = "Tên chuỗi là bắt buộc."))]
    pub name: Option<String>,
    /// Só é aceito se for igual ao código atual.
    pub code: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Email không hợp lệ."))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: Option<ChainStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_code_rejects_spaces() {
        let payload = NewChain {
            name: "The Coffee House".into(),
            code: "T C H".into(),
            phone: None,
            email: None,
            address: None,
        };
        assert!(payload.validate().is_err());
    }
}
