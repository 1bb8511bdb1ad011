// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

// --- Pedido (transação de venda) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub chain_id: Option<Uuid>,
    pub store_id: Uuid,
    pub user_id: Option<Uuid>,
    pub status: OrderStatus,
    #[schema(example = "90000")]
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    /// Preço do produto no momento do pedido.
    #[schema(example = "45000")]
    pub unit_price: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Số lượng phải lớn hơn 0."))]
    #[schema(example = 1)]
    pub quantity: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Obrigatório quando o chamador não está preso a uma loja.
    pub store_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Đơn hàng cần ít nhất một món."))]
    #[validate(nested)]
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    pub store_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

// --- Nota fiscal (hóa đơn) ---
// Retrato imutável dos totais de um pedido. Uma por pedido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub order_id: Uuid,
    pub chain_id: Option<Uuid>,
    pub store_id: Uuid,
    #[schema(example = "90000")]
    pub subtotal: Decimal,
    #[schema(example = "0")]
    pub service_charge: Decimal,
    #[schema(example = "9000")]
    pub tax: Decimal,
    #[schema(example = "99000")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

fn validate_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if rate.is_sign_negative() || *rate > Decimal::ONE {
        let mut err = ValidationError::new("range");
        err.message = Some("Tỷ lệ phải nằm trong khoảng 0 đến 1.".into());
        return Err(err);
    }
    Ok(())
}

fn default_tax_rate() -> Decimal {
    // VAT 10%
    Decimal::new(10, 2)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    #[serde(default)]
    #[validate(custom(function = "validate_rate"))]
    #[schema(example = "0.05")]
    pub service_charge_rate: Decimal,
    #[serde(default = "default_tax_rate")]
    #[validate(custom(function = "validate_rate"))]
    #[schema(example = "0.1")]
    pub tax_rate: Decimal,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvoiceQuery {
    pub store_id: Option<Uuid>,
}

/// Totais congelados na nota: taxa de serviço sobre o subtotal, imposto sobre
/// (subtotal + serviço), tudo arredondado para unidade inteira (VND).
pub fn invoice_totals(
    subtotal: Decimal,
    service_charge_rate: Decimal,
    tax_rate: Decimal,
) -> (Decimal, Decimal, Decimal) {
    let service_charge = (subtotal * service_charge_rate).round_dp(0);
    let tax = ((subtotal + service_charge) * tax_rate).round_dp(0);
    let total = subtotal + service_charge + tax;
    (service_charge, tax, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_follow_service_then_tax() {
        let (service, tax, total) =
            invoice_totals(Decimal::from(90_000), Decimal::new(5, 2), Decimal::new(10, 2));
        assert_eq!(service, Decimal::from(4_500));
        assert_eq!(tax, Decimal::from(9_450));
        assert_eq!(total, Decimal::from(103_950));
    }

    #[test]
    fn rate_above_one_is_rejected() {
        let payload = NewInvoice {
            service_charge_rate: Decimal::from(2),
            tax_rate: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn order_needs_items() {
        let payload = NewOrder { store_id: None, items: vec![] };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn item_quantity_is_checked_inside_order() {
        let payload = NewOrder {
            store_id: None,
            items: vec![NewOrderItem { product_id: Uuid::new_v4(), quantity: 0, note: None }],
        };
        assert!(payload.validate().is_err());

        let ok = NewOrder {
            store_id: None,
            items: vec![NewOrderItem { product_id: Uuid::new_v4(), quantity: 2, note: None }],
        };
        assert!(ok.validate().is_ok());
    }
}
