// src/services/invoice_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    cache::{facade::INVOICES, CacheFacade, CacheTtl},
    common::error::{AppError, ConflictKind, EntityKind},
    db::SalesStore,
    models::{
        identity::CallerIdentity,
        sales::{invoice_totals, Invoice, InvoiceQuery, NewInvoice, OrderStatus},
    },
    services::tenant_filter::{can_access_scoped, resolve_tenant_filter},
};

#[derive(Clone)]
pub struct InvoiceService {
    sales: Arc<dyn SalesStore>,
    cache: CacheFacade,
}

impl InvoiceService {
    pub fn new(sales: Arc<dyn SalesStore>, cache: CacheFacade) -> Self {
        Self { sales, cache }
    }

    /// Emite a nota do pedido. Uma por pedido; os totais ficam congelados.
    pub async fn create_for_order(
        &self,
        caller: Option<&CallerIdentity>,
        order_id: Uuid,
        payload: NewInvoice,
    ) -> Result<Invoice, AppError> {
        payload.validate()?;

        // 1. Pedido no escopo do chamador
        let order = self
            .sales
            .find_order(order_id)
            .await?
            .filter(|order| can_access_scoped(caller, order.chain_id, order.store_id))
            .ok_or(AppError::not_found(EntityKind::Order, order_id))?;

        if order.status == OrderStatus::Cancelled {
            return Err(AppError::Conflict(ConflictKind::OrderCancelled(order.id)));
        }

        // 2. Já emitida? (o índice único no banco cobre a corrida)
        if self.sales.find_invoice_by_order(order.id).await?.is_some() {
            return Err(AppError::Conflict(ConflictKind::InvoiceAlreadyIssued(order.id)));
        }

        // 3. Totais
        let (service_charge, tax, total) =
            invoice_totals(order.subtotal, payload.service_charge_rate, payload.tax_rate);

        let invoice = Invoice {
            id: Uuid::new_v4(),
            order_id: order.id,
            chain_id: order.chain_id,
            store_id: order.store_id,
            subtotal: order.subtotal,
            service_charge,
            tax,
            total,
            payment_method: payload.payment_method,
            created_at: Utc::now(),
        };
        let created = self.sales.insert_invoice(&invoice).await?;

        // 4. Invalida
        self.cache.invalidate_invoices(created.chain_id).await;

        tracing::info!("🧾 Nota {} emitida para o pedido {} (total {})", created.id, order.id, created.total);
        Ok(created)
    }

    pub async fn find_all(
        &self,
        caller: Option<&CallerIdentity>,
        query: InvoiceQuery,
    ) -> Result<Vec<Invoice>, AppError> {
        let filter = resolve_tenant_filter(caller);
        let key = CacheFacade::list_key(INVOICES, &filter, &query);

        self.cache
            .get_or_set(&key, CacheTtl::Short, || self.sales.list_invoices(&filter, &query))
            .await
    }

    pub async fn find_one(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<Invoice, AppError> {
        self.sales
            .find_invoice(id)
            .await?
            .filter(|invoice| can_access_scoped(caller, invoice.chain_id, invoice.store_id))
            .ok_or(AppError::not_found(EntityKind::Invoice, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::{
        db::MemoryStore,
        models::sales::{Order, PaymentMethod},
        services::test_support,
    };

    async fn setup(status: OrderStatus) -> (InvoiceService, Order) {
        let store = Arc::new(MemoryStore::new());
        let mut order = test_support::order(Some(Uuid::new_v4()), Uuid::new_v4(), Decimal::from(90_000));
        order.status = status;
        store.insert_order(&order, &[]).await.unwrap();
        (InvoiceService::new(store, test_support::cache()), order)
    }

    fn payload() -> NewInvoice {
        NewInvoice {
            service_charge_rate: Decimal::new(5, 2),
            tax_rate: Decimal::new(10, 2),
            payment_method: PaymentMethod::Card,
        }
    }

    #[tokio::test]
    async fn invoice_snapshots_totals() {
        let (service, order) = setup(OrderStatus::Pending).await;
        let invoice = service.create_for_order(None, order.id, payload()).await.unwrap();

        assert_eq!(invoice.subtotal, Decimal::from(90_000));
        assert_eq!(invoice.service_charge, Decimal::from(4_500));
        assert_eq!(invoice.tax, Decimal::from(9_450));
        assert_eq!(invoice.total, Decimal::from(103_950));
        assert_eq!(invoice.store_id, order.store_id);
    }

    #[tokio::test]
    async fn second_invoice_conflicts() {
        let (service, order) = setup(OrderStatus::Paid).await;
        service.create_for_order(None, order.id, payload()).await.unwrap();

        let err = service
            .create_for_order(None, order.id, payload())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ConflictKind::InvoiceAlreadyIssued(_))));
    }

    #[tokio::test]
    async fn cancelled_order_is_not_invoiced() {
        let (service, order) = setup(OrderStatus::Cancelled).await;
        let err = service
            .create_for_order(None, order.id, payload())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ConflictKind::OrderCancelled(_))));
    }

    #[tokio::test]
    async fn foreign_chain_sees_nothing() {
        let (service, order) = setup(OrderStatus::Pending).await;
        let invoice = service.create_for_order(None, order.id, payload()).await.unwrap();
        let outsider = test_support::identity(Some(Uuid::new_v4()), None);

        let err = service.find_one(Some(&outsider), invoice.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: EntityKind::Invoice, .. }));

        let listed = service
            .find_all(Some(&outsider), InvoiceQuery::default())
            .await
            .unwrap();
        assert!(listed.is_empty());

        let err = service
            .create_for_order(Some(&outsider), order.id, payload())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: EntityKind::Order, .. }));
    }
}
