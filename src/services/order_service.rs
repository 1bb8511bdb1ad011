// src/services/order_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    cache::{facade::ORDERS, CacheFacade, CacheTtl},
    common::error::{AppError, EntityKind},
    db::{CatalogStore, SalesStore, TenancyStore},
    models::{
        catalog::ProductStatus,
        identity::CallerIdentity,
        sales::{NewOrder, Order, OrderDetail, OrderItem, OrderQuery, OrderStatus},
    },
    services::tenant_filter::{can_access_scoped, can_read_shared, resolve_tenant_filter},
};

#[derive(Clone)]
pub struct OrderService {
    catalog: Arc<dyn CatalogStore>,
    sales: Arc<dyn SalesStore>,
    tenancy: Arc<dyn TenancyStore>,
    cache: CacheFacade,
}

impl OrderService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        sales: Arc<dyn SalesStore>,
        tenancy: Arc<dyn TenancyStore>,
        cache: CacheFacade,
    ) -> Self {
        Self {
            catalog,
            sales,
            tenancy,
            cache,
        }
    }

    pub async fn create(
        &self,
        caller: Option<&CallerIdentity>,
        payload: NewOrder,
    ) -> Result<OrderDetail, AppError> {
        payload.validate()?;

        // 1. Loja: a do chamador, senão a informada no payload
        let store_id = caller
            .and_then(|identity| identity.store_id)
            .or(payload.store_id)
            .ok_or(AppError::StoreRequired)?;

        let store = self
            .tenancy
            .find_store(store_id)
            .await?
            .filter(|store| can_access_scoped(caller, store.chain_id, store.id))
            .ok_or(AppError::not_found(EntityKind::Store, store_id))?;

        // 2. Itens com o preço do momento
        let order_id = Uuid::new_v4();
        let mut subtotal = Decimal::ZERO;
        let mut items = Vec::with_capacity(payload.items.len());

        for line in payload.items {
            let product = self
                .catalog
                .find_product(line.product_id)
                .await?
                .filter(|product| {
                    can_read_shared(caller, product.chain_id)
                        && (product.chain_id.is_none() || product.chain_id == store.chain_id)
                })
                .ok_or(AppError::not_found(EntityKind::Product, line.product_id))?;

            if product.status == ProductStatus::Hidden {
                return Err(AppError::ProductUnavailable(product.id));
            }

            subtotal += product.price * Decimal::from(line.quantity);
            items.push(OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: product.id,
                quantity: line.quantity,
                unit_price: product.price,
                note: line.note,
            });
        }

        // 3. Pedido + itens numa transação
        let now = Utc::now();
        let order = Order {
            id: order_id,
            chain_id: store.chain_id,
            store_id: store.id,
            user_id: caller.map(|identity| identity.id),
            status: OrderStatus::Pending,
            subtotal,
            created_at: now,
            updated_at: now,
        };
        let created = self.sales.insert_order(&order, &items).await?;

        // 4. Invalida
        self.cache.invalidate_orders(created.order.chain_id).await;

        tracing::info!(
            "🧾 Pedido {} criado na loja {} (subtotal {})",
            created.order.id,
            created.order.store_id,
            created.order.subtotal
        );
        Ok(created)
    }

    pub async fn find_all(
        &self,
        caller: Option<&CallerIdentity>,
        query: OrderQuery,
    ) -> Result<Vec<Order>, AppError> {
        let filter = resolve_tenant_filter(caller);
        let key = CacheFacade::list_key(ORDERS, &filter, &query);

        self.cache
            .get_or_set(&key, CacheTtl::Short, || self.sales.list_orders(&filter, &query))
            .await
    }

    pub async fn find_one(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<OrderDetail, AppError> {
        self.sales
            .find_order_detail(id)
            .await?
            .filter(|detail| can_access_scoped(caller, detail.order.chain_id, detail.order.store_id))
            .ok_or(AppError::not_found(EntityKind::Order, id))
    }
}
