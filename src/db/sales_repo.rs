// src/db/sales_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, ConflictKind},
    db::store::SalesStore,
    models::sales::{Invoice, InvoiceQuery, Order, OrderDetail, OrderItem, OrderQuery},
    services::tenant_filter::TenantFilter,
};

// Pedidos e notas no PostgreSQL
#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalesStore for SalesRepository {
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn find_order_detail(&self, id: Uuid) -> Result<Option<OrderDetail>, AppError> {
        let Some(order) = self.find_order(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(OrderDetail { order, items }))
    }

    async fn list_orders(
        &self,
        filter: &TenantFilter,
        query: &OrderQuery,
    ) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::uuid IS NULL OR chain_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::uuid IS NULL OR store_id = $3)
              AND ($4::order_status IS NULL OR status = $4)
            ORDER BY created_at DESC
            "#,
        )
            .bind(filter.chain_id)
            .bind(filter.store_id)
            .bind(query.store_id)
            .bind(query.status)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn insert_order(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<OrderDetail, AppError> {
        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cabeçalho do pedido
        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, chain_id, store_id, user_id, status, subtotal, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(order.id)
            .bind(order.chain_id)
            .bind(order.store_id)
            .bind(order.user_id)
            .bind(order.status)
            .bind(order.subtotal)
            .bind(order.created_at)
            .bind(order.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        // 3. Itens
        let mut saved_items = Vec::with_capacity(items.len());
        for item in items {
            let saved = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, note)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
                .bind(item.id)
                .bind(created.id)
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(item.unit_price)
                .bind(&item.note)
                .fetch_one(&mut *tx)
                .await?;
            saved_items.push(saved);
        }

        // 4. Commit
        tx.commit().await?;

        Ok(OrderDetail {
            order: created,
            items: saved_items,
        })
    }

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    async fn find_invoice_by_order(&self, order_id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    async fn list_invoices(
        &self,
        filter: &TenantFilter,
        query: &InvoiceQuery,
    ) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT * FROM invoices
            WHERE ($1::uuid IS NULL OR chain_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::uuid IS NULL OR store_id = $3)
            ORDER BY created_at DESC
            "#,
        )
            .bind(filter.chain_id)
            .bind(filter.store_id)
            .bind(query.store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, AppError> {
        sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (id, order_id, chain_id, store_id, subtotal, service_charge, tax, total, payment_method, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
            .bind(invoice.id)
            .bind(invoice.order_id)
            .bind(invoice.chain_id)
            .bind(invoice.store_id)
            .bind(invoice.subtotal)
            .bind(invoice.service_charge)
            .bind(invoice.tax)
            .bind(invoice.total)
            .bind(invoice.payment_method)
            .bind(invoice.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                // `order_id` é UNIQUE: duas notas para o mesmo pedido caem aqui
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict(ConflictKind::InvoiceAlreadyIssued(
                            invoice.order_id,
                        ));
                    }
                }
                e.into()
            })
    }
}
