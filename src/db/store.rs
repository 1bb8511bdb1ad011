// src/db/store.rs

//! Interfaces de persistência consumidas pelos serviços.
//!
//! Os serviços só falam com estes traits; o PostgreSQL (`sqlx`) é uma das
//! implementações. Relações expandidas ("includes") são métodos explícitos
//! que devolvem os formatos `*Detail`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        catalog::{
            Category, CategoryDetail, CategoryQuery, Modifier, ModifierQuery, Product,
            ProductDetail, ProductQuery,
        },
        sales::{Invoice, InvoiceQuery, Order, OrderDetail, OrderItem, OrderQuery},
        tenancy::{Chain, Store},
    },
    services::tenant_filter::TenantFilter,
};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- Categorias ---
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError>;

    /// Categoria + pai + filhos diretos + contagem de produtos.
    async fn find_category_detail(&self, id: Uuid) -> Result<Option<CategoryDetail>, AppError>;

    async fn list_categories(
        &self,
        filter: &TenantFilter,
        query: &CategoryQuery,
    ) -> Result<Vec<Category>, AppError>;

    async fn list_child_category_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn count_products_in_category(&self, category_id: Uuid) -> Result<i64, AppError>;

    async fn insert_category(&self, category: &Category) -> Result<Category, AppError>;

    async fn save_category(&self, category: &Category) -> Result<Category, AppError>;

    async fn delete_category(&self, id: Uuid) -> Result<bool, AppError>;

    // --- Produtos ---
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Produto + categoria + modificadores vinculados.
    async fn find_product_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, AppError>;

    async fn list_products(
        &self,
        filter: &TenantFilter,
        query: &ProductQuery,
    ) -> Result<Vec<Product>, AppError>;

    /// Produto e vínculos com modificadores numa única transação.
    async fn insert_product(
        &self,
        product: &Product,
        modifier_ids: &[Uuid],
    ) -> Result<Product, AppError>;

    /// `Some(ids)` substitui todos os vínculos; `None` mantém os atuais.
    async fn save_product(
        &self,
        product: &Product,
        modifier_ids: Option<&[Uuid]>,
    ) -> Result<Product, AppError>;

    async fn count_order_items_for_product(&self, product_id: Uuid) -> Result<i64, AppError>;

    /// Remove vínculos com modificadores, linhas de receita e o produto,
    /// tudo ou nada.
    async fn delete_product_cascade(&self, id: Uuid) -> Result<bool, AppError>;

    // --- Modificadores ---
    async fn find_modifier(&self, id: Uuid) -> Result<Option<Modifier>, AppError>;

    async fn list_modifiers(
        &self,
        filter: &TenantFilter,
        query: &ModifierQuery,
    ) -> Result<Vec<Modifier>, AppError>;

    async fn insert_modifier(&self, modifier: &Modifier) -> Result<Modifier, AppError>;

    async fn save_modifier(&self, modifier: &Modifier) -> Result<Modifier, AppError>;

    async fn count_products_for_modifier(&self, modifier_id: Uuid) -> Result<i64, AppError>;

    async fn delete_modifier(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait SalesStore: Send + Sync {
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    async fn find_order_detail(&self, id: Uuid) -> Result<Option<OrderDetail>, AppError>;

    async fn list_orders(
        &self,
        filter: &TenantFilter,
        query: &OrderQuery,
    ) -> Result<Vec<Order>, AppError>;

    /// Pedido e itens numa única transação.
    async fn insert_order(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<OrderDetail, AppError>;

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError>;

    async fn find_invoice_by_order(&self, order_id: Uuid) -> Result<Option<Invoice>, AppError>;

    async fn list_invoices(
        &self,
        filter: &TenantFilter,
        query: &InvoiceQuery,
    ) -> Result<Vec<Invoice>, AppError>;

    /// Falha com `Conflict` se o pedido já tiver nota.
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, AppError>;
}

#[async_trait]
pub trait TenancyStore: Send + Sync {
    async fn find_chain(&self, id: Uuid) -> Result<Option<Chain>, AppError>;

    async fn find_chain_by_code(&self, code: &str) -> Result<Option<Chain>, AppError>;

    async fn list_chains(&self, filter: &TenantFilter) -> Result<Vec<Chain>, AppError>;

    /// Falha com `Conflict` se o código já existir.
    async fn insert_chain(&self, chain: &Chain) -> Result<Chain, AppError>;

    async fn save_chain(&self, chain: &Chain) -> Result<Chain, AppError>;

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, AppError>;
}
