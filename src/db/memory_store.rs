// src/db/memory_store.rs

//! Implementação em memória das interfaces de persistência, usada nos testes
//! dos serviços. Cada operação roda sob um único lock, então as operações
//! "atômicas" do trait são atômicas aqui também.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::{AppError, ConflictKind, EntityKind},
    db::store::{CatalogStore, SalesStore, TenancyStore},
    models::{
        catalog::{
            Category, CategoryDetail, CategoryQuery, Modifier, ModifierQuery, Product,
            ProductDetail, ProductModifier, ProductQuery, Recipe,
        },
        sales::{Invoice, InvoiceQuery, Order, OrderDetail, OrderItem, OrderQuery},
        tenancy::{Chain, Store},
    },
    services::tenant_filter::TenantFilter,
};

#[derive(Default)]
struct Tables {
    chains: HashMap<Uuid, Chain>,
    stores: HashMap<Uuid, Store>,
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    modifiers: HashMap<Uuid, Modifier>,
    product_modifiers: Vec<ProductModifier>,
    recipes: Vec<Recipe>,
    orders: HashMap<Uuid, Order>,
    order_items: Vec<OrderItem>,
    invoices: HashMap<Uuid, Invoice>,
}

fn matches_search(name: &str, search: &Option<String>) -> bool {
    match search.as_deref().map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => name.to_lowercase().contains(&term.to_lowercase()),
        None => true,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    list_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantas listagens chegaram ao "banco" (para verificar o cache).
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn count_list(&self) {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn seed_store(&self, store: Store) {
        self.tables.lock().await.stores.insert(store.id, store);
    }

    pub async fn seed_recipe(&self, recipe: Recipe) {
        self.tables.lock().await.recipes.push(recipe);
    }

    pub async fn product_modifier_links(&self, product_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables
            .product_modifiers
            .iter()
            .filter(|link| link.product_id == product_id)
            .count()
    }

    pub async fn recipe_lines(&self, product_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables
            .recipes
            .iter()
            .filter(|recipe| recipe.product_id == product_id)
            .count()
    }
}

fn link_modifiers(tables: &mut Tables, product_id: Uuid, modifier_ids: &[Uuid]) {
    for modifier_id in modifier_ids {
        let link = ProductModifier {
            product_id,
            modifier_id: *modifier_id,
        };
        if !tables.product_modifiers.contains(&link) {
            tables.product_modifiers.push(link);
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn find_category_detail(&self, id: Uuid) -> Result<Option<CategoryDetail>, AppError> {
        let tables = self.tables.lock().await;
        let Some(category) = tables.categories.get(&id).cloned() else {
            return Ok(None);
        };

        let parent = category
            .parent_id
            .and_then(|parent_id| tables.categories.get(&parent_id).cloned());

        let mut children: Vec<Category> = tables
            .categories
            .values()
            .filter(|child| child.parent_id == Some(id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));

        let product_count = tables
            .products
            .values()
            .filter(|product| product.category_id == id)
            .count() as i64;

        Ok(Some(CategoryDetail {
            category,
            parent,
            children,
            product_count,
        }))
    }

    async fn list_categories(
        &self,
        filter: &TenantFilter,
        query: &CategoryQuery,
    ) -> Result<Vec<Category>, AppError> {
        self.count_list();
        let tables = self.tables.lock().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| filter.admits_shared(c.chain_id))
            .filter(|c| query.parent_id.is_none() || c.parent_id == query.parent_id)
            .filter(|c| !query.roots_only || c.parent_id.is_none())
            .filter(|c| matches_search(&c.name, &query.search))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_child_category_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .map(|c| c.id)
            .collect())
    }

    async fn count_products_in_category(&self, category_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.category_id == category_id)
            .count() as i64)
    }

    async fn insert_category(&self, category: &Category) -> Result<Category, AppError> {
        let mut tables = self.tables.lock().await;
        tables.categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn save_category(&self, category: &Category) -> Result<Category, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.categories.get_mut(&category.id) {
            Some(existing) => {
                *existing = category.clone();
                Ok(category.clone())
            }
            None => Err(AppError::not_found(EntityKind::Category, category.id)),
        }
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.lock().await.categories.remove(&id).is_some())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn find_product_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, AppError> {
        let tables = self.tables.lock().await;
        let Some(product) = tables.products.get(&id).cloned() else {
            return Ok(None);
        };

        let category = tables
            .categories
            .get(&product.category_id)
            .cloned()
            .ok_or(AppError::not_found(EntityKind::Category, product.category_id))?;

        let mut modifiers: Vec<Modifier> = tables
            .product_modifiers
            .iter()
            .filter(|link| link.product_id == id)
            .filter_map(|link| tables.modifiers.get(&link.modifier_id).cloned())
            .collect();
        modifiers.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Some(ProductDetail {
            product,
            category,
            modifiers,
        }))
    }

    async fn list_products(
        &self,
        filter: &TenantFilter,
        query: &ProductQuery,
    ) -> Result<Vec<Product>, AppError> {
        self.count_list();
        let tables = self.tables.lock().await;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| filter.admits_shared(p.chain_id))
            .filter(|p| query.category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| query.status.is_none_or(|status| p.status == status))
            .filter(|p| matches_search(&p.name, &query.search))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn insert_product(
        &self,
        product: &Product,
        modifier_ids: &[Uuid],
    ) -> Result<Product, AppError> {
        let mut tables = self.tables.lock().await;
        tables.products.insert(product.id, product.clone());
        link_modifiers(&mut tables, product.id, modifier_ids);
        Ok(product.clone())
    }

    async fn save_product(
        &self,
        product: &Product,
        modifier_ids: Option<&[Uuid]>,
    ) -> Result<Product, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.products.contains_key(&product.id) {
            return Err(AppError::not_found(EntityKind::Product, product.id));
        }
        tables.products.insert(product.id, product.clone());

        if let Some(modifier_ids) = modifier_ids {
            tables
                .product_modifiers
                .retain(|link| link.product_id != product.id);
            link_modifiers(&mut tables, product.id, modifier_ids);
        }
        Ok(product.clone())
    }

    async fn count_order_items_for_product(&self, product_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .order_items
            .iter()
            .filter(|item| item.product_id == product_id)
            .count() as i64)
    }

    async fn delete_product_cascade(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        tables.product_modifiers.retain(|link| link.product_id != id);
        tables.recipes.retain(|recipe| recipe.product_id != id);
        Ok(tables.products.remove(&id).is_some())
    }

    async fn find_modifier(&self, id: Uuid) -> Result<Option<Modifier>, AppError> {
        Ok(self.tables.lock().await.modifiers.get(&id).cloned())
    }

    async fn list_modifiers(
        &self,
        filter: &TenantFilter,
        query: &ModifierQuery,
    ) -> Result<Vec<Modifier>, AppError> {
        self.count_list();
        let tables = self.tables.lock().await;
        let mut modifiers: Vec<Modifier> = tables
            .modifiers
            .values()
            .filter(|m| filter.admits_shared(m.chain_id))
            .filter(|m| matches_search(&m.name, &query.search))
            .cloned()
            .collect();
        modifiers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modifiers)
    }

    async fn insert_modifier(&self, modifier: &Modifier) -> Result<Modifier, AppError> {
        let mut tables = self.tables.lock().await;
        tables.modifiers.insert(modifier.id, modifier.clone());
        Ok(modifier.clone())
    }

    async fn save_modifier(&self, modifier: &Modifier) -> Result<Modifier, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.modifiers.get_mut(&modifier.id) {
            Some(existing) => {
                *existing = modifier.clone();
                Ok(modifier.clone())
            }
            None => Err(AppError::not_found(EntityKind::Modifier, modifier.id)),
        }
    }

    async fn count_products_for_modifier(&self, modifier_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .product_modifiers
            .iter()
            .filter(|link| link.modifier_id == modifier_id)
            .count() as i64)
    }

    async fn delete_modifier(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.lock().await.modifiers.remove(&id).is_some())
    }
}

#[async_trait]
impl SalesStore for MemoryStore {
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn find_order_detail(&self, id: Uuid) -> Result<Option<OrderDetail>, AppError> {
        let tables = self.tables.lock().await;
        let Some(order) = tables.orders.get(&id).cloned() else {
            return Ok(None);
        };
        let items = tables
            .order_items
            .iter()
            .filter(|item| item.order_id == id)
            .cloned()
            .collect();
        Ok(Some(OrderDetail { order, items }))
    }

    async fn list_orders(
        &self,
        filter: &TenantFilter,
        query: &OrderQuery,
    ) -> Result<Vec<Order>, AppError> {
        self.count_list();
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| filter.admits_scoped(o.chain_id, o.store_id))
            .filter(|o| query.store_id.is_none_or(|id| o.store_id == id))
            .filter(|o| query.status.is_none_or(|status| o.status == status))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn insert_order(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<OrderDetail, AppError> {
        let mut tables = self.tables.lock().await;
        tables.orders.insert(order.id, order.clone());
        tables.order_items.extend(items.iter().cloned());
        Ok(OrderDetail {
            order: order.clone(),
            items: items.to_vec(),
        })
    }

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        Ok(self.tables.lock().await.invoices.get(&id).cloned())
    }

    async fn find_invoice_by_order(&self, order_id: Uuid) -> Result<Option<Invoice>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .invoices
            .values()
            .find(|invoice| invoice.order_id == order_id)
            .cloned())
    }

    async fn list_invoices(
        &self,
        filter: &TenantFilter,
        query: &InvoiceQuery,
    ) -> Result<Vec<Invoice>, AppError> {
        self.count_list();
        let tables = self.tables.lock().await;
        let mut invoices: Vec<Invoice> = tables
            .invoices
            .values()
            .filter(|i| filter.admits_scoped(i.chain_id, i.store_id))
            .filter(|i| query.store_id.is_none_or(|id| i.store_id == id))
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.invoices.values().any(|i| i.order_id == invoice.order_id) {
            return Err(AppError::Conflict(ConflictKind::InvoiceAlreadyIssued(
                invoice.order_id,
            )));
        }
        tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice.clone())
    }
}

#[async_trait]
impl TenancyStore for MemoryStore {
    async fn find_chain(&self, id: Uuid) -> Result<Option<Chain>, AppError> {
        Ok(self.tables.lock().await.chains.get(&id).cloned())
    }

    async fn find_chain_by_code(&self, code: &str) -> Result<Option<Chain>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.chains.values().find(|c| c.code == code).cloned())
    }

    async fn list_chains(&self, filter: &TenantFilter) -> Result<Vec<Chain>, AppError> {
        let tables = self.tables.lock().await;
        let mut chains: Vec<Chain> = tables
            .chains
            .values()
            .filter(|c| filter.chain_id.is_none_or(|id| c.id == id))
            .cloned()
            .collect();
        chains.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(chains)
    }

    async fn insert_chain(&self, chain: &Chain) -> Result<Chain, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.chains.values().any(|c| c.code == chain.code) {
            return Err(AppError::Conflict(ConflictKind::ChainCodeTaken(chain.code.clone())));
        }
        tables.chains.insert(chain.id, chain.clone());
        Ok(chain.clone())
    }

    async fn save_chain(&self, chain: &Chain) -> Result<Chain, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.chains.get_mut(&chain.id) {
            Some(existing) => {
                *existing = chain.clone();
                Ok(chain.clone())
            }
            None => Err(AppError::not_found(EntityKind::Chain, chain.id)),
        }
    }

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        Ok(self.tables.lock().await.stores.get(&id).cloned())
    }
}
