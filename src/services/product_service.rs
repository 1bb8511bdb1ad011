// src/services/product_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    cache::{facade::PRODUCTS, CacheFacade, CacheTtl},
    common::error::{AppError, DependentKind, EntityKind},
    db::CatalogStore,
    models::{
        catalog::{
            NewProduct, Product, ProductChanges, ProductDetail, ProductQuery, ProductStatus,
        },
        identity::CallerIdentity,
    },
    services::tenant_filter::{
        attribute_chain, can_read_shared, can_write_shared, resolve_tenant_filter,
    },
};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn CatalogStore>,
    cache: CacheFacade,
}

impl ProductService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheFacade) -> Self {
        Self { store, cache }
    }

    pub async fn create(
        &self,
        caller: Option<&CallerIdentity>,
        payload: NewProduct,
    ) -> Result<Product, AppError> {
        payload.validate()?;

        // 1. Rede do registro
        let chain_id = attribute_chain(caller, payload.chain_id);

        // 2. Categoria e modificadores precisam estar ao alcance da mesma rede
        self.ensure_category(caller, payload.category_id, chain_id).await?;
        let modifier_ids = self
            .ensure_modifiers(caller, &payload.modifier_ids, chain_id)
            .await?;

        // 3. Produto + vínculos
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            price: payload.price,
            description: payload.description,
            image_url: payload.image_url,
            category_id: payload.category_id,
            chain_id,
            status: payload.status.unwrap_or(ProductStatus::Visible),
            created_at: now,
            updated_at: now,
        };
        let created = self.store.insert_product(&product, &modifier_ids).await?;

        // 4. Invalida
        self.cache.invalidate_products(created.chain_id).await;

        tracing::info!("✅ Produto {} criado com {} modificadores", created.id, modifier_ids.len());
        Ok(created)
    }

    pub async fn find_all(
        &self,
        caller: Option<&CallerIdentity>,
        query: ProductQuery,
    ) -> Result<Vec<Product>, AppError> {
        let filter = resolve_tenant_filter(caller);
        let key = CacheFacade::list_key(PRODUCTS, &filter, &query);

        self.cache
            .get_or_set(&key, CacheTtl::Long, || self.store.list_products(&filter, &query))
            .await
    }

    /// Produto com categoria e modificadores.
    pub async fn find_one(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<ProductDetail, AppError> {
        let mut detail = self
            .store
            .find_product_detail(id)
            .await?
            .filter(|detail| can_read_shared(caller, detail.product.chain_id))
            .ok_or(AppError::not_found(EntityKind::Product, id))?;

        detail
            .modifiers
            .retain(|modifier| can_read_shared(caller, modifier.chain_id));

        Ok(detail)
    }

    pub async fn update(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, AppError> {
        changes.validate()?;

        let mut product = self.load_writable(caller, id).await?;

        if let Some(category_id) = changes.category_id {
            self.ensure_category(caller, category_id, product.chain_id).await?;
            product.category_id = category_id;
        }

        let modifier_ids = match &changes.modifier_ids {
            Some(ids) => Some(self.ensure_modifiers(caller, ids, product.chain_id).await?),
            None => None,
        };

        if let Some(name) = changes.name {
            product.name = name.trim().to_string();
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(image_url) = changes.image_url {
            product.image_url = image_url;
        }
        if let Some(status) = changes.status {
            product.status = status;
        }
        product.updated_at = Utc::now();

        let saved = self
            .store
            .save_product(&product, modifier_ids.as_deref())
            .await?;
        self.cache.invalidate_products(saved.chain_id).await;

        tracing::info!("✅ Produto {} atualizado", saved.id);
        Ok(saved)
    }

    /// Oculta ou exibe o produto no cardápio.
    pub async fn set_status(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
        status: ProductStatus,
    ) -> Result<Product, AppError> {
        let mut product = self.load_writable(caller, id).await?;
        if product.status == status {
            return Ok(product);
        }

        product.status = status;
        product.updated_at = Utc::now();

        let saved = self.store.save_product(&product, None).await?;
        self.cache.invalidate_products(saved.chain_id).await;
        Ok(saved)
    }

    /// Produto já vendido não sai do catálogo (o histórico de pedidos aponta
    /// para ele); os demais levam junto vínculos e receita.
    pub async fn remove(&self, caller: Option<&CallerIdentity>, id: Uuid) -> Result<(), AppError> {
        let product = self.load_writable(caller, id).await?;

        let sold = self.store.count_order_items_for_product(id).await?;
        if sold > 0 {
            return Err(AppError::HasDependents {
                entity: EntityKind::Product,
                id,
                kind: DependentKind::OrderItems,
                count: sold,
            });
        }

        if !self.store.delete_product_cascade(id).await? {
            return Err(AppError::not_found(EntityKind::Product, id));
        }
        self.cache.invalidate_products(product.chain_id).await;

        tracing::info!("🗑️ Produto {} removido", id);
        Ok(())
    }

    async fn load_writable(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<Product, AppError> {
        self.store
            .find_product(id)
            .await?
            .filter(|product| can_write_shared(caller, product.chain_id))
            .ok_or(AppError::not_found(EntityKind::Product, id))
    }

    async fn ensure_category(
        &self,
        caller: Option<&CallerIdentity>,
        category_id: Uuid,
        chain_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        self.store
            .find_category(category_id)
            .await?
            .filter(|category| {
                can_read_shared(caller, category.chain_id)
                    && (category.chain_id.is_none() || category.chain_id == chain_id)
            })
            .map(|_| ())
            .ok_or(AppError::not_found(EntityKind::Category, category_id))
    }

    /// Confere cada modificador e devolve a lista sem repetições.
    async fn ensure_modifiers(
        &self,
        caller: Option<&CallerIdentity>,
        modifier_ids: &[Uuid],
        chain_id: Option<Uuid>,
    ) -> Result<Vec<Uuid>, AppError> {
        let mut unique = Vec::with_capacity(modifier_ids.len());
        for id in modifier_ids {
            if unique.contains(id) {
                continue;
            }
            self.store
                .find_modifier(*id)
                .await?
                .filter(|modifier| {
                    can_read_shared(caller, modifier.chain_id)
                        && (modifier.chain_id.is_none() || modifier.chain_id == chain_id)
                })
                .ok_or(AppError::not_found(EntityKind::Modifier, *id))?;
            unique.push(*id);
        }
        Ok(unique)
    }
}
