// src/services/modifier_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    cache::{facade::MODIFIERS, CacheFacade, CacheTtl},
    common::error::{AppError, DependentKind, EntityKind},
    db::CatalogStore,
    models::{
        catalog::{Modifier, ModifierChanges, ModifierQuery, NewModifier},
        identity::CallerIdentity,
    },
    services::tenant_filter::{
        attribute_chain, can_read_shared, can_write_shared, resolve_tenant_filter,
    },
};

fn clean_options(options: Vec<String>) -> Vec<String> {
    options
        .into_iter()
        .map(|option| option.trim().to_string())
        .collect()
}

#[derive(Clone)]
pub struct ModifierService {
    store: Arc<dyn CatalogStore>,
    cache: CacheFacade,
}

impl ModifierService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheFacade) -> Self {
        Self { store, cache }
    }

    pub async fn create(
        &self,
        caller: Option<&CallerIdentity>,
        payload: NewModifier,
    ) -> Result<Modifier, AppError> {
        payload.validate()?;

        let now = Utc::now();
        let modifier = Modifier {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            options: clean_options(payload.options),
            chain_id: attribute_chain(caller, payload.chain_id),
            created_at: now,
            updated_at: now,
        };
        let created = self.store.insert_modifier(&modifier).await?;
        self.cache.invalidate_modifiers(created.chain_id).await;

        tracing::info!("✅ Modificador {} criado", created.id);
        Ok(created)
    }

    pub async fn find_all(
        &self,
        caller: Option<&CallerIdentity>,
        query: ModifierQuery,
    ) -> Result<Vec<Modifier>, AppError> {
        let filter = resolve_tenant_filter(caller);
        let key = CacheFacade::list_key(MODIFIERS, &filter, &query);

        self.cache
            .get_or_set(&key, CacheTtl::Long, || self.store.list_modifiers(&filter, &query))
            .await
    }

    pub async fn find_one(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<Modifier, AppError> {
        self.store
            .find_modifier(id)
            .await?
            .filter(|modifier| can_read_shared(caller, modifier.chain_id))
            .ok_or(AppError::not_found(EntityKind::Modifier, id))
    }

    pub async fn update(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
        changes: ModifierChanges,
    ) -> Result<Modifier, AppError> {
        changes.validate()?;

        let mut modifier = self.load_writable(caller, id).await?;
        if let Some(name) = changes.name {
            modifier.name = name.trim().to_string();
        }
        if let Some(options) = changes.options {
            modifier.options = clean_options(options);
        }
        modifier.updated_at = Utc::now();

        let saved = self.store.save_modifier(&modifier).await?;

        // Produtos expandem os modificadores no detalhe
        self.cache.invalidate_modifiers(saved.chain_id).await;
        self.cache.invalidate_products(saved.chain_id).await;

        tracing::info!("✅ Modificador {} atualizado", saved.id);
        Ok(saved)
    }

    pub async fn remove(&self, caller: Option<&CallerIdentity>, id: Uuid) -> Result<(), AppError> {
        let modifier = self.load_writable(caller, id).await?;

        let linked = self.store.count_products_for_modifier(id).await?;
        if linked > 0 {
            return Err(AppError::HasDependents {
                entity: EntityKind::Modifier,
                id,
                kind: DependentKind::Products,
                count: linked,
            });
        }

        if !self.store.delete_modifier(id).await? {
            return Err(AppError::not_found(EntityKind::Modifier, id));
        }
        self.cache.invalidate_modifiers(modifier.chain_id).await;

        tracing::info!("🗑️ Modificador {} removido", id);
        Ok(())
    }

    async fn load_writable(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<Modifier, AppError> {
        self.store
            .find_modifier(id)
            .await?
            .filter(|modifier| can_write_shared(caller, modifier.chain_id))
            .ok_or(AppError::not_found(EntityKind::Modifier, id))
    }
}
