// src/services/category_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    cache::{facade::CATEGORIES, CacheFacade, CacheTtl},
    common::error::{AppError, EntityKind},
    db::CatalogStore,
    models::{
        catalog::{
            Category, CategoryChanges, CategoryDepth, CategoryDetail, CategoryQuery, NewCategory,
        },
        identity::CallerIdentity,
    },
    services::{
        category_hierarchy::{CategoryHierarchy, MAX_DEPTH},
        tenant_filter::{attribute_chain, can_read_shared, can_write_shared, resolve_tenant_filter},
    },
};

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn CatalogStore>,
    hierarchy: CategoryHierarchy,
    cache: CacheFacade,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheFacade) -> Self {
        let hierarchy = CategoryHierarchy::new(store.clone());
        Self {
            store,
            hierarchy,
            cache,
        }
    }

    pub async fn create(
        &self,
        caller: Option<&CallerIdentity>,
        payload: NewCategory,
    ) -> Result<Category, AppError> {
        payload.validate()?;

        // 1. Rede do registro (quem tem rede carimba a própria)
        let chain_id = attribute_chain(caller, payload.chain_id);

        // 2. Pai: existe, está no escopo e a árvore comporta mais um nível
        if let Some(parent_id) = payload.parent_id {
            let parent = self.hierarchy.validate_parent_assignment(parent_id, None).await?;
            ensure_parent_in_scope(caller, &parent, chain_id)?;
        }

        // 3. Grava
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            description: payload.description,
            parent_id: payload.parent_id,
            chain_id,
            created_at: now,
            updated_at: now,
        };
        let created = self.store.insert_category(&category).await?;

        // 4. Invalida as listagens afetadas
        self.cache.invalidate_categories(created.chain_id).await;

        tracing::info!("✅ Categoria {} criada", created.id);
        Ok(created)
    }

    pub async fn find_all(
        &self,
        caller: Option<&CallerIdentity>,
        query: CategoryQuery,
    ) -> Result<Vec<Category>, AppError> {
        let filter = resolve_tenant_filter(caller);
        let key = CacheFacade::list_key(CATEGORIES, &filter, &query);

        self.cache
            .get_or_set(&key, CacheTtl::Long, || {
                self.store.list_categories(&filter, &query)
            })
            .await
    }

    /// Categoria com pai, filhas visíveis ao chamador e contagem de produtos.
    pub async fn find_one(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<CategoryDetail, AppError> {
        let mut detail = self
            .store
            .find_category_detail(id)
            .await?
            .filter(|detail| can_read_shared(caller, detail.category.chain_id))
            .ok_or(AppError::not_found(EntityKind::Category, id))?;

        detail
            .children
            .retain(|child| can_read_shared(caller, child.chain_id));

        Ok(detail)
    }

    pub async fn update(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Category, AppError> {
        changes.validate()?;

        let mut category = self.load_writable(caller, id).await?;

        // `Some(None)` = vira raiz; `None` = mantém o pai atual
        if let Some(parent_id) = changes.parent_id {
            if let Some(parent_id) = parent_id {
                let parent = self
                    .hierarchy
                    .validate_parent_assignment(parent_id, Some(id))
                    .await?;
                ensure_parent_in_scope(caller, &parent, category.chain_id)?;
            }
            category.parent_id = parent_id;
        }

        if let Some(name) = changes.name {
            category.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            category.description = description;
        }
        category.updated_at = Utc::now();

        let saved = self.store.save_category(&category).await?;
        self.cache.invalidate_categories(saved.chain_id).await;

        tracing::info!("✅ Categoria {} atualizada", saved.id);
        Ok(saved)
    }

    pub async fn remove(&self, caller: Option<&CallerIdentity>, id: Uuid) -> Result<(), AppError> {
        let category = self.load_writable(caller, id).await?;

        self.hierarchy.ensure_deletable(id).await?;

        if !self.store.delete_category(id).await? {
            return Err(AppError::not_found(EntityKind::Category, id));
        }
        self.cache.invalidate_categories(category.chain_id).await;

        tracing::info!("🗑️ Categoria {} removida", id);
        Ok(())
    }

    pub async fn depth(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<CategoryDepth, AppError> {
        self.store
            .find_category(id)
            .await?
            .filter(|category| can_read_shared(caller, category.chain_id))
            .ok_or(AppError::not_found(EntityKind::Category, id))?;

        let depth = self.hierarchy.compute_depth(id).await?;
        Ok(CategoryDepth {
            category_id: id,
            depth,
            max_depth: MAX_DEPTH,
        })
    }

    // Fora do escopo de escrita responde como inexistente
    async fn load_writable(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<Category, AppError> {
        self.store
            .find_category(id)
            .await?
            .filter(|category| can_write_shared(caller, category.chain_id))
            .ok_or(AppError::not_found(EntityKind::Category, id))
    }
}

/// O pai precisa ser legível pelo chamador e ser compartilhado ou da mesma
/// rede da categoria filha.
fn ensure_parent_in_scope(
    caller: Option<&CallerIdentity>,
    parent: &Category,
    child_chain_id: Option<Uuid>,
) -> Result<(), AppError> {
    let readable = can_read_shared(caller, parent.chain_id);
    let same_tree = parent.chain_id.is_none() || parent.chain_id == child_chain_id;
    if readable && same_tree {
        Ok(())
    } else {
        Err(AppError::not_found(EntityKind::Category, parent.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::{DependentKind, HierarchyViolation},
        db::MemoryStore,
        services::test_support,
    };

    fn service() -> (Arc<MemoryStore>, CategoryService) {
        let store = Arc::new(MemoryStore::new());
        let service = CategoryService::new(store.clone(), test_support::cache());
        (store, service)
    }

    fn new_category(name: &str, parent_id: Option<Uuid>) -> NewCategory {
        NewCategory {
            name: name.into(),
            description: None,
            parent_id,
            chain_id: None,
        }
    }

    #[tokio::test]
    async fn three_levels_fit_and_the_fourth_fails() {
        let (_, service) = service();
        let caller = test_support::identity(Some(Uuid::new_v4()), None);
        let caller = Some(&caller);

        let drinks = service.create(caller, new_category("Drinks", None)).await.unwrap();
        let coffee = service
            .create(caller, new_category("Coffee", Some(drinks.id)))
            .await
            .unwrap();
        let iced = service
            .create(caller, new_category("Iced Coffee", Some(coffee.id)))
            .await
            .unwrap();
        assert_eq!(service.depth(caller, iced.id).await.unwrap().depth, 3);

        let err = service
            .create(caller, new_category("Iced Latte", Some(iced.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidHierarchy(HierarchyViolation::TooDeep { .. })));
    }

    #[tokio::test]
    async fn chain_caller_stamps_own_chain() {
        let (_, service) = service();
        let chain = Uuid::new_v4();
        let caller = test_support::identity(Some(chain), None);

        let mut payload = new_category("Tea", None);
        payload.chain_id = Some(Uuid::new_v4());
        let created = service.create(Some(&caller), payload).await.unwrap();
        assert_eq!(created.chain_id, Some(chain));
    }

    #[tokio::test]
    async fn parent_from_another_chain_is_not_found() {
        let (_, service) = service();
        let foreign = test_support::identity(Some(Uuid::new_v4()), None);
        let own = test_support::identity(Some(Uuid::new_v4()), None);

        let parent = service
            .create(Some(&foreign), new_category("Drinks", None))
            .await
            .unwrap();
        let err = service
            .create(Some(&own), new_category("Coffee", Some(parent.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: EntityKind::Category, .. }));
    }

    #[tokio::test]
    async fn self_parent_update_fails() {
        let (_, service) = service();
        let drinks = service.create(None, new_category("Drinks", None)).await.unwrap();

        let changes = CategoryChanges {
            parent_id: Some(Some(drinks.id)),
            ..Default::default()
        };
        let err = service.update(None, drinks.id, changes).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidHierarchy(HierarchyViolation::SelfParent)));
    }

    #[tokio::test]
    async fn null_parent_moves_category_to_root() {
        let (_, service) = service();
        let drinks = service.create(None, new_category("Drinks", None)).await.unwrap();
        let coffee = service
            .create(None, new_category("Coffee", Some(drinks.id)))
            .await
            .unwrap();

        let changes = CategoryChanges {
            parent_id: Some(None),
            ..Default::default()
        };
        let moved = service.update(None, coffee.id, changes).await.unwrap();
        assert_eq!(moved.parent_id, None);
        assert_eq!(service.depth(None, coffee.id).await.unwrap().depth, 1);
    }

    #[tokio::test]
    async fn null_description_clears_it() {
        let (_, service) = service();
        let mut payload = new_category("Drinks", None);
        payload.description = Some("Đồ uống".into());
        let drinks = service.create(None, payload).await.unwrap();

        let keep = CategoryChanges { name: Some("Beverages".into()), ..Default::default() };
        let renamed = service.update(None, drinks.id, keep).await.unwrap();
        assert_eq!(renamed.description.as_deref(), Some("Đồ uống"));

        let clear = CategoryChanges { description: Some(None), ..Default::default() };
        let cleared = service.update(None, drinks.id, clear).await.unwrap();
        assert_eq!(cleared.description, None);
    }

    #[tokio::test]
    async fn deleting_category_with_products_reports_count() {
        let (store, service) = service();
        let coffee = service.create(None, new_category("Coffee", None)).await.unwrap();
        let latte = test_support::product("Latte", 45_000, coffee.id, None);
        store.insert_product(&latte, &[]).await.unwrap();

        let err = service.remove(None, coffee.id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::HasDependents { kind: DependentKind::Products, count: 1, .. }
        ));
    }

    #[tokio::test]
    async fn shared_category_is_read_only_for_chain_callers() {
        let (_, service) = service();
        let shared = service.create(None, new_category("Drinks", None)).await.unwrap();
        let caller = test_support::identity(Some(Uuid::new_v4()), None);

        assert!(service.find_one(Some(&caller), shared.id).await.is_ok());
        let err = service.remove(Some(&caller), shared.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn find_one_hides_children_of_other_chains() {
        let (_, service) = service();
        let shared = service.create(None, new_category("Drinks", None)).await.unwrap();
        let chain_a = test_support::identity(Some(Uuid::new_v4()), None);
        let chain_b = test_support::identity(Some(Uuid::new_v4()), None);

        service
            .create(Some(&chain_a), new_category("Coffee A", Some(shared.id)))
            .await
            .unwrap();
        service
            .create(Some(&chain_b), new_category("Coffee B", Some(shared.id)))
            .await
            .unwrap();

        let detail = service.find_one(Some(&chain_a), shared.id).await.unwrap();
        let names: Vec<_> = detail.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee A"]);
    }

    #[tokio::test]
    async fn listing_is_cached_until_a_write() {
        let (store, service) = service();
        let caller = test_support::identity(Some(Uuid::new_v4()), None);
        service
            .create(Some(&caller), new_category("Drinks", None))
            .await
            .unwrap();

        let first = service
            .find_all(Some(&caller), CategoryQuery::default())
            .await
            .unwrap();
        let second = service
            .find_all(Some(&caller), CategoryQuery::default())
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_calls(), 1);

        service
            .create(Some(&caller), new_category("Food", None))
            .await
            .unwrap();
        let third = service
            .find_all(Some(&caller), CategoryQuery::default())
            .await
            .unwrap();
        assert_eq!(third.len(), 2);
        assert_eq!(store.list_calls(), 2);
    }
}
