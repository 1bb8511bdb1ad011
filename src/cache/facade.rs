// src/cache/facade.rs

use std::{future::Future, sync::Arc, time::Duration};

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    cache::store::CacheStore,
    common::error::AppError,
    services::tenant_filter::TenantFilter,
};

const KEY_ROOT: &str = "pos";

// Prefixos por entidade
pub const CATEGORIES: &str = "categories";
pub const PRODUCTS: &str = "products";
pub const MODIFIERS: &str = "modifiers";
pub const ORDERS: &str = "orders";
pub const INVOICES: &str = "invoices";

/// Classe de tempo de vida de uma entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    Short,
    Long,
}

#[derive(Clone)]
pub struct CacheFacade {
    store: Arc<dyn CacheStore>,
    short_ttl: Duration,
    long_ttl: Duration,
}

impl CacheFacade {
    pub fn new(store: Arc<dyn CacheStore>, short_ttl: Duration, long_ttl: Duration) -> Self {
        Self {
            store,
            short_ttl,
            long_ttl,
        }
    }

    /// `pos:{prefix}:{parte1}:{parte2}...`
    pub fn build_key(prefix: &str, parts: &[&str]) -> String {
        let mut key = format!("{KEY_ROOT}:{prefix}");
        for part in parts {
            key.push(':');
            key.push_str(part);
        }
        key
    }

    /// Chave de uma listagem: prefixo + rede + loja + formato da consulta.
    pub fn list_key<Q: Serialize>(prefix: &str, filter: &TenantFilter, query: &Q) -> String {
        let (chain, store) = filter.cache_namespace();
        let shape = serde_json::to_string(query).unwrap_or_default();
        Self::build_key(prefix, &[&chain, &store, &shape])
    }

    fn ttl(&self, ttl: CacheTtl) -> Duration {
        match ttl {
            CacheTtl::Short => self.short_ttl,
            CacheTtl::Long => self.long_ttl,
        }
    }

    /// Devolve o valor em cache ou executa `producer`, grava e devolve.
    /// Erros do cache só viram log; erros do `producer` sobem normalmente.
    pub async fn get_or_set<T, F, Fut>(
        &self,
        key: &str,
        ttl: CacheTtl,
        producer: F,
    ) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        match self.store.get(key).await {
            Ok(Some(cached)) => match serde_json::from_value::<T>(cached) {
                Ok(value) => {
                    tracing::debug!(key, "cache hit");
                    return Ok(value);
                }
                Err(e) => tracing::warn!(key, error = %e, "Entrada de cache ilegível, recalculando"),
            },
            Ok(None) => tracing::debug!(key, "cache miss"),
            Err(e) => tracing::warn!(key, error = %e, "Cache indisponível na leitura, indo ao banco"),
        }

        let value = producer().await?;

        match serde_json::to_value(&value) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(key, serialized, self.ttl(ttl)).await {
                    tracing::warn!(key, error = %e, "Falha ao gravar no cache");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "Valor não serializável para o cache"),
        }

        Ok(value)
    }

    /// Com rede: limpa o namespace da rede e as listagens globais (que também
    /// a incluem). Sem rede (registro compartilhado): limpa o prefixo inteiro.
    pub async fn invalidate(&self, prefix: &str, chain_id: Option<Uuid>) {
        let targets = match chain_id {
            Some(chain_id) => vec![
                format!("{}:", Self::build_key(prefix, &[&chain_id.to_string()])),
                format!("{}:", Self::build_key(prefix, &["global"])),
            ],
            None => vec![format!("{}:", Self::build_key(prefix, &[]))],
        };

        for target in targets {
            match self.store.delete_prefix(&target).await {
                Ok(removed) => tracing::debug!(prefix = %target, removed, "cache invalidated"),
                Err(e) => tracing::warn!(prefix = %target, error = %e, "Falha ao invalidar o cache"),
            }
        }
    }

    pub async fn invalidate_categories(&self, chain_id: Option<Uuid>) {
        self.invalidate(CATEGORIES, chain_id).await;
    }

    pub async fn invalidate_products(&self, chain_id: Option<Uuid>) {
        self.invalidate(PRODUCTS, chain_id).await;
    }

    pub async fn invalidate_modifiers(&self, chain_id: Option<Uuid>) {
        self.invalidate(MODIFIERS, chain_id).await;
    }

    pub async fn invalidate_orders(&self, chain_id: Option<Uuid>) {
        self.invalidate(ORDERS, chain_id).await;
    }

    pub async fn invalidate_invoices(&self, chain_id: Option<Uuid>) {
        self.invalidate(INVOICES, chain_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::{CacheError, MemoryCacheStore};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Cache fora do ar: toda operação falha
    struct DownCache;

    #[async_trait]
    impl CacheStore for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
        async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    fn facade(store: Arc<dyn CacheStore>) -> CacheFacade {
        CacheFacade::new(store, Duration::from_secs(60), Duration::from_secs(600))
    }

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(CacheFacade::build_key(PRODUCTS, &["a", "b"]), "pos:products:a:b");
        let filter = TenantFilter::unrestricted();
        assert_eq!(
            CacheFacade::list_key(CATEGORIES, &filter, &()),
            "pos:categories:global:all:null"
        );
    }

    #[tokio::test]
    async fn producer_runs_once_until_invalidated() {
        let cache = facade(Arc::new(MemoryCacheStore::new()));
        let calls = AtomicUsize::new(0);
        let chain = Uuid::new_v4();
        let filter = TenantFilter { chain_id: Some(chain), store_id: None };
        let key = CacheFacade::list_key(PRODUCTS, &filter, &());

        for _ in 0..2 {
            let value: Vec<i32> = cache
                .get_or_set(&key, CacheTtl::Long, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2])
                })
                .await
                .unwrap();
            assert_eq!(value, vec![1, 2]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate_products(Some(chain)).await;
        let _: Vec<i32> = cache
            .get_or_set(&key, CacheTtl::Long, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![1, 2])
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn chain_invalidation_also_clears_global_listings() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = facade(store.clone());
        let (chain, other) = (Uuid::new_v4(), Uuid::new_v4());

        let keys = [
            CacheFacade::list_key(PRODUCTS, &TenantFilter { chain_id: Some(chain), store_id: None }, &()),
            CacheFacade::list_key(PRODUCTS, &TenantFilter { chain_id: Some(other), store_id: None }, &()),
            CacheFacade::list_key(PRODUCTS, &TenantFilter::unrestricted(), &()),
        ];
        for key in &keys {
            let _: i32 = cache.get_or_set(key, CacheTtl::Short, || async { Ok(1) }).await.unwrap();
        }

        cache.invalidate_products(Some(chain)).await;
        assert_eq!(store.get(&keys[0]).await.unwrap(), None);
        assert!(store.get(&keys[1]).await.unwrap().is_some());
        assert_eq!(store.get(&keys[2]).await.unwrap(), None);

        cache.invalidate_products(None).await;
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn unavailable_cache_falls_through_to_producer() {
        let cache = facade(Arc::new(DownCache));
        let value: String = cache
            .get_or_set("pos:orders:x", CacheTtl::Short, || async { Ok("from db".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "from db");

        // Invalidação com cache fora do ar também não falha
        cache.invalidate_orders(None).await;
    }

    #[tokio::test]
    async fn producer_errors_are_propagated_and_not_cached() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = facade(store.clone());
        let result: Result<i32, AppError> = cache
            .get_or_set("pos:orders:y", CacheTtl::Short, || async {
                Err(AppError::InvalidToken)
            })
            .await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
        assert_eq!(store.len(), 0);
    }
}
