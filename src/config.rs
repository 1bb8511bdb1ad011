// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    cache::{CacheFacade, MemoryCacheStore},
    db::{CatalogRepository, SalesRepository, TenantRepository},
    services::{
        AuthService, CategoryService, InvoiceService, ModifierService, OrderService,
        ProductService, TenantService,
    },
};

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub cache_ttl_short: Duration,
    pub cache_ttl_long: Duration,
}

fn var_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            cache_ttl_short: Duration::from_secs(var_or("CACHE_TTL_SHORT_SECS", 60)?),
            cache_ttl_long: Duration::from_secs(var_or("CACHE_TTL_LONG_SECS", 600)?),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub category_service: CategoryService,
    pub product_service: ProductService,
    pub modifier_service: ModifierService,
    pub order_service: OrderService,
    pub invoice_service: InvoiceService,
    pub tenant_service: TenantService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let catalog = Arc::new(CatalogRepository::new(db_pool.clone()));
        let sales = Arc::new(SalesRepository::new(db_pool.clone()));
        let tenancy = Arc::new(TenantRepository::new(db_pool.clone()));

        let cache = CacheFacade::new(
            Arc::new(MemoryCacheStore::new()),
            config.cache_ttl_short,
            config.cache_ttl_long,
        );

        Ok(Self {
            auth_service: AuthService::new(config.jwt_secret.clone()),
            category_service: CategoryService::new(catalog.clone(), cache.clone()),
            product_service: ProductService::new(catalog.clone(), cache.clone()),
            modifier_service: ModifierService::new(catalog.clone(), cache.clone()),
            order_service: OrderService::new(catalog, sales.clone(), tenancy.clone(), cache.clone()),
            invoice_service: InvoiceService::new(sales, cache),
            tenant_service: TenantService::new(tenancy),
            db_pool,
        })
    }
}
