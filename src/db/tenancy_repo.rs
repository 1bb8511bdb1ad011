// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, ConflictKind, EntityKind},
    db::store::TenancyStore,
    models::tenancy::{Chain, Store},
    services::tenant_filter::TenantFilter,
};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenancyStore for TenantRepository {
    async fn find_chain(&self, id: Uuid) -> Result<Option<Chain>, AppError> {
        let chain = sqlx::query_as::<_, Chain>("SELECT * FROM chains WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(chain)
    }

    async fn find_chain_by_code(&self, code: &str) -> Result<Option<Chain>, AppError> {
        let chain = sqlx::query_as::<_, Chain>("SELECT * FROM chains WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(chain)
    }

    async fn list_chains(&self, filter: &TenantFilter) -> Result<Vec<Chain>, AppError> {
        let chains = sqlx::query_as::<_, Chain>(
            "SELECT * FROM chains WHERE ($1::uuid IS NULL OR id = $1) ORDER BY name ASC",
        )
            .bind(filter.chain_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(chains)
    }

    async fn insert_chain(&self, chain: &Chain) -> Result<Chain, AppError> {
        sqlx::query_as::<_, Chain>(
            r#"
            INSERT INTO chains (id, name, code, phone, email, address, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
            .bind(chain.id)
            .bind(&chain.name)
            .bind(&chain.code)
            .bind(&chain.phone)
            .bind(&chain.email)
            .bind(&chain.address)
            .bind(chain.status)
            .bind(chain.created_at)
            .bind(chain.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict(ConflictKind::ChainCodeTaken(chain.code.clone()));
                    }
                }
                e.into()
            })
    }

    async fn save_chain(&self, chain: &Chain) -> Result<Chain, AppError> {
        // `code` não entra no UPDATE: é imutável
        sqlx::query_as::<_, Chain>(
            r#"
            UPDATE chains
            SET name = $2, phone = $3, email = $4, address = $5, status = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(chain.id)
            .bind(&chain.name)
            .bind(&chain.phone)
            .bind(&chain.email)
            .bind(&chain.address)
            .bind(chain.status)
            .bind(chain.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::not_found(EntityKind::Chain, chain.id))
    }

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }
}
