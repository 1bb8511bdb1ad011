// src/services/tenancy_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{AppError, ConflictKind, EntityKind},
    db::TenancyStore,
    models::{
        identity::CallerIdentity,
        tenancy::{Chain, ChainChanges, ChainStatus, NewChain},
    },
    services::tenant_filter::{can_access_chain, has_global_scope, resolve_tenant_filter},
};

#[derive(Clone)]
pub struct TenantService {
    tenancy: Arc<dyn TenancyStore>,
}

impl TenantService {
    pub fn new(tenancy: Arc<dyn TenancyStore>) -> Self {
        Self { tenancy }
    }

    /// Escopo global vê todas as redes; os demais, só a própria.
    pub async fn list_chains(&self, caller: Option<&CallerIdentity>) -> Result<Vec<Chain>, AppError> {
        let filter = resolve_tenant_filter(caller);
        self.tenancy.list_chains(&filter).await
    }

    pub async fn find_chain(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
    ) -> Result<Chain, AppError> {
        self.tenancy
            .find_chain(id)
            .await?
            .filter(|chain| caller.is_none_or(|identity| can_access_chain(identity, Some(chain.id))))
            .ok_or(AppError::not_found(EntityKind::Chain, id))
    }

    /// Só o escopo global abre redes novas.
    pub async fn create_chain(
        &self,
        caller: Option<&CallerIdentity>,
        payload: NewChain,
    ) -> Result<Chain, AppError> {
        payload.validate()?;

        if caller.is_some_and(|identity| !has_global_scope(identity)) {
            return Err(AppError::Forbidden("chain:write".into()));
        }

        // 1. Código normalizado e único
        let code = payload.code.trim().to_uppercase();
        if self.tenancy.find_chain_by_code(&code).await?.is_some() {
            return Err(AppError::Conflict(ConflictKind::ChainCodeTaken(code)));
        }

        // 2. Grava (o índice único cobre a corrida)
        let now = Utc::now();
        let chain = Chain {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            code,
            phone: payload.phone,
            email: payload.email,
            address: payload.address,
            status: ChainStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let created = self.tenancy.insert_chain(&chain).await?;

        tracing::info!("🏢 Rede {} ({}) criada", created.code, created.id);
        Ok(created)
    }

    pub async fn update_chain(
        &self,
        caller: Option<&CallerIdentity>,
        id: Uuid,
        changes: ChainChanges,
    ) -> Result<Chain, AppError> {
        changes.validate()?;

        let mut chain = self.find_chain(caller, id).await?;

        if let Some(code) = changes.code {
            if code.trim().to_uppercase() != chain.code {
                return Err(AppError::Conflict(ConflictKind::ChainCodeImmutable));
            }
        }

        if let Some(name) = changes.name {
            chain.name = name.trim().to_string();
        }
        if let Some(phone) = changes.phone {
            chain.phone = Some(phone);
        }
        if let Some(email) = changes.email {
            chain.email = Some(email);
        }
        if let Some(address) = changes.address {
            chain.address = Some(address);
        }
        if let Some(status) = changes.status {
            chain.status = status;
        }
        chain.updated_at = Utc::now();

        self.tenancy.save_chain(&chain).await
    }
}
