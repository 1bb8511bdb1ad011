// src/services/tenant_filter.rs

//! Escopo de tenant (rede/loja) derivado da identidade do chamador.
//!
//! Funções puras, sem estado: cada serviço importa e aplica em toda consulta
//! e escrita.

use serde::Serialize;
use uuid::Uuid;

use crate::models::identity::CallerIdentity;

/// Predicado de escopo. Sem nenhum campo = sem restrição (escopo global).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantFilter {
    pub chain_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

impl TenantFilter {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.chain_id.is_none() && self.store_id.is_none()
    }

    /// Para registros de catálogo: os compartilhados (`chain_id` nulo)
    /// aparecem para todo mundo.
    pub fn admits_shared(&self, chain_id: Option<Uuid>) -> bool {
        match self.chain_id {
            None => true,
            Some(own) => chain_id.is_none() || chain_id == Some(own),
        }
    }

    /// Para registros de venda (pedidos, notas): rede e loja precisam bater.
    pub fn admits_scoped(&self, chain_id: Option<Uuid>, store_id: Uuid) -> bool {
        let chain_ok = self.chain_id.is_none() || self.chain_id == chain_id;
        let store_ok = self.store_id.is_none() || self.store_id == Some(store_id);
        chain_ok && store_ok
    }

    /// Segmentos de chave de cache: `{rede}:{loja}`, com `global`/`all` quando ausentes.
    pub fn cache_namespace(&self) -> (String, String) {
        let chain = self
            .chain_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "global".to_string());
        let store = self
            .store_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "all".to_string());
        (chain, store)
    }
}

/// Rede definida => filtra pela rede; loja também definida => filtra pelas duas.
/// Sem rede e sem loja (ou sem chamador, contexto interno) => sem restrição.
pub fn resolve_tenant_filter(caller: Option<&CallerIdentity>) -> TenantFilter {
    match caller {
        Some(identity) => match identity.chain_id {
            Some(chain_id) => TenantFilter {
                chain_id: Some(chain_id),
                store_id: identity.store_id,
            },
            // Loja sem rede conhecida: nunca vira escopo global
            None => TenantFilter {
                chain_id: None,
                store_id: identity.store_id,
            },
        },
        None => TenantFilter::unrestricted(),
    }
}

pub fn has_global_scope(identity: &CallerIdentity) -> bool {
    identity.chain_id.is_none() && identity.store_id.is_none()
}

pub fn can_access_chain(identity: &CallerIdentity, chain_id: Option<Uuid>) -> bool {
    has_global_scope(identity) || (identity.chain_id.is_some() && identity.chain_id == chain_id)
}

/// Quem não está preso a uma loja fica limitado apenas pela rede
/// (ver `can_access_chain`).
pub fn can_access_store(identity: &CallerIdentity, store_id: Option<Uuid>) -> bool {
    has_global_scope(identity) || identity.store_id.is_none() || identity.store_id == store_id
}

/// Leitura de registro de catálogo por id.
pub fn can_read_shared(caller: Option<&CallerIdentity>, chain_id: Option<Uuid>) -> bool {
    match caller {
        Some(identity) => chain_id.is_none() || can_access_chain(identity, chain_id),
        None => true,
    }
}

/// Escrita em registro de catálogo: os compartilhados só pelo escopo global.
pub fn can_write_shared(caller: Option<&CallerIdentity>, chain_id: Option<Uuid>) -> bool {
    match caller {
        Some(identity) => can_access_chain(identity, chain_id),
        None => true,
    }
}

/// Leitura de pedido/nota por id.
pub fn can_access_scoped(
    caller: Option<&CallerIdentity>,
    chain_id: Option<Uuid>,
    store_id: Uuid,
) -> bool {
    match caller {
        Some(identity) => {
            can_access_chain(identity, chain_id) && can_access_store(identity, Some(store_id))
        }
        None => true,
    }
}

/// Rede atribuída a um registro novo: quem pertence a uma rede sempre carimba
/// a própria; o escopo global escolhe (ou deixa compartilhado).
pub fn attribute_chain(caller: Option<&CallerIdentity>, requested: Option<Uuid>) -> Option<Uuid> {
    match caller.and_then(|identity| identity.chain_id) {
        Some(own) => Some(own),
        None => requested,
    }
}
