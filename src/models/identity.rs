// src/models/identity.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Código do cargo que ignora a verificação de permissões.
pub const SUPER_ADMIN_ROLE: &str = "SUPER_ADMIN";

// Um cargo atribuído ao usuário, com escopo opcional próprio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    #[schema(example = "CHAIN_MANAGER")]
    pub code: String,
    #[schema(example = 50)]
    pub level: i32,
    pub chain_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

// ---
// Identidade do chamador
// ---
// Montada uma única vez por requisição (a partir do token validado) e
// imutável até o fim dela.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub id: Uuid,
    #[schema(example = "quanly.tch")]
    pub username: String,
    pub email: String,
    /// `None` = escopo global (sistema inteiro).
    pub chain_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub roles: Vec<RoleAssignment>,
    pub permissions: Vec<String>,
}

impl CallerIdentity {
    /// Constrói a identidade a partir das claims do JWT.
    ///
    /// Quando as claims não trazem rede, usa o escopo do cargo de maior nível
    /// que tenha um. Só fica global quem não tem rede nem loja em lugar nenhum.
    ///
    /// Loja nas claims sem rede: a loja é mantida e a rede vem do cargo
    /// daquela loja. Sem cargo que a resolva, a identidade fica só com a loja
    /// (ver `has_unresolved_chain`).
    pub fn from_claims(claims: Claims) -> Self {
        let (chain_id, store_id) = match (claims.chain_id, claims.store_id) {
            (Some(chain_id), store_id) => (Some(chain_id), store_id),
            (None, Some(store_id)) => {
                let chain_id = claims
                    .roles
                    .iter()
                    .filter(|role| role.chain_id.is_some() && role.store_id == Some(store_id))
                    .max_by_key(|role| role.level)
                    .and_then(|role| role.chain_id);
                (chain_id, Some(store_id))
            }
            (None, None) => claims
                .roles
                .iter()
                .filter(|role| role.chain_id.is_some())
                .max_by_key(|role| role.level)
                .map(|role| (role.chain_id, role.store_id))
                .unwrap_or((None, None)),
        };

        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            chain_id,
            store_id,
            roles: claims.roles,
            permissions: claims.permissions,
        }
    }

    /// Presa a uma loja sem saber de que rede ela é.
    pub fn has_unresolved_chain(&self) -> bool {
        self.chain_id.is_none() && self.store_id.is_some()
    }

    pub fn is_super_admin(&self) -> bool {
        self.roles.iter().any(|role| role.code == SUPER_ADMIN_ROLE)
    }

    /// `*` concede tudo; `modulo:*` concede o módulo inteiro.
    pub fn has_permission(&self, slug: &str) -> bool {
        if self.is_super_admin() {
            return true;
        }
        let module = slug.split(':').next().unwrap_or(slug);
        self.permissions.iter().any(|granted| {
            granted == slug
                || granted == "*"
                || granted.strip_suffix(":*").is_some_and(|m| m == module)
        })
    }
}

// Claims do JWT emitido pela camada de autenticação externa
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub chain_id: Option<Uuid>,
    #[serde(default)]
    pub store_id: Option<Uuid>,
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}
