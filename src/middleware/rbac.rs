// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. As permissões já vêm nas claims; SUPER_ADMIN passa direto
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        let required_perm = T::slug();
        if !user.0.has_permission(required_perm) {
            let locale = Locale::from_request_parts(parts, state)
                .await
                .unwrap_or_default();
            return Err(AppError::Forbidden(required_perm.to_string()).to_api_error(&locale));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $slug:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn slug() -> &'static str {
                $slug
            }
        }
    };
}

permission!(PermCategoryRead, "category:read");
permission!(PermCategoryWrite, "category:write");
permission!(PermProductRead, "product:read");
permission!(PermProductWrite, "product:write");
permission!(PermModifierRead, "modifier:read");
permission!(PermModifierWrite, "modifier:write");
permission!(PermOrderRead, "order:read");
permission!(PermOrderWrite, "order:write");
permission!(PermInvoiceRead, "invoice:read");
permission!(PermInvoiceWrite, "invoice:write");
permission!(PermChainRead, "chain:read");
permission!(PermChainWrite, "chain:write");
