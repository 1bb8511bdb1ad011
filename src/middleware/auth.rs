// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::identity::CallerIdentity,
    services::tenant_filter::has_global_scope,
};

// O middleware em si: valida o Bearer e pendura a identidade na requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

    let identity = app_state
        .auth_service
        .validate_token(token.token())
        .map_err(|e| e.to_api_error(&locale))?;

    // Escopo global sem SUPER_ADMIN costuma ser token mal emitido
    if has_global_scope(&identity) && !identity.is_super_admin() {
        tracing::warn!(
            "⚠️ Usuário {} sem rede e sem SUPER_ADMIN: acesso com escopo global",
            identity.id
        );
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// Extrator para obter o chamador autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CallerIdentity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts.extensions.get::<CallerIdentity>().cloned();
        match identity {
            Some(identity) => Ok(AuthenticatedUser(identity)),
            None => {
                let locale = Locale::from_request_parts(parts, state)
                    .await
                    .unwrap_or_default();
                Err(AppError::InvalidToken.to_api_error(&locale))
            }
        }
    }
}
