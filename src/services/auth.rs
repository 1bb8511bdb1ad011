// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::identity::{CallerIdentity, Claims},
};

// A emissão do token fica com o serviço de login; aqui só validamos e
// montamos a identidade do chamador.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<CallerIdentity, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Loja sem rede resolvível: token mal emitido, nunca escopo global
        let identity = CallerIdentity::from_claims(token_data.claims);
        if identity.has_unresolved_chain() {
            tracing::warn!("⚠️ Token do usuário {} com loja e sem rede", identity.id);
            return Err(AppError::InvalidToken);
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "segredo-de-teste";

    fn token(secret: &str, chain_id: Option<Uuid>, expires_in: i64) -> String {
        scoped_token(secret, chain_id, None, expires_in)
    }

    fn scoped_token(
        secret: &str,
        chain_id: Option<Uuid>,
        store_id: Option<Uuid>,
        expires_in: i64,
    ) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "quanly.tch".into(),
            email: "quanly@tch.vn".into(),
            chain_id,
            store_id,
            roles: vec![],
            permissions: vec!["product:read".into()],
            exp: (now + expires_in) as usize,
            iat: now as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref())).unwrap()
    }

    #[test]
    fn valid_token_yields_identity() {
        let chain = Uuid::new_v4();
        let service = AuthService::new(SECRET.into());

        let identity = service.validate_token(&token(SECRET, Some(chain), 3600)).unwrap();
        assert_eq!(identity.chain_id, Some(chain));
        assert!(identity.has_permission("product:read"));
        assert!(!identity.has_permission("product:write"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let service = AuthService::new(SECRET.into());
        let err = service.validate_token(&token("outro", None, 3600)).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = AuthService::new(SECRET.into());
        let err = service.validate_token(&token(SECRET, None, -3600)).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn store_without_chain_is_rejected() {
        let service = AuthService::new(SECRET.into());
        let err = service
            .validate_token(&scoped_token(SECRET, None, Some(Uuid::new_v4()), 3600))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
