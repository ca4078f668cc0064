//! Token service: signing and verifying access/refresh token pairs.
//!
//! A pure function of its inputs, the clock, and the signing secret — no
//! store interaction. Revocation is deliberately someone else's job
//! (`RevocationRegistry`), which keeps this service trivially
//! unit-testable and free of external dependencies.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use sn_shared::config::JwtConfig;

use crate::domain::entities::{Claims, Principal, TokenPair, TokenUse, TOKEN_TYPE_BEARER};
use crate::errors::{DomainError, DomainResult, TokenError};

/// A freshly issued pair together with its claim sets.
///
/// The claims are returned so the caller can record the session (jti and
/// expiry) without re-decoding the tokens it just created.
pub struct IssuedTokens {
    pub pair: TokenPair,
    pub access_claims: Claims,
    pub refresh_claims: Claims,
}

/// Service for issuing and verifying JWT pairs (HS256).
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue an access + refresh pair for a principal.
    pub fn issue_pair(&self, principal: &Principal) -> DomainResult<IssuedTokens> {
        let access_claims = Claims::new(
            principal.user_id,
            principal.role,
            TokenUse::Access,
            self.config.access_token_ttl_seconds,
            &self.config.issuer,
            &self.config.audience,
        );
        let refresh_claims = Claims::new(
            principal.user_id,
            principal.role,
            TokenUse::Refresh,
            self.config.refresh_token_ttl_seconds,
            &self.config.issuer,
            &self.config.audience,
        );

        let access_token = self.encode(&access_claims)?;
        let refresh_token = self.encode(&refresh_claims)?;

        let pair = TokenPair {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_ttl_seconds,
            access_expires_at: access_claims.expires_at(),
            refresh_expires_at: refresh_claims.expires_at(),
        };

        Ok(IssuedTokens {
            pair,
            access_claims,
            refresh_claims,
        })
    }

    fn encode(&self, claims: &Claims) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Does NOT consult the revocation registry; callers combining both
    /// checks go through `AuthService::authenticate`.
    pub fn verify(&self, token: &str) -> DomainResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let error = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            };
            DomainError::Token(error)
        })?;
        Ok(data.claims)
    }

    /// Verify an access token.
    pub fn verify_access(&self, token: &str) -> DomainResult<Claims> {
        let claims = self.verify(token)?;
        if claims.token_use != TokenUse::Access {
            return Err(DomainError::Token(TokenError::WrongTokenUse));
        }
        Ok(claims)
    }

    /// Verify a refresh token.
    pub fn verify_refresh(&self, token: &str) -> DomainResult<Claims> {
        let claims = self.verify(token)?;
        if claims.token_use != TokenUse::Refresh {
            return Err(DomainError::Token(TokenError::WrongTokenUse));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            issuer: "serena".to_string(),
            audience: "serena-api".to_string(),
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_seconds: 7 * 86_400,
        }
    }

    fn principal() -> Principal {
        Principal::new(Uuid::new_v4(), "0901234567", Role::Manager)
    }

    #[test]
    fn test_issue_pair_shape() {
        let service = TokenService::new(config());
        let issued = service.issue_pair(&principal()).unwrap();

        assert_eq!(issued.pair.token_type, "Bearer");
        assert_eq!(issued.pair.expires_in, 3600);
        assert_eq!(issued.access_claims.token_use, TokenUse::Access);
        assert_eq!(issued.refresh_claims.token_use, TokenUse::Refresh);
        assert_ne!(issued.access_claims.jti, issued.refresh_claims.jti);
        assert!(issued.pair.refresh_expires_at > issued.pair.access_expires_at);
    }

    #[test]
    fn test_verify_round_trip() {
        let service = TokenService::new(config());
        let who = principal();
        let issued = service.issue_pair(&who).unwrap();

        let claims = service.verify_access(&issued.pair.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), who.user_id);
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.jti, issued.access_claims.jti);
    }

    #[test]
    fn test_token_use_discrimination() {
        let service = TokenService::new(config());
        let issued = service.issue_pair(&principal()).unwrap();

        let err = service.verify_access(&issued.pair.refresh_token).unwrap_err();
        assert!(matches!(err, DomainError::Token(TokenError::WrongTokenUse)));

        let err = service.verify_refresh(&issued.pair.access_token).unwrap_err();
        assert!(matches!(err, DomainError::Token(TokenError::WrongTokenUse)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(config());
        let who = principal();

        // Hand-build claims already past expiry (beyond validation leeway)
        let mut claims = Claims::new(
            who.user_id,
            who.role,
            TokenUse::Access,
            3600,
            "serena",
            "serena-api",
        );
        claims.iat -= 7200;
        claims.nbf -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap();

        let err = service.verify(&token).unwrap_err();
        assert!(matches!(err, DomainError::Token(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let service = TokenService::new(config());
        let issued = service.issue_pair(&principal()).unwrap();

        let other = TokenService::new(JwtConfig {
            secret: "ffffffffffffffffffffffffffffffff".to_string(),
            ..config()
        });
        let err = other.verify(&issued.pair.access_token).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Token(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = TokenService::new(config());
        for garbage in ["", "not-a-jwt", "aaa.bbb.ccc"] {
            let err = service.verify(garbage).unwrap_err();
            assert!(matches!(err, DomainError::Token(TokenError::Malformed)));
        }
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let service = TokenService::new(config());
        let issued = service.issue_pair(&principal()).unwrap();

        let other = TokenService::new(JwtConfig {
            audience: "different-api".to_string(),
            ..config()
        });
        assert!(other.verify(&issued.pair.access_token).is_err());
    }
}
