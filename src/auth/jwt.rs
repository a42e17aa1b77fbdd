use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::{Claims, TokenPurpose};
use crate::config::JwtConfig;
use crate::state::AppState;

/// Stateless HS256 issuer/verifier around the shared secret. There is no
/// revocation list; a token stays valid for its full TTL.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub access_ttl: Duration,
    pub reset_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            access_ttl_minutes,
            reset_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::from_secs((access_ttl_minutes as u64) * 60),
            reset_ttl: Duration::from_secs((reset_ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn sign_with_purpose(&self, email: &str, purpose: TokenPurpose) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match purpose {
            TokenPurpose::Access => self.access_ttl,
            TokenPurpose::Reset => self.reset_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            purpose,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(subject = %email, purpose = ?purpose, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, email: &str) -> anyhow::Result<String> {
        self.sign_with_purpose(email, TokenPurpose::Access)
    }

    pub fn sign_reset(&self, email: &str) -> anyhow::Result<String> {
        self.sign_with_purpose(email, TokenPurpose::Reset)
    }

    /// Signature is checked before any claim is inspected; expiry is exact
    /// (no leeway).
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(subject = %data.claims.sub, purpose = ?data.claims.purpose, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_reset(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.purpose != TokenPurpose::Reset {
            anyhow::bail!("not a reset token");
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    async fn make_keys() -> JwtKeys {
        let (state, _) = AppState::for_tests().await;
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_access_token() {
        let keys = make_keys().await;
        let token = keys.sign_access("a@x.com").expect("sign access");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.purpose, TokenPurpose::Access);
    }

    #[tokio::test]
    async fn verify_reset_rejects_access_token() {
        let keys = make_keys().await;
        let token = keys.sign_access("a@x.com").expect("sign access");
        let err = keys.verify_reset(&token).unwrap_err();
        assert!(err.to_string().contains("not a reset token"));
    }

    #[tokio::test]
    async fn verify_reset_accepts_reset_token() {
        let keys = make_keys().await;
        let token = keys.sign_reset("a@x.com").expect("sign reset");
        let claims = keys.verify_reset(&token).expect("verify reset");
        assert_eq!(claims.sub, "a@x.com");
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys().await;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "a@x.com".into(),
            iat: (now - 120) as usize,
            exp: (now - 30) as usize,
            purpose: TokenPurpose::Access,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_token_signed_with_other_secret() {
        let keys = make_keys().await;
        let other = EncodingKey::from_secret(b"some-other-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "a@x.com".into(),
            iat: now as usize,
            exp: (now + 600) as usize,
            purpose: TokenPurpose::Access,
        };
        let token = encode(&Header::default(), &claims, &other).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let keys = make_keys().await;
        assert!(keys.verify("not.a.jwt").is_err());
        assert!(keys.verify("").is_err());
    }
}
