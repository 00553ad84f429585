use serde::Deserialize;

use crate::error::ThingsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub sub: String,
    pub name: String,
    pub email: String,
}

/// Turns an identity provider token into a verified subject.
#[rocket::async_trait]
pub(crate) trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ThingsError>;
}

pub(crate) type Identity = Box<dyn IdentityVerifier>;

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
    email: String,
    name: String,
}

pub(crate) struct GoogleIdentity {
    parser: jsonwebtoken_google::Parser,
}

impl GoogleIdentity {
    pub(crate) fn new(client_id: &str) -> GoogleIdentity {
        GoogleIdentity {
            parser: jsonwebtoken_google::Parser::new(client_id),
        }
    }
}

#[rocket::async_trait]
impl IdentityVerifier for GoogleIdentity {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ThingsError> {
        let claims = self
            .parser
            .parse::<TokenClaims>(token)
            .await
            .map_err(|_| ThingsError::InvalidToken)?;

        Ok(VerifiedIdentity {
            sub: claims.sub,
            name: claims.name,
            email: claims.email,
        })
    }
}
