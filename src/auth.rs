// src/auth.rs
use crate::core::config_manager::IdentityConfig;
use crate::session::SessionIdentity;
use anyhow::Result;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub exp: usize,
    pub iat: Option<usize>,
}

impl From<Claims> for SessionIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            primary_email: claims.email,
            full_name: claims.name,
            image_url: claims.picture,
        }
    }
}

pub struct AuthConfig {
    pub issuer: String,
    pub audience: Option<String>,
    pub keys_url: String,
    pub signing_keys: HashMap<String, String>, // kid -> public key PEM
}

impl AuthConfig {
    pub fn new(identity: &IdentityConfig) -> Self {
        Self {
            issuer: identity.issuer.clone(),
            audience: identity.audience.clone(),
            keys_url: identity.keys_url.clone(),
            signing_keys: HashMap::new(),
        }
    }

    /// Fetch the identity provider's public keys for session token verification
    pub async fn update_keys(&mut self) -> Result<()> {
        let response = reqwest::get(&self.keys_url).await?.error_for_status()?;
        let keys: HashMap<String, String> = response.json().await?;

        info!("Loaded {} identity provider signing keys", keys.len());
        self.signing_keys = keys;
        Ok(())
    }

    pub fn verify_token(&self, token: &str) -> Result<SessionIdentity> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| anyhow::anyhow!("Missing kid in token header"))?;

        let public_key = self
            .signing_keys
            .get(&kid)
            .ok_or_else(|| anyhow::anyhow!("Unknown key ID: {}", kid))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())?;
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;

        Ok(token_data.claims.into())
    }
}

/// Identity provider session attached to a request
pub struct AuthenticatedIdentity {
    pub identity: SessionIdentity,
}

impl AuthenticatedIdentity {
    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    ConfigurationMissing,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::ConfigurationMissing => "Authentication is not configured",
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedIdentity {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => {
                return Outcome::Error((status, AuthError::ConfigurationMissing))
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token,
                None => {
                    warn!("Invalid Authorization header format");
                    return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
                }
            },
            None => {
                warn!("Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        match auth_config.verify_token(token) {
            Ok(identity) => {
                info!("Identity {} authenticated", identity.id);
                Outcome::Success(AuthenticatedIdentity { identity })
            }
            Err(e) => {
                error!("Token verification failed: {}", e);
                Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed))
            }
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalIdentity {
    pub identity: Option<AuthenticatedIdentity>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalIdentity {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedIdentity::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalIdentity {
                identity: Some(auth),
            }),
            _ => Outcome::Success(OptionalIdentity { identity: None }),
        }
    }
}

/// Hash a credential into a PHC string (argon2id)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to build password salt: {}", e))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Stored password hash is invalid: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
