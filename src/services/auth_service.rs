//! Account service - signup, login and token verification.
//!
//! Passwords are hashed through the domain `Password` value object and
//! tokens are HS256 JWTs carrying `{ user: { id }, iat, exp }`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Identity embedded in a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsUser {
    pub id: Uuid,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: ClaimsUser,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Account service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and sign them in
    async fn signup(&self, name: String, email: String, password: String)
        -> AppResult<AuthSession>;

    /// Check credentials and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Verify signature and expiry, returning the claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn issue_token(user_id: Uuid, config: &Config) -> AppResult<AuthSession> {
    let now = Utc::now();
    let lifetime = Duration::try_hours(config.jwt_expiration_hours)
        .ok_or_else(|| AppError::internal("Token lifetime out of range"))?;
    let expires_at = now
        .checked_add_signed(lifetime)
        .ok_or_else(|| AppError::internal("Token expiry out of range"))?;

    let claims = Claims {
        user: ClaimsUser { id: user_id },
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(AuthSession {
        user_id,
        token,
        expires_in: lifetime.num_seconds(),
    })
}

fn decode_token(token: &str, config: &Config) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        AppError::InvalidToken
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn signup(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<AuthSession> {
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateUser);
        }

        let password_hash = Password::new(&password)?.into_string();
        // The unique index still catches a concurrent signup for the same email
        let user = self.uow.users().create(name, email, password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        issue_token(user.id, &self.config)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let user: User = self
            .uow
            .users()
            .find_by_email(&email)
            .await?
            .ok_or(AppError::UnknownUser)?;

        if !Password::from_hash(user.password_hash.clone()).verify(&password) {
            return Err(AppError::BadCredentials);
        }

        issue_token(user.id, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode_token(token, &self.config)
    }
}
