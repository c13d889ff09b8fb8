//! Authentication and authorization.
//!
//! JWT bearer tokens (HS256) with refresh-token rotation, argon2 password
//! hashing, and role-based permission checks. `auth_middleware` resolves the
//! bearer token into an [`AuthUser`] stored in request extensions;
//! `AuthRouterExt::with_permission` gates whole route groups.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{refresh_token, user};

pub mod roles;

pub use roles::{consts, permissions_for_role, role};

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub permissions: Vec<String>,
    /// Dealer scope for dealer-side users
    pub dealer_id: Option<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated principal extracted from the JWT token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub permissions: Vec<String>,
    pub dealer_id: Option<Uuid>,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role_name: &str) -> bool {
        self.role == role_name
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(role::ADMIN)
    }

    /// Dealer ownership check. ADMIN and EVM_STAFF see every dealer's data.
    pub fn can_access_dealer(&self, dealer_id: Uuid) -> bool {
        if self.is_admin() || self.has_role(role::EVM_STAFF) {
            return true;
        }
        self.dealer_id == Some(dealer_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer: "evdms-auth".to_string(),
            jwt_audience: "evdms-api".to_string(),
            access_token_expiration,
            refresh_token_expiration,
        }
    }
}

/// Token blacklist entry for revoked access tokens.
#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Authentication service handling token issuance and validation.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

fn hash_jti(jti: &str) -> String {
    hex::encode(Sha256::digest(jti.as_bytes()))
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        PasswordHash::new(password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Generate an access/refresh token pair for a user.
    pub async fn generate_token(&self, user: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let access_jti = Uuid::new_v4().to_string();
        let refresh_jti = Uuid::new_v4().to_string();
        let permissions = permissions_for_role(&user.role);

        let access_claims = Claims {
            sub: user.id.to_string(),
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            role: user.role.clone(),
            permissions,
            dealer_id: user.dealer_id.map(|id| id.to_string()),
            jti: access_jti,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        // Refresh tokens carry minimal data
        let refresh_claims = Claims {
            sub: user.id.to_string(),
            name: None,
            email: None,
            role: user.role.clone(),
            permissions: vec![],
            dealer_id: user.dealer_id.map(|id| id.to_string()),
            jti: refresh_jti.clone(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = encode(&Header::new(Algorithm::HS256), &access_claims, &key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;
        let refresh_token = encode(&Header::new(Algorithm::HS256), &refresh_claims, &key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        self.store_refresh_token(user.id, &refresh_jti, refresh_exp)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT and return its claims.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.clone()]);
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_token_blacklisted(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Rotate a refresh token into a fresh token pair.
    pub async fn refresh_token(&self, refresh_token_str: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate_token(refresh_token_str).await?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        if !self.verify_refresh_token(user_id, &claims.jti).await? {
            return Err(AuthError::InvalidToken);
        }

        let user = self.get_user(user_id).await?;
        let new_tokens = self.generate_token(&user).await?;
        self.revoke_refresh_token(user_id, &claims.jti).await?;

        Ok(new_tokens)
    }

    /// Blacklist an access token until its natural expiry.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.validate_token(token).await?;
        let expiry = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.push(BlacklistedToken {
            jti: claims.jti,
            expiry,
        });
        let now = Utc::now();
        blacklist.retain(|t| t.expiry > now);
        Ok(())
    }

    async fn is_token_blacklisted(&self, token_id: &str) -> bool {
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist.iter().any(|t| t.jti == token_id)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, AuthError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        match found {
            Some(u) if u.active => Ok(u),
            Some(_) => Err(AuthError::InvalidCredentials),
            None => Err(AuthError::UserNotFound),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<user::Model>, AuthError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        jti: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let model = refresh_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            jti_hash: Set(hash_jti(jti)),
            expires_at: Set(expiry),
            revoked: Set(false),
            created_at: Set(Utc::now()),
        };
        model
            .insert(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        debug!(%user_id, "stored refresh token");
        Ok(())
    }

    async fn verify_refresh_token(&self, user_id: Uuid, jti: &str) -> Result<bool, AuthError> {
        let found = refresh_token::Entity::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::JtiHash.eq(hash_jti(jti)))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(matches!(found, Some(t) if !t.revoked && t.expires_at > Utc::now()))
    }

    async fn revoke_refresh_token(&self, user_id: Uuid, jti: &str) -> Result<(), AuthError> {
        let found = refresh_token::Entity::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::JtiHash.eq(hash_jti(jti)))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        if let Some(token) = found {
            let mut active: refresh_token::ActiveModel = token.into();
            active.revoked = Set(true);
            active
                .update(&*self.db)
                .await
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token has been revoked")]
    RevokedToken,
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Authentication token has been revoked".to_string(),
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Token creation failed".to_string(),
            ),
            Self::UserNotFound => (
                StatusCode::NOT_FOUND,
                "AUTH_USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::EmailTaken => (
                StatusCode::CONFLICT,
                "AUTH_EMAIL_TAKEN",
                "Email already registered".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "AUTH_VALIDATION_ERROR",
                msg.clone(),
            ),
            Self::DatabaseError(_) | Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));
        (status, body).into_response()
    }
}

/// Middleware that resolves the bearer token into an [`AuthUser`] request
/// extension. Requires an `Arc<AuthService>` extension injected upstream.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    let token = match token {
        Some(token) => token,
        None => return AuthError::MissingAuth.into_response(),
    };

    match auth_service.validate_token(&token).await {
        Ok(claims) => {
            let user_id = match Uuid::parse_str(&claims.sub) {
                Ok(id) => id,
                Err(_) => return AuthError::InvalidToken.into_response(),
            };
            let auth_user = AuthUser {
                user_id,
                name: claims.name,
                email: claims.email,
                role: claims.role,
                permissions: claims.permissions,
                dealer_id: claims.dealer_id.and_then(|d| Uuid::parse_str(&d).ok()),
                token_id: claims.jti,
            };
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware enforcing a single permission for a route group. Admin role
/// bypasses the check.
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if !user.is_admin() && !user.has_permission(&required_permission) {
        warn!(
            user_id = %user.user_id,
            permission = %required_permission,
            "permission denied"
        );
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

/// Authentication routes (`/auth/*`)
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new()
        .route("/register", axum::routing::post(register_handler))
        .route("/login", axum::routing::post(login_handler))
        .route("/refresh", axum::routing::post(refresh_token_handler))
        .route("/logout", axum::routing::post(logout_handler))
        .route("/validate", axum::routing::get(validate_handler))
}

async fn register_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    if auth_service
        .get_user_by_email(&request.email)
        .await?
        .is_some()
    {
        return Err(AuthError::EmailTaken);
    }

    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(request.name),
        email: Set(request.email.clone()),
        password_hash: Set(auth_service.hash_password(&request.password)?),
        // Self-registration always yields a customer account; staff and
        // dealer accounts are provisioned by an admin.
        role: Set(role::CUSTOMER.to_string()),
        dealer_id: Set(None),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(Some(now)),
    };
    let created = model
        .insert(&*auth_service.db)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    info!(user_id = %created.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": created.id,
            "email": created.email,
            "role": created.role,
        })),
    ))
}

async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<TokenPair>, AuthError> {
    credentials
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let user = auth_service
        .get_user_by_email(&credentials.email)
        .await?
        .filter(|u| u.active)
        .ok_or(AuthError::InvalidCredentials)?;

    if !auth_service.verify_password(&credentials.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    let token_pair = auth_service.generate_token(&user).await?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(token_pair))
}

async fn refresh_token_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let token_pair = auth_service.refresh_token(&request.refresh_token).await?;
    Ok(Json(token_pair))
}

async fn logout_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: axum::http::HeaderMap,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<Json<serde_json::Value>, AuthError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingAuth)?;

    auth_service.revoke_token(bearer).await?;

    // Also retire the refresh token when the client supplies it
    if let Some(Json(request)) = body {
        if let Ok(claims) = auth_service.validate_token(&request.refresh_token).await {
            if let Ok(user_id) = Uuid::parse_str(&claims.sub) {
                auth_service
                    .revoke_refresh_token(user_id, &claims.jti)
                    .await?;
            }
        }
    }

    Ok(Json(
        serde_json::json!({ "message": "Successfully logged out" }),
    ))
}

async fn validate_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: axum::http::HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingAuth)?;

    let claims = auth_service.validate_token(bearer).await?;
    Ok(Json(serde_json::json!({
        "valid": true,
        "sub": claims.sub,
        "role": claims.role,
        "dealer_id": claims.dealer_id,
        "expires_at": claims.exp,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let config = AuthConfig::new(
            "unit-test-secret-key-that-is-long-enough-for-the-validator-0123".into(),
            Duration::from_secs(3600),
            Duration::from_secs(86400),
        );
        AuthService::new(config, Arc::new(DatabaseConnection::Disconnected))
    }

    fn sample_user() -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            name: "Staff".into(),
            email: "staff@example.com".into(),
            password_hash: String::new(),
            role: role::EVM_STAFF.into(),
            dealer_id: None,
            active: true,
            created_at: now,
            updated_at: Some(now),
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let svc = service();
        let hash = svc.hash_password("correct horse").unwrap();
        assert!(svc.verify_password("correct horse", &hash));
        assert!(!svc.verify_password("wrong horse", &hash));
    }

    #[test]
    fn dealer_scope_checks() {
        let dealer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut user = AuthUser {
            user_id: Uuid::new_v4(),
            name: None,
            email: None,
            role: role::DEALER_MANAGER.into(),
            permissions: permissions_for_role(role::DEALER_MANAGER),
            dealer_id: Some(dealer),
            token_id: "jti".into(),
        };
        assert!(user.can_access_dealer(dealer));
        assert!(!user.can_access_dealer(other));

        user.role = role::EVM_STAFF.into();
        assert!(user.can_access_dealer(other));
    }

    #[test]
    fn claims_contain_role_permissions() {
        let user = sample_user();
        let perms = permissions_for_role(&user.role);
        assert!(perms.contains(&consts::QUOTATIONS_TRANSITION.to_string()));
    }

    #[tokio::test]
    async fn validate_rejects_garbage_token() {
        let svc = service();
        assert!(matches!(
            svc.validate_token("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
