/*!
 * # Authentication
 *
 * Email/password accounts with argon2 hashes and HS256 bearer tokens.
 *
 * - [`AuthService`] registers users, checks credentials and issues/validates tokens
 * - [`middleware`] layers resolve the bearer token into an [`AuthUser`]
 * - [`AuthUser`] / [`OptionalAuthUser`] extract the caller inside handlers
 */

use std::sync::Arc;
use std::time::Duration;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::db::is_unique_violation;
use crate::entities::{
    company::{self, CompanyType},
    user::{self, UserStatus, UserType},
};
use crate::errors::ServiceError;

pub mod middleware;
pub mod password;

pub use middleware::{auth_middleware, optional_auth_middleware, AuthRouterExt};

/// JWT claims carried in every bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub user_type: UserType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated caller resolved from a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub user_type: UserType,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_any_role(&self, roles: &[UserType]) -> bool {
        roles.contains(&self.user_type)
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            email: claims.email,
            user_type: claims.user_type,
            token_id: claims.jti,
        })
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

/// Caller on routes where a token is optional
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthUser>().cloned()))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth | AuthError::InvalidToken | AuthError::TokenExpired => {
                ServiceError::Unauthorized(err.to_string())
            }
            AuthError::InsufficientPermissions => ServiceError::Forbidden(err.to_string()),
            AuthError::TokenCreation(msg) => ServiceError::JwtError(msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_issuer.clone(),
            cfg.jwt_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    #[schema(example = "buyer@demo.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub user_type: UserType,
    pub company_id: Option<Uuid>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub company_type: CompanyType,
    pub logo: Option<String>,
}

impl From<company::Model> for CompanySummary {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            company_type: model.company_type,
            logo: model.logo,
        }
    }
}

/// Public view of an account; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub user_type: UserType,
    pub status: UserStatus,
    pub email_verified: bool,
    pub phone_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanySummary>,
}

impl UserProfile {
    pub fn new(user: user::Model, company: Option<company::Model>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            avatar: user.avatar,
            user_type: user.user_type,
            status: user.status,
            email_verified: user.email_verified,
            phone_verified: user.phone_verified,
            company: company.map(CompanySummary::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Signs an HS256 token for the user
    pub fn issue_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(self.config.token_expiration)
            .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            user_type: user.user_type,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verifies signature, expiry, issuer and audience
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.validate_nbf = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email, user_type = ?request.user_type))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db;

        if request.user_type == UserType::Admin {
            warn!("rejected self-registration as admin");
            return Err(ServiceError::Forbidden(
                "Administrator accounts cannot be self-registered".to_string(),
            ));
        }

        let email = normalize_email(&request.email);
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let company = match request.company_id {
            Some(company_id) => Some(
                company::Entity::find_by_id(company_id)
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Company with ID {} not found",
                            company_id
                        ))
                    })?,
            ),
            None => None,
        };

        let password_hash = password::hash_password(request.password).await?;
        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            phone: Set(request.phone),
            avatar: Set(None),
            user_type: Set(request.user_type),
            status: Set(UserStatus::Pending),
            email_verified: Set(false),
            phone_verified: Set(false),
            company_id: Set(request.company_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::Conflict("User with this email already exists".to_string())
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user registered");

        Ok(AuthResponse {
            user: UserProfile::new(user, company),
            token,
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        request.validate()?;

        let found = user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(&request.email)))
            .find_also_related(company::Entity)
            .one(&*self.db)
            .await?;

        let Some((user, company)) = found else {
            return Err(ServiceError::InvalidCredentials);
        };

        if !password::verify_password(request.password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.status.can_login() {
            warn!(user_id = %user.id, status = ?user.status, "inactive account tried to sign in");
            return Err(ServiceError::Unauthorized("Account is not active".to_string()));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user signed in");

        Ok(AuthResponse {
            user: UserProfile::new(user, company),
            token,
        })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        let (user, company) = user::Entity::find_by_id(user_id)
            .find_also_related(company::Entity)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User not found".to_string()))?;

        Ok(UserProfile::new(user, company))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DatabaseConnection;

    fn service(secret: &str, ttl: Duration) -> AuthService {
        AuthService::new(
            AuthConfig::new(
                secret.to_string(),
                "marketplace-api".to_string(),
                "marketplace-clients".to_string(),
                ttl,
            ),
            Arc::new(DatabaseConnection::Disconnected),
        )
    }

    fn sample_user(user_type: UserType) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            email: "supplier@demo.com".to_string(),
            password_hash: String::new(),
            first_name: "Anna".to_string(),
            last_name: "Kalnina".to_string(),
            phone: None,
            avatar: None,
            user_type,
            status: UserStatus::Active,
            email_verified: true,
            phone_verified: false,
            company_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_token_round_trips_to_auth_user() {
        let auth = service("unit-test-secret-with-plenty-of-entropy-0123456789", Duration::from_secs(600));
        let user = sample_user(UserType::Supplier);

        let token = auth.issue_token(&user).unwrap();
        let claims = auth.validate_token(&token).unwrap();
        let auth_user = AuthUser::try_from(claims).unwrap();

        assert_eq!(auth_user.user_id, user.id);
        assert_eq!(auth_user.user_type, UserType::Supplier);
        assert!(auth_user.has_any_role(&[UserType::Supplier, UserType::Admin]));
        assert!(!auth_user.is_admin());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = service("first-secret-with-plenty-of-entropy-0123456789", Duration::from_secs(600));
        let verifier = service("second-secret-with-plenty-of-entropy-9876543210", Duration::from_secs(600));

        let token = issuer.issue_token(&sample_user(UserType::Buyer)).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let auth = service("unit-test-secret-with-plenty-of-entropy-0123456789", Duration::from_secs(600));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "buyer@demo.com".to_string(),
            user_type: UserType::Buyer,
            jti: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
            nbf: now - 7200,
            iss: "marketplace-api".to_string(),
            aud: "marketplace-clients".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret-with-plenty-of-entropy-0123456789"),
        )
        .unwrap();

        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn auth_errors_map_to_http_statuses() {
        use axum::http::StatusCode;
        assert_eq!(
            ServiceError::from(AuthError::MissingAuth).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::from(AuthError::InsufficientPermissions).status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
