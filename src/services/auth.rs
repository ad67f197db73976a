use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tokio::task;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify,
};

use crate::{
    config::{AuthConfig, JwtConfig},
    entities::{users, RoleEnum, UserEntity},
    errors::{ApiError, ApiResult},
    schemas::auth::{AuthToken, LoginRequest, RegisterRequest},
    services::database::DatabaseConnection,
};

/// JWT claims carried by every admin token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub id: i32,
    pub role: RoleEnum,
    pub exp: usize,
}

impl Claims {
    pub fn new(user: &users::Model, jwt_config: &JwtConfig) -> Self {
        let exp = Utc::now().timestamp() as usize + jwt_config.expiration as usize;
        Self {
            sub: user.username.clone(),
            id: user.id,
            role: user.role,
            exp,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == RoleEnum::Admin
    }
}

/// Registers the `bearer_auth` scheme referenced by protected routes
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert(Default::default());
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub struct AuthService;

impl AuthService {
    pub fn create_access_token(user: &users::Model, jwt_config: &JwtConfig) -> ApiResult<String> {
        let claims = Claims::new(user, jwt_config);

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_config.secret.as_ref()),
        )
        .map_err(|e| {
            tracing::error!("Failed to sign token for user {}: {}", user.id, e);
            ApiError::Internal("Failed to sign token".to_string())
        })
    }

    /// Decodes and checks signature and expiry. The error is a short reason for the logs.
    pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, String> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt_config.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "token expired".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => "bad signature".to_string(),
            _ => "invalid token".to_string(),
        })
    }

    /// bcrypt is CPU bound, so both directions run on the blocking pool.
    pub async fn hash_password(password: String, cost: u32) -> ApiResult<String> {
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|_| ApiError::Internal("Password hashing task failed".to_string()))?
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {e}")))
    }

    pub async fn verify_password(password: String, hashed: String) -> ApiResult<bool> {
        task::spawn_blocking(move || bcrypt::verify(password, &hashed))
            .await
            .map_err(|_| ApiError::Internal("Password check task failed".to_string()))?
            .map_err(|e| ApiError::Internal(format!("Password check failed: {e}")))
    }

    /// Creates an admin account when the caller knows the registration key.
    pub async fn register(
        db: &DatabaseConnection,
        auth_config: &AuthConfig,
        data: RegisterRequest,
    ) -> ApiResult<users::Model> {
        if data.admin_key != auth_config.registration_key {
            tracing::warn!("Rejected registration for {}: wrong admin key", data.username);
            return Err(ApiError::Forbidden("Invalid admin key".to_string()));
        }

        let taken = UserEntity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(&data.email))
                    .add(users::Column::Username.eq(&data.username)),
            )
            .count(db.as_ref())
            .await?;
        if taken > 0 {
            return Err(ApiError::Conflict(
                "A user with this email or username already exists".to_string(),
            ));
        }

        let hashed_password = Self::hash_password(data.password, auth_config.bcrypt_cost).await?;

        let user = users::ActiveModel {
            username: Set(data.username),
            email: Set(data.email),
            name: Set(data.name),
            hashed_password: Set(hashed_password),
            role: Set(RoleEnum::Admin),
            created_at: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {}", e);
            ApiError::Database(format!("Failed to create user: {e}"))
        })?;

        tracing::info!("Registered admin account {} (id={})", user.username, user.id);
        Ok(user)
    }

    pub async fn login(
        db: &DatabaseConnection,
        jwt_config: &JwtConfig,
        data: LoginRequest,
    ) -> ApiResult<AuthToken> {
        let column = if data.username_or_email.contains('@') {
            users::Column::Email
        } else {
            users::Column::Username
        };

        let user = UserEntity::find()
            .filter(column.eq(&data.username_or_email))
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = Self::verify_password(data.password, user.hashed_password.clone()).await?;
        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = Self::create_access_token(&user, jwt_config)?;

        let db = db.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            if let Err(e) = Self::update_last_login(&db, user_id).await {
                tracing::warn!("Failed to record last login for user {}: {}", user_id, e);
            }
        });

        Ok(AuthToken {
            access_token: token,
            expires_in: jwt_config.expiration,
        })
    }

    pub async fn update_last_login(db: &DatabaseConnection, user_id: i32) -> ApiResult<()> {
        users::ActiveModel {
            id: Set(user_id),
            last_login: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(db.as_ref())
        .await
        .map(|_| ())
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> users::Model {
        users::Model {
            id: 7,
            username: "lens".to_string(),
            email: "lens@example.com".to_string(),
            name: "Lens".to_string(),
            hashed_password: String::new(),
            role: RoleEnum::Admin,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_string(),
            expiration: 3600,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let token = AuthService::create_access_token(&admin(), &jwt()).unwrap();
        let claims = AuthService::verify_token(&token, &jwt()).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.sub, "lens");
        assert!(claims.is_admin());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = AuthService::create_access_token(&admin(), &jwt()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            expiration: 3600,
        };
        assert_eq!(
            AuthService::verify_token(&token, &other).unwrap_err(),
            "bad signature"
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "lens".to_string(),
            id: 7,
            role: RoleEnum::Admin,
            exp: (Utc::now().timestamp() - 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt().secret.as_ref()),
        )
        .unwrap();
        assert_eq!(
            AuthService::verify_token(&token, &jwt()).unwrap_err(),
            "token expired"
        );
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = AuthService::hash_password("hunter22".to_string(), 4)
            .await
            .unwrap();
        assert!(AuthService::verify_password("hunter22".to_string(), hashed.clone())
            .await
            .unwrap());
        assert!(!AuthService::verify_password("wrong".to_string(), hashed)
            .await
            .unwrap());
    }
}
