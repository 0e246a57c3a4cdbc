//! Bearer authentication.
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`) and a random `jti`.
//! Logging out stores the `jti` as revoked until the token would expire on
//! its own.

use api_types::{
    Status,
    auth::{Credentials, Session, UserView},
};
use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use email_address::EmailAddress;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

const MIN_PASSWORD_LEN: usize = 6;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;

/// Authentication parameters.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Signing keys derived once from [`AuthSettings`].
pub(crate) struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthKeys {
    pub(crate) fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            ttl: Duration::try_hours(settings.token_ttl_hours).unwrap_or_else(|| {
                tracing::warn!(
                    token_ttl_hours = settings.token_ttl_hours,
                    "token ttl out of range, using the default"
                );
                Duration::hours(DEFAULT_TOKEN_TTL_HOURS)
            }),
            bcrypt_cost: settings.bcrypt_cost,
        }
    }
}

/// The contents of a token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    jti: String,
    iat: i64,
    exp: i64,
}

/// The caller of a protected route, inserted by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

fn issue_token(keys: &AuthKeys, user_id: Uuid) -> Result<(String, DateTime<Utc>), ServerError> {
    let now = Utc::now();
    let expires_at = now.checked_add_signed(keys.ttl).ok_or_else(|| {
        tracing::error!("token expiry out of range");
        ServerError::Internal("token error".to_string())
    })?;
    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(|err| {
        tracing::error!("failed to sign token: {err}");
        ServerError::Internal("token error".to_string())
    })?;
    Ok((token, expires_at))
}

fn verify_token(keys: &AuthKeys, token: &str) -> Option<AuthUser> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::new(Algorithm::HS256)).ok()?;
    let user_id = Uuid::parse_str(&data.claims.sub).ok()?;
    let expires_at = Utc.timestamp_opt(data.claims.exp, 0).single()?;
    Some(AuthUser {
        user_id,
        jti: data.claims.jti,
        expires_at,
    })
}

/// Rejects requests without a valid, unrevoked bearer token.
pub(crate) async fn require_auth(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthorized("missing bearer token".to_string()));
    };
    let user = verify_token(&state.auth, bearer.token().trim())
        .ok_or_else(|| ServerError::Unauthorized("invalid token".to_string()))?;
    if state.engine.is_token_revoked(&user.jti).await? {
        return Err(ServerError::Unauthorized("token revoked".to_string()));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn hash_password(password: String, cost: u32) -> Result<String, ServerError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| {
            tracing::error!("password hashing task failed: {err}");
            ServerError::Internal("hash error".to_string())
        })?
        .map_err(|err| {
            tracing::error!("failed to hash password: {err}");
            ServerError::Internal("hash error".to_string())
        })
}

async fn verify_password(password: String, hash: String) -> Result<bool, ServerError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| {
            tracing::error!("password verification task failed: {err}");
            ServerError::Internal("hash error".to_string())
        })?
        .map_err(|err| {
            tracing::error!("failed to verify password: {err}");
            ServerError::Internal("hash error".to_string())
        })
}

fn session(keys: &AuthKeys, user: engine::User) -> Result<Session, ServerError> {
    let (token, expires_at) = issue_token(keys, user.id)?;
    Ok(Session {
        user: UserView {
            id: user.id,
            email: user.email,
        },
        token,
        expires_at,
    })
}

/// Handle requests for creating a new user.
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Session>), ServerError> {
    let Json(payload) = payload?;
    let email = payload.email.trim();
    if !EmailAddress::is_valid(email) {
        return Err(ServerError::BadRequest {
            message: "invalid payload".to_string(),
            details: Some("email must be a valid address".to_string()),
        });
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServerError::BadRequest {
            message: "invalid payload".to_string(),
            details: Some(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )),
        });
    }
    if state.engine.user_by_email(email).await?.is_some() {
        return Err(engine::EngineError::ExistingKey("email already registered".to_string()).into());
    }

    let hash = hash_password(payload.password, state.auth.bcrypt_cost).await?;
    let user = state.engine.register_user(email, &hash).await?;
    Ok((StatusCode::CREATED, Json(session(&state.auth, user)?)))
}

/// Handle requests for exchanging credentials for a token.
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, ServerError> {
    let Json(payload) = payload?;
    let invalid = || ServerError::Unauthorized("invalid credentials".to_string());

    let user = state
        .engine
        .user_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(payload.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }
    Ok(Json(session(&state.auth, user)?))
}

/// Handle requests for revoking the caller's token.
pub async fn logout(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Status>, ServerError> {
    state
        .engine
        .revoke_token(user.user_id, &user.jti, user.expires_at)
        .await?;
    tracing::debug!(user_id = %user.user_id, "token revoked");
    Ok(Json(Status::ok()))
}
