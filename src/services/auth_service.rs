use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    audit,
    config::{AppConfig, AuthStrategy},
    credentials::{hash_password, verify_password},
    db::DbPool,
    dto::auth::{
        AdminLoginRequest, Claims, LoginRequest, LoginResponse, RegisterRequest,
        RotatePasswordRequest, UserResponse,
    },
    error::{AppError, AppResult},
    middleware::auth::{ROLE_ADMIN, ROLE_USER, SESSION_ADMIN_KEY, AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    services::require_text,
    state::AppState,
};

const TOKEN_TTL_HOURS: i64 = 24;

fn require_token_mode(state: &AppState) -> AppResult<()> {
    if state.config.auth_strategy != AuthStrategy::Token {
        return Err(AppError::Validation(
            "user accounts are disabled in session mode".into(),
        ));
    }
    Ok(())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    require_token_mode(state)?;
    require_text(&payload.email, "email")?;
    require_text(&payload.password, "password")?;

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::Validation("email is already taken".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.email.as_str())
    .bind(password_hash)
    .bind(ROLE_USER)
    .fetch_one(&state.pool)
    .await?;

    audit::try_record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        UserResponse::from(user),
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    require_token_mode(state)?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    let Some(user) = user else {
        return Err(AppError::Unauthenticated);
    };
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthenticated);
    }

    let token = issue_token(&state.config.jwt_secret, user.id, &user.role)?;

    audit::try_record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}

fn issue_token(secret: &str, user_id: Uuid, role: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to compute expiry")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Session-strategy admin login: verify against the credential store and mark
/// the session. Wrong credentials are a 401.
pub async fn admin_login(
    state: &AppState,
    session: &Session,
    payload: AdminLoginRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if state.config.auth_strategy != AuthStrategy::Session {
        return Err(AppError::Validation(
            "session login is disabled in token mode".into(),
        ));
    }

    if !state.credentials.verify(&payload.username, &payload.password) {
        return Err(AppError::Unauthenticated);
    }

    session
        .insert(SESSION_ADMIN_KEY, true)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;

    audit::try_record(
        &state.pool,
        None,
        "admin_login",
        "sessions",
        serde_json::json!({}),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn admin_logout(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<serde_json::Value>> {
    session
        .flush()
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;

    audit::try_record(
        &state.pool,
        None,
        "admin_logout",
        "sessions",
        serde_json::json!({}),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Rotate the admin password without touching configuration: the in-memory
/// credential store in session mode, the caller's user row in token mode.
pub async fn rotate_admin_password(
    state: &AppState,
    user: &AuthUser,
    payload: RotatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    require_text(&payload.new_password, "new_password")?;

    match state.config.auth_strategy {
        AuthStrategy::Session => state.credentials.rotate(&payload.new_password)?,
        AuthStrategy::Token => {
            let subject = user.subject.ok_or(AppError::Forbidden)?;
            let password_hash = hash_password(&payload.new_password)?;
            let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
                .bind(subject)
                .bind(password_hash)
                .execute(&state.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound);
            }
        }
    }

    audit::try_record(
        &state.pool,
        user.subject,
        "admin_password_rotate",
        "credentials",
        serde_json::json!({}),
    )
    .await;

    Ok(ApiResponse::success(
        "Password updated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Startup bootstrap for the token strategy: make sure the configured admin
/// account exists with the admin role.
pub async fn ensure_admin_account(pool: &DbPool, config: &AppConfig) -> anyhow::Result<()> {
    if config.auth_strategy != AuthStrategy::Token {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password)?;
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&config.admin_username)
    .bind(password_hash)
    .bind(ROLE_ADMIN)
    .execute(pool)
    .await?;

    tracing::info!(admin = %config.admin_username, "admin account ensured");
    Ok(())
}
