use std::sync::Arc;

use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use topup_store_api::{
    config::{AppConfig, AuthStrategy, ProductResolution},
    credentials::CredentialStore,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::{LoginRequest, RegisterRequest, RotatePasswordRequest},
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN},
    notify::{LogNotifier, spawn_dispatcher},
    services::auth_service,
    state::AppState,
};

// Token-mode account flow: registration, login, admin bootstrap, rotation.
#[tokio::test]
async fn register_login_and_rotate_flow() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    let user = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "sara@example.com".into(),
            password: "pass1234".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(user.role, "user");

    // The email is unique.
    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "sara@example.com".into(),
            password: "pass1234".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "sara@example.com".into(),
            password: "pass1234".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!login.token.is_empty());

    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "sara@example.com".into(),
            password: "wrong".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));

    // Startup bootstrap creates the configured admin; it can log in.
    auth_service::ensure_admin_account(&state.pool, &state.config).await?;
    let admin_login = auth_service::login_user(
        &state,
        LoginRequest {
            email: state.config.admin_username.clone(),
            password: state.config.admin_password.clone(),
        },
    )
    .await?;
    assert!(admin_login.success);

    // Rotation swaps the stored hash, never the configuration.
    let (admin_id,): (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&state.config.admin_username)
        .fetch_one(&state.pool)
        .await?;
    let admin = AuthUser {
        subject: Some(admin_id),
        role: ROLE_ADMIN.into(),
    };
    auth_service::rotate_admin_password(
        &state,
        &admin,
        RotatePasswordRequest {
            new_password: "rotated-secret".into(),
        },
    )
    .await?;

    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: state.config.admin_username.clone(),
            password: state.config.admin_password.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));

    let rotated = auth_service::login_user(
        &state,
        LoginRequest {
            email: state.config.admin_username.clone(),
            password: "rotated-secret".into(),
        },
    )
    .await?;
    assert!(rotated.success);

    // Registration is a token-mode feature.
    let session_state = AppState {
        config: AppConfig {
            auth_strategy: AuthStrategy::Session,
            ..state.config.clone()
        },
        ..state.clone()
    };
    let err = auth_service::register_user(
        &session_state,
        RegisterRequest {
            email: "nope@example.com".into(),
            password: "pass1234".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE orders, inquiries, suggestions, audit_logs, products, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        auth_strategy: AuthStrategy::Token,
        product_resolution: ProductResolution::Catalog,
        admin_username: "admin@example.com".into(),
        admin_password: "admin123".into(),
        notify_on_order: false,
        telegram: None,
    };
    let credentials = Arc::new(CredentialStore::new(
        &config.admin_username,
        &config.admin_password,
    )?);
    let notify = spawn_dispatcher(Arc::new(LogNotifier));

    Ok(AppState {
        pool,
        orm,
        config,
        credentials,
        notify,
    })
}
