use std::sync::Arc;

use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use topup_store_api::{
    config::{AppConfig, AuthStrategy, ProductResolution},
    credentials::CredentialStore,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::orders::{CreateOrderRequest, UpdateOrderStatusRequest},
    dto::products::CreateProductRequest,
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_USER},
    models::order_status,
    notify::{LogNotifier, spawn_dispatcher},
    routes::params::{OrderListQuery, Pagination},
    services::{catalog_service, order_service},
    state::AppState,
};

// Integration flow over the order lifecycle: submission under both product
// resolution strategies, owner scoping, admin-gated status transitions and
// deletion.
#[tokio::test]
async fn order_lifecycle_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
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

    let state = setup_state(&database_url, ProductResolution::Catalog).await?;

    let user_id = create_user(&state, ROLE_USER, "user@example.com").await?;
    let other_id = create_user(&state, ROLE_USER, "other@example.com").await?;
    let admin_id = create_user(&state, ROLE_ADMIN, "admin@example.com").await?;

    let customer = AuthUser {
        subject: Some(user_id),
        role: ROLE_USER.into(),
    };
    let other = AuthUser {
        subject: Some(other_id),
        role: ROLE_USER.into(),
    };
    let admin = AuthUser {
        subject: Some(admin_id),
        role: ROLE_ADMIN.into(),
    };

    // Admin stocks the catalog.
    let product = catalog_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "660 UC".into(),
            category: "uc".into(),
            uc_amount: Some(660),
            price: 99900,
            image_url: None,
        },
    )
    .await?
    .data
    .unwrap();

    // Concurrent submissions get distinct generated ids.
    let (first, second) = tokio::join!(
        order_service::create_order(&state, Some(&customer), order_payload(product.id)),
        order_service::create_order(&state, Some(&other), order_payload(product.id)),
    );
    let first = first?.data.unwrap();
    let second = second?.data.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.status, order_status::AWAITING_PAYMENT);
    assert_eq!(second.status, order_status::AWAITING_PAYMENT);
    // The catalog row, not the request, decided the product fields.
    assert_eq!(first.kind, "uc");
    assert_eq!(first.uc_amount, Some(660));
    assert_eq!(first.owner_id, Some(user_id));

    // Admin sees both orders; each customer only their own.
    let all = order_service::list_orders(&state, &admin, default_query()).await?;
    assert_eq!(all.meta.unwrap().total, Some(2));

    let mine = order_service::list_orders(&state, &customer, default_query())
        .await?
        .data
        .unwrap();
    assert_eq!(mine.items.len(), 1);
    assert!(mine.items.iter().all(|o| o.owner_id == Some(user_id)));

    // Another user's order is hidden, not just forbidden.
    let err = order_service::get_order(&state, &other, first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Status updates are admin-only and leave the row untouched on failure.
    let err = order_service::update_status(
        &state,
        &customer,
        first.id,
        UpdateOrderStatusRequest {
            status: order_status::PAID.into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let unchanged = order_service::get_order(&state, &admin, first.id)
        .await?
        .data
        .unwrap();
    assert_eq!(unchanged.status, order_status::AWAITING_PAYMENT);

    // Unknown ids are a 404 without side effects.
    let err = order_service::update_status(
        &state,
        &admin,
        Uuid::new_v4(),
        UpdateOrderStatusRequest {
            status: order_status::PAID.into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Forward transition works; repeating or moving backwards does not.
    let paid = order_service::update_status(
        &state,
        &admin,
        first.id,
        UpdateOrderStatusRequest {
            status: order_status::PAID.into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(paid.status, order_status::PAID);

    let err = order_service::update_status(
        &state,
        &admin,
        first.id,
        UpdateOrderStatusRequest {
            status: order_status::AWAITING_PAYMENT.into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let delivered = order_service::update_status(
        &state,
        &admin,
        first.id,
        UpdateOrderStatusRequest {
            status: order_status::DELIVERED.into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(delivered.status, order_status::DELIVERED);

    // Orders against a vanished product are rejected with nothing inserted.
    catalog_service::delete_product(&state, &admin, product.id).await?;
    let err = order_service::create_order(&state, Some(&customer), order_payload(product.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let all = order_service::list_orders(&state, &admin, default_query()).await?;
    assert_eq!(all.meta.unwrap().total, Some(2));

    // Inline deployments skip the catalog entirely.
    let inline_state = AppState {
        config: AppConfig {
            product_resolution: ProductResolution::Inline,
            ..state.config.clone()
        },
        ..state.clone()
    };
    let inline_order = order_service::create_order(
        &inline_state,
        None,
        CreateOrderRequest {
            customer_name: "Walk-in".into(),
            player_id: "5551234".into(),
            contact_email: "walkin@example.com".into(),
            uc_amount: None,
            bundle_name: Some("Royale Pass".into()),
            product_id: None,
            total_amount: "11.99".into(),
            transaction_id: "TXN-777".into(),
            screenshot_url: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(inline_order.kind, "bundle");
    assert_eq!(inline_order.bundle_name.as_deref(), Some("Royale Pass"));
    assert_eq!(inline_order.owner_id, None);

    // Admin deletion; a second attempt is a 404.
    order_service::delete_order(&state, &admin, inline_order.id).await?;
    let err = order_service::delete_order(&state, &admin, inline_order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

fn order_payload(product_id: Uuid) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: "Ahmed".into(),
        player_id: "51234567".into(),
        contact_email: "ahmed@example.com".into(),
        uc_amount: None,
        bundle_name: None,
        product_id: Some(product_id),
        total_amount: "9.99".into(),
        transaction_id: "TXN-1001".into(),
        screenshot_url: Some("/uploads/receipt.png".into()),
    }
}

fn default_query() -> OrderListQuery {
    OrderListQuery {
        pagination: Pagination {
            page: Some(1),
            per_page: Some(50),
        },
        status: None,
        sort_order: None,
    }
}

async fn setup_state(
    database_url: &str,
    product_resolution: ProductResolution,
) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs.
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
        product_resolution,
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

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, 'x', $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(role)
    .fetch_one(&state.pool)
    .await?;
    Ok(row.0)
}
