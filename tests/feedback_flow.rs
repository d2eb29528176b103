use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use topup_store_api::{
    config::{AppConfig, AuthStrategy, ProductResolution},
    credentials::CredentialStore,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::feedback::{
        CreateInquiryRequest, CreateSuggestionRequest, DirectMessageRequest, ReplyInquiryRequest,
    },
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_USER},
    models::inquiry_status,
    notify::{Notification, Notifier, NotifyError, spawn_dispatcher},
    services::feedback_service,
    state::AppState,
};

/// Records payloads handed to it; stands in for the external channel.
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(note.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _note: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".into()))
    }
}

// Feedback flow: public submissions notify the admin best-effort; the reply
// flow couples delivery and the status flip.
#[tokio::test]
async fn inquiry_reply_and_moderation_flow() -> anyhow::Result<()> {
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

    let channel = Arc::new(RecordingNotifier {
        sent: Mutex::new(Vec::new()),
    });
    let state = setup_state(&database_url, channel.clone()).await?;

    let admin = AuthUser {
        subject: None,
        role: ROLE_ADMIN.into(),
    };
    let visitor = AuthUser {
        subject: Some(Uuid::new_v4()),
        role: ROLE_USER.into(),
    };

    // Public inquiry persists even though delivery is asynchronous.
    let inquiry = feedback_service::create_inquiry(
        &state,
        CreateInquiryRequest {
            name: "Sara".into(),
            email: "sara@example.com".into(),
            message: "Where is my top-up?".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(inquiry.status, inquiry_status::PENDING);

    // Blank fields never reach storage.
    let err = feedback_service::create_inquiry(
        &state,
        CreateInquiryRequest {
            name: "".into(),
            email: "x@example.com".into(),
            message: "hi".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Moderation is admin-only.
    let err = feedback_service::list_inquiries(&state, &visitor)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let listed = feedback_service::list_inquiries(&state, &admin)
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 1);

    // A dead channel blocks the reply and leaves the inquiry pending.
    let broken_state = AppState {
        notify: spawn_dispatcher(Arc::new(FailingNotifier)),
        ..state.clone()
    };
    let err = feedback_service::reply_inquiry(
        &broken_state,
        &admin,
        inquiry.id,
        ReplyInquiryRequest {
            reply: "On its way".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Notification(_)));
    let (status,): (String,) = sqlx::query_as("SELECT status FROM inquiries WHERE id = $1")
        .bind(inquiry.id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(status, inquiry_status::PENDING);

    // With a working channel the reply lands and the status advances.
    let replied = feedback_service::reply_inquiry(
        &state,
        &admin,
        inquiry.id,
        ReplyInquiryRequest {
            reply: "On its way".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(replied.status, inquiry_status::REPLIED);
    assert!(
        channel
            .sent
            .lock()
            .unwrap()
            .iter()
            .any(|note| matches!(note, Notification::Customer { email, .. } if email == "sara@example.com"))
    );

    // Replying twice is rejected.
    let err = feedback_service::reply_inquiry(
        &state,
        &admin,
        inquiry.id,
        ReplyInquiryRequest {
            reply: "again".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Suggestions: create, list, delete; a second delete is a 404.
    let suggestion = feedback_service::create_suggestion(
        &state,
        CreateSuggestionRequest {
            name: "Omar".into(),
            contact: "@omar".into(),
            message: "Add 3850 UC".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let suggestions = feedback_service::list_suggestions(&state, &admin)
        .await?
        .data
        .unwrap();
    assert_eq!(suggestions.items.len(), 1);
    feedback_service::delete_suggestion(&state, &admin, suggestion.id).await?;
    let err = feedback_service::delete_suggestion(&state, &admin, suggestion.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Direct message goes straight through the channel.
    feedback_service::send_direct_message(
        &state,
        &admin,
        DirectMessageRequest {
            email: "sara@example.com".into(),
            subject: "Your order".into(),
            message: "Delivered today".into(),
        },
    )
    .await?;
    assert!(channel.sent.lock().unwrap().len() >= 2);

    Ok(())
}

async fn setup_state(database_url: &str, channel: Arc<dyn Notifier>) -> anyhow::Result<AppState> {
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
    let notify = spawn_dispatcher(channel);

    Ok(AppState {
        pool,
        orm,
        config,
        credentials,
        notify,
    })
}
