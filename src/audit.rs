use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

pub async fn record_action(
    pool: &DbPool,
    actor_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, actor_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Best-effort variant used by every mutating operation: audit failures are
/// logged and never fail the caller.
pub async fn try_record(
    pool: &DbPool,
    actor_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = record_action(pool, actor_id, action, resource, metadata).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
