use uuid::Uuid;

use crate::{
    audit,
    dto::feedback::{
        CreateInquiryRequest, CreateSuggestionRequest, DirectMessageRequest, InquiryList,
        ReplyInquiryRequest, SuggestionList,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Inquiry, Suggestion, inquiry_status},
    notify::Notification,
    response::{ApiResponse, Meta},
    services::require_text,
    state::AppState,
};

pub async fn create_inquiry(
    state: &AppState,
    payload: CreateInquiryRequest,
) -> AppResult<ApiResponse<Inquiry>> {
    require_text(&payload.name, "name")?;
    require_text(&payload.email, "email")?;
    require_text(&payload.message, "message")?;

    let inquiry: Inquiry = sqlx::query_as(
        r#"
        INSERT INTO inquiries (id, name, email, message)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.message)
    .fetch_one(&state.pool)
    .await?;

    // Best effort: the inquiry is saved whether or not the alert goes out.
    state.notify.enqueue(Notification::AdminAlert {
        subject: "New customer inquiry".into(),
        body: format!(
            "From: {} <{}>\n\n{}",
            inquiry.name, inquiry.email, inquiry.message
        ),
    });

    Ok(ApiResponse::success(
        "Inquiry received",
        inquiry,
        Some(Meta::empty()),
    ))
}

pub async fn create_suggestion(
    state: &AppState,
    payload: CreateSuggestionRequest,
) -> AppResult<ApiResponse<Suggestion>> {
    require_text(&payload.name, "name")?;
    require_text(&payload.contact, "contact")?;
    require_text(&payload.message, "message")?;

    let suggestion: Suggestion = sqlx::query_as(
        r#"
        INSERT INTO suggestions (id, name, contact, message)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(&payload.contact)
    .bind(&payload.message)
    .fetch_one(&state.pool)
    .await?;

    state.notify.enqueue(Notification::AdminAlert {
        subject: "New suggestion".into(),
        body: format!(
            "From: {} ({})\n\n{}",
            suggestion.name, suggestion.contact, suggestion.message
        ),
    });

    Ok(ApiResponse::success(
        "Suggestion received",
        suggestion,
        Some(Meta::empty()),
    ))
}

pub async fn list_inquiries(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InquiryList>> {
    ensure_admin(user)?;

    let items = sqlx::query_as::<_, Inquiry>("SELECT * FROM inquiries ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Inquiries",
        InquiryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_suggestions(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SuggestionList>> {
    ensure_admin(user)?;

    let items =
        sqlx::query_as::<_, Suggestion>("SELECT * FROM suggestions ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "Suggestions",
        SuggestionList { items },
        Some(Meta::empty()),
    ))
}

pub async fn delete_inquiry(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::try_record(
        &state.pool,
        user.subject,
        "inquiry_delete",
        "inquiries",
        serde_json::json!({ "inquiry_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inquiry deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn delete_suggestion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = sqlx::query("DELETE FROM suggestions WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::try_record(
        &state.pool,
        user.subject,
        "suggestion_delete",
        "suggestions",
        serde_json::json!({ "suggestion_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Suggestion deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Reply to an inquiry. The customer notification is delivered first and the
/// status flip only happens after it succeeds, so a dropped send leaves the
/// inquiry visibly pending.
pub async fn reply_inquiry(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ReplyInquiryRequest,
) -> AppResult<ApiResponse<Inquiry>> {
    ensure_admin(user)?;
    require_text(&payload.reply, "reply")?;

    let inquiry: Inquiry = sqlx::query_as("SELECT * FROM inquiries WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound)?;

    if inquiry.status == inquiry_status::REPLIED {
        return Err(AppError::Validation(
            "inquiry has already been replied to".into(),
        ));
    }

    state
        .notify
        .deliver(&Notification::Customer {
            email: inquiry.email.clone(),
            subject: "Reply to your inquiry".into(),
            body: format!(
                "Your inquiry:\n{}\n\nOur reply:\n{}",
                inquiry.message, payload.reply
            ),
        })
        .await?;

    let updated: Inquiry = sqlx::query_as(
        "UPDATE inquiries SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(inquiry_status::REPLIED)
    .fetch_one(&state.pool)
    .await?;

    audit::try_record(
        &state.pool,
        user.subject,
        "inquiry_reply",
        "inquiries",
        serde_json::json!({ "inquiry_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Reply sent",
        updated,
        Some(Meta::empty()),
    ))
}

/// Direct admin-to-customer message; delivery failure is the caller's
/// problem, so this one is synchronous too.
pub async fn send_direct_message(
    state: &AppState,
    user: &AuthUser,
    payload: DirectMessageRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    require_text(&payload.email, "email")?;
    require_text(&payload.subject, "subject")?;
    require_text(&payload.message, "message")?;

    state
        .notify
        .deliver(&Notification::Customer {
            email: payload.email.clone(),
            subject: payload.subject.clone(),
            body: payload.message.clone(),
        })
        .await?;

    audit::try_record(
        &state.pool,
        user.subject,
        "direct_message",
        "notifications",
        serde_json::json!({ "email": payload.email }),
    )
    .await;

    Ok(ApiResponse::success(
        "Message sent",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
