use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::feedback::{CreateInquiryRequest, CreateSuggestionRequest},
    error::AppResult,
    models::{Inquiry, Suggestion},
    response::ApiResponse,
    services::feedback_service,
    state::AppState,
};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/inquiry", post(create_inquiry))
        .route("/suggestion", post(create_suggestion))
}

#[utoipa::path(
    post,
    path = "/api/inquiry",
    request_body = CreateInquiryRequest,
    responses(
        (status = 200, description = "Inquiry received", body = ApiResponse<Inquiry>),
        (status = 400, description = "Missing fields"),
    ),
    tag = "Feedback"
)]
pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(payload): Json<CreateInquiryRequest>,
) -> AppResult<Json<ApiResponse<Inquiry>>> {
    let resp = feedback_service::create_inquiry(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/suggestion",
    request_body = CreateSuggestionRequest,
    responses(
        (status = 200, description = "Suggestion received", body = ApiResponse<Suggestion>),
        (status = 400, description = "Missing fields"),
    ),
    tag = "Feedback"
)]
pub async fn create_suggestion(
    State(state): State<AppState>,
    Json(payload): Json<CreateSuggestionRequest>,
) -> AppResult<Json<ApiResponse<Suggestion>>> {
    let resp = feedback_service::create_suggestion(&state, payload).await?;
    Ok(Json(resp))
}
