use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    dto::auth::{AdminLoginRequest, RotatePasswordRequest},
    dto::feedback::{DirectMessageRequest, InquiryList, ReplyInquiryRequest, SuggestionList},
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Inquiry, Product},
    response::ApiResponse,
    services::{auth_service, catalog_service, feedback_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(admin_login))
        .route("/logout", post(admin_logout))
        .route("/password", post(rotate_password))
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product))
        .route("/products/{id}", delete(delete_product))
        .route("/inquiries", get(list_inquiries))
        .route("/inquiries/{id}", delete(delete_inquiry))
        .route("/inquiries/{id}/reply", post(reply_inquiry))
        .route("/suggestions", get(list_suggestions))
        .route("/suggestions/{id}", delete(delete_suggestion))
        .route("/messages", post(send_message))
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Session established"),
        (status = 401, description = "Wrong credentials"),
        (status = 400, description = "Disabled in token mode"),
    ),
    tag = "Admin"
)]
pub async fn admin_login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AdminLoginRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::admin_login(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses((status = 200, description = "Session destroyed")),
    tag = "Admin"
)]
pub async fn admin_logout(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::admin_logout(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/password",
    request_body = RotatePasswordRequest,
    responses(
        (status = 200, description = "Password rotated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn rotate_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RotatePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::rotate_admin_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Category rule violated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = catalog_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 400, description = "Category rule violated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = catalog_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/inquiries",
    responses(
        (status = 200, description = "Inquiries, newest first", body = ApiResponse<InquiryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_inquiries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InquiryList>>> {
    let resp = feedback_service::list_inquiries(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/inquiries/{id}",
    params(("id" = Uuid, Path, description = "Inquiry ID")),
    responses(
        (status = 200, description = "Inquiry deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_inquiry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = feedback_service::delete_inquiry(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/inquiries/{id}/reply",
    params(("id" = Uuid, Path, description = "Inquiry ID")),
    request_body = ReplyInquiryRequest,
    responses(
        (status = 200, description = "Reply delivered and status advanced", body = ApiResponse<Inquiry>),
        (status = 400, description = "Already replied"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 502, description = "Notification channel failure; status unchanged"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn reply_inquiry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplyInquiryRequest>,
) -> AppResult<Json<ApiResponse<Inquiry>>> {
    let resp = feedback_service::reply_inquiry(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/suggestions",
    responses(
        (status = 200, description = "Suggestions, newest first", body = ApiResponse<SuggestionList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_suggestions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SuggestionList>>> {
    let resp = feedback_service::list_suggestions(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/suggestions/{id}",
    params(("id" = Uuid, Path, description = "Suggestion ID")),
    responses(
        (status = 200, description = "Suggestion deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_suggestion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = feedback_service::delete_suggestion(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/messages",
    request_body = DirectMessageRequest,
    responses(
        (status = 200, description = "Message delivered"),
        (status = 403, description = "Forbidden"),
        (status = 502, description = "Notification channel failure"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DirectMessageRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = feedback_service::send_direct_message(&state, &user, payload).await?;
    Ok(Json(resp))
}
