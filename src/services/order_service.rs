use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    config::ProductResolution,
    dto::orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{KIND_BUNDLE, KIND_UC, Order, order_status},
    notify::Notification,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::require_text,
    state::AppState,
};

/// Product fields an order is stored with, after the configured resolution
/// strategy has been applied.
#[derive(Debug, PartialEq)]
struct ResolvedProduct {
    kind: String,
    uc_amount: Option<i32>,
    bundle_name: Option<String>,
    product_id: Option<Uuid>,
}

pub async fn create_order(
    state: &AppState,
    requester: Option<&AuthUser>,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    require_text(&payload.customer_name, "customer_name")?;
    require_text(&payload.player_id, "player_id")?;
    require_text(&payload.contact_email, "contact_email")?;
    require_text(&payload.total_amount, "total_amount")?;
    require_text(&payload.transaction_id, "transaction_id")?;

    let resolved = resolve_product(state, &payload).await?;

    let active = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_name: Set(payload.customer_name),
        player_id: Set(payload.player_id),
        contact_email: Set(payload.contact_email),
        kind: Set(resolved.kind),
        uc_amount: Set(resolved.uc_amount),
        bundle_name: Set(resolved.bundle_name),
        product_id: Set(resolved.product_id),
        total_amount: Set(payload.total_amount),
        transaction_id: Set(payload.transaction_id),
        screenshot_url: Set(payload.screenshot_url),
        status: Set(order_status::AWAITING_PAYMENT.to_string()),
        owner_id: Set(requester.and_then(|user| user.subject)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let order = active.insert(&state.orm).await?;

    if state.config.notify_on_order {
        state.notify.enqueue(Notification::Chat {
            text: format!(
                "New {} order {} from {} (total {})",
                order.kind, order.id, order.customer_name, order.total_amount
            ),
        });
    }

    Ok(ApiResponse::success(
        "Order received",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

async fn resolve_product(
    state: &AppState,
    payload: &CreateOrderRequest,
) -> AppResult<ResolvedProduct> {
    match state.config.product_resolution {
        ProductResolution::Inline => {
            resolve_inline(payload.uc_amount, payload.bundle_name.as_deref())
        }
        ProductResolution::Catalog => {
            let product_id = payload
                .product_id
                .ok_or_else(|| AppError::Validation("product_id is required".into()))?;

            // The catalog row, not the client, decides what was bought.
            let product = Products::find_by_id(product_id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;

            let bundle_name = (product.category == KIND_BUNDLE).then(|| product.name.clone());
            Ok(ResolvedProduct {
                kind: product.category,
                uc_amount: product.uc_amount,
                bundle_name,
                product_id: Some(product.id),
            })
        }
    }
}

fn resolve_inline(uc_amount: Option<i32>, bundle_name: Option<&str>) -> AppResult<ResolvedProduct> {
    let bundle_name = bundle_name.map(str::trim).filter(|name| !name.is_empty());
    match (uc_amount, bundle_name) {
        (Some(amount), None) if amount > 0 => Ok(ResolvedProduct {
            kind: KIND_UC.to_string(),
            uc_amount: Some(amount),
            bundle_name: None,
            product_id: None,
        }),
        (Some(_), None) => Err(AppError::Validation("uc_amount must be positive".into())),
        (None, Some(name)) => Ok(ResolvedProduct {
            kind: KIND_BUNDLE.to_string(),
            uc_amount: None,
            bundle_name: Some(name.to_string()),
            product_id: None,
        }),
        _ => Err(AppError::Validation(
            "exactly one of uc_amount or bundle_name is required".into(),
        )),
    }
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if !user.is_admin() {
        // Non-admin callers only ever see their own orders.
        let owner = user.subject.ok_or(AppError::Forbidden)?;
        condition = condition.add(OrderCol::OwnerId.eq(owner));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !user.is_admin() && order.owner_id != user.subject {
        // Hide other owners' orders rather than confirming they exist.
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Order",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    if !order_status::is_known(&payload.status) {
        return Err(AppError::Validation(format!(
            "unknown order status {:?}",
            payload.status
        )));
    }

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !order_status::can_transition(&existing.status, &payload.status) {
        return Err(AppError::Validation(format!(
            "illegal status transition {:?} -> {:?}",
            existing.status, payload.status
        )));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    audit::try_record(
        &state.pool,
        user.subject,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::try_record(
        &state.pool,
        user.subject,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_name: model.customer_name,
        player_id: model.player_id,
        contact_email: model.contact_email,
        kind: model.kind,
        uc_amount: model.uc_amount,
        bundle_name: model.bundle_name,
        product_id: model.product_id,
        total_amount: model.total_amount,
        transaction_id: model.transaction_id,
        screenshot_url: model.screenshot_url,
        status: model.status,
        owner_id: model.owner_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
