use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{KIND_BUNDLE, KIND_UC, Product},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    services::require_text,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    let uc_only = query.category.as_deref() == Some(KIND_UC);
    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    let mut finder = Products::find().filter(condition);
    // The storefront shows UC options smallest first; everything else newest
    // first.
    finder = if uc_only {
        finder.order_by_asc(Column::UcAmount)
    } else {
        finder.order_by_desc(Column::CreatedAt)
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product),
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    require_text(&payload.name, "name")?;
    let uc_amount = validate_category_fields(&payload.category, payload.uc_amount)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        category: Set(payload.category),
        uc_amount: Set(uc_amount),
        price: Set(payload.price),
        image_url: Set(payload.image_url),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::try_record(
        &state.pool,
        user.subject,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let category = payload.category.unwrap_or_else(|| existing.category.clone());
    let uc_amount = payload.uc_amount.or(existing.uc_amount);
    // Re-check the cross-field rule against the merged result, not just the
    // patch.
    let uc_amount = validate_category_fields(&category, uc_amount)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        require_text(&name, "name")?;
        active.name = Set(name);
    }
    active.category = Set(category);
    active.uc_amount = Set(uc_amount);
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }

    let product = active.update(&state.orm).await?;

    audit::try_record(
        &state.pool,
        user.subject,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::try_record(
        &state.pool,
        user.subject,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// `uc` products must carry a positive amount; `bundle` products never carry
/// one.
fn validate_category_fields(category: &str, uc_amount: Option<i32>) -> AppResult<Option<i32>> {
    match category {
        KIND_UC => match uc_amount {
            Some(amount) if amount > 0 => Ok(Some(amount)),
            Some(_) => Err(AppError::Validation("uc_amount must be positive".into())),
            None => Err(AppError::Validation(
                "uc_amount is required for uc products".into(),
            )),
        },
        KIND_BUNDLE => Ok(None),
        other => Err(AppError::Validation(format!(
            "unknown product category {other:?}"
        ))),
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        category: model.category,
        uc_amount: model.uc_amount,
        price: model.price,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uc_requires_amount() {
        assert!(validate_category_fields(KIND_UC, None).is_err());
        assert!(validate_category_fields(KIND_UC, Some(0)).is_err());
        assert_eq!(
            validate_category_fields(KIND_UC, Some(325)).unwrap(),
            Some(325)
        );
    }

    #[test]
    fn bundle_ignores_amount() {
        assert_eq!(validate_category_fields(KIND_BUNDLE, Some(325)).unwrap(), None);
        assert_eq!(validate_category_fields(KIND_BUNDLE, None).unwrap(), None);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(validate_category_fields("skin", Some(1)).is_err());
    }
}
