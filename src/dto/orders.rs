use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Order;

/// Order submission. Which product fields are honored depends on the
/// configured resolution strategy: inline deployments read
/// `uc_amount`/`bundle_name`, catalog deployments read `product_id` and
/// derive the rest from the referenced product.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub player_id: String,
    pub contact_email: String,
    pub uc_amount: Option<i32>,
    pub bundle_name: Option<String>,
    pub product_id: Option<Uuid>,
    pub total_amount: String,
    pub transaction_id: String,
    pub screenshot_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
